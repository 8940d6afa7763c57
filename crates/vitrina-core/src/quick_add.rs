//! One-line product entry: `Nombre | Precio | URL`.

use vitrina_types::error::ValidationError;
use vitrina_types::price::Price;
use vitrina_types::product::MediaKind;

use crate::media::classify_media_url;
use crate::session::draft::validate_name;

#[derive(Debug, Clone, PartialEq)]
pub struct QuickAdd {
    pub name: String,
    pub price: Price,
    pub media: Option<(MediaKind, String)>,
}

/// Whether `text` looks like a quick-add line at all.
pub fn is_quick_add(text: &str) -> bool {
    text.contains('|')
}

/// Parse a quick-add line. The media part is optional; an empty one is
/// ignored, a malformed one rejected.
pub fn parse(text: &str) -> Result<QuickAdd, ValidationError> {
    let mut parts = text.split('|').map(str::trim);
    let name = validate_name(parts.next().unwrap_or_default())?;
    let price = Price::parse_input(parts.next().unwrap_or_default())?;
    let media = match parts.next() {
        Some(url) if !url.is_empty() => Some(classify_media_url(url)?),
        _ => None,
    };
    Ok(QuickAdd { name, price, media })
}

#[cfg(test)]
mod tests {
    use vitrina_types::error::PriceError;

    use super::*;

    #[test]
    fn test_full_line() {
        let q = parse("Nike Air Max | 250000 | https://x/a.jpg").unwrap();
        assert_eq!(q.name, "Nike Air Max");
        assert_eq!(q.price.to_string(), "250000");
        assert_eq!(
            q.media,
            Some((MediaKind::Image, "https://x/a.jpg".to_string()))
        );
    }

    #[test]
    fn test_without_media() {
        let q = parse("Gorra | $45.000").unwrap();
        assert_eq!(q.price.to_string(), "45000");
        assert!(q.media.is_none());
        assert!(parse("Gorra | 45000 |  ").unwrap().media.is_none());
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            parse("ab | 1000"),
            Err(ValidationError::NameTooShort { min: 3 })
        );
        assert_eq!(
            parse("Gorra |"),
            Err(ValidationError::Price(PriceError::Empty))
        );
        assert!(matches!(
            parse("Gorra | 1000 | foto"),
            Err(ValidationError::InvalidMediaUrl(_))
        ));
    }

    #[test]
    fn test_detection() {
        assert!(is_quick_add("a | b"));
        assert!(!is_quick_add("hola"));
    }
}
