//! The product wizard state machine.
//!
//! `CatalogSession` wraps a [`ProductDraft`] and applies one input at a time.
//! Malformed input never ends the session: it produces an `Invalid` reply and
//! the wizard stays on the same step.

use tokio::time::Instant;
use vitrina_types::product::{Category, MediaKind};
use vitrina_types::reply::{Reply, WizardStep};

use super::draft::ProductDraft;
use crate::media::classify_media_url;

/// One normalized wizard input. Uploads are resolved to URLs by the caller
/// before they get here.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardInput {
    Text(String),
    Category(Category),
    Media { kind: MediaKind, url: String },
    Skip,
    Continue,
    Cancel,
}

/// What applying an input did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Still capturing; tell the user these things.
    Continue(Vec<Reply>),
    /// The draft is complete and has been taken out of the session.
    Finalize(Box<ProductDraft>),
    Cancelled,
}

impl Transition {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Transition::Continue(_))
    }
}

#[derive(Debug, Clone)]
pub struct CatalogSession {
    pub chat_id: i64,
    pub draft: ProductDraft,
    pub media_limit: usize,
    pub last_activity: Instant,
}

impl CatalogSession {
    pub fn new(chat_id: i64, media_limit: usize) -> Self {
        Self {
            chat_id,
            draft: ProductDraft::default(),
            media_limit,
            last_activity: Instant::now(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.draft.next_step()
    }

    pub fn apply(&mut self, input: WizardInput) -> Transition {
        self.last_activity = Instant::now();
        let step = self.step();

        match input {
            WizardInput::Cancel => Transition::Cancelled,
            WizardInput::Skip => match self.draft.skip() {
                Err(step) => Transition::Continue(vec![
                    Reply::SkipNotAllowed { step },
                    Reply::Prompt { step },
                ]),
                Ok(next) => {
                    let mut replies = Vec::new();
                    if step == WizardStep::Category {
                        if let Some(category) = self.draft.category {
                            replies.push(Reply::CategorySelected { category });
                        }
                    }
                    self.advance_to(next, replies)
                }
            },
            WizardInput::Continue if step == WizardStep::Media => {
                self.draft.media_done = true;
                self.finalize()
            }
            WizardInput::Continue => self.reprompt(),
            WizardInput::Text(text) => self.apply_text(step, &text),
            WizardInput::Category(category) if step == WizardStep::Category => {
                self.select_category(category)
            }
            WizardInput::Category(_) => self.reprompt(),
            WizardInput::Media { kind, url } if step == WizardStep::Media => {
                self.accept_media(kind, url)
            }
            WizardInput::Media { .. } => self.reprompt(),
        }
    }

    fn apply_text(&mut self, step: WizardStep, text: &str) -> Transition {
        let result = match step {
            WizardStep::Name => self.draft.set_name(text),
            WizardStep::Price => self.draft.set_price(text),
            WizardStep::Description => {
                self.draft.description = Some(text.trim().to_string());
                Ok(())
            }
            WizardStep::Sizes => {
                self.draft.sizes = Some(text.trim().to_string());
                Ok(())
            }
            WizardStep::Category => match text.parse::<Category>() {
                Ok(category) => return self.select_category(category),
                Err(_) => Err(vitrina_types::error::ValidationError::UnknownCategory(
                    text.trim().to_string(),
                )),
            },
            WizardStep::Media => match classify_media_url(text) {
                Ok((kind, url)) => return self.accept_media(kind, url),
                Err(e) => Err(e),
            },
            WizardStep::Finalize => return self.finalize(),
        };

        match result {
            Ok(()) => self.advance_to(self.step(), Vec::new()),
            Err(error) => Transition::Continue(vec![
                Reply::Invalid { step, error },
                Reply::Prompt { step },
            ]),
        }
    }

    fn select_category(&mut self, category: Category) -> Transition {
        self.draft.category = Some(category);
        self.advance_to(self.step(), vec![Reply::CategorySelected { category }])
    }

    fn accept_media(&mut self, kind: MediaKind, url: String) -> Transition {
        match self.draft.push_media(kind, url, self.media_limit) {
            Ok(()) => Transition::Continue(vec![Reply::MediaAccepted {
                kind,
                images: self.draft.image_count(),
                videos: self.draft.videos.len(),
            }]),
            Err(_) => Transition::Continue(vec![Reply::MediaLimitReached {
                limit: self.media_limit,
            }]),
        }
    }

    fn advance_to(&mut self, next: WizardStep, mut replies: Vec<Reply>) -> Transition {
        if next == WizardStep::Finalize {
            return self.finalize();
        }
        replies.push(Reply::Prompt { step: next });
        Transition::Continue(replies)
    }

    fn reprompt(&self) -> Transition {
        Transition::Continue(vec![Reply::Prompt { step: self.step() }])
    }

    fn finalize(&mut self) -> Transition {
        Transition::Finalize(Box::new(std::mem::take(&mut self.draft)))
    }
}

#[cfg(test)]
mod tests {
    use vitrina_types::error::ValidationError;

    use super::*;

    fn text(s: &str) -> WizardInput {
        WizardInput::Text(s.to_string())
    }

    fn replies(t: Transition) -> Vec<Reply> {
        match t {
            Transition::Continue(r) => r,
            other => panic!("expected Continue, got {other:?}"),
        }
    }

    #[test]
    fn test_full_walkthrough() {
        let mut s = CatalogSession::new(1, 30);
        assert_eq!(
            replies(s.apply(text("Test Shoe"))),
            vec![Reply::Prompt {
                step: WizardStep::Price
            }]
        );
        s.apply(text("150000"));
        assert_eq!(s.step(), WizardStep::Description);
        s.apply(WizardInput::Skip);
        s.apply(WizardInput::Skip);
        assert_eq!(s.step(), WizardStep::Category);
        let r = replies(s.apply(WizardInput::Category(Category::Sneakers)));
        assert_eq!(
            r,
            vec![
                Reply::CategorySelected {
                    category: Category::Sneakers
                },
                Reply::Prompt {
                    step: WizardStep::Media
                }
            ]
        );
        let r = replies(s.apply(text("http://x/a.jpg")));
        assert_eq!(
            r,
            vec![Reply::MediaAccepted {
                kind: MediaKind::Image,
                images: 1,
                videos: 0
            }]
        );
        match s.apply(WizardInput::Continue) {
            Transition::Finalize(draft) => {
                assert_eq!(draft.name.as_deref(), Some("Test Shoe"));
                assert_eq!(draft.price.unwrap().to_string(), "150000");
                assert_eq!(draft.primary_media.as_deref(), Some("http://x/a.jpg"));
                assert!(draft.extra_images.is_empty());
            }
            other => panic!("expected Finalize, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_price_stays_in_place() {
        let mut s = CatalogSession::new(1, 30);
        s.apply(text("Test Shoe"));
        let r = replies(s.apply(text("abc")));
        assert!(matches!(
            r[0],
            Reply::Invalid {
                step: WizardStep::Price,
                error: ValidationError::Price(_)
            }
        ));
        assert_eq!(s.step(), WizardStep::Price);
        assert!(s.draft.price.is_none());
    }

    #[test]
    fn test_skip_refused_at_name() {
        let mut s = CatalogSession::new(1, 30);
        let r = replies(s.apply(WizardInput::Skip));
        assert_eq!(
            r[0],
            Reply::SkipNotAllowed {
                step: WizardStep::Name
            }
        );
        assert_eq!(s.step(), WizardStep::Name);
    }

    #[test]
    fn test_skip_at_category_applies_default() {
        let mut s = CatalogSession::new(1, 30);
        s.apply(text("Gorra"));
        s.apply(text("45000"));
        s.apply(text("Gorra plana"));
        s.apply(text("Única"));
        let r = replies(s.apply(WizardInput::Skip));
        assert_eq!(
            r[0],
            Reply::CategorySelected {
                category: Category::Sneakers
            }
        );
        assert_eq!(s.step(), WizardStep::Media);
    }

    #[test]
    fn test_category_as_text() {
        let mut s = CatalogSession::new(1, 30);
        s.apply(text("Camiseta"));
        s.apply(text("45000"));
        s.apply(WizardInput::Skip);
        s.apply(WizardInput::Skip);
        s.apply(text("ropa"));
        assert_eq!(s.draft.category, Some(Category::Clothing));

        let mut s = CatalogSession::new(1, 30);
        s.apply(text("Camiseta"));
        s.apply(text("45000"));
        s.apply(WizardInput::Skip);
        s.apply(WizardInput::Skip);
        let r = replies(s.apply(text("sombreros")));
        assert!(matches!(
            r[0],
            Reply::Invalid {
                error: ValidationError::UnknownCategory(_),
                ..
            }
        ));
    }

    #[test]
    fn test_media_loop_repeats_and_caps() {
        let mut s = CatalogSession::new(1, 2);
        s.apply(text("Test Shoe"));
        s.apply(text("150000"));
        for _ in 0..3 {
            s.apply(WizardInput::Skip);
        }
        assert_eq!(s.step(), WizardStep::Media);
        s.apply(WizardInput::Media {
            kind: MediaKind::Video,
            url: "https://x/v.mp4".into(),
        });
        s.apply(text("http://x/a.jpg"));
        let r = replies(s.apply(text("http://x/b.jpg")));
        assert_eq!(r, vec![Reply::MediaLimitReached { limit: 2 }]);
        assert_eq!(s.step(), WizardStep::Media);
        let r = replies(s.apply(text("not a link")));
        assert!(matches!(r[0], Reply::Invalid { step: WizardStep::Media, .. }));
        assert!(matches!(s.apply(WizardInput::Skip), Transition::Finalize(_)));
    }

    #[test]
    fn test_cancel_from_anywhere() {
        let mut s = CatalogSession::new(1, 30);
        s.apply(text("Test Shoe"));
        assert_eq!(s.apply(WizardInput::Cancel), Transition::Cancelled);
    }

    #[test]
    fn test_out_of_place_inputs_reprompt() {
        let mut s = CatalogSession::new(1, 30);
        let r = replies(s.apply(WizardInput::Continue));
        assert_eq!(r, vec![Reply::Prompt { step: WizardStep::Name }]);
        let r = replies(s.apply(WizardInput::Category(Category::Clothing)));
        assert_eq!(r, vec![Reply::Prompt { step: WizardStep::Name }]);
        assert!(s.draft.category.is_none());
    }
}
