//! `vitrina list`: print the catalog as a table.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use vitrina_types::product::{Category, Product};

use crate::state::AppState;

pub async fn list_products(state: &AppState, json: bool) -> Result<()> {
    let products = state.store.hydrate().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
        return Ok(());
    }

    if products.is_empty() {
        println!();
        println!("  {}", style("No products yet.").dim());
        println!();
        return Ok(());
    }

    println!();
    println!(
        "  {} ({} products)",
        style("Catalog").bold(),
        products.len()
    );
    println!();
    println!("{}", product_table(&products));
    println!();
    Ok(())
}

/// Newest first, positions 1-based to match `/eliminar` and `/editar`.
pub fn product_table(products: &[Product]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Price").fg(Color::White),
        Cell::new("Category").fg(Color::White),
        Cell::new("Images").fg(Color::White),
        Cell::new("Videos").fg(Color::White),
        Cell::new("Id").fg(Color::White),
    ]);

    for (i, product) in products.iter().enumerate() {
        let category = match product.category {
            Category::Sneakers => Cell::new("sneakers").fg(Color::Cyan),
            Category::Clothing => Cell::new("clothing").fg(Color::Magenta),
        };
        let price = if product.price.is_zero() {
            Cell::new("0").fg(Color::Yellow)
        } else {
            Cell::new(format!("${}", product.price))
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&product.name).fg(Color::Cyan),
            price,
            category,
            Cell::new(product.image_count()),
            Cell::new(product.videos.len()),
            Cell::new(product.id.as_str()).fg(Color::DarkGrey),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use vitrina_types::price::Price;
    use vitrina_types::product::ProductId;

    use super::*;

    #[test]
    fn table_has_one_row_per_product() {
        let product = Product {
            id: ProductId::from("producto_a"),
            name: "Nike Air Max".into(),
            price: Price::parse_input("250000").unwrap(),
            description: String::new(),
            sizes: String::new(),
            category: Category::Sneakers,
            primary_media: Some("https://i.ibb.co/a.jpg".into()),
            extra_images: vec![],
            videos: vec![],
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            created_by: None,
            extra: Default::default(),
        };
        let table = product_table(&[product]);
        assert_eq!(table.row_iter().count(), 1);
        let rendered = table.to_string();
        assert!(rendered.contains("Nike Air Max"));
        assert!(rendered.contains("$250000"));
        assert!(rendered.contains("producto_a"));
    }
}
