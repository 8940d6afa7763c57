//! Spanish text for bot replies.
//!
//! The core emits semantic [`Reply`] values; this is the only place that
//! turns them into words.

use vitrina_types::error::{PriceError, ValidationError};
use vitrina_types::product::{Category, MediaKind, Product};
use vitrina_types::reply::{FlushOutcome, Reply, WizardStep};

/// Number of user-facing wizard steps (finalize has no prompt).
const STEPS: usize = 6;

pub fn render(reply: &Reply) -> String {
    match reply {
        Reply::Welcome { name } => {
            let greeting = match name {
                Some(name) => format!("Hola {name}!"),
                None => "Hola!".to_string(),
            };
            format!(
                "👋 Bienvenido a Vitrina\n\n{greeting}\n\n{}\n\n💡 Formato rápido:\nNombre | Precio | URL_imagen\nEjemplo: Nike Air Max | 250000 | https://...",
                command_summary()
            )
        }
        Reply::Help => format!(
            "📚 Guía de uso\n\n{}\n\nGestión:\n• /eliminar <posición|id>\n• /editar <posición|id> <campo> <valor>\n  campos: nombre, precio, descripcion, tallas, categoria\n\nCategorías: 👟 Zapatillas, 👕 Ropa\nMultimedia: varias fotos y videos, como enlaces o archivos.",
            command_summary()
        ),
        Reply::Denied { user_id } => format!(
            "🚫 Acceso denegado\n\nEste bot es solo para administradores.\nTu ID: {user_id}"
        ),
        Reply::Prompt { step } => prompt(*step),
        Reply::Invalid { error, .. } => format!("❌ {}", validation(error)),
        Reply::SkipNotAllowed { step } => {
            format!("⚠️ El {} es obligatorio, no se puede saltar.", field_label(*step))
        }
        Reply::CategorySelected { category } => {
            format!("✅ Categoría: {}", category_label(*category))
        }
        Reply::MediaAccepted {
            kind,
            images,
            videos,
        } => {
            let what = match kind {
                MediaKind::Image => "Foto",
                MediaKind::Video => "Video",
            };
            format!(
                "✅ {what} guardado ({images} foto(s), {videos} video(s))\n\nEnvía más o /continuar"
            )
        }
        Reply::MediaLimitReached { limit } => format!(
            "⚠️ Límite de {limit} archivos alcanzado. Usa /continuar para guardar."
        ),
        Reply::MediaUploadFailed { reason } => {
            format!("❌ No se pudo subir el archivo ({reason}). Intenta de nuevo o envía un enlace.")
        }
        Reply::MediaNeedsLink => {
            "⚠️ No hay servicio de imágenes configurado. Envía un enlace (http...) en su lugar."
                .to_string()
        }
        Reply::Cancelled => "❌ Operación cancelada\n\nUsa /agregar para comenzar de nuevo".to_string(),
        Reply::NoActiveSession => {
            "ℹ️ No hay ningún producto en curso. Usa /agregar para empezar.".to_string()
        }
        Reply::ProductSaved { product, sync } => format!(
            "✅ Producto agregado\n\n{}\n👤 Por: {}\n\n{}",
            product_card(product),
            product.created_by.as_deref().unwrap_or("-"),
            sync_line(sync)
        ),
        Reply::ProductList { products } => product_list(products),
        Reply::ProductDeleted { product, sync } => format!(
            "🗑️ Eliminado: {}\n\n{}",
            product.name,
            sync_line(sync)
        ),
        Reply::ProductUpdated {
            product,
            field,
            sync,
        } => format!(
            "✏️ Actualizado ({field})\n\n{}\n\n{}",
            product_card(product),
            sync_line(sync)
        ),
        Reply::ProductNotFound { reference } => {
            format!("🔍 No existe el producto '{reference}'. Revisa /listar.")
        }
        Reply::Rejected { error } => format!("❌ {}", validation(error)),
        Reply::CatalogUrl { url: Some(url) } => format!(
            "🌐 Catálogo público\n\nTu catálogo está en:\n{url}\n\n📱 Comparte este link con tus clientes"
        ),
        Reply::CatalogUrl { url: None } => "⚠️ Configuración de GitHub incompleta.".to_string(),
        Reply::Usage { command } => match command.as_str() {
            "eliminar" => "Uso: /eliminar <posición|id>".to_string(),
            "editar" => "Uso: /editar <posición|id> <campo> <valor>".to_string(),
            other => format!("Uso: /{other}"),
        },
        Reply::UnknownCommand { name } => {
            format!("❓ Comando desconocido /{name}. Usa /ayuda para ver los comandos.")
        }
        Reply::Hint => {
            "💡 Usa /agregar para crear un producto o el formato rápido:\nNombre | Precio | URL"
                .to_string()
        }
        Reply::InternalError => {
            "❌ Ocurrió un error interno. El producto en curso se descartó.".to_string()
        }
    }
}

fn command_summary() -> &'static str {
    "📋 Comandos disponibles:\n• /agregar → Agregar nuevo producto\n• /listar → Ver todos los productos\n• /catalogo → Ver URL del catálogo web\n• /ayuda → Ayuda detallada"
}

fn prompt(step: WizardStep) -> String {
    match step {
        WizardStep::Name => format!(
            "📝 Paso 1/{STEPS}: ¿Cuál es el nombre del producto?\n\nEjemplo: Nike Air Max 270"
        ),
        WizardStep::Price => {
            format!("💰 Paso 2/{STEPS}: ¿Cuál es el precio?\n\nEjemplo: 250000")
        }
        WizardStep::Description => format!(
            "📝 Paso 3/{STEPS}: Descripción del producto\n\nEscribe una breve descripción o /saltar"
        ),
        WizardStep::Sizes => {
            format!("📏 Paso 4/{STEPS}: Tallas disponibles\n\nEjemplo: 36-42 o /saltar")
        }
        WizardStep::Category => format!(
            "🏷️ Paso 5/{STEPS}: Selecciona la categoría\n\n[{}] 👟 Zapatillas\n[{}] 👕 Ropa",
            Category::Sneakers.button_payload(),
            Category::Clothing.button_payload()
        ),
        WizardStep::Media => format!(
            "📸 Paso 6/{STEPS}: Envía fotos o videos (archivos o enlaces)\n\nCuando termines: /continuar\nSi no tienes: /saltar"
        ),
        WizardStep::Finalize => "💾 Guardando producto...".to_string(),
    }
}

fn field_label(step: WizardStep) -> &'static str {
    match step {
        WizardStep::Name => "nombre",
        WizardStep::Price => "precio",
        WizardStep::Description => "descripción",
        WizardStep::Sizes => "campo tallas",
        WizardStep::Category => "campo categoría",
        WizardStep::Media => "paso multimedia",
        WizardStep::Finalize => "paso final",
    }
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::Sneakers => "👟 Zapatillas",
        Category::Clothing => "👕 Ropa",
    }
}

fn category_icon(category: Category) -> &'static str {
    match category {
        Category::Sneakers => "👟",
        Category::Clothing => "👕",
    }
}

fn validation(error: &ValidationError) -> String {
    match error {
        ValidationError::NameTooShort { min } => {
            format!("El nombre debe tener al menos {min} caracteres.")
        }
        ValidationError::Price(PriceError::Empty) => "El precio está vacío.".to_string(),
        ValidationError::Price(PriceError::Invalid(raw)) => {
            format!("Precio inválido '{raw}'. Ejemplo: 250000")
        }
        ValidationError::Price(PriceError::NotPositive(_)) => {
            "El precio debe ser mayor que cero.".to_string()
        }
        ValidationError::UnknownCategory(raw) => {
            format!("Categoría desconocida '{raw}'. Usa zapatillas o ropa.")
        }
        ValidationError::InvalidMediaUrl(raw) => {
            format!("'{raw}' no es un enlace http(s). Envía una foto o una URL.")
        }
        ValidationError::MediaLimitReached(limit) => {
            format!("Se alcanzó el límite de {limit} archivos.")
        }
        ValidationError::UnknownField(raw) => format!(
            "Campo desconocido '{raw}'. Campos: nombre, precio, descripcion, tallas, categoria."
        ),
    }
}

fn sync_line(sync: &FlushOutcome) -> String {
    match sync {
        FlushOutcome::Published => "🌐 Ya está visible en el catálogo web".to_string(),
        FlushOutcome::Stored => "💾 Guardado (sin repositorio remoto configurado)".to_string(),
        FlushOutcome::Unchanged => "💾 Sin cambios que publicar".to_string(),
        FlushOutcome::SavedLocally { reason } => format!(
            "⚠️ Guardado localmente, se publicará en la próxima sincronización ({reason})"
        ),
        FlushOutcome::Failed { reason } => {
            format!("❌ No se pudo guardar en disco ({reason}); el cambio sigue en memoria")
        }
    }
}

fn product_card(product: &Product) -> String {
    let mut card = format!(
        "{} {}\n💰 ${}\n📷 {} foto(s)",
        category_icon(product.category),
        product.name,
        product.price,
        product.image_count()
    );
    if !product.videos.is_empty() {
        card.push_str(&format!(" 🎥 {} video(s)", product.videos.len()));
    }
    if !product.sizes.is_empty() {
        card.push_str(&format!("\n📏 {}", product.sizes));
    }
    card
}

fn product_list(products: &[Product]) -> String {
    if products.is_empty() {
        return "📭 No hay productos todavía. Usa /agregar.".to_string();
    }
    let mut text = format!("📋 Productos ({}):\n", products.len());
    for (i, product) in products.iter().enumerate() {
        let video = if product.videos.is_empty() { "" } else { " 🎥" };
        text.push_str(&format!(
            "\n{}. {} {}{video}\n   💰 ${} | 📷 {} foto(s)\n",
            i + 1,
            category_icon(product.category),
            product.name,
            product.price,
            product.image_count()
        ));
    }
    text
}
