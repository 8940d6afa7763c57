//! The bot handler: one inbound event in, replies out.
//!
//! `CatalogBot::handle` is what a chat transport calls for every normalized
//! event. Authorization happens first, then routing to the catalog or the
//! caller's wizard session. Panics while handling are caught here so one
//! broken conversation never takes the dispatcher down.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures_util::FutureExt;
use vitrina_types::error::ValidationError;
use vitrina_types::event::{EventPayload, InboundEvent, MediaAttachment, MediaSource, Sender};
use vitrina_types::price::Price;
use vitrina_types::product::{Category, EditField, Product, ProductId};
use vitrina_types::reply::{Reply, WizardStep};

use crate::access::AccessGate;
use crate::catalog::{CatalogMirror, CatalogStore};
use crate::media::{BoxMediaExternalizer, MediaExternalizer};
use crate::quick_add;
use crate::session::draft::{ProductDraft, validate_name};
use crate::session::{SessionRegistry, Transition, WizardInput};

pub struct CatalogBot<M: CatalogMirror> {
    store: Arc<CatalogStore<M>>,
    sessions: Arc<SessionRegistry>,
    gate: AccessGate,
    media: Option<BoxMediaExternalizer>,
    catalog_url: Option<String>,
}

impl<M: CatalogMirror> CatalogBot<M> {
    pub fn new(
        store: Arc<CatalogStore<M>>,
        sessions: Arc<SessionRegistry>,
        gate: AccessGate,
    ) -> Self {
        Self {
            store,
            sessions,
            gate,
            media: None,
            catalog_url: None,
        }
    }

    /// Route uploads through `media` instead of storing platform URLs.
    pub fn with_media(mut self, media: BoxMediaExternalizer) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_catalog_url(mut self, url: Option<String>) -> Self {
        self.catalog_url = url;
        self
    }

    pub fn store(&self) -> &Arc<CatalogStore<M>> {
        &self.store
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Handle one inbound event.
    pub async fn handle(&self, event: InboundEvent) -> Vec<Reply> {
        let user_id = event.sender.id;
        if !self.gate.authorize(user_id) {
            tracing::warn!(
                user_id,
                name = event.sender.display_name.as_deref().unwrap_or("-"),
                "unauthorized access attempt"
            );
            return vec![Reply::Denied { user_id }];
        }

        match AssertUnwindSafe(self.dispatch(&event)).catch_unwind().await {
            Ok(replies) => replies,
            Err(_) => {
                tracing::error!(user_id, chat_id = event.chat_id, "panic while handling event, session discarded");
                self.sessions.end(user_id);
                vec![Reply::InternalError]
            }
        }
    }

    async fn dispatch(&self, event: &InboundEvent) -> Vec<Reply> {
        match &event.payload {
            EventPayload::Command { name, args } => self.command(event, name, args).await,
            EventPayload::Text { text } => self.text(event, text).await,
            EventPayload::Media { attachment } => self.attachment(event, attachment).await,
            EventPayload::Callback { data } => match Category::from_button_payload(data) {
                Some(category) => self.wizard(event, WizardInput::Category(category)).await,
                None => {
                    tracing::debug!(%data, "ignoring unknown button payload");
                    vec![Reply::Hint]
                }
            },
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    async fn command(&self, event: &InboundEvent, name: &str, args: &[String]) -> Vec<Reply> {
        match name {
            "start" => vec![Reply::Welcome {
                name: event.sender.display_name.clone(),
            }],
            "ayuda" | "help" => vec![Reply::Help],
            "listar" => vec![Reply::ProductList {
                products: self.store.get_all().await,
            }],
            "catalogo" => vec![Reply::CatalogUrl {
                url: self.catalog_url.clone(),
            }],
            "agregar" => {
                self.sessions.begin(event.sender.id, event.chat_id);
                tracing::info!(user_id = event.sender.id, "wizard started");
                vec![Reply::Prompt {
                    step: WizardStep::Name,
                }]
            }
            "saltar" => self.wizard(event, WizardInput::Skip).await,
            "continuar" => self.wizard(event, WizardInput::Continue).await,
            "cancelar" => self.wizard(event, WizardInput::Cancel).await,
            "eliminar" => self.delete(args).await,
            "editar" => self.edit(args).await,
            other => vec![Reply::UnknownCommand {
                name: other.to_string(),
            }],
        }
    }

    async fn delete(&self, args: &[String]) -> Vec<Reply> {
        let Some(reference) = args.first() else {
            return vec![Reply::Usage {
                command: "eliminar".into(),
            }];
        };
        let Some(product) = self.store.find(reference).await else {
            return vec![Reply::ProductNotFound {
                reference: reference.clone(),
            }];
        };
        self.store.delete(&product.id).await;
        tracing::info!(product_id = %product.id, "product deleted");
        let sync = self.store.flush().await;
        vec![Reply::ProductDeleted {
            product: Box::new(product),
            sync,
        }]
    }

    async fn edit(&self, args: &[String]) -> Vec<Reply> {
        let [reference, field, value @ ..] = args else {
            return vec![Reply::Usage {
                command: "editar".into(),
            }];
        };
        if value.is_empty() {
            return vec![Reply::Usage {
                command: "editar".into(),
            }];
        }
        let Ok(field) = field.parse::<EditField>() else {
            return vec![Reply::Rejected {
                error: ValidationError::UnknownField(field.clone()),
            }];
        };
        let change = match FieldChange::parse(field, &value.join(" ")) {
            Ok(change) => change,
            Err(error) => return vec![Reply::Rejected { error }],
        };
        let Some(found) = self.store.find(reference).await else {
            return vec![Reply::ProductNotFound {
                reference: reference.clone(),
            }];
        };
        let Some(product) = self.store.update(&found.id, |p| change.apply(p)).await else {
            // Deleted between lookup and update.
            return vec![Reply::ProductNotFound {
                reference: reference.clone(),
            }];
        };
        tracing::info!(product_id = %product.id, %field, "product edited");
        let sync = self.store.flush().await;
        vec![Reply::ProductUpdated {
            product: Box::new(product),
            field,
            sync,
        }]
    }

    // -----------------------------------------------------------------------
    // Free text and attachments
    // -----------------------------------------------------------------------

    async fn text(&self, event: &InboundEvent, text: &str) -> Vec<Reply> {
        if self.sessions.contains(event.sender.id, event.chat_id) {
            return self.wizard(event, WizardInput::Text(text.to_string())).await;
        }
        if quick_add::is_quick_add(text) {
            return self.quick_add(event, text).await;
        }
        vec![Reply::Hint]
    }

    async fn quick_add(&self, event: &InboundEvent, text: &str) -> Vec<Reply> {
        let parsed = match quick_add::parse(text) {
            Ok(parsed) => parsed,
            Err(error) => return vec![Reply::Rejected { error }],
        };
        let mut draft = ProductDraft {
            name: Some(parsed.name),
            price: Some(parsed.price),
            ..ProductDraft::default()
        };
        if let Some((kind, url)) = parsed.media {
            draft.add_media(kind, url);
        }
        self.finalize(draft, &event.sender).await
    }

    async fn attachment(&self, event: &InboundEvent, attachment: &MediaAttachment) -> Vec<Reply> {
        let Some(session) = self.sessions.get(event.sender.id, event.chat_id) else {
            return vec![Reply::NoActiveSession];
        };
        let step = session.step();
        if step != WizardStep::Media {
            return vec![Reply::Prompt { step }];
        }
        if session.draft.media_count() >= session.media_limit {
            return vec![Reply::MediaLimitReached {
                limit: session.media_limit,
            }];
        }

        let url = match (&self.media, &attachment.source) {
            (Some(host), source) => match host.externalize(source).await {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(host = MediaExternalizer::name(host), error = %e, "media upload failed");
                    return vec![
                        Reply::MediaUploadFailed {
                            reason: e.to_string(),
                        },
                        Reply::Prompt { step },
                    ];
                }
            },
            (None, MediaSource::PlatformUrl(url)) => url.clone(),
            (None, MediaSource::Bytes { .. }) => return vec![Reply::MediaNeedsLink],
        };

        self.wizard(
            event,
            WizardInput::Media {
                kind: attachment.kind,
                url,
            },
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Wizard
    // -----------------------------------------------------------------------

    async fn wizard(&self, event: &InboundEvent, input: WizardInput) -> Vec<Reply> {
        match self.sessions.apply(event.sender.id, event.chat_id, input) {
            None => vec![Reply::NoActiveSession],
            Some(Transition::Continue(replies)) => replies,
            Some(Transition::Cancelled) => {
                tracing::info!(user_id = event.sender.id, "wizard cancelled");
                vec![Reply::Cancelled]
            }
            // The registry already dropped the session.
            Some(Transition::Finalize(draft)) => self.finalize(*draft, &event.sender).await,
        }
    }

    async fn finalize(&self, draft: ProductDraft, sender: &Sender) -> Vec<Reply> {
        let Some(product) = draft.into_product(
            ProductId::generate(),
            Utc::now(),
            sender.display_name.clone(),
        ) else {
            tracing::error!(user_id = sender.id, "finalize reached with an incomplete draft");
            return vec![Reply::InternalError];
        };
        tracing::info!(product_id = %product.id, user_id = sender.id, "product created");
        self.store.upsert(product.clone()).await;
        let sync = self.store.flush().await;
        vec![Reply::ProductSaved {
            product: Box::new(product),
            sync,
        }]
    }
}

/// A validated single-field edit.
enum FieldChange {
    Name(String),
    Price(Price),
    Description(String),
    Sizes(String),
    Category(Category),
}

impl FieldChange {
    fn parse(field: EditField, value: &str) -> Result<Self, ValidationError> {
        Ok(match field {
            EditField::Name => FieldChange::Name(validate_name(value)?),
            EditField::Price => FieldChange::Price(Price::parse_input(value)?),
            EditField::Description => FieldChange::Description(value.trim().to_string()),
            EditField::Sizes => FieldChange::Sizes(value.trim().to_string()),
            EditField::Category => FieldChange::Category(
                value
                    .parse()
                    .map_err(|_| ValidationError::UnknownCategory(value.trim().to_string()))?,
            ),
        })
    }

    fn apply(self, product: &mut Product) {
        match self {
            FieldChange::Name(v) => product.name = v,
            FieldChange::Price(v) => product.price = v,
            FieldChange::Description(v) => product.description = v,
            FieldChange::Sizes(v) => product.sizes = v,
            FieldChange::Category(v) => product.category = v,
        }
    }
}
