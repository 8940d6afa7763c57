//! Semantic outbound replies and the outcomes they report.
//!
//! The core never formats user-facing text. It emits [`Reply`] values and the
//! transport side renders them in whatever language and markup it needs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::product::{EditField, MediaKind, Product};

/// The wizard step a draft is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Name,
    Price,
    Description,
    Sizes,
    Category,
    Media,
    Finalize,
}

impl WizardStep {
    /// Whether `/saltar` may be used at this step.
    pub fn is_skippable(&self) -> bool {
        !matches!(self, WizardStep::Name | WizardStep::Price)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardStep::Name => write!(f, "name"),
            WizardStep::Price => write!(f, "price"),
            WizardStep::Description => write!(f, "description"),
            WizardStep::Sizes => write!(f, "sizes"),
            WizardStep::Category => write!(f, "category"),
            WizardStep::Media => write!(f, "media"),
            WizardStep::Finalize => write!(f, "finalize"),
        }
    }
}

/// Result of a catalog flush.
///
/// The in-memory catalog is authoritative in every case; these only describe
/// how far the current snapshot travelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlushOutcome {
    /// Written, committed and pushed to the remote.
    Published,
    /// Written to the local mirror; no remote is configured.
    Stored,
    /// Nothing changed and nothing was pending.
    Unchanged,
    /// Written locally but the remote leg failed; retried on the next flush.
    SavedLocally { reason: String },
    /// The local mirror itself could not be written.
    Failed { reason: String },
}

impl FlushOutcome {
    /// Whether the snapshot is at least durable on local disk.
    pub fn is_durable(&self) -> bool {
        !matches!(self, FlushOutcome::Failed { .. })
    }

    /// Whether a remote push is still owed.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            FlushOutcome::SavedLocally { .. } | FlushOutcome::Failed { .. }
        )
    }
}

impl fmt::Display for FlushOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushOutcome::Published => write!(f, "published"),
            FlushOutcome::Stored => write!(f, "stored"),
            FlushOutcome::Unchanged => write!(f, "unchanged"),
            FlushOutcome::SavedLocally { reason } => write!(f, "saved locally ({reason})"),
            FlushOutcome::Failed { reason } => write!(f, "failed ({reason})"),
        }
    }
}

/// Something the bot wants to tell the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Welcome { name: Option<String> },
    Help,
    /// Caller is not an admin; carries their own id only.
    Denied { user_id: i64 },

    /// Ask for the input of a wizard step.
    Prompt { step: WizardStep },
    /// Input rejected; the wizard stays on `step`.
    Invalid {
        step: WizardStep,
        error: ValidationError,
    },
    SkipNotAllowed { step: WizardStep },
    CategorySelected { category: crate::product::Category },
    MediaAccepted {
        kind: MediaKind,
        images: usize,
        videos: usize,
    },
    MediaLimitReached { limit: usize },
    MediaUploadFailed { reason: String },
    /// Raw uploads need a media host; ask for a link instead.
    MediaNeedsLink,
    Cancelled,
    NoActiveSession,

    ProductSaved {
        product: Box<Product>,
        sync: FlushOutcome,
    },
    ProductList { products: Vec<Product> },
    ProductDeleted {
        product: Box<Product>,
        sync: FlushOutcome,
    },
    ProductUpdated {
        product: Box<Product>,
        field: EditField,
        sync: FlushOutcome,
    },
    ProductNotFound { reference: String },
    /// A one-shot edit or quick-add was refused.
    Rejected { error: ValidationError },
    CatalogUrl { url: Option<String> },
    Usage { command: String },
    UnknownCommand { name: String },
    /// Stray text outside a wizard.
    Hint,
    InternalError,
}
