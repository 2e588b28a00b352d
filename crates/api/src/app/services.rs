use std::sync::Arc;

use invoiceai_ai::{AiRunner, GeminiClient};
use invoiceai_core::{InvoiceId, ProfileId};
use invoiceai_infra::{InMemoryOwnerStore, InvoiceRepository, ProfileRepository, UploadStore};
use invoiceai_invoicing::{BusinessProfile, Invoice};

use crate::config::{AppConfig, ConfigError};

pub type InvoiceStore = Arc<InMemoryOwnerStore<InvoiceId, Invoice>>;
pub type ProfileStore = Arc<InMemoryOwnerStore<ProfileId, BusinessProfile>>;

/// Shared application services, one instance per process.
pub struct AppServices {
    pub invoices: InvoiceRepository<InvoiceStore>,
    pub profiles: ProfileRepository<ProfileStore>,
    pub uploads: UploadStore,
    /// `None` when no Gemini API key is configured.
    pub ai: Option<AiRunner>,
}

pub fn build_services(config: &AppConfig) -> Result<AppServices, ConfigError> {
    let ai = match config.gemini_api_key.as_deref() {
        Some(key) => {
            let client = GeminiClient::new(key, config.gemini_base_url.as_str(), config.gemini_timeout)?;
            tracing::info!(
                models = ?config.gemini_models.iter().collect::<Vec<_>>(),
                "AI generation enabled"
            );
            Some(AiRunner::new(Arc::new(client), config.gemini_models.clone()))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set; AI routes will answer 500");
            None
        }
    };

    Ok(AppServices {
        invoices: InvoiceRepository::new(Arc::new(InMemoryOwnerStore::new())),
        profiles: ProfileRepository::new(Arc::new(InMemoryOwnerStore::new())),
        uploads: UploadStore::new(config.uploads_dir.clone()),
        ai,
    })
}
