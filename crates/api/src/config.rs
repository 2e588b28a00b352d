//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use invoiceai_ai::ModelCandidates;
use invoiceai_ai::gemini::DEFAULT_BASE_URL;
use invoiceai_auth::{ClerkJwtValidator, Hs256JwtValidator, JwtValidator, TokenError};

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("CLERK_JWT_KEY could not be loaded: {0}")]
    JwtKey(#[from] TokenError),

    #[error("AI client could not be built: {0}")]
    AiClient(#[from] invoiceai_ai::AiError),
}

/// How session tokens are verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// RS256 tokens issued by Clerk, checked against the instance public key.
    Clerk {
        public_key_pem: String,
        issuer: Option<String>,
        authorized_parties: Vec<String>,
    },
    /// HS256 tokens signed with a shared secret (local development).
    SharedSecret(String),
}

impl AuthConfig {
    pub fn validator(&self) -> Result<Arc<dyn JwtValidator>, ConfigError> {
        let validator: Arc<dyn JwtValidator> = match self {
            AuthConfig::Clerk {
                public_key_pem,
                issuer,
                authorized_parties,
            } => {
                let mut v = ClerkJwtValidator::from_pem(public_key_pem)?
                    .with_authorized_parties(authorized_parties.clone());
                if let Some(issuer) = issuer {
                    v = v.with_issuer(issuer.clone());
                }
                Arc::new(v)
            }
            AuthConfig::SharedSecret(secret) => Arc::new(Hs256JwtValidator::new(secret.as_bytes())),
        };
        Ok(validator)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_models: ModelCandidates,
    pub gemini_base_url: String,
    pub gemini_timeout: Option<Duration>,
    pub auth: AuthConfig,
    pub cors_origin: String,
    pub uploads_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let gemini_models = match get("GEMINI_MODELS") {
            Some(csv) => ModelCandidates::parse(&csv).map_err(|e| ConfigError::Invalid {
                var: "GEMINI_MODELS",
                reason: e.to_string(),
            })?,
            None => ModelCandidates::default(),
        };

        let gemini_timeout = match get("GEMINI_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    var: "GEMINI_TIMEOUT_SECS",
                    reason: e.to_string(),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let auth = match get("CLERK_JWT_KEY") {
            // Single-line env values carry the PEM with escaped newlines.
            Some(pem) => AuthConfig::Clerk {
                public_key_pem: pem.replace("\\n", "\n"),
                issuer: get("CLERK_ISSUER"),
                authorized_parties: get("CLERK_AUTHORIZED_PARTIES")
                    .map(|csv| {
                        csv.split(',')
                            .map(|p| p.trim().to_string())
                            .filter(|p| !p.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            None => match get("JWT_SECRET") {
                Some(secret) => AuthConfig::SharedSecret(secret),
                None => {
                    tracing::warn!("neither CLERK_JWT_KEY nor JWT_SECRET set; using insecure dev secret");
                    AuthConfig::SharedSecret(DEV_JWT_SECRET.to_string())
                }
            },
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_models,
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            gemini_timeout,
            auth,
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            uploads_dir: PathBuf::from(get("UPLOADS_DIR").unwrap_or_else(|| DEFAULT_UPLOADS_DIR.to_string())),
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })
    }
}
