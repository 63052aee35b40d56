//! Boundary to the external identity provider.
//!
//! The provider owns accounts and their public metadata (role, department,
//! department-head flag, position). This crate reads that metadata to resolve
//! actors and writes it back when a system administrator edits a user.

mod http;
mod memory;

pub use http::HttpIdentityProvider;
pub use memory::InMemoryIdentityProvider;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::utils::non_blank;

/// Role value older accounts carry instead of the `department_head` flag.
pub const LEGACY_DEPARTMENT_HEAD_ROLE: &str = "department_head";

pub const DEFAULT_ROLE: &str = "member";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicMetadata {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub department_head: Option<bool>,
    #[serde(default)]
    pub position: Option<String>,
}

impl PublicMetadata {
    pub fn is_department_head(&self) -> bool {
        self.department_head.unwrap_or(false)
    }

    /// Folds the legacy `department_head` role into the flag and maps blank
    /// strings to `None`.
    pub fn normalized(&self) -> PublicMetadata {
        let role = non_blank(self.role.as_deref()).map(str::to_string);
        let legacy_head = role.as_deref() == Some(LEGACY_DEPARTMENT_HEAD_ROLE);

        PublicMetadata {
            role: if legacy_head { Some(DEFAULT_ROLE.to_string()) } else { role },
            department_id: non_blank(self.department_id.as_deref()).map(str::to_string),
            department_head: Some(self.is_department_head() || legacy_head),
            position: non_blank(self.position.as_deref()).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub public_metadata: PublicMetadata,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: None,
            last_name: None,
            username: None,
            email_addresses: vec![EmailAddress {
                email_address: email.into(),
            }],
            public_metadata: PublicMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: PublicMetadata) -> Self {
        self.public_metadata = metadata;
        self
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .first()
            .and_then(|email| non_blank(Some(email.email_address.as_str())))
    }

    /// "First Last" when either part is present, otherwise the username.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect();

        if parts.is_empty() {
            non_blank(self.username.as_deref()).map(str::to_string)
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Profile and metadata write sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub public_metadata: PublicMetadata,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` when the provider has no such account.
    async fn get_identity(&self, id: &str) -> AppResult<Option<Identity>>;

    async fn list_identities(&self) -> AppResult<Vec<Identity>>;

    async fn update_identity(&self, id: &str, update: &IdentityUpdate) -> AppResult<()>;

    async fn delete_identity(&self, id: &str) -> AppResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityConfig {
    Http { base_url: String, api_key: String },
    Memory,
}

impl IdentityConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let backend = std::env::var("IDENTITY_PROVIDER").unwrap_or_else(|_| "http".to_string());

        match backend.to_lowercase().as_str() {
            "memory" => Ok(IdentityConfig::Memory),
            "http" => {
                let base_url = std::env::var("IDENTITY_API_URL")
                    .map_err(|_| AppError::configuration("IDENTITY_API_URL not set"))?;
                let api_key = std::env::var("IDENTITY_API_KEY")
                    .map_err(|_| AppError::configuration("IDENTITY_API_KEY not set"))?;
                Ok(IdentityConfig::Http { base_url, api_key })
            }
            other => Err(AppError::configuration(format!(
                "IDENTITY_PROVIDER must be 'http' or 'memory', got '{other}'"
            ))),
        }
    }

    pub fn build(self) -> Arc<dyn IdentityProvider> {
        match self {
            IdentityConfig::Http { base_url, api_key } => Arc::new(HttpIdentityProvider::new(base_url, api_key)),
            IdentityConfig::Memory => {
                tracing::warn!("using in-memory identity provider; accounts are not persisted");
                Arc::new(InMemoryIdentityProvider::new())
            }
        }
    }
}
