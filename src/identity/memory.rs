use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Identity, IdentityProvider, IdentityUpdate};
use crate::errors::{AppError, AppResult};

/// Process-local identity store for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    identities: RwLock<BTreeMap<String, Identity>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identities(identities: impl IntoIterator<Item = Identity>) -> Self {
        let provider = Self::new();
        for identity in identities {
            provider.insert(identity);
        }
        provider
    }

    pub fn insert(&self, identity: Identity) {
        if let Ok(mut guard) = self.identities.write() {
            guard.insert(identity.id.clone(), identity);
        }
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, BTreeMap<String, Identity>>> {
        self.identities
            .read()
            .map_err(|_| AppError::internal("identity store lock poisoned"))
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, BTreeMap<String, Identity>>> {
        self.identities
            .write()
            .map_err(|_| AppError::internal("identity store lock poisoned"))
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn get_identity(&self, id: &str) -> AppResult<Option<Identity>> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn list_identities(&self) -> AppResult<Vec<Identity>> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn update_identity(&self, id: &str, update: &IdentityUpdate) -> AppResult<()> {
        let mut guard = self.write()?;
        let identity = guard
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("identity not found"))?;

        if let Some(first_name) = &update.first_name {
            identity.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &update.last_name {
            identity.last_name = Some(last_name.clone());
        }
        identity.public_metadata = update.public_metadata.clone();
        Ok(())
    }

    async fn delete_identity(&self, id: &str) -> AppResult<()> {
        self.write()?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("identity not found"))
    }
}
