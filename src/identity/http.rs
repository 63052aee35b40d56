use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::{Identity, IdentityProvider, IdentityUpdate};
use crate::errors::{AppError, AppResult};

/// Identity provider reached over its backend REST API (`/v1/users`).
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn users_url(&self, id: Option<&str>) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| AppError::configuration(format!("invalid IDENTITY_API_URL: {err}")))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::configuration("IDENTITY_API_URL cannot be a base url"))?;
            segments.pop_if_empty().extend(["v1", "users"]);
            if let Some(id) = id {
                segments.push(id);
            }
        }

        Ok(url)
    }

    async fn ensure_success(response: reqwest::Response, action: &str) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%status, %body, "identity provider rejected {}", action);
        Err(AppError::upstream(format!("identity provider returned {status} on {action}")))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn get_identity(&self, id: &str) -> AppResult<Option<Identity>> {
        let response = self
            .client
            .get(self.users_url(Some(id))?)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::ensure_success(response, "user lookup").await?;
        Ok(Some(response.json::<Identity>().await?))
    }

    async fn list_identities(&self) -> AppResult<Vec<Identity>> {
        let mut url = self.users_url(None)?;
        url.query_pairs_mut().append_pair("limit", "500");

        let response = self.client.get(url).bearer_auth(&self.api_key).send().await?;
        let response = Self::ensure_success(response, "user list").await?;
        Ok(response.json::<Vec<Identity>>().await?)
    }

    async fn update_identity(&self, id: &str, update: &IdentityUpdate) -> AppResult<()> {
        let response = self
            .client
            .patch(self.users_url(Some(id))?)
            .bearer_auth(&self.api_key)
            .json(update)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::not_found("identity not found"));
        }

        Self::ensure_success(response, "user update").await?;
        Ok(())
    }

    async fn delete_identity(&self, id: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.users_url(Some(id))?)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::not_found("identity not found"));
        }

        Self::ensure_success(response, "user deletion").await?;
        Ok(())
    }
}
