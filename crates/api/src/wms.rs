//! Minimal WMS (Picqer) client.
//!
//! The engine only touches the WMS for order labels: reading the current
//! tags, removing stale advice labels, and writing the advised ones. Order
//! and shipment management live in other services.

use serde::Deserialize;

use florapack_core::types::DbId;

/// Errors talking to the WMS.
#[derive(Debug, thiserror::Error)]
pub enum WmsError {
    #[error("WMS API is not configured (WMS_API_URL unset)")]
    NotConfigured,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0} from {1}")]
    Status(reqwest::StatusCode, String),
}

/// A label (tag) known to the WMS.
#[derive(Debug, Clone, Deserialize)]
pub struct WmsTag {
    pub idtag: DbId,
    pub title: String,
}

/// HTTP client for the WMS label endpoints. API-key authenticated via
/// basic auth, the scheme the WMS uses.
pub struct WmsClient {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: String,
}

impl WmsClient {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: api_key.unwrap_or_default(),
        }
    }

    fn base(&self) -> Result<&str, WmsError> {
        self.base_url.as_deref().ok_or(WmsError::NotConfigured)
    }

    /// All tags defined in the WMS.
    pub async fn list_tags(&self) -> Result<Vec<WmsTag>, WmsError> {
        let url = format!("{}/tags", self.base()?);
        self.get_json(&url).await
    }

    /// Tags currently on an order.
    pub async fn order_tags(&self, order_id: DbId) -> Result<Vec<WmsTag>, WmsError> {
        let url = format!("{}/orders/{order_id}/tags", self.base()?);
        self.get_json(&url).await
    }

    /// Attach a tag to an order.
    pub async fn add_order_tag(&self, order_id: DbId, idtag: DbId) -> Result<(), WmsError> {
        let url = format!("{}/orders/{order_id}/tags", self.base()?);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.api_key, Some(""))
            .json(&serde_json::json!({ "idtag": idtag }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(WmsError::Status(response.status(), url));
        }
        Ok(())
    }

    /// Remove a tag from an order.
    pub async fn remove_order_tag(&self, order_id: DbId, idtag: DbId) -> Result<(), WmsError> {
        let url = format!("{}/orders/{order_id}/tags/{idtag}", self.base()?);
        let response = self
            .client
            .delete(&url)
            .basic_auth(&self.api_key, Some(""))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(WmsError::Status(response.status(), url));
        }
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, WmsError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.api_key, Some(""))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(WmsError::Status(response.status(), url.to_string()));
        }
        Ok(response.json().await?)
    }
}
