use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

const KIT_BASE_URL: &str = "https://api.convertkit.com";

#[derive(Debug, Error)]
pub enum KitError {
    /// Kit answered with a non-2xx status; the body is preserved so callers
    /// can surface it verbatim.
    #[error("{body}")]
    Upstream { status: u16, body: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    api_key: &'a str,
    email: &'a str,
    fields: SubscriberFields<'a>,
}

/// Custom field names must exactly match the fields configured in Kit.
#[derive(Debug, Serialize)]
struct SubscriberFields<'a> {
    license_key: &'a str,
    platform: &'a str,
}

/// Client for Kit's (ConvertKit) v3 subscriber API.
#[derive(Debug, Clone)]
pub struct KitClient {
    client: Client,
    api_key: String,
    form_id: String,
    base_url: String,
}

impl KitClient {
    pub fn new(api_key: String, form_id: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            form_id,
            base_url: KIT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Upsert a subscriber on the configured form, attaching license_key and
    /// platform as custom attributes on the subscriber record.
    pub async fn subscribe(
        &self,
        email: &str,
        license_key: &str,
        platform: &str,
    ) -> Result<(), KitError> {
        let url = format!("{}/v3/forms/{}/subscribe", self.base_url, self.form_id);

        let response = self
            .client
            .post(&url)
            .json(&SubscribeRequest {
                api_key: &self.api_key,
                email,
                fields: SubscriberFields {
                    license_key,
                    platform,
                },
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(KitError::Upstream { status, body });
        }

        Ok(())
    }
}
