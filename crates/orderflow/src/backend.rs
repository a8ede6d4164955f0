//! Typed client for the ordering backend.
//!
//! The backend owns order records, payment initiation/verification, and
//! email delivery behind a plain JSON HTTP boundary. The orchestrator and
//! catalog talk to it through the [`OrderBackend`] trait so tests can swap
//! in an in-memory mock.
//!
//! # Endpoints
//!
//! - `GET /meals` - orderable items
//! - `POST /orders` - `{ order: { items, customer } }`, creates the record
//! - `POST /api/payment/orders` - `{ amount }` → `{ data: { id, amount, currency } }`
//! - `POST /api/payment/verify` - provider callback payload → `{ message }`
//! - `POST /send-email` - `{ emailBody, email }`, fire-and-forget

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use tableside_core::{
    MenuItem, OrderDraft, PaymentIntent, PaymentIntentEnvelope, ProviderCallback,
    VerificationResponse,
};

use crate::config::OrderflowConfig;

/// Errors that can occur when talking to the ordering backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend URL could not be joined with the endpoint path.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// The external collaborators of the order lifecycle, as one seam.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Read-only catalog fetch.
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, BackendError>;

    /// Create the order record. Only success/failure matters.
    async fn create_order(&self, draft: &OrderDraft) -> Result<(), BackendError>;

    /// Request a payment intent for the given amount.
    async fn create_payment_intent(&self, amount: Decimal)
    -> Result<PaymentIntent, BackendError>;

    /// Forward a provider callback for verification.
    async fn verify_payment(
        &self,
        callback: &ProviderCallback,
    ) -> Result<VerificationResponse, BackendError>;

    /// Dispatch the confirmation email. Response ignored beyond logging.
    async fn send_confirmation_email(
        &self,
        email: &str,
        email_body: &str,
    ) -> Result<(), BackendError>;
}

// =============================================================================
// HttpBackend
// =============================================================================

/// Reqwest-backed [`OrderBackend`] implementation.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a new backend client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &OrderflowConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpBackendInner {
                client,
                base_url: config.backend_url.clone(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| BackendError::InvalidEndpoint(format!("{path}: {e}")))
    }

    /// POST a JSON body and decode a JSON response.
    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        Self::decode(path, response).await
    }

    /// Read the response body as text first for better error diagnostics,
    /// then decode it.
    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                endpoint = path,
                status = %status,
                body = %text.chars().take(200).collect::<String>(),
                "backend returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl OrderBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, BackendError> {
        let url = self.endpoint("meals")?;
        let response = self.inner.client.get(url).send().await?;
        let items: Vec<MenuItem> = Self::decode("meals", response).await?;
        debug!(count = items.len(), "fetched menu");
        Ok(items)
    }

    #[instrument(skip(self, draft), fields(lines = draft.items.len()))]
    async fn create_order(&self, draft: &OrderDraft) -> Result<(), BackendError> {
        // Response body is only used to detect success/failure.
        let _: serde_json::Value = self.post_json("orders", &json!({ "order": draft })).await?;
        debug!("order record created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_payment_intent(
        &self,
        amount: Decimal,
    ) -> Result<PaymentIntent, BackendError> {
        let envelope: PaymentIntentEnvelope = self
            .post_json("api/payment/orders", &json!({ "amount": amount }))
            .await?;
        debug!(intent = %envelope.data.id, "payment intent created");
        Ok(envelope.data)
    }

    #[instrument(skip(self, callback), fields(intent = %callback.intent_id))]
    async fn verify_payment(
        &self,
        callback: &ProviderCallback,
    ) -> Result<VerificationResponse, BackendError> {
        self.post_json(
            "api/payment/verify",
            &serde_json::to_value(callback).map_err(BackendError::Parse)?,
        )
        .await
    }

    #[instrument(skip(self, email_body))]
    async fn send_confirmation_email(
        &self,
        email: &str,
        email_body: &str,
    ) -> Result<(), BackendError> {
        let url = self.endpoint("send-email")?;
        let response = self
            .inner
            .client
            .post(url)
            .json(&json!({ "emailBody": email_body, "email": email }))
            .send()
            .await?;

        // Fire-and-forget: log whatever the backend says and move on.
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        debug!(status = %status, body = %text.chars().take(200).collect::<String>(), "email dispatch response");

        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }
        Ok(())
    }
}
