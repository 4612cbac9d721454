use serde_json::json;
use std::sync::{Arc, RwLock};

use super::{Delivery, Relay, RelayCredentials, RelayOptions};
use crate::error::RelayError;
use crate::form::SubmissionPayload;
use crate::rate_limit::RateLimiter;

const SEND_PATH: &str = "/api/v1.0/email/send";

/// Relay client for the EmailJS REST API
/// (https://www.emailjs.com/docs/rest-api/send/).
///
/// Created uninitialized; `initialize` must succeed before `send` will touch the network.
pub struct RelayClient {
    http: reqwest::Client,
    options: RelayOptions,
    limiter: Arc<RateLimiter>,
    headless: bool,
    visitor: Option<String>,
    credentials: RwLock<Option<RelayCredentials>>,
}

impl RelayClient {
    pub fn new(http: reqwest::Client, options: RelayOptions, limiter: Arc<RateLimiter>) -> Self {
        RelayClient {
            http,
            options,
            limiter,
            headless: false,
            visitor: None,
            credentials: RwLock::new(None),
        }
    }

    /// Build the shared HTTP client with the configured timeout.
    pub fn http_client(options: &RelayOptions) -> Result<reqwest::Client, RelayError> {
        reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| RelayError::Transport(format!("HTTP client error: {}", e)))
    }

    /// Mark this client as serving an automated browser.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Scope the rate limit to one visitor (their IP). Without a scope every client
    /// sharing the limiter shares the bare limit id.
    pub fn visitor(mut self, visitor: Option<String>) -> Self {
        self.visitor = visitor;
        self
    }

    fn limit_key(&self, limit_id: &str) -> String {
        match &self.visitor {
            Some(visitor) => format!("{}:{}", limit_id, visitor),
            None => limit_id.to_string(),
        }
    }

    /// Validate and store credentials. Calling again with valid credentials re-applies them;
    /// a failed call never clears an earlier successful one.
    pub fn initialize(&self, credentials: RelayCredentials) -> Result<(), RelayError> {
        let missing = credentials.missing();
        if !missing.is_empty() {
            log::error!("[relay] Cannot initialize, missing {}", missing.join(", "));
            return Err(RelayError::Configuration { missing });
        }

        let mut slot = self.credentials.write().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref() != Some(&credentials) {
            match &self.options.limit_rate {
                Some(limit) => log::debug!(
                    "[relay] Initialized for service {} (rate limit '{}' every {}s, block headless: {})",
                    credentials.service_id,
                    limit.id,
                    limit.throttle.as_secs(),
                    self.options.block_headless
                ),
                None => log::debug!(
                    "[relay] Initialized for service {} (no rate limit, block headless: {})",
                    credentials.service_id,
                    self.options.block_headless
                ),
            }
        }
        *slot = Some(credentials);
        Ok(())
    }

    fn current_credentials(&self) -> Option<RelayCredentials> {
        self.credentials
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Relay for RelayClient {
    fn is_initialized(&self) -> bool {
        self.credentials
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    async fn send(&self, payload: &SubmissionPayload) -> Result<Delivery, RelayError> {
        let credentials = self
            .current_credentials()
            .ok_or(RelayError::NotInitialized)?;

        if self.options.block_headless && self.headless {
            return Err(RelayError::Rejected {
                status: 451,
                text: "Unavailable For Headless Browser".into(),
            });
        }

        if let Some(limit) = &self.options.limit_rate {
            let key = self.limit_key(&limit.id);
            if let Some(left) = self.limiter.check_and_record(&key, limit.throttle) {
                log::warn!(
                    "[relay] Rate limit '{}' hit, {}ms left",
                    key,
                    left.as_millis()
                );
                return Err(RelayError::Rejected {
                    status: 429,
                    text: "Too Many Requests".into(),
                });
            }
        }

        let mut body = json!({
            "service_id": credentials.service_id,
            "template_id": credentials.template_id,
            "user_id": credentials.public_key,
            "template_params": {
                "from_name": payload.name,
                "from_email": payload.email,
                "message": payload.message,
                "to_email": self.options.to_email
            }
        });
        if let Some(token) = &credentials.access_token {
            body["accessToken"] = json!(token);
        }

        let url = format!("{}{}", self.options.origin.trim_end_matches('/'), SEND_PATH);

        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("EmailJS request failed: {}", e)))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| RelayError::Transport(format!("EmailJS response unreadable: {}", e)))?;

        if status != 200 {
            return Err(RelayError::Rejected { status, text });
        }

        Ok(Delivery { status, text })
    }
}
