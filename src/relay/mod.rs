pub mod emailjs;

pub use emailjs::RelayClient;

use std::future::Future;
use std::time::Duration;

use crate::config::{DEFAULT_LIMIT_ID, DEFAULT_ORIGIN, DEFAULT_TO_EMAIL};
use crate::error::RelayError;
use crate::form::SubmissionPayload;

// ── Types ─────────────────────────────────────────────

/// Provider credentials. Injected once; never read from the environment here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayCredentials {
    pub public_key: String,
    pub service_id: String,
    pub template_id: String,
    /// Optional private key, sent as `accessToken` when present.
    pub access_token: Option<String>,
}

impl RelayCredentials {
    /// Names of the required credentials that are blank.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.public_key.trim().is_empty() {
            missing.push("public_key");
        }
        if self.service_id.trim().is_empty() {
            missing.push("service_id");
        }
        if self.template_id.trim().is_empty() {
            missing.push("template_id");
        }
        missing
    }
}

/// Minimum interval between sends sharing the same `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitRate {
    pub id: String,
    pub throttle: Duration,
}

#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Fixed destination passed to the template as `to_email`.
    pub to_email: String,
    pub origin: String,
    pub limit_rate: Option<LimitRate>,
    pub block_headless: bool,
    pub timeout: Duration,
}

impl Default for RelayOptions {
    fn default() -> Self {
        RelayOptions {
            to_email: DEFAULT_TO_EMAIL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            limit_rate: Some(LimitRate {
                id: DEFAULT_LIMIT_ID.to_string(),
                throttle: Duration::from_secs(10),
            }),
            block_headless: true,
            timeout: Duration::from_secs(30),
        }
    }
}

/// A send the provider accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
    pub text: String,
}

// ── Relay seam ────────────────────────────────────────

/// The outbound side of a contact form. `SubmissionController` only talks to this.
pub trait Relay: Send + Sync + 'static {
    fn is_initialized(&self) -> bool;

    /// Make exactly one delivery attempt for `payload`.
    fn send(
        &self,
        payload: &SubmissionPayload,
    ) -> impl Future<Output = Result<Delivery, RelayError>> + Send;
}

/// User agents of automated browsers the provider refuses to serve.
const HEADLESS_MARKERS: &[&str] = &["headless", "phantomjs", "lighthouse"];

pub fn is_headless_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    HEADLESS_MARKERS.iter().any(|m| ua.contains(m))
}
