use std::collections::HashMap;
use std::time::Duration;

use crate::form::StatusOnEdit;
use crate::relay::{LimitRate, RelayCredentials, RelayOptions};

pub const DEFAULT_ORIGIN: &str = "https://api.emailjs.com";
pub const DEFAULT_TO_EMAIL: &str = "inbox@example.com";
pub const DEFAULT_LIMIT_ID: &str = "relayform";
pub const DEFAULT_MAX_FORMS: usize = 10_000;

/// Process-wide configuration, read once at boot.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: RelayCredentials,
    pub options: RelayOptions,
    pub on_edit: StatusOnEdit,
    /// Upper bound on mounted form instances; the least recently seen one is evicted.
    pub max_forms: usize,
    pub session_max_age: Duration,
    pub cleanup_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_map(&vars)
    }

    /// Build settings from a key/value map (the environment in production).
    pub fn from_map(vars: &HashMap<String, String>) -> Self {
        let sg = |key: &str, def: &str| -> String {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| def.to_string())
        };

        let credentials = RelayCredentials {
            public_key: sg("EMAILJS_PUBLIC_KEY", ""),
            service_id: sg("EMAILJS_SERVICE_ID", ""),
            template_id: sg("EMAILJS_TEMPLATE_ID", ""),
            access_token: Some(sg("EMAILJS_PRIVATE_KEY", "")).filter(|s| !s.is_empty()),
        };

        let throttle_secs = parse_u64(vars, "CONTACT_RATE_LIMIT_SECS", 10);
        let limit_rate = if throttle_secs == 0 {
            None
        } else {
            Some(LimitRate {
                id: sg("CONTACT_RATE_LIMIT_ID", DEFAULT_LIMIT_ID),
                throttle: Duration::from_secs(throttle_secs),
            })
        };

        let options = RelayOptions {
            to_email: sg("CONTACT_TO_EMAIL", DEFAULT_TO_EMAIL),
            origin: sg("EMAILJS_ORIGIN", DEFAULT_ORIGIN)
                .trim_end_matches('/')
                .to_string(),
            limit_rate,
            block_headless: parse_bool(vars, "CONTACT_BLOCK_HEADLESS", true),
            ..RelayOptions::default()
        };

        let on_edit = if parse_bool(vars, "CONTACT_RESET_ON_EDIT", false) {
            StatusOnEdit::ResetToIdle
        } else {
            StatusOnEdit::Keep
        };
        let max_forms = parse_u64(vars, "CONTACT_MAX_FORMS", DEFAULT_MAX_FORMS as u64).max(1);

        Settings {
            credentials,
            options,
            on_edit,
            max_forms: usize::try_from(max_forms).unwrap_or(usize::MAX),
            session_max_age: minutes(parse_u64(vars, "CONTACT_SESSION_MAX_AGE_MINS", 60)),
            cleanup_interval: minutes(parse_u64(vars, "CONTACT_CLEANUP_INTERVAL_MINS", 10)),
        }
    }
}

/// At least one minute; huge values saturate instead of overflowing.
fn minutes(mins: u64) -> Duration {
    Duration::from_secs(mins.max(1).saturating_mul(60))
}

fn parse_u64(vars: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    match vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("[config] {} is not a number ({:?}), using {}", key, raw, default);
            default
        }),
    }
}

fn parse_bool(vars: &HashMap<String, String>, key: &str, default: bool) -> bool {
    match vars.get(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => default,
        Some(v) if v.is_empty() => default,
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                log::warn!("[config] {} is not a boolean ({:?}), using {}", key, v, default);
                default
            }
        },
    }
}
