use log::{error, info, warn};

use crate::config::{Settings, DEFAULT_TO_EMAIL};

/// Report the relay configuration before Rocket launches.
/// Missing credentials are an operator problem: the site still serves the form,
/// but every submit will end in the error state. Returns the number of errors found.
pub fn run(settings: &Settings) -> u32 {
    info!("[boot] Contact relay boot check starting...");

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Credentials ─────────────────────────────────
    let missing = settings.credentials.missing();
    if missing.is_empty() {
        info!(
            "[boot]   Relay service {} / template {}",
            settings.credentials.service_id, settings.credentials.template_id
        );
    } else {
        for key in &missing {
            error!("[boot]   MISSING relay credential: {}", env_name(key));
        }
        errors += missing.len() as u32;
    }

    // ── 2. Delivery options ────────────────────────────
    if settings.options.to_email == DEFAULT_TO_EMAIL {
        warn!("[boot]   CONTACT_TO_EMAIL not set, messages go to {}", DEFAULT_TO_EMAIL);
        warnings += 1;
    }
    match &settings.options.limit_rate {
        Some(limit) => info!(
            "[boot]   Rate limit '{}': one message per {}s",
            limit.id,
            limit.throttle.as_secs()
        ),
        None => {
            warn!("[boot]   Rate limit disabled");
            warnings += 1;
        }
    }
    if !settings.options.block_headless {
        info!("[boot]   Headless browsers are allowed to send");
    }

    // ── 3. Form instances ──────────────────────────────
    info!(
        "[boot]   Up to {} form instances, idle ones dropped after {} min ({:?} on edit)",
        settings.max_forms,
        settings.session_max_age.as_secs() / 60,
        settings.on_edit
    );

    // ── Summary ────────────────────────────────────────
    if errors > 0 {
        error!(
            "[boot] Boot check finished with {} error(s), {} warning(s): the contact form cannot send",
            errors, warnings
        );
    } else if warnings > 0 {
        warn!("[boot] Boot check passed with {} warning(s)", warnings);
    } else {
        info!("[boot] Boot check passed");
    }
    errors
}

fn env_name(key: &str) -> &'static str {
    match key {
        "public_key" => "EMAILJS_PUBLIC_KEY",
        "service_id" => "EMAILJS_SERVICE_ID",
        "template_id" => "EMAILJS_TEMPLATE_ID",
        _ => "EMAILJS_*",
    }
}
