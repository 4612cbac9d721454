use rocket::http::Status;
use rocket::serde::json::{Error as JsonError, Json};
use serde::Deserialize;
use serde_json::{json, Value};

// ── Contact submission log ─────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ContactSubmit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// Logs the submission and reports success. Nothing is delivered from here;
/// the contact form relays through the provider instead.
#[post("/contact", data = "<body>")]
pub fn contact_log(body: Result<Json<ContactSubmit>, JsonError<'_>>) -> (Status, Json<Value>) {
    match body {
        Ok(submit) => {
            log::info!(
                "[api] Contact form submission: name={:?} email={:?} message_length={}",
                submit.name.as_deref().unwrap_or_default(),
                submit.email.as_deref().unwrap_or_default(),
                submit.message.as_deref().map(|m| m.chars().count()).unwrap_or(0)
            );
            (
                Status::Ok,
                Json(json!({ "message": "Message sent successfully" })),
            )
        }
        Err(e) => {
            log::warn!("[api] Unreadable contact submission: {}", e);
            (
                Status::InternalServerError,
                Json(json!({ "message": "Failed to send message" })),
            )
        }
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![contact_log]
}
