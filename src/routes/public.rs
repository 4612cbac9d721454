use rocket::form::Form;
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use serde::Deserialize;

use crate::form::{Field, FormView, SubmissionPayload, SubmitOutcome};
use crate::render;
use crate::session::{ContactSession, KnownForm};

// ── Landing page ───────────────────────────────────────

#[get("/")]
pub fn index(visitor: KnownForm) -> RawHtml<String> {
    RawHtml(render::landing_page(&visitor.view()))
}

// ── Contact form ───────────────────────────────────────

#[derive(FromForm)]
pub struct ContactFormData {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// Plain HTML submit: replace the three fields, run one submit, redirect back to the form.
#[post("/contact", data = "<form>")]
pub async fn contact_submit(session: ContactSession, form: Form<ContactFormData>) -> Redirect {
    let data = form.into_inner();
    let values = SubmissionPayload::new(
        data.name.unwrap_or_default(),
        data.email.unwrap_or_default(),
        data.message.unwrap_or_default(),
    );

    let outcome = session.form.on_submit_with(values).await;
    log_outcome(&session.id, &outcome);

    Redirect::to("/#contact")
}

/// Script submit: send what the form already holds and answer with the settled view.
#[post("/contact/submit")]
pub async fn contact_submit_json(session: ContactSession) -> Json<FormView> {
    let outcome = session.form.on_submit().await;
    log_outcome(&session.id, &outcome);
    Json(session.form.view())
}

fn log_outcome(id: &str, outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Sent(delivery) => log::debug!(
            "[form] Form {} delivered: {} {}",
            id,
            delivery.status,
            delivery.text
        ),
        SubmitOutcome::Failed(e) => log::debug!("[form] Form {} failed: {}", id, e),
        SubmitOutcome::Ignored => log::debug!("[form] Form {} busy, submit ignored", id),
    }
}

#[get("/contact/state")]
pub fn contact_state(visitor: KnownForm) -> Json<FormView> {
    Json(visitor.view())
}

#[derive(Debug, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub value: String,
}

#[post("/contact/field", format = "json", data = "<change>")]
pub fn contact_field(
    session: ContactSession,
    change: Json<FieldChange>,
) -> Result<Json<FormView>, Status> {
    let FieldChange { field, value } = change.into_inner();
    let field: Field = field.parse().map_err(|e| {
        log::debug!("[form] {}", e);
        Status::UnprocessableEntity
    })?;
    session.form.on_field_change(field, value);
    Ok(Json(session.form.view()))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        index,
        contact_submit,
        contact_submit_json,
        contact_state,
        contact_field
    ]
}
