#[macro_use]
extern crate rocket;

use rocket::response::content::RawHtml;
use rocket::{Build, Rocket};
use std::sync::Arc;

mod boot;
mod config;
mod error;
mod form;
mod rate_limit;
mod relay;
mod render;
mod routes;
mod session;
mod tasks;


use config::Settings;
use error::RelayError;
use relay::RelayClient;
use session::FormSessions;

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

/// Assemble the site around one shared form-session registry.
pub fn build(settings: Settings) -> Result<Rocket<Build>, RelayError> {
    let http = RelayClient::http_client(&settings.options)?;
    let sessions = Arc::new(FormSessions::new(settings, http));

    Ok(rocket::build()
        .manage(sessions)
        .attach(tasks::BackgroundTasks)
        .mount("/", routes::public::routes())
        .mount("/api", routes::api::routes())
        .register("/", catchers![not_found, server_error]))
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let settings = Settings::from_env();
    boot::run(&settings);

    build(settings).expect("Failed to build relay HTTP client")
}
