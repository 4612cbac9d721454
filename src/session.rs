use rocket::http::{Cookie, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::form::{FormView, SubmissionController, SubmissionPayload, SubmissionStatus};
use crate::rate_limit::RateLimiter;
use crate::relay::{is_headless_agent, RelayClient};

const FORM_COOKIE: &str = "relayform_form";

/// One mounted contact form: a controller and the relay client it drives.
pub type ContactForm = SubmissionController<RelayClient>;

struct FormInstance {
    form: Arc<ContactForm>,
    last_seen: Instant,
}

/// Who is asking for a form: client IP and User-Agent, as far as the request tells.
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Registry of form instances, one per visitor cookie.
/// Every instance shares one rate limiter, so a visitor dropping the cookie gets no fresh quota.
pub struct FormSessions {
    settings: Settings,
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    forms: Mutex<HashMap<String, FormInstance>>,
}

impl FormSessions {
    pub fn new(settings: Settings, http: reqwest::Client) -> Self {
        FormSessions {
            settings,
            http,
            limiter: Arc::new(RateLimiter::new()),
            forms: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Look up a mounted form without creating one.
    pub fn find(&self, id: Option<&str>) -> Option<Arc<ContactForm>> {
        let mut forms = self.lock();
        let instance = forms.get_mut(id?)?;
        instance.last_seen = Instant::now();
        Some(Arc::clone(&instance.form))
    }

    /// Return the form for `id`, or mount a fresh one under a new id.
    pub fn open(&self, id: Option<&str>, visitor: &Visitor) -> (String, Arc<ContactForm>) {
        let mut forms = self.lock();
        if let Some((id, instance)) = id.and_then(|id| forms.get_mut(id).map(|i| (id, i))) {
            instance.last_seen = Instant::now();
            return (id.to_string(), Arc::clone(&instance.form));
        }

        if forms.len() >= self.settings.max_forms {
            evict_oldest(&mut forms);
        }

        let id = uuid::Uuid::new_v4().to_string();
        let form = Arc::new(self.mount(visitor));
        forms.insert(
            id.clone(),
            FormInstance {
                form: Arc::clone(&form),
                last_seen: Instant::now(),
            },
        );
        (id, form)
    }

    fn mount(&self, visitor: &Visitor) -> ContactForm {
        let headless = visitor
            .user_agent
            .as_deref()
            .map(is_headless_agent)
            .unwrap_or(false);
        let client = RelayClient::new(
            self.http.clone(),
            self.settings.options.clone(),
            Arc::clone(&self.limiter),
        )
        .headless(headless)
        .visitor(visitor.ip.clone());

        // Missing credentials were reported at boot. The form still mounts, and every
        // submit on it ends in Error.
        let credentials = &self.settings.credentials;
        if credentials.missing().is_empty() {
            let _ = client.initialize(credentials.clone());
        }
        SubmissionController::with_policy(Arc::new(client), self.settings.on_edit)
    }

    /// Drop instances not seen within `max_age`, keeping any with a send in flight.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let mut forms = self.lock();
        let before = forms.len();
        forms.retain(|_, instance| {
            instance.last_seen.elapsed() < max_age
                || instance.form.status() == SubmissionStatus::Sending
        });
        before - forms.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, FormInstance>> {
        self.forms.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Make room for one more instance. Forms with a send in flight are never evicted.
fn evict_oldest(forms: &mut HashMap<String, FormInstance>) {
    let oldest = forms
        .iter()
        .filter(|(_, instance)| instance.form.status() != SubmissionStatus::Sending)
        .min_by_key(|(_, instance)| instance.last_seen)
        .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
        forms.remove(&id);
        log::debug!("[form] Registry full, evicted form {}", id);
    }
}

fn form_cookie(request: &Request<'_>) -> Option<String> {
    request
        .cookies()
        .get_private(FORM_COOKIE)
        .map(|c| c.value().to_string())
}

async fn registry<'r>(request: &'r Request<'_>) -> Option<&'r Arc<FormSessions>> {
    match request.guard::<&State<Arc<FormSessions>>>().await {
        Outcome::Success(s) => Some(s.inner()),
        _ => None,
    }
}

/// Guard resolving the visitor's form instance, mounting one and setting the cookie
/// on first use. Only routes that change the form take this guard.
pub struct ContactSession {
    pub id: String,
    pub form: Arc<ContactForm>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ContactSession {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(sessions) = registry(request).await else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        let existing = form_cookie(request);
        let visitor = Visitor {
            ip: request.client_ip().map(|ip| ip.to_string()),
            user_agent: request.headers().get_one("User-Agent").map(str::to_string),
        };

        let (id, form) = sessions.open(existing.as_deref(), &visitor);
        if existing.as_deref() != Some(id.as_str()) {
            let mut cookie = Cookie::new(FORM_COOKIE, id.clone());
            cookie.set_http_only(true);
            cookie.set_same_site(SameSite::Lax);
            cookie.set_path("/");
            request.cookies().add_private(cookie);
        }

        Outcome::Success(ContactSession { id, form })
    }
}

/// Read-only guard: the visitor's form if one is mounted. Never mounts or sets a cookie.
pub struct KnownForm(pub Option<Arc<ContactForm>>);

impl KnownForm {
    /// The mounted form's view, or a blank idle form.
    pub fn view(&self) -> FormView {
        match &self.0 {
            Some(form) => form.view(),
            None => FormView::new(SubmissionPayload::default(), SubmissionStatus::Idle),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for KnownForm {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(sessions) = registry(request).await else {
            return Outcome::Error((Status::InternalServerError, ()));
        };
        Outcome::Success(KnownForm(sessions.find(form_cookie(request).as_deref())))
    }
}
