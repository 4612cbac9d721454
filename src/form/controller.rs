use std::sync::{Arc, Mutex, MutexGuard};

use super::{Field, FormView, SubmissionPayload, SubmissionStatus};
use crate::error::{RelayError, SubmitError};
use crate::relay::{Delivery, Relay};

/// What an edit does to a terminal status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusOnEdit {
    /// `Success`/`Error` stay displayed until the next submit.
    #[default]
    Keep,
    /// Any edit after `Success`/`Error` returns the form to `Idle`.
    ResetToIdle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent(Delivery),
    Failed(SubmitError),
    /// A send was already in flight; nothing happened.
    Ignored,
}

#[derive(Debug, Default)]
struct FormState {
    fields: SubmissionPayload,
    status: SubmissionStatus,
}

/// Owns one form's fields and its `Idle → Sending → Success | Error` machine.
///
/// The state lock is never held across the relay call, so `status()` and edits stay
/// responsive while a send is in flight, and a second submit sees `Sending` and backs off.
pub struct SubmissionController<R: Relay> {
    relay: Arc<R>,
    on_edit: StatusOnEdit,
    state: Mutex<FormState>,
}

impl<R: Relay> SubmissionController<R> {
    #[cfg(test)]
    pub fn new(relay: Arc<R>) -> Self {
        Self::with_policy(relay, StatusOnEdit::default())
    }

    pub fn with_policy(relay: Arc<R>, on_edit: StatusOnEdit) -> Self {
        SubmissionController {
            relay,
            on_edit,
            state: Mutex::new(FormState::default()),
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        self.lock().status
    }

    #[cfg(test)]
    pub fn fields(&self) -> SubmissionPayload {
        self.lock().fields.clone()
    }

    pub fn view(&self) -> FormView {
        let state = self.lock();
        FormView::new(state.fields.clone(), state.status)
    }

    pub fn on_field_change(&self, field: Field, value: impl Into<String>) {
        let mut state = self.lock();
        state.fields.set(field, value.into());
        if self.on_edit == StatusOnEdit::ResetToIdle && state.status.is_terminal() {
            state.status = SubmissionStatus::Idle;
        }
    }

    /// Validate, send once, and settle on `Success` or `Error`.
    /// Every failure is absorbed here; the returned outcome is informational.
    pub async fn on_submit(&self) -> SubmitOutcome {
        self.submit(None).await
    }

    /// Replace all fields with `values` and submit, as one step. While a send is in
    /// flight the values are discarded along with the submit, never written over the
    /// fields of the message being sent.
    pub async fn on_submit_with(&self, values: SubmissionPayload) -> SubmitOutcome {
        self.submit(Some(values)).await
    }

    async fn submit(&self, values: Option<SubmissionPayload>) -> SubmitOutcome {
        let payload = match self.begin(values) {
            Ok(payload) => payload,
            Err(outcome) => return outcome,
        };

        log::info!(
            "[form] Sending message ({} chars)",
            payload.message.chars().count()
        );

        let in_flight = InFlight {
            controller: self,
            settled: false,
        };
        let result = self.relay.send(&payload).await;
        in_flight.settle(result)
    }

    fn begin(&self, values: Option<SubmissionPayload>) -> Result<SubmissionPayload, SubmitOutcome> {
        let mut state = self.lock();

        if state.status == SubmissionStatus::Sending {
            log::debug!("[form] Submit ignored, a send is already in flight");
            return Err(SubmitOutcome::Ignored);
        }

        if let Some(values) = values {
            state.fields = values;
        }

        let empty = state.fields.empty_fields();
        if !empty.is_empty() {
            state.status = SubmissionStatus::Error;
            return Err(failed(SubmitError::Validation { empty }));
        }

        if !self.relay.is_initialized() {
            state.status = SubmissionStatus::Error;
            return Err(failed(RelayError::NotInitialized.into()));
        }

        state.status = SubmissionStatus::Sending;
        Ok(state.fields.clone())
    }

    fn finish(&self, result: Result<Delivery, RelayError>) -> SubmitOutcome {
        let mut state = self.lock();
        match result {
            Ok(delivery) => {
                log::info!("[form] Message delivered (status {})", delivery.status);
                state.status = SubmissionStatus::Success;
                state.fields = SubmissionPayload::default();
                SubmitOutcome::Sent(delivery)
            }
            Err(e) => {
                state.status = SubmissionStatus::Error;
                failed(e.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Held across the relay call. If the submit future is dropped before the send
/// resolves, the form leaves `Sending` for `Error` instead of staying locked.
struct InFlight<'a, R: Relay> {
    controller: &'a SubmissionController<R>,
    settled: bool,
}

impl<R: Relay> InFlight<'_, R> {
    fn settle(mut self, result: Result<Delivery, RelayError>) -> SubmitOutcome {
        self.settled = true;
        self.controller.finish(result)
    }
}

impl<R: Relay> Drop for InFlight<'_, R> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.controller.lock();
        if state.status == SubmissionStatus::Sending {
            log::warn!("[form] Submit abandoned before the relay answered");
            state.status = SubmissionStatus::Error;
        }
    }
}

fn failed(err: SubmitError) -> SubmitOutcome {
    match &err {
        SubmitError::Validation { .. } => log::info!("[form] {}", err),
        SubmitError::Relay(RelayError::Rejected { status, .. }) => {
            log::error!("[form] Relay rejected the message with status {}", status)
        }
        SubmitError::Relay(RelayError::NotInitialized | RelayError::Configuration { .. }) => {
            log::error!("[form] {} (check relay configuration)", err)
        }
        SubmitError::Relay(RelayError::Transport(_)) => log::warn!("[form] {}", err),
    }
    SubmitOutcome::Failed(err)
}
