//! Reset flow engine shared by the request and confirm forms.
//!
//! A flow owns one [`FlowOutcome`] and one [`FieldErrors`] set. `submit` takes
//! `&self` so a presentation layer can fire it from any event handler; the
//! state lock is only held between awaits, never across the network call.

mod confirm;
mod request;

use crate::config::Messages;
use crate::transport::{Endpoint, ResetPayload, ResetTransport, TransportResult};
use crate::validation::FieldErrors;
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use confirm::{ConfirmForm, ResetConfirmFlow};
pub use request::{RequestForm, ResetRequestFlow};

/// Status of the most recent submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowOutcome {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

impl FlowOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowOutcome::Succeeded)
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            FlowOutcome::Failed(detail) => Some(detail),
            _ => None,
        }
    }
}

/// What a call to [`ResetFlow::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    /// Local validation failed; nothing was sent.
    Invalid,
    /// Another submission is already in flight; this call was ignored.
    InFlight,
    /// The flow already succeeded; success is terminal.
    AlreadySucceeded,
    /// The submission ran to completion with this outcome.
    Resolved(FlowOutcome),
}

/// Consistent view of a flow's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSnapshot {
    pub outcome: FlowOutcome,
    pub field_errors: FieldErrors,
}

/// One kind of reset form: what it validates and what it sends where.
pub trait ResetForm: Send {
    const ENDPOINT: Endpoint;

    /// Local field checks; any entry blocks submission.
    fn validate(&self) -> FieldErrors;

    /// Failure detail for input that passed validation but can never succeed.
    ///
    /// Only consulted once [`ResetForm::validate`] reports no field errors, so
    /// invalid input yields `SubmitStatus::Invalid` and leaves the outcome as is.
    fn precondition(&self, _messages: &Messages) -> Option<String> {
        None
    }

    fn payload(&self) -> ResetPayload;

    /// Message shown when the server rejects without a usable detail.
    fn rejected_fallback(messages: &Messages) -> &str;

    /// Short description of the input for logs, never containing secrets.
    fn describe(&self) -> String;
}

struct FlowState<F> {
    form: F,
    outcome: FlowOutcome,
    field_errors: FieldErrors,
}

/// Generic reset state machine: `Idle → Submitting → {Succeeded | Failed}`.
pub struct ResetFlow<F: ResetForm, T: ResetTransport + ?Sized> {
    state: Mutex<FlowState<F>>,
    transport: Arc<T>,
    messages: Messages,
}

impl<F: ResetForm, T: ResetTransport + ?Sized> ResetFlow<F, T> {
    pub fn new(form: F, transport: Arc<T>, messages: Messages) -> Self {
        Self {
            state: Mutex::new(FlowState {
                form,
                outcome: FlowOutcome::Idle,
                field_errors: FieldErrors::new(),
            }),
            transport,
            messages,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlowState<F>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn outcome(&self) -> FlowOutcome {
        self.lock().outcome.clone()
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.lock().field_errors.clone()
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        let state = self.lock();
        FlowSnapshot {
            outcome: state.outcome.clone(),
            field_errors: state.field_errors.clone(),
        }
    }

    /// Mutate form input. Never validates and never changes the outcome.
    pub(crate) fn edit<R>(&self, apply: impl FnOnce(&mut F) -> R) -> R {
        apply(&mut self.lock().form)
    }

    pub(crate) fn read<R>(&self, inspect: impl FnOnce(&F) -> R) -> R {
        inspect(&self.lock().form)
    }

    /// Return the flow to `Idle` and drop field errors.
    ///
    /// Returns `false` (and changes nothing) while a submission is in flight.
    pub fn reset(&self) -> bool {
        let mut state = self.lock();
        if state.outcome == FlowOutcome::Submitting {
            return false;
        }
        state.outcome = FlowOutcome::Idle;
        state.field_errors.clear();
        true
    }

    /// Validate, send once, and record the resolution.
    pub async fn submit(&self) -> SubmitStatus {
        let (payload, description) = match self.begin() {
            Ok(prepared) => prepared,
            Err(status) => return status,
        };

        let mut guard = InFlight {
            state: &self.state,
            armed: true,
        };
        info!("dispatching {} request for {description}", F::ENDPOINT);
        let result = self.transport.submit(F::ENDPOINT, &payload).await;
        drop(payload);
        let outcome = self.resolve(result);

        guard.armed = false;
        self.lock().outcome = outcome.clone();
        SubmitStatus::Resolved(outcome)
    }

    /// Everything up to the network call, committed under one lock.
    fn begin(&self) -> Result<(ResetPayload, String), SubmitStatus> {
        let mut state = self.lock();
        match state.outcome {
            FlowOutcome::Submitting => {
                debug!("{} submission already in flight; ignoring", F::ENDPOINT);
                return Err(SubmitStatus::InFlight);
            }
            FlowOutcome::Succeeded => return Err(SubmitStatus::AlreadySucceeded),
            FlowOutcome::Idle | FlowOutcome::Failed(_) => {}
        }

        state.field_errors = state.form.validate();
        if !state.field_errors.is_empty() {
            return Err(SubmitStatus::Invalid);
        }

        let blocked = state.form.precondition(&self.messages);
        if let Some(detail) = blocked {
            warn!("{} submission short-circuited: {detail}", F::ENDPOINT);
            state.outcome = FlowOutcome::Failed(detail);
            return Err(SubmitStatus::Resolved(state.outcome.clone()));
        }

        state.outcome = FlowOutcome::Submitting;
        Ok((state.form.payload(), state.form.describe()))
    }

    fn resolve(&self, result: TransportResult) -> FlowOutcome {
        match result {
            TransportResult::Ok => {
                info!("{} request accepted", F::ENDPOINT);
                FlowOutcome::Succeeded
            }
            TransportResult::Rejected { detail } => {
                let detail = detail
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| F::rejected_fallback(&self.messages).to_string());
                warn!("{} request rejected: {detail}", F::ENDPOINT);
                FlowOutcome::Failed(detail)
            }
            TransportResult::TransportFailure(err) => {
                error!("{} request failed in transport: {err}", F::ENDPOINT);
                FlowOutcome::Failed(self.messages.generic_failure.clone())
            }
        }
    }
}

/// Puts a flow back to `Idle` if its submission future is dropped mid-flight.
struct InFlight<'a, F> {
    state: &'a Mutex<FlowState<F>>,
    armed: bool,
}

impl<F> Drop for InFlight<'_, F> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.outcome == FlowOutcome::Submitting {
                state.outcome = FlowOutcome::Idle;
            }
        }
    }
}
