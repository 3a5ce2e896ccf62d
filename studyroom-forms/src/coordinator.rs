use crate::context::FormContext;
use crate::key::{FormKey, NoStep};
use crate::submission::{PendingSubmission, SubmissionBuilder, SubmissionResponse};
use crate::value::FieldValue;
use crate::verdict::HelperText;
use crate::verification::{Completion, PendingVerification, Verifier, VerificationResponse};
use std::collections::BTreeMap;
use std::time::Duration;
use studyroom_error::{require, require_lt, FormError, Result};
use studyroom_transport::{ApiResponse, Transport};
use tracing::{error, info, warn};

/// Shown when submit is pressed while the active context is not valid.
pub const INCOMPLETE_FORM_MESSAGE: &str = "모든 필드를 채워주세요.";

struct ContextSlot<K: FormKey, S: FormKey> {
    context: FormContext<K, S>,
    submission: Box<dyn SubmissionBuilder<K, S>>,
}

/// Owns the contexts of one screen and exposes the active one.
///
/// Each context keeps its own values, verdicts and steps; switching only
/// changes which one is read and written. A single submit may be in flight
/// for the whole screen.
pub struct FormCoordinator<K: FormKey, S: FormKey = NoStep> {
    slots: Vec<ContextSlot<K, S>>,
    active: usize,
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl<K: FormKey, S: FormKey> FormCoordinator<K, S> {
    pub fn new(context: FormContext<K, S>, submission: impl SubmissionBuilder<K, S> + 'static) -> Self {
        Self {
            slots: vec![ContextSlot {
                context,
                submission: Box::new(submission),
            }],
            active: 0,
            in_flight: None,
            next_ticket: 0,
        }
    }

    pub fn with_context(
        mut self,
        context: FormContext<K, S>,
        submission: impl SubmissionBuilder<K, S> + 'static,
    ) -> Self {
        self.slots.push(ContextSlot {
            context,
            submission: Box::new(submission),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &FormContext<K, S> {
        &self.slots[self.active].context
    }

    pub fn context(&self, index: usize) -> Result<&FormContext<K, S>> {
        self.slot(index).map(|slot| &slot.context)
    }

    /// Direct access to a context that may not be the active one, e.g. to
    /// install a rule once its option set is loaded.
    pub fn context_mut(&mut self, index: usize) -> Result<&mut FormContext<K, S>> {
        self.slot_mut(index).map(|slot| &mut slot.context)
    }

    fn slot(&self, index: usize) -> Result<&ContextSlot<K, S>> {
        let len = self.slots.len();
        self.slots
            .get(index)
            .ok_or(FormError::UnknownContext { index, len })
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut ContextSlot<K, S>> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or(FormError::UnknownContext { index, len })
    }

    /// Exposes another context. Nothing is re-validated.
    pub fn switch_context(&mut self, index: usize) -> Result<()> {
        require_lt!(
            index,
            self.slots.len(),
            FormError::UnknownContext {
                index,
                len: self.slots.len(),
            }
        );
        self.active = index;
        Ok(())
    }

    pub fn active_gate(&self) -> bool {
        self.active().is_valid()
    }

    pub fn active_helper_texts(&self) -> BTreeMap<K, HelperText> {
        self.active().helper_texts()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Submit button state: the gate is open and nothing is in flight.
    pub fn can_submit(&self) -> bool {
        self.active_gate() && !self.is_loading()
    }

    /// Edits a field of the active context.
    pub fn on_field_change(&mut self, field: K, value: FieldValue) -> Result<bool> {
        let active = self.active;
        self.slot_mut(active)?.context.set_value(field, value)
    }

    /// Starts a verification on the active context. The pending request
    /// remembers the context so the answer finds its way back after a switch.
    pub fn request_verification(&mut self, step: S) -> Result<Option<PendingVerification<K, S>>> {
        let active = self.active;
        self.slot_mut(active)?.context.begin_verification(active, step)
    }

    pub fn complete_verification(&mut self, response: &VerificationResponse<S>) -> Result<Completion> {
        self.slot_mut(response.context)?
            .context
            .complete_verification(response)
    }

    /// Request, await and apply one verification in a single call.
    pub async fn verify<V>(&mut self, step: S, verifier: &V, timeout: Duration) -> Result<Option<Completion>>
    where
        V: Verifier<K, S> + ?Sized,
    {
        let Some(pending) = self.request_verification(step)? else {
            return Ok(None);
        };
        let response = pending.resolve(verifier, timeout).await;
        self.complete_verification(&response).map(Some)
    }

    /// Checks the gate of the active context and marks a submission in flight.
    ///
    /// A closed gate touches every field of the active context first. Values
    /// that were valid but never edited open it then; otherwise the result is
    /// a user-visible [`FormError::PreconditionViolation`] and no request is
    /// built.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission> {
        require!(self.in_flight.is_none(), FormError::SubmissionInFlight);

        let active = self.active;
        let slot = self.slot_mut(active)?;
        if !slot.context.is_valid() {
            slot.context.validate_all();
        }
        if !slot.context.is_valid() {
            let field = slot.context.check().err().and_then(|err| match err {
                FormError::ValidationFailure { field, .. } => Some(field),
                _ => None,
            });
            warn!(context = slot.context.id(), ?field, "submit rejected: form is incomplete");
            return Err(FormError::PreconditionViolation {
                message: INCOMPLETE_FORM_MESSAGE.to_string(),
                field,
            });
        }

        let request = slot.submission.build(&slot.context)?;
        self.next_ticket += 1;
        self.in_flight = Some(self.next_ticket);
        Ok(PendingSubmission {
            context: active,
            ticket: self.next_ticket,
            request,
        })
    }

    /// Releases the in-flight guard for a submission whose answer will never
    /// be applied. A late answer for `ticket` is then refused by
    /// [`finish_submit`](Self::finish_submit). `false` when `ticket` is not
    /// the submission in flight.
    pub fn abandon_submit(&mut self, ticket: u64) -> bool {
        if self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        warn!(ticket, "submission abandoned");
        true
    }

    /// Clears the in-flight guard and reports the outcome. On failure the
    /// context is left exactly as it was so the user can resubmit.
    pub fn finish_submit(&mut self, response: SubmissionResponse) -> Result<ApiResponse> {
        require!(
            self.in_flight == Some(response.ticket),
            FormError::submission(None, "Submission response does not match the request in flight")
        );
        self.in_flight = None;

        let slot = self.slot(response.context)?;
        match response.result {
            Ok(api_response) => {
                info!(context = slot.context.id(), status = api_response.status, "submission succeeded");
                Ok(api_response)
            }
            Err(err) => {
                error!(context = slot.context.id(), error = %err, "submission failed");
                Err(FormError::submission(err.status(), slot.submission.failure_message()))
            }
        }
    }

    /// Begin, send and finish a submission. Dropping the future before it
    /// resolves abandons the submission.
    pub async fn submit<T: Transport + ?Sized>(&mut self, transport: &T, timeout: Duration) -> Result<ApiResponse> {
        let pending = self.begin_submit()?;
        let guard = InFlight {
            ticket: Some(pending.ticket()),
            coordinator: self,
        };
        let response = pending.send(transport, timeout).await;
        guard.finish(response)
    }

    /// [`submit`](Self::submit), then hand the successful response to
    /// `continuation` (navigation, toast, ...).
    pub async fn submit_then<T, F, R>(&mut self, transport: &T, timeout: Duration, continuation: F) -> Result<R>
    where
        T: Transport + ?Sized,
        F: FnOnce(ApiResponse) -> R,
    {
        let response = self.submit(transport, timeout).await?;
        Ok(continuation(response))
    }
}

/// Holds the in-flight mark of one `submit` call and abandons it on drop
/// unless the answer was applied.
struct InFlight<'a, K: FormKey, S: FormKey> {
    coordinator: &'a mut FormCoordinator<K, S>,
    ticket: Option<u64>,
}

impl<K: FormKey, S: FormKey> InFlight<'_, K, S> {
    fn finish(mut self, response: SubmissionResponse) -> Result<ApiResponse> {
        self.ticket = None;
        self.coordinator.finish_submit(response)
    }
}

impl<K: FormKey, S: FormKey> Drop for InFlight<'_, K, S> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.coordinator.abandon_submit(ticket);
        }
    }
}
