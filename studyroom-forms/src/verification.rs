//! Asynchronous confirmation steps (mailed code, nickname availability).
//!
//! A request is split in three: [`AsyncVerificationStep::begin`] hands out a
//! [`PendingVerification`] that owns everything the call needs, the caller
//! awaits it, and the [`VerificationResponse`] is fed back to the context.
//! Edits may happen in between; a response whose ticket or input snapshot no
//! longer matches is discarded.

use crate::field_set::FieldSet;
use crate::key::FormKey;
use crate::value::FieldValue;
use async_trait::async_trait;
use std::time::Duration;
use studyroom_transport::TransportError;
use tracing::{debug, warn};

/// Message recorded when a verification does not answer in time.
pub const TIMEOUT_MESSAGE: &str = "timeout";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VerificationState {
    #[default]
    Idle,
    Requesting,
    Succeeded,
    Failed { message: Option<String> },
}

impl VerificationState {
    pub fn is_requesting(&self) -> bool {
        matches!(self, VerificationState::Requesting)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, VerificationState::Succeeded)
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            VerificationState::Failed { message } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Confirmed,
    Rejected(Option<String>),
}

impl<T> From<Result<T, TransportError>> for VerificationOutcome {
    fn from(result: Result<T, TransportError>) -> Self {
        match result {
            Ok(_) => VerificationOutcome::Confirmed,
            Err(TransportError::Status { message, .. }) => VerificationOutcome::Rejected(Some(message)),
            Err(err) => VerificationOutcome::Rejected(Some(err.to_string())),
        }
    }
}

/// What happened to a response handed back to its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request was issued after this one.
    StaleTicket,
    /// The step was reset by an edit while the request was outstanding.
    NotRequesting,
    /// The inputs no longer hold the values the request was issued for.
    ValueChanged,
}

impl Completion {
    pub fn is_applied(self) -> bool {
        matches!(self, Completion::Applied)
    }
}

/// One verification round trip bound to a set of input fields.
#[derive(Debug, Clone)]
pub struct AsyncVerificationStep<K: FormKey> {
    inputs: FieldSet<K>,
    required: bool,
    state: VerificationState,
    ticket: u64,
    requested_for: Vec<(K, FieldValue)>,
}

impl<K: FormKey> AsyncVerificationStep<K> {
    pub fn new(inputs: FieldSet<K>, required: bool) -> Self {
        Self {
            inputs,
            required,
            state: VerificationState::Idle,
            ticket: 0,
            requested_for: Vec::new(),
        }
    }

    pub fn inputs(&self) -> FieldSet<K> {
        self.inputs
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    pub fn is_satisfied(&self) -> bool {
        self.state.is_succeeded()
    }

    /// Whether a new request may start: not while one is outstanding, and not
    /// once the current inputs are confirmed.
    pub fn accepts_request(&self) -> bool {
        !self.state.is_requesting() && !self.state.is_succeeded()
    }

    /// Moves to `Requesting` for `snapshot` and returns the new ticket, or
    /// `None` when [`accepts_request`](Self::accepts_request) is false.
    pub(crate) fn begin(&mut self, snapshot: Vec<(K, FieldValue)>) -> Option<u64> {
        if !self.accepts_request() {
            return None;
        }
        self.ticket += 1;
        self.requested_for = snapshot;
        self.state = VerificationState::Requesting;
        Some(self.ticket)
    }

    pub(crate) fn complete(
        &mut self,
        ticket: u64,
        outcome: VerificationOutcome,
        current: &[(K, FieldValue)],
    ) -> Completion {
        if ticket != self.ticket {
            return Completion::StaleTicket;
        }
        if !self.state.is_requesting() {
            return Completion::NotRequesting;
        }
        if self.requested_for.as_slice() != current {
            self.state = VerificationState::Idle;
            return Completion::ValueChanged;
        }
        self.state = match outcome {
            VerificationOutcome::Confirmed => VerificationState::Succeeded,
            VerificationOutcome::Rejected(message) => VerificationState::Failed { message },
        };
        Completion::Applied
    }

    /// Forces `Idle` because an input changed. Returns whether the state moved.
    pub(crate) fn invalidate(&mut self) -> bool {
        if self.state == VerificationState::Idle {
            return false;
        }
        self.state = VerificationState::Idle;
        self.requested_for.clear();
        true
    }
}

/// A verification request detached from the form, ready to be awaited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification<K: FormKey, S: FormKey> {
    pub(crate) context: usize,
    pub(crate) step: S,
    pub(crate) ticket: u64,
    pub(crate) inputs: Vec<(K, FieldValue)>,
}

impl<K: FormKey, S: FormKey> PendingVerification<K, S> {
    pub fn context(&self) -> usize {
        self.context
    }

    pub fn step(&self) -> S {
        self.step
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn input(&self, key: K) -> Option<&FieldValue> {
        self.inputs.iter().find(|(k, _)| *k == key).map(|(_, value)| value)
    }

    /// Trimmed text of an input, empty when absent.
    pub fn text(&self, key: K) -> &str {
        self.input(key).map_or("", FieldValue::trimmed)
    }

    pub fn respond(&self, outcome: VerificationOutcome) -> VerificationResponse<S> {
        VerificationResponse {
            context: self.context,
            step: self.step,
            ticket: self.ticket,
            outcome,
        }
    }

    /// Awaits `verifier`, giving up after `timeout`.
    pub async fn resolve<V>(&self, verifier: &V, timeout: Duration) -> VerificationResponse<S>
    where
        V: Verifier<K, S> + ?Sized,
    {
        debug!(step = self.step.name(), ticket = self.ticket, "verification sent");
        let outcome = match tokio::time::timeout(timeout, verifier.verify(self)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(step = self.step.name(), ticket = self.ticket, "verification timed out");
                VerificationOutcome::Rejected(Some(TIMEOUT_MESSAGE.to_string()))
            }
        };
        self.respond(outcome)
    }
}

/// Answer for a [`PendingVerification`], routed back by context index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResponse<S> {
    pub context: usize,
    pub step: S,
    pub ticket: u64,
    pub outcome: VerificationOutcome,
}

/// Performs the external confirmation for a step.
#[async_trait]
pub trait Verifier<K: FormKey, S: FormKey>: Send + Sync {
    async fn verify(&self, request: &PendingVerification<K, S>) -> VerificationOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, crate::FormKey)]
    enum Key {
        Nickname,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, crate::FormKey)]
    enum Step {
        CheckNickname,
    }

    fn snapshot(nickname: &str) -> Vec<(Key, FieldValue)> {
        vec![(Key::Nickname, FieldValue::text(nickname))]
    }

    fn step() -> AsyncVerificationStep<Key> {
        AsyncVerificationStep::new(FieldSet::from_keys(&[Key::Nickname]), true)
    }

    #[test]
    fn begin_is_refused_while_requesting() {
        let mut step = step();
        assert_eq!(step.begin(snapshot("별빛")), Some(1));
        assert_eq!(step.begin(snapshot("별빛")), None);
        assert!(step.state().is_requesting());
    }

    #[test]
    fn confirmed_response_succeeds() {
        let mut step = step();
        let ticket = step.begin(snapshot("별빛")).unwrap();
        let completion = step.complete(ticket, VerificationOutcome::Confirmed, &snapshot("별빛"));
        assert_eq!(completion, Completion::Applied);
        assert!(step.is_satisfied());
        assert_eq!(step.begin(snapshot("별빛")), None);
    }

    #[test]
    fn rejected_response_keeps_message() {
        let mut step = step();
        let ticket = step.begin(snapshot("별빛")).unwrap();
        step.complete(
            ticket,
            VerificationOutcome::Rejected(Some("이미 사용 중인 닉네임입니다.".into())),
            &snapshot("별빛"),
        );
        assert_eq!(step.state().failure_message(), Some("이미 사용 중인 닉네임입니다."));

        // Failed steps may be requested again.
        assert_eq!(step.begin(snapshot("별빛")), Some(2));
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut step = step();
        let first = step.begin(snapshot("a")).unwrap();
        assert!(step.invalidate());
        let second = step.begin(snapshot("b")).unwrap();

        assert_eq!(
            step.complete(first, VerificationOutcome::Confirmed, &snapshot("b")),
            Completion::StaleTicket
        );
        assert!(step.state().is_requesting());

        assert_eq!(
            step.complete(second, VerificationOutcome::Confirmed, &snapshot("c")),
            Completion::ValueChanged
        );
        assert_eq!(step.state(), &VerificationState::Idle);
    }

    #[test]
    fn response_after_reset_is_ignored() {
        let mut step = step();
        let ticket = step.begin(snapshot("a")).unwrap();
        step.invalidate();
        assert_eq!(
            step.complete(ticket, VerificationOutcome::Confirmed, &snapshot("a")),
            Completion::NotRequesting
        );
        assert!(!step.is_satisfied());
        assert!(!step.invalidate());
    }

    #[test]
    fn transport_results_map_to_outcomes() {
        let ok: Result<(), TransportError> = Ok(());
        assert_eq!(VerificationOutcome::from(ok), VerificationOutcome::Confirmed);

        let conflict: Result<(), TransportError> = Err(TransportError::Status {
            status: 409,
            message: "duplicated".into(),
        });
        assert_eq!(
            VerificationOutcome::from(conflict),
            VerificationOutcome::Rejected(Some("duplicated".into()))
        );
    }

    struct Silent;

    #[async_trait]
    impl Verifier<Key, Step> for Silent {
        async fn verify(&self, _request: &PendingVerification<Key, Step>) -> VerificationOutcome {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            VerificationOutcome::Confirmed
        }
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_times_out() {
        let pending = PendingVerification {
            context: 0,
            step: Step::CheckNickname,
            ticket: 1,
            inputs: snapshot("별빛"),
        };
        assert_eq!(pending.text(Key::Nickname), "별빛");

        let response = pending.resolve(&Silent, Duration::from_secs(5)).await;
        assert_eq!(
            response.outcome,
            VerificationOutcome::Rejected(Some(TIMEOUT_MESSAGE.to_string()))
        );
        assert_eq!(response.ticket, 1);
    }
}
