use crate::field::FieldState;
use crate::field_set::FieldSet;
use crate::key::{FormKey, NoStep};
use crate::validator::FieldValidator;
use crate::value::FieldValue;
use crate::verdict::{HelperText, Verdict};
use crate::verification::{
    AsyncVerificationStep, Completion, PendingVerification, VerificationResponse, VerificationState,
};
use std::collections::BTreeMap;
use studyroom_error::{require, require_lt, require_some, FormError, Result};
use tracing::{debug, warn};

/// Message recorded on a step that never succeeded when the context is asked
/// why it is not submittable.
pub const VERIFICATION_REQUIRED: &str = "인증이 필요합니다.";

/// Message for a required field that was never edited.
pub const FIELD_UNCHECKED: &str = "입력값을 확인해주세요.";

/// One independently validated group of fields with its verification steps.
///
/// Every mutation recomputes the gate ([`FormContext::is_valid`]) before it
/// returns.
#[derive(Debug)]
pub struct FormContext<K: FormKey, S: FormKey = NoStep> {
    id: &'static str,
    fields: BTreeMap<K, FieldState<K>>,
    required: FieldSet<K>,
    dependents: BTreeMap<K, FieldSet<K>>,
    steps: BTreeMap<S, AsyncVerificationStep<K>>,
    valid: bool,
}

pub struct FormContextBuilder<K: FormKey, S: FormKey = NoStep> {
    id: &'static str,
    fields: Vec<(FieldState<K>, bool)>,
    steps: Vec<(S, AsyncVerificationStep<K>)>,
}

impl<K: FormKey, S: FormKey> FormContextBuilder<K, S> {
    /// Adds a field the gate requires to pass.
    pub fn field(mut self, key: K, initial: FieldValue, validator: impl FieldValidator<K> + 'static) -> Self {
        self.fields.push((FieldState::new(key, initial, validator), true));
        self
    }

    /// Adds a field that is validated and rendered but not part of the gate.
    pub fn optional_field(
        mut self,
        key: K,
        initial: FieldValue,
        validator: impl FieldValidator<K> + 'static,
    ) -> Self {
        self.fields.push((FieldState::new(key, initial, validator), false));
        self
    }

    pub fn step(mut self, key: S, inputs: &[K], required: bool) -> Self {
        self.steps
            .push((key, AsyncVerificationStep::new(FieldSet::from_keys(inputs), required)));
        self
    }

    pub fn build(self) -> Result<FormContext<K, S>> {
        let id = self.id;
        let unknown_field = |field: K| FormError::UnknownField {
            field: field.name(),
            context: id,
        };

        let mut fields = BTreeMap::new();
        let mut required = FieldSet::new();
        for (state, is_required) in self.fields {
            require_lt!(state.key().index(), FieldSet::<K>::CAPACITY, unknown_field(state.key()));
            if is_required {
                required.insert(state.key());
            }
            fields.insert(state.key(), state);
        }

        let mut dependents: BTreeMap<K, FieldSet<K>> = BTreeMap::new();
        for (key, state) in &fields {
            for dependency in state.dependencies().iter() {
                require!(fields.contains_key(&dependency), unknown_field(dependency));
                dependents.entry(dependency).or_default().insert(*key);
            }
        }

        let mut steps = BTreeMap::new();
        for (key, step) in self.steps {
            for input in step.inputs().iter() {
                require!(fields.contains_key(&input), unknown_field(input));
            }
            steps.insert(key, step);
        }

        let mut context = FormContext {
            id,
            fields,
            required,
            dependents,
            steps,
            valid: false,
        };
        context.recompute_gate();
        Ok(context)
    }
}

impl<K: FormKey, S: FormKey> FormContext<K, S> {
    pub fn builder(id: &'static str) -> FormContextBuilder<K, S> {
        FormContextBuilder {
            id,
            fields: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    /// The gate: every required field passes and every required step succeeded.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn contains(&self, field: K) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn is_required(&self, field: K) -> bool {
        self.required.contains(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = K> + '_ {
        self.fields.keys().copied()
    }

    pub fn value(&self, field: K) -> Option<&FieldValue> {
        self.fields.get(&field).map(FieldState::value)
    }

    /// Trimmed text of a field, empty when absent.
    pub fn text(&self, field: K) -> &str {
        self.value(field).map_or("", FieldValue::trimmed)
    }

    pub fn values(&self) -> BTreeMap<K, FieldValue> {
        self.fields
            .iter()
            .map(|(key, state)| (*key, state.value().clone()))
            .collect()
    }

    pub fn verdict(&self, field: K) -> Option<&Verdict> {
        self.fields.get(&field).and_then(FieldState::verdict)
    }

    pub fn helper_text(&self, field: K) -> Option<HelperText> {
        self.fields.get(&field).map(FieldState::helper_text)
    }

    pub fn helper_texts(&self) -> BTreeMap<K, HelperText> {
        self.fields
            .iter()
            .map(|(key, state)| (*key, state.helper_text()))
            .collect()
    }

    pub fn step_state(&self, step: S) -> Option<&VerificationState> {
        self.steps.get(&step).map(AsyncVerificationStep::state)
    }

    /// A step can be requested when it is neither in flight nor already
    /// succeeded, and all of its inputs pass.
    pub fn can_request(&self, step: S) -> bool {
        self.steps.get(&step).map_or(false, |s| {
            s.accepts_request() && s.inputs().iter().all(|input| self.field_passes(input))
        })
    }

    fn field_passes(&self, field: K) -> bool {
        self.fields.get(&field).map_or(false, FieldState::is_pass)
    }

    fn field_mut(&mut self, field: K) -> Result<&mut FieldState<K>> {
        let context = self.id;
        Ok(require_some!(
            self.fields.get_mut(&field),
            FormError::UnknownField {
                field: field.name(),
                context,
            }
        ))
    }

    /// Stores a new value for `field`.
    ///
    /// The field and its already-validated dependents are re-derived, steps
    /// fed by the field drop back to `Idle` when the value actually changed,
    /// and the gate is recomputed. Returns whether the value changed.
    pub fn set_value(&mut self, field: K, value: FieldValue) -> Result<bool> {
        let changed = self.field_mut(field)?.replace_value(value)?;

        self.revalidate(field);
        let dependents = self.dependents.get(&field).copied().unwrap_or_default();
        for dependent in dependents.iter() {
            if self.fields.get(&dependent).map_or(false, FieldState::is_touched) {
                self.revalidate(dependent);
            }
        }

        if changed {
            for (key, step) in self.steps.iter_mut() {
                if step.inputs().contains(field) && step.invalidate() {
                    debug!(context = self.id, step = key.name(), field = field.name(), "verification reset by edit");
                }
            }
        }

        self.recompute_gate();
        Ok(changed)
    }

    /// Touches every field so all messages become visible.
    pub fn validate_all(&mut self) {
        let keys: Vec<K> = self.fields.keys().copied().collect();
        for key in keys {
            self.revalidate(key);
        }
        self.recompute_gate();
    }

    /// Swaps the rule of `field`, e.g. once the set of valid options is known.
    /// A touched field is re-derived under the new rule.
    pub fn replace_validator(
        &mut self,
        field: K,
        validator: impl FieldValidator<K> + 'static,
    ) -> Result<()> {
        let validator: Box<dyn FieldValidator<K>> = Box::new(validator);
        let new_dependencies = validator.dependencies();
        for dependency in new_dependencies.iter() {
            require!(
                self.fields.contains_key(&dependency),
                FormError::UnknownField {
                    field: dependency.name(),
                    context: self.id,
                }
            );
        }

        let state = self.field_mut(field)?;
        let old_dependencies = state.dependencies();
        state.replace_validator(validator);
        let touched = state.is_touched();

        for dependency in old_dependencies.iter() {
            if let Some(set) = self.dependents.get_mut(&dependency) {
                set.remove(field);
            }
        }
        for dependency in new_dependencies.iter() {
            self.dependents.entry(dependency).or_default().insert(field);
        }

        if touched {
            self.revalidate(field);
        }
        self.recompute_gate();
        Ok(())
    }

    /// Starts a verification round trip for `step`. `context` is this
    /// context's slot in the owning coordinator and is stamped on the request.
    ///
    /// `Ok(None)` when the request is suppressed: one is already in flight or
    /// an input does not pass.
    pub(crate) fn begin_verification(
        &mut self,
        context: usize,
        step: S,
    ) -> Result<Option<PendingVerification<K, S>>> {
        let inputs = self.step_mut(step)?.inputs();
        if !self.can_request(step) {
            debug!(context = self.id, step = step.name(), "verification request suppressed");
            return Ok(None);
        }

        let snapshot = self.snapshot(inputs);
        let ticket = match self.step_mut(step)?.begin(snapshot.clone()) {
            Some(ticket) => ticket,
            None => return Ok(None),
        };
        debug!(context = self.id, step = step.name(), ticket, "verification requesting");
        self.recompute_gate();

        Ok(Some(PendingVerification {
            context,
            step,
            ticket,
            inputs: snapshot,
        }))
    }

    /// Applies a verification answer, discarding it when stale.
    pub(crate) fn complete_verification(&mut self, response: &VerificationResponse<S>) -> Result<Completion> {
        let inputs = self.step_mut(response.step)?.inputs();
        let current = self.snapshot(inputs);
        let completion = self
            .step_mut(response.step)?
            .complete(response.ticket, response.outcome.clone(), &current);

        if completion.is_applied() {
            debug!(
                context = self.id,
                step = response.step.name(),
                state = ?self.step_state(response.step),
                "verification completed"
            );
        } else {
            warn!(
                context = self.id,
                step = response.step.name(),
                ticket = response.ticket,
                ?completion,
                "verification response discarded"
            );
        }
        self.recompute_gate();
        Ok(completion)
    }

    /// Why the gate is closed: the first failing required field (in key
    /// order), then the first unsatisfied required step.
    pub fn check(&self) -> Result<()> {
        for key in self.required.iter() {
            let Some(state) = self.fields.get(&key) else {
                continue;
            };
            let verdict = match state.verdict() {
                Some(verdict) => verdict.clone(),
                None => state.evaluate(&self.fields),
            };
            if let Verdict::Fail(message) = verdict {
                return Err(FormError::ValidationFailure {
                    field: key.name(),
                    message,
                });
            }
            // Touched verdicts are current; an untouched field that would
            // pass still counts as unfilled.
            require!(
                state.is_pass(),
                FormError::ValidationFailure {
                    field: key.name(),
                    message: FIELD_UNCHECKED.to_string(),
                }
            );
        }
        for (key, step) in &self.steps {
            if step.is_required() && !step.is_satisfied() {
                return Err(FormError::VerificationFailure {
                    step: key.name(),
                    message: step
                        .state()
                        .failure_message()
                        .unwrap_or(VERIFICATION_REQUIRED)
                        .to_string(),
                });
            }
        }
        Ok(())
    }

    fn step_mut(&mut self, step: S) -> Result<&mut AsyncVerificationStep<K>> {
        let context = self.id;
        Ok(require_some!(
            self.steps.get_mut(&step),
            FormError::UnknownStep {
                step: step.name(),
                context,
            }
        ))
    }

    fn snapshot(&self, inputs: FieldSet<K>) -> Vec<(K, FieldValue)> {
        inputs
            .iter()
            .filter_map(|key| self.value(key).map(|value| (key, value.clone())))
            .collect()
    }

    fn revalidate(&mut self, field: K) {
        let Some(state) = self.fields.get(&field) else {
            return;
        };
        let verdict = state.evaluate(&self.fields);
        if let Some(state) = self.fields.get_mut(&field) {
            state.set_verdict(verdict);
        }
    }

    fn recompute_gate(&mut self) {
        let fields_pass = self.required.iter().all(|key| self.field_passes(key));
        let steps_pass = self
            .steps
            .values()
            .filter(|step| step.is_required())
            .all(AsyncVerificationStep::is_satisfied);
        let valid = fields_pass && steps_pass;
        if valid != self.valid {
            debug!(context = self.id, valid, "gate changed");
        }
        self.valid = valid;
    }
}
