use crate::core::{FormModel, Value};
use crate::domain::command::Command;
use crate::domain::effect::Effect;
use crate::error::WizardError;
use crate::state::flow::Flow;
use crate::state::wizard_state::WizardState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection<F> {
    /// The current step failed validation; `first_error` is the first of the
    /// step's fields, in declaration order, that has an error.
    Invalid { first_error: F },
    NotOnLastStep { current: usize, last: usize },
    Submitted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition<M: FormModel> {
    Applied(WizardState<M>),
    Rejected {
        state: WizardState<M>,
        reason: Rejection<M::Field>,
    },
}

impl<M: FormModel> Transition<M> {
    pub fn state(&self) -> &WizardState<M> {
        match self {
            Self::Applied(state) => state,
            Self::Rejected { state, .. } => state,
        }
    }

    pub fn into_state(self) -> WizardState<M> {
        match self {
            Self::Applied(state) => state,
            Self::Rejected { state, .. } => state,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn rejection(&self) -> Option<&Rejection<M::Field>> {
        match self {
            Self::Applied(_) => None,
            Self::Rejected { reason, .. } => Some(reason),
        }
    }

    fn rejected(state: WizardState<M>, reason: Rejection<M::Field>) -> Self {
        Self::Rejected { state, reason }
    }
}

// ── Pure transitions ──────────────────────────────────────────────────────────

/// Writes one field and drops any error recorded for exactly that field.
/// The new value is not re-validated until the next explicit validation.
pub fn update_field<M: FormModel>(
    state: &WizardState<M>,
    field: &M::Field,
    value: Value,
) -> Result<WizardState<M>, WizardError> {
    update_fields(state, [(field.clone(), value)])
}

/// Applies every write or none of them.
pub fn update_fields<M: FormModel>(
    state: &WizardState<M>,
    updates: impl IntoIterator<Item = (M::Field, Value)>,
) -> Result<WizardState<M>, WizardError> {
    if state.submitted {
        return Err(WizardError::Submitted);
    }

    let mut next = state.clone();
    for (field, value) in updates {
        next.form_data.set_field(&field, value)?;
        next.errors.remove(&field);
    }
    Ok(next)
}

/// Replaces `errors` with the current step's validation result. Never moves.
pub fn validate_current_step<M: FormModel>(
    state: &WizardState<M>,
    flow: &Flow<M>,
) -> Result<WizardState<M>, WizardError> {
    flow.check(state)?;
    let step = flow.step(state.current_step_index)?;

    let mut next = state.clone();
    next.errors = step.validate_step(&state.form_data);
    Ok(next)
}

pub fn first_error<M: FormModel>(state: &WizardState<M>, flow: &Flow<M>) -> Option<M::Field> {
    match flow.steps().get(state.current_step_index) {
        Some(step) => state.errors.first_in(step.field_ids()).cloned(),
        None => state.errors.fields().next().cloned(),
    }
}

/// Validates the current step and, when it passes, moves to the next
/// applicable step. When no applicable step follows, it moves to the last
/// index so the wizard can still be submitted; an inapplicable last step
/// validates clean.
pub fn advance<M: FormModel>(
    state: &WizardState<M>,
    flow: &Flow<M>,
) -> Result<Transition<M>, WizardError> {
    flow.check(state)?;
    if state.submitted {
        return Ok(Transition::rejected(state.clone(), Rejection::Submitted));
    }

    let mut next = validate_current_step(state, flow)?;
    if let Some(first_error) = first_error(&next, flow) {
        return Ok(Transition::rejected(next, Rejection::Invalid { first_error }));
    }

    next.current_step_index = flow
        .next_applicable(next.current_step_index, &next.form_data)
        .unwrap_or_else(|| flow.last_index());
    Ok(Transition::Applied(next))
}

/// Moves to the previous applicable step without validating. Errors are
/// left as they are; the next validation replaces them.
pub fn retreat<M: FormModel>(
    state: &WizardState<M>,
    flow: &Flow<M>,
) -> Result<Transition<M>, WizardError> {
    flow.check(state)?;
    if state.submitted {
        return Ok(Transition::rejected(state.clone(), Rejection::Submitted));
    }

    let mut next = state.clone();
    if let Some(index) = flow.prev_applicable(state.current_step_index, &state.form_data) {
        next.current_step_index = index;
    }
    Ok(Transition::Applied(next))
}

/// The validation half of `submit`: on success the returned state is marked
/// submitted, but nothing is handed off.
pub fn finalize<M: FormModel>(
    state: &WizardState<M>,
    flow: &Flow<M>,
) -> Result<Transition<M>, WizardError> {
    flow.check(state)?;
    if state.submitted {
        return Ok(Transition::rejected(state.clone(), Rejection::Submitted));
    }

    let last = flow.last_index();
    if state.current_step_index != last {
        return Ok(Transition::rejected(
            state.clone(),
            Rejection::NotOnLastStep {
                current: state.current_step_index,
                last,
            },
        ));
    }

    let mut next = validate_current_step(state, flow)?;
    if let Some(first_error) = first_error(&next, flow) {
        return Ok(Transition::rejected(next, Rejection::Invalid { first_error }));
    }

    next.submitted = true;
    Ok(Transition::Applied(next))
}

/// Validates the last step and, on success, calls `on_submit` with the
/// collected form exactly once. A second submit is rejected without calling it.
pub fn submit<M: FormModel>(
    state: &WizardState<M>,
    flow: &Flow<M>,
    on_submit: impl FnOnce(&M),
) -> Result<Transition<M>, WizardError> {
    let transition = finalize(state, flow)?;
    if let Transition::Applied(next) = &transition {
        on_submit(&next.form_data);
    }
    Ok(transition)
}

// ── Command-driven reducer ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Reduction<M: FormModel> {
    pub transition: Transition<M>,
    pub effects: Vec<Effect<M>>,
}

pub struct Reducer;

impl Reducer {
    pub fn reduce<M: FormModel>(
        state: &WizardState<M>,
        flow: &Flow<M>,
        command: Command<M>,
    ) -> Result<Reduction<M>, WizardError> {
        let transition = match command {
            Command::UpdateField { field, value } => {
                Transition::Applied(update_field(state, &field, value)?)
            }
            Command::UpdateFields(updates) => Transition::Applied(update_fields(state, updates)?),
            Command::Validate => Transition::Applied(validate_current_step(state, flow)?),
            Command::Advance => advance(state, flow)?,
            Command::Retreat => retreat(state, flow)?,
            Command::Submit => finalize(state, flow)?,
        };

        let effects = Self::effects_for(state, &transition);
        Ok(Reduction {
            transition,
            effects,
        })
    }

    fn effects_for<M: FormModel>(
        before: &WizardState<M>,
        transition: &Transition<M>,
    ) -> Vec<Effect<M>> {
        match transition {
            Transition::Rejected {
                reason: Rejection::Invalid { first_error },
                ..
            } => vec![Effect::FocusField(first_error.clone())],
            Transition::Rejected { .. } => vec![],
            Transition::Applied(after) => {
                let mut effects = Vec::new();
                if after.current_step_index != before.current_step_index {
                    effects.push(Effect::StepChanged {
                        from: before.current_step_index,
                        to: after.current_step_index,
                    });
                }
                if after.submitted && !before.submitted {
                    effects.push(Effect::Submit(after.form_data.clone()));
                }
                effects
            }
        }
    }
}
