use crate::core::{FormModel, Value};
use crate::domain::reducer::{self, Reducer, Rejection, Transition};
use crate::domain::{Command, Effect};
use crate::error::WizardError;
use crate::state::flow::{Flow, StepStatus};
use crate::state::step::StepDefinition;
use crate::state::validation::FieldErrors;
use crate::state::wizard_state::{Phase, WizardState};
use std::collections::VecDeque;
use tracing::{debug, info};

const HISTORY_LIMIT: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<F> {
    Moved { from: usize, to: usize },
    Stayed,
    Submitted,
    Rejected(Rejection<F>),
}

impl<F> Outcome<F> {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Owns one flow and the live state of one session. Every operation goes
/// through the pure reducer; the controller only commits the result.
pub struct Wizard<M: FormModel> {
    flow: Flow<M>,
    state: WizardState<M>,
    history: VecDeque<WizardState<M>>,
}

impl<M: FormModel + Default> Wizard<M> {
    pub fn new(flow: Flow<M>) -> Self {
        Self::with_form(flow, M::default())
    }
}

impl<M: FormModel> Wizard<M> {
    pub fn with_form(flow: Flow<M>, form: M) -> Self {
        let state = flow.start(form);
        Self {
            flow,
            state,
            history: VecDeque::new(),
        }
    }

    pub fn flow(&self) -> &Flow<M> {
        &self.flow
    }

    pub fn state(&self) -> &WizardState<M> {
        &self.state
    }

    pub fn form(&self) -> &M {
        &self.state.form_data
    }

    pub fn errors(&self) -> &FieldErrors<M::Field> {
        &self.state.errors
    }

    pub fn error(&self, field: &M::Field) -> Option<&str> {
        self.state.errors.get(field)
    }

    pub fn first_error(&self) -> Option<M::Field> {
        reducer::first_error(&self.state, &self.flow)
    }

    pub fn current_step(&self) -> &StepDefinition<M> {
        &self.flow.steps()[self.state.current_step_index]
    }

    pub fn current_step_index(&self) -> usize {
        self.state.current_step_index
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_submitted(&self) -> bool {
        self.state.submitted
    }

    pub fn is_first_step(&self) -> bool {
        self.state.is_first_step()
    }

    pub fn is_last_step(&self) -> bool {
        self.state.is_last_step()
    }

    pub fn progress_percent(&self) -> u8 {
        self.state.progress_percent()
    }

    pub fn step_label(&self) -> String {
        self.state.step_label()
    }

    pub fn step_statuses(&self) -> Vec<StepStatus> {
        self.flow.statuses(&self.state)
    }

    pub fn update_field(
        &mut self,
        field: &M::Field,
        value: impl Into<Value>,
    ) -> Result<(), WizardError> {
        let next = reducer::update_field(&self.state, field, value.into())?;
        self.commit(next);
        Ok(())
    }

    pub fn update_fields(
        &mut self,
        updates: impl IntoIterator<Item = (M::Field, Value)>,
    ) -> Result<(), WizardError> {
        let next = reducer::update_fields(&self.state, updates)?;
        self.commit(next);
        Ok(())
    }

    /// Re-validates the current step in place and returns the fresh errors.
    pub fn validate(&mut self) -> Result<&FieldErrors<M::Field>, WizardError> {
        self.state = reducer::validate_current_step(&self.state, &self.flow)?;
        Ok(&self.state.errors)
    }

    pub fn advance(&mut self) -> Result<Outcome<M::Field>, WizardError> {
        let transition = reducer::advance(&self.state, &self.flow)?;
        Ok(self.apply(transition))
    }

    pub fn retreat(&mut self) -> Result<Outcome<M::Field>, WizardError> {
        let transition = reducer::retreat(&self.state, &self.flow)?;
        Ok(self.apply(transition))
    }

    /// Calls `on_submit` once with the completed form when the last step is
    /// valid. Later calls are rejected and never reach `on_submit`.
    pub fn submit(&mut self, on_submit: impl FnOnce(&M)) -> Result<Outcome<M::Field>, WizardError> {
        let transition = reducer::submit(&self.state, &self.flow, on_submit)?;
        Ok(self.apply(transition))
    }

    /// Command-style entry point. Effects, including the submitted form, are
    /// returned for the host to act on.
    pub fn dispatch(&mut self, command: Command<M>) -> Result<Vec<Effect<M>>, WizardError> {
        let reduction = Reducer::reduce(&self.state, &self.flow, command)?;
        self.apply(reduction.transition);
        Ok(reduction.effects)
    }

    /// Restores the state before the last applied edit or move. Not available
    /// once the wizard is submitted.
    pub fn undo(&mut self) -> bool {
        if self.state.submitted {
            return false;
        }
        match self.history.pop_back() {
            Some(previous) => {
                debug!(step = previous.current_step_index, "undo");
                self.state = previous;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.state.submitted && !self.history.is_empty()
    }

    pub fn into_state(self) -> WizardState<M> {
        self.state
    }

    fn apply(&mut self, transition: Transition<M>) -> Outcome<M::Field> {
        let from = self.state.current_step_index;
        match transition {
            Transition::Applied(next) => {
                let outcome = if next.submitted && !self.state.submitted {
                    info!(steps = next.total_steps, "wizard submitted");
                    Outcome::Submitted
                } else if next.current_step_index != from {
                    debug!(from, to = next.current_step_index, "step changed");
                    Outcome::Moved {
                        from,
                        to: next.current_step_index,
                    }
                } else {
                    Outcome::Stayed
                };
                self.commit(next);
                outcome
            }
            Transition::Rejected { state, reason } => {
                match &reason {
                    Rejection::Invalid { first_error } => debug!(
                        step = from,
                        errors = state.errors.len(),
                        first_error = %first_error,
                        "step rejected"
                    ),
                    other => debug!(step = from, reason = ?other, "transition rejected"),
                }
                self.state = state;
                Outcome::Rejected(reason)
            }
        }
    }

    fn commit(&mut self, next: WizardState<M>) {
        let previous = std::mem::replace(&mut self.state, next);
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(previous);
    }
}
