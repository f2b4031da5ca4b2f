use crate::core::FormModel;
use crate::error::WizardError;
use crate::state::step::StepDefinition;
use crate::state::wizard_state::WizardState;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Active,
    Done,
    Skipped,
}

/// The ordered steps of one wizard. Construction rejects empty flows and
/// fields claimed by more than one step.
pub struct Flow<M: FormModel> {
    steps: Vec<StepDefinition<M>>,
}

impl<M: FormModel> Flow<M> {
    pub fn new(steps: Vec<StepDefinition<M>>) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::EmptyFlow);
        }

        let mut seen = HashSet::new();
        for field in steps.iter().flat_map(StepDefinition::field_ids) {
            if !seen.insert(field) {
                return Err(WizardError::DuplicateField {
                    field: field.to_string(),
                });
            }
        }

        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn steps(&self) -> &[StepDefinition<M>] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Result<&StepDefinition<M>, WizardError> {
        self.steps.get(index).ok_or(WizardError::UnknownStep {
            index,
            total: self.steps.len(),
        })
    }

    pub fn step_by_id(&self, id: &str) -> Option<(usize, &StepDefinition<M>)> {
        self.steps.iter().enumerate().find(|(_, step)| step.id == id)
    }

    pub fn step_of_field(&self, field: &M::Field) -> Option<usize> {
        self.steps.iter().position(|step| step.owns(field))
    }

    pub fn start(&self, form: M) -> WizardState<M> {
        WizardState::new(self.steps.len(), form)
    }

    /// Nearest applicable step after `from`.
    pub fn next_applicable(&self, from: usize, form: &M) -> Option<usize> {
        (from + 1..self.steps.len()).find(|&index| self.steps[index].is_applicable(form))
    }

    /// Nearest applicable step before `from`.
    pub fn prev_applicable(&self, from: usize, form: &M) -> Option<usize> {
        (0..from.min(self.steps.len()))
            .rev()
            .find(|&index| self.steps[index].is_applicable(form))
    }

    pub(crate) fn check(&self, state: &WizardState<M>) -> Result<(), WizardError> {
        if state.total_steps != self.steps.len() {
            return Err(WizardError::FlowMismatch {
                state: state.total_steps,
                flow: self.steps.len(),
            });
        }
        Ok(())
    }

    pub fn status_at(&self, state: &WizardState<M>, index: usize) -> StepStatus {
        let Some(step) = self.steps.get(index) else {
            return StepStatus::Pending;
        };
        if state.submitted {
            return if step.is_applicable(&state.form_data) {
                StepStatus::Done
            } else {
                StepStatus::Skipped
            };
        }
        if index == state.current_step_index {
            return StepStatus::Active;
        }
        if !step.is_applicable(&state.form_data) {
            return StepStatus::Skipped;
        }
        if index < state.current_step_index {
            StepStatus::Done
        } else {
            StepStatus::Pending
        }
    }

    pub fn statuses(&self, state: &WizardState<M>) -> Vec<StepStatus> {
        (0..self.steps.len())
            .map(|index| self.status_at(state, index))
            .collect()
    }
}
