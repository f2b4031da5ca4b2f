use crate::core::FormModel;
use crate::state::validation::FieldErrors;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Editing(usize),
    Submitted,
}

/// One wizard session. Treated as a value: every transition produces a new
/// state and leaves the previous one untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", bound = "M: Serialize")]
pub struct WizardState<M: FormModel> {
    pub current_step_index: usize,
    pub total_steps: usize,
    pub form_data: M,
    pub errors: FieldErrors<M::Field>,
    pub submitted: bool,
}

impl<M: FormModel> WizardState<M> {
    pub fn new(total_steps: usize, form_data: M) -> Self {
        Self {
            current_step_index: 0,
            total_steps,
            form_data,
            errors: FieldErrors::new(),
            submitted: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.submitted {
            Phase::Submitted
        } else {
            Phase::Editing(self.current_step_index)
        }
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step_index == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step_index + 1 == self.total_steps
    }

    /// `round(100 * (index + 1) / total)`, half rounding up.
    pub fn progress_percent(&self) -> u8 {
        if self.total_steps == 0 {
            return 0;
        }
        let done = (self.current_step_index + 1).min(self.total_steps);
        let percent = (200 * done + self.total_steps) / (2 * self.total_steps);
        percent as u8
    }

    /// 1-based label as shown above the form, e.g. "Step 2 of 3".
    pub fn step_label(&self) -> String {
        format!("Step {} of {}", self.current_step_index + 1, self.total_steps)
    }
}
