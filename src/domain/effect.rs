use crate::core::FormModel;

/// Work the host performs after a transition; the reducer only reports it.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<M: FormModel> {
    /// Hand the completed form to the caller's transport.
    Submit(M),
    /// Bring the first errored field into view.
    FocusField(M::Field),
    /// The visible step changed; hosts typically scroll to the top.
    StepChanged { from: usize, to: usize },
}
