pub mod command;
pub mod effect;
pub mod reducer;

pub use command::Command;
pub use effect::Effect;
pub use reducer::{Reducer, Reduction, Rejection, Transition};
