pub mod controller;

pub use controller::{Outcome, Wizard};
