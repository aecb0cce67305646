//! Install wizard domain module.
//!
//! This module defines the device installation wizard: its session data,
//! the closed set of states, events and actions, and the pure transition
//! function that ties them together.

mod action;
mod error;
mod event;
mod progress;
mod session;
mod state;
pub mod state_machine;

pub use action::WizardAction;
pub use error::{Field, WizardError, WizardErrorKind};
pub use event::WizardEvent;
pub use progress::TransferProgress;
pub use session::{WizardOptions, WizardSession};
pub use state::WizardState;
pub use state_machine::WizardStateMachine;
