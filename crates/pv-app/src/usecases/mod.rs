//! Business logic use cases

pub mod install_wizard;

pub use install_wizard::{InstallWizardError, InstallWizardOrchestrator, WizardContext};
