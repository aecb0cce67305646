mod context;
mod orchestrator;
mod presence_wait;

pub use context::WizardContext;
pub use orchestrator::{InstallWizardError, InstallWizardOrchestrator};
