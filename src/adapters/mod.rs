mod events;

pub use events::LogWizardEvents;
