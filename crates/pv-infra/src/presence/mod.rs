mod polling;

pub use polling::PollingPresenceMonitor;
