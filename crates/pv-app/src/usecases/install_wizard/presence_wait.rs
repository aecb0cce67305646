use std::time::Duration;

use pv_core::ids::ConfigurationHandle;
use pv_core::ports::PresenceSubscription;
use pv_core::wizard::WizardEvent;
use tracing::debug;

/// Wait until `handle` is reported online, bounded by `timeout`.
pub(crate) async fn wait_for_device(
    subscription: &mut PresenceSubscription,
    handle: &ConfigurationHandle,
    timeout: Duration,
) -> WizardEvent {
    let seen = async {
        while let Some(snapshot) = subscription.next().await {
            let online = snapshot.get(handle).copied().unwrap_or(false);
            debug!(handle = %handle, online, devices = snapshot.len(), "presence snapshot");
            if online {
                return true;
            }
        }
        false
    };

    match tokio::time::timeout(timeout, seen).await {
        Ok(true) => WizardEvent::DeviceOnline,
        Ok(false) => WizardEvent::PresenceFailed {
            message: "presence monitor stopped".to_string(),
        },
        Err(_) => WizardEvent::PresenceTimedOut,
    }
}
