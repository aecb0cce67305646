//! Drives the pure state machine through complete install flows, answering
//! every action the way a healthy collaborator would.

use pv_core::device::{FirmwareImage, Platform};
use pv_core::ids::ConfigurationHandle;
use pv_core::wizard::{
    TransferProgress, WizardAction, WizardEvent, WizardOptions, WizardSession, WizardState,
    WizardStateMachine,
};

/// Feed `event`, then keep answering actions with successful results until
/// the machine stops producing follow-ups.
fn run(session: WizardSession, event: WizardEvent, log: &mut Vec<WizardAction>) -> WizardSession {
    let mut pending = std::collections::VecDeque::from([event]);
    let mut session = session;
    while let Some(event) = pending.pop_front() {
        let (next, actions) = WizardStateMachine::transition(session, event);
        session = next;
        for action in actions {
            if let Some(follow_up) = answer(&action) {
                pending.push_back(follow_up);
            }
            log.push(action);
        }
    }
    session
}

fn answer(action: &WizardAction) -> Option<WizardEvent> {
    match action {
        WizardAction::PersistWifiSecret { .. } => Some(WizardEvent::WifiSecretPersisted),
        WizardAction::AcquireTransport => Some(WizardEvent::TransportAcquired),
        WizardAction::IdentifyChip => Some(WizardEvent::ChipIdentified {
            chip: "ESP32".to_string(),
        }),
        WizardAction::CreateConfiguration { config } => Some(WizardEvent::ConfigurationCreated {
            handle: ConfigurationHandle::from(config.name.as_str()),
        }),
        WizardAction::FetchApiKey { .. } => Some(WizardEvent::ApiKeyFetched {
            api_key: Some("c2VjcmV0LWtleQ==".to_string()),
        }),
        WizardAction::CompileConfiguration { .. } => Some(WizardEvent::ConfigurationCompiled {
            images: vec![FirmwareImage::new(0x1000, vec![0xAA; 64])],
        }),
        WizardAction::TransferFirmware { .. } => Some(WizardEvent::TransferCompleted),
        WizardAction::AwaitPresence { .. } => Some(WizardEvent::DeviceOnline),
        _ => None,
    }
}

#[test]
fn serial_install_reaches_done_without_error() {
    let mut log = Vec::new();
    let session = WizardSession::new(true, WizardOptions::default());

    let session = run(
        session,
        WizardEvent::SubmitBasicConfig {
            name: "kitchen".to_string(),
            wifi_ssid: "HomeNet".to_string(),
            stored_secret: false,
        },
        &mut log,
    );
    assert_eq!(session.state, WizardState::ConnectTransport);

    let session = run(session, WizardEvent::RequestTransport, &mut log);

    assert_eq!(session.state, WizardState::Done);
    assert!(session.error.is_none());
    assert!(session.succeeded());
    assert_eq!(
        session.configuration_handle,
        Some(ConfigurationHandle::from("kitchen"))
    );
    assert_eq!(session.device_config.platform, Some(Platform::Esp32));
    assert_eq!(session.device_config.board_id.as_deref(), Some("esp32dev"));
    assert_eq!(session.api_key.as_deref(), Some("c2VjcmV0LWtleQ=="));
    assert!(log.contains(&WizardAction::HardReset));
    assert!(!log
        .iter()
        .any(|a| matches!(a, WizardAction::DeleteConfiguration { .. })));
}

#[test]
fn offline_install_creates_configuration_only() {
    let mut log = Vec::new();
    let session = WizardSession::new(false, WizardOptions::default());
    let session = run(session, WizardEvent::AcknowledgeCapability, &mut log);
    let session = run(
        session,
        WizardEvent::SubmitBasicConfig {
            name: "garage".to_string(),
            wifi_ssid: String::new(),
            stored_secret: true,
        },
        &mut log,
    );
    assert_eq!(session.state, WizardState::PickPlatform);

    let session = run(
        session,
        WizardEvent::SelectPlatform {
            platform: Platform::Rp2040,
            use_recommended: true,
        },
        &mut log,
    );

    assert_eq!(session.state, WizardState::Done);
    assert!(session.succeeded());
    assert!(!session.flashed);
    assert!(!log.iter().any(|a| matches!(
        a,
        WizardAction::AcquireTransport | WizardAction::TransferFirmware { .. }
    )));
}

#[test]
fn progress_is_cleared_once_flashing_ends() {
    let mut session = WizardSession::new(true, WizardOptions::default());
    session.state = WizardState::Flashing;
    session.configuration_handle = Some(ConfigurationHandle::from("kitchen"));
    session.transfer_progress = Some(TransferProgress::Percent(0));

    for pct in [10, 55, 100] {
        let (next, _) = WizardStateMachine::transition(
            session,
            WizardEvent::TransferProgressed {
                progress: TransferProgress::Percent(pct),
            },
        );
        session = next;
        assert_eq!(session.transfer_progress, Some(TransferProgress::Percent(pct)));
    }

    let (session, _) = WizardStateMachine::transition(session, WizardEvent::TransferCompleted);
    assert_eq!(session.transfer_progress, None);
}
