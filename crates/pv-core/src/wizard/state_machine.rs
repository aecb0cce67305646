//! Install wizard state machine / 安装向导状态机
//!
//! Defines a pure state transition function for the device installation
//! flow. Side effects are returned as [`WizardAction`]s; their results come
//! back in as further [`WizardEvent`]s.
//! 定义纯状态转换函数；副作用以动作返回，其结果作为后续事件回传。

use crate::device::ChipFamily;
use crate::wizard::{
    Field, TransferProgress, WizardAction, WizardError, WizardEvent, WizardSession, WizardState,
};

/// Pure install wizard state machine: no side effects.
/// 纯安装向导状态机：无副作用。
pub struct WizardStateMachine;

impl WizardStateMachine {
    pub fn transition(
        mut session: WizardSession,
        event: WizardEvent,
    ) -> (WizardSession, Vec<WizardAction>) {
        match (session.state, event) {
            (WizardState::Done, WizardEvent::Cancel) => (session, Vec::new()),
            (_, WizardEvent::Cancel) => Self::abort(session),
            (_, WizardEvent::ApiKeyFetched { api_key }) if session.configuration_handle.is_some() => {
                session.api_key = api_key;
                (session, Vec::new())
            }

            (WizardState::AskTransportCapability, WizardEvent::AcknowledgeCapability) => {
                session.enter(WizardState::BasicConfig);
                (session, Vec::new())
            }

            (
                WizardState::BasicConfig,
                WizardEvent::SubmitBasicConfig {
                    name,
                    wifi_ssid,
                    stored_secret,
                },
            ) => {
                let name = name.trim().to_string();
                if let Err(error) = validate_device_name(&name) {
                    session.fail(WizardState::BasicConfig, error);
                    return (session, Vec::new());
                }
                let ssid = wifi_ssid.trim().to_string();
                if ssid.is_empty() && !stored_secret {
                    session.fail(
                        WizardState::BasicConfig,
                        WizardError::validation(Field::WifiSsid, "Wi-Fi network name is required"),
                    );
                    return (session, Vec::new());
                }

                let new_ssid = (!ssid.is_empty()).then(|| ssid.clone());
                session.edit_config(|c| {
                    c.name = name;
                    c.wifi_ssid = new_ssid;
                });

                if ssid.is_empty() {
                    Self::leave_basic_config(session)
                } else {
                    // Stay until the secret store confirms the write.
                    session.enter(WizardState::BasicConfig);
                    (session, vec![WizardAction::PersistWifiSecret { ssid }])
                }
            }
            (WizardState::BasicConfig, WizardEvent::WifiSecretPersisted) => {
                Self::leave_basic_config(session)
            }
            (WizardState::BasicConfig, WizardEvent::WifiSecretFailed { message }) => {
                session.fail(WizardState::BasicConfig, WizardError::storage(&message));
                (session, Vec::new())
            }

            (
                WizardState::PickPlatform,
                WizardEvent::SelectPlatform {
                    platform,
                    use_recommended,
                },
            ) => {
                session.edit_config(|c| {
                    c.platform = Some(platform);
                    c.board_id = None;
                });
                match platform.default_board() {
                    Some(board) if use_recommended => {
                        session.edit_config(|c| c.board_id = Some(board.to_string()));
                        Self::finish_board_selection(session)
                    }
                    _ => {
                        session.enter(WizardState::PickBoard);
                        (session, Vec::new())
                    }
                }
            }
            (WizardState::PickPlatform, WizardEvent::Back) => {
                session.enter(WizardState::BasicConfig);
                (session, Vec::new())
            }
            (WizardState::PickBoard, WizardEvent::SelectBoard { board_id }) => {
                let board_id = board_id.trim().to_string();
                if board_id.is_empty() {
                    session.fail(
                        WizardState::PickBoard,
                        WizardError::validation(Field::Board, "Select a board"),
                    );
                    return (session, Vec::new());
                }
                session.edit_config(|c| c.board_id = Some(board_id));
                Self::finish_board_selection(session)
            }
            (WizardState::PickBoard, WizardEvent::Back) => {
                session.enter(WizardState::PickPlatform);
                (session, Vec::new())
            }

            (WizardState::ConnectTransport, WizardEvent::Back) => {
                session.enter(WizardState::BasicConfig);
                (session, Vec::new())
            }
            (WizardState::ConnectTransport, WizardEvent::RequestTransport) => {
                session.enter(WizardState::ConnectTransport);
                (session, vec![WizardAction::AcquireTransport])
            }
            (WizardState::ConnectTransport, WizardEvent::TransportAcquired) => {
                session.enter(WizardState::Connecting);
                (session, vec![WizardAction::IdentifyChip])
            }
            (WizardState::ConnectTransport, WizardEvent::TransportNotFound) => {
                session.enter(WizardState::ConnectTransport);
                (session, vec![WizardAction::ShowCapabilityFallback])
            }
            (WizardState::ConnectTransport, WizardEvent::TransportFailed { message }) => {
                session.fail(
                    WizardState::ConnectTransport,
                    WizardError::transport(&message),
                );
                (session, Vec::new())
            }

            (WizardState::Connecting, WizardEvent::HandshakeFailed { message }) => {
                session.fail(
                    WizardState::ConnectTransport,
                    WizardError::handshake(&message),
                );
                (session, vec![WizardAction::CloseTransport])
            }
            (WizardState::Connecting, WizardEvent::ChipIdentified { chip }) => {
                Self::prepare_for_chip(session, &chip)
            }

            (WizardState::Preparing, WizardEvent::ConfigurationCreated { handle }) => {
                if session.configuration_handle.is_some() {
                    return (session, Vec::new());
                }
                session.configuration_handle = Some(handle.clone());
                session.config_locked = true;

                if session.transport_capable {
                    session.enter(WizardState::Preparing);
                    (
                        session,
                        vec![
                            WizardAction::FetchApiKey {
                                handle: handle.clone(),
                            },
                            WizardAction::CompileConfiguration { handle },
                        ],
                    )
                } else {
                    // Offline install: the user flashes the downloaded binary later.
                    session.enter(WizardState::Done);
                    (session, vec![WizardAction::FetchApiKey { handle }])
                }
            }
            (WizardState::Preparing, WizardEvent::ConfigurationCompiled { images }) => {
                session.enter(WizardState::Flashing);
                session.transfer_progress = Some(TransferProgress::Percent(0));
                let erase = session.options.erase_before_flash;
                (session, vec![WizardAction::TransferFirmware { images, erase }])
            }
            (WizardState::Preparing, WizardEvent::PreparationFailed { error }) => {
                let rollback = if session.transport_capable {
                    WizardState::ConnectTransport
                } else {
                    WizardState::PickPlatform
                };
                let mut actions = Self::release_configuration(&mut session);
                if session.transport_capable {
                    actions.push(WizardAction::CloseTransport);
                }
                session.fail(rollback, error);
                (session, actions)
            }

            (WizardState::Flashing, WizardEvent::TransferProgressed { progress }) => {
                session.transfer_progress = Some(progress);
                (session, Vec::new())
            }
            (WizardState::Flashing, WizardEvent::TransferCompleted) => {
                session.flashed = true;
                session.enter(WizardState::WaitingNetwork);
                let mut actions = vec![WizardAction::HardReset];
                if let Some(handle) = session.configuration_handle.clone() {
                    actions.push(WizardAction::AwaitPresence { handle });
                }
                (session, actions)
            }
            (WizardState::Flashing, WizardEvent::TransferFailed { message }) => {
                let mut actions = Self::release_configuration(&mut session);
                actions.push(WizardAction::CloseTransport);
                session.fail(
                    WizardState::ConnectTransport,
                    WizardError::transfer(&message),
                );
                (session, actions)
            }

            (WizardState::WaitingNetwork, WizardEvent::DeviceOnline) => {
                session.enter(WizardState::Done);
                (session, vec![WizardAction::CloseTransport])
            }
            (WizardState::WaitingNetwork, WizardEvent::PresenceTimedOut) => {
                session.fail(WizardState::Done, WizardError::not_detected_online());
                (session, vec![WizardAction::CloseTransport])
            }
            (WizardState::WaitingNetwork, WizardEvent::PresenceFailed { message }) => {
                session.fail(
                    WizardState::Done,
                    WizardError::not_detected_online().with_details(message),
                );
                (session, vec![WizardAction::CloseTransport])
            }

            (_state, _event) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(state = ?_state, event = _event.name(), "wizard event ignored");
                (session, Vec::new())
            }
        }
    }

    fn leave_basic_config(mut session: WizardSession) -> (WizardSession, Vec<WizardAction>) {
        let next = if session.transport_capable {
            WizardState::ConnectTransport
        } else {
            WizardState::PickPlatform
        };
        session.enter(next);
        (session, Vec::new())
    }

    fn finish_board_selection(mut session: WizardSession) -> (WizardSession, Vec<WizardAction>) {
        if session.transport_capable {
            session.enter(WizardState::ConnectTransport);
            return (session, Vec::new());
        }
        session.enter(WizardState::Preparing);
        let config = session.device_config.clone();
        (session, vec![WizardAction::CreateConfiguration { config }])
    }

    fn prepare_for_chip(
        mut session: WizardSession,
        chip: &str,
    ) -> (WizardSession, Vec<WizardAction>) {
        let Some(family) = ChipFamily::from_chip_name(chip) else {
            session.fail(
                WizardState::ConnectTransport,
                WizardError::unknown_chip(chip),
            );
            return (session, vec![WizardAction::CloseTransport]);
        };

        let platform = family.platform();
        session.edit_config(|c| {
            if c.platform != Some(platform) {
                c.platform = Some(platform);
                c.board_id = None;
            }
            if c.board_id.is_none() {
                c.board_id = platform.default_board().map(str::to_string);
            }
        });

        if session.device_config.board_id.is_none() {
            session.fail(
                WizardState::ConnectTransport,
                WizardError::configuration(&format!("no board known for platform {platform}")),
            );
            return (session, vec![WizardAction::CloseTransport]);
        }

        session.enter(WizardState::Preparing);
        let config = session.device_config.clone();
        (session, vec![WizardAction::CreateConfiguration { config }])
    }

    /// Drop the handle and unlock the config; returns the delete action if an
    /// artifact exists.
    fn release_configuration(session: &mut WizardSession) -> Vec<WizardAction> {
        session.config_locked = false;
        session.api_key = None;
        session
            .configuration_handle
            .take()
            .map(|handle| WizardAction::DeleteConfiguration { handle })
            .into_iter()
            .collect()
    }

    fn abort(mut session: WizardSession) -> (WizardSession, Vec<WizardAction>) {
        let mut actions = vec![WizardAction::CancelPresence, WizardAction::CloseTransport];
        // A flashed device runs this configuration; keep it.
        if !session.flashed {
            actions.extend(Self::release_configuration(&mut session));
        }
        session.enter(WizardState::Done);
        session.cancelled = true;
        (session, actions)
    }
}

fn validate_device_name(name: &str) -> Result<(), WizardError> {
    if name.is_empty() {
        return Err(WizardError::validation(Field::Name, "Name is required"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '))
    {
        return Err(WizardError::validation(
            Field::Name,
            "Name may only contain letters, numbers, spaces, '-' and '_'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::WizardStateMachine;
    use crate::device::{FirmwareImage, Platform};
    use crate::ids::ConfigurationHandle;
    use crate::wizard::{
        Field, TransferProgress, WizardAction, WizardErrorKind, WizardEvent, WizardOptions,
        WizardSession, WizardState,
    };

    fn session_in(state: WizardState, capable: bool) -> WizardSession {
        let mut session = WizardSession::new(capable, WizardOptions::default());
        session.state = state;
        session
    }

    fn submit(name: &str, ssid: &str, stored_secret: bool) -> WizardEvent {
        WizardEvent::SubmitBasicConfig {
            name: name.to_string(),
            wifi_ssid: ssid.to_string(),
            stored_secret,
        }
    }

    #[test]
    fn wizard_state_machine_acknowledge_capability_moves_to_basic_config() {
        let session = WizardSession::new(false, WizardOptions::default());
        let (next, actions) =
            WizardStateMachine::transition(session, WizardEvent::AcknowledgeCapability);
        assert_eq!(next.state, WizardState::BasicConfig);
        assert!(actions.is_empty());
    }

    #[test]
    fn wizard_state_machine_blank_name_refocuses_name_field() {
        let session = session_in(WizardState::BasicConfig, true);
        let (next, actions) = WizardStateMachine::transition(session, submit("  ", "HomeNet", false));
        assert_eq!(next.state, WizardState::BasicConfig);
        assert_eq!(
            next.error.map(|e| e.kind),
            Some(WizardErrorKind::Validation(Field::Name))
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn wizard_state_machine_missing_ssid_without_stored_secret_never_leaves_basic_config() {
        for capable in [true, false] {
            let session = session_in(WizardState::BasicConfig, capable);
            let (next, actions) =
                WizardStateMachine::transition(session, submit("kitchen", "", false));
            assert_eq!(next.state, WizardState::BasicConfig);
            assert_eq!(
                next.error.map(|e| e.kind),
                Some(WizardErrorKind::Validation(Field::WifiSsid))
            );
            assert!(actions.is_empty());
        }
    }

    #[test]
    fn wizard_state_machine_stored_secret_makes_ssid_optional() {
        let session = session_in(WizardState::BasicConfig, false);
        let (next, actions) = WizardStateMachine::transition(session, submit("kitchen", "", true));
        assert_eq!(next.state, WizardState::PickPlatform);
        assert_eq!(next.device_config.name, "kitchen");
        assert!(actions.is_empty());
    }

    #[test]
    fn wizard_state_machine_new_ssid_is_persisted_before_leaving_basic_config() {
        let session = session_in(WizardState::BasicConfig, true);
        let (next, actions) =
            WizardStateMachine::transition(session, submit("kitchen", "HomeNet", false));
        assert_eq!(next.state, WizardState::BasicConfig);
        assert_eq!(
            actions,
            vec![WizardAction::PersistWifiSecret {
                ssid: "HomeNet".to_string()
            }]
        );

        let (next, _) = WizardStateMachine::transition(next, WizardEvent::WifiSecretPersisted);
        assert_eq!(next.state, WizardState::ConnectTransport);
        assert_eq!(next.device_config.wifi_ssid.as_deref(), Some("HomeNet"));
    }

    #[test]
    fn wizard_state_machine_recommended_settings_skip_board_selection() {
        let session = session_in(WizardState::PickPlatform, true);
        let (next, _) = WizardStateMachine::transition(
            session,
            WizardEvent::SelectPlatform {
                platform: Platform::Esp32,
                use_recommended: true,
            },
        );
        assert_eq!(next.state, WizardState::ConnectTransport);
        assert_eq!(next.device_config.board_id.as_deref(), Some("esp32dev"));
    }

    #[test]
    fn wizard_state_machine_empty_board_is_rejected() {
        let session = session_in(WizardState::PickBoard, true);
        let (next, _) = WizardStateMachine::transition(
            session,
            WizardEvent::SelectBoard {
                board_id: String::new(),
            },
        );
        assert_eq!(next.state, WizardState::PickBoard);
        assert_eq!(
            next.error.map(|e| e.kind),
            Some(WizardErrorKind::Validation(Field::Board))
        );
    }

    #[test]
    fn wizard_state_machine_offline_board_selection_creates_configuration() {
        let mut session = session_in(WizardState::PickBoard, false);
        session.device_config.name = "kitchen".to_string();
        session.device_config.platform = Some(Platform::Esp8266);
        let (next, actions) = WizardStateMachine::transition(
            session,
            WizardEvent::SelectBoard {
                board_id: "nodemcuv2".to_string(),
            },
        );
        assert_eq!(next.state, WizardState::Preparing);
        assert!(matches!(
            actions.as_slice(),
            [WizardAction::CreateConfiguration { config }] if config.board_id.as_deref() == Some("nodemcuv2")
        ));

        let (done, actions) = WizardStateMachine::transition(
            next,
            WizardEvent::ConfigurationCreated {
                handle: ConfigurationHandle::from("kitchen"),
            },
        );
        assert_eq!(done.state, WizardState::Done);
        assert!(done.error.is_none());
        assert!(done.succeeded());
        assert_eq!(
            actions,
            vec![WizardAction::FetchApiKey {
                handle: ConfigurationHandle::from("kitchen")
            }]
        );
    }

    #[test]
    fn wizard_state_machine_transport_not_found_keeps_state_without_error() {
        let session = session_in(WizardState::ConnectTransport, true);
        let (next, actions) =
            WizardStateMachine::transition(session, WizardEvent::TransportNotFound);
        assert_eq!(next.state, WizardState::ConnectTransport);
        assert!(next.error.is_none());
        assert_eq!(actions, vec![WizardAction::ShowCapabilityFallback]);
    }

    #[test]
    fn wizard_state_machine_unknown_chip_returns_to_connect_transport() {
        let session = session_in(WizardState::Connecting, true);
        let (next, actions) = WizardStateMachine::transition(
            session,
            WizardEvent::ChipIdentified {
                chip: "ESP99".to_string(),
            },
        );
        assert_eq!(next.state, WizardState::ConnectTransport);
        let error = next.error.expect("error set");
        assert_eq!(error.kind, WizardErrorKind::UnknownChip);
        assert!(error
            .message
            .contains("Unable to identify the connected device"));
        assert_eq!(actions, vec![WizardAction::CloseTransport]);
    }

    #[test]
    fn wizard_state_machine_handshake_failure_closes_transport() {
        let session = session_in(WizardState::Connecting, true);
        let (next, actions) = WizardStateMachine::transition(
            session,
            WizardEvent::HandshakeFailed {
                message: "no serial data received".to_string(),
            },
        );
        assert_eq!(next.state, WizardState::ConnectTransport);
        let error = next.error.expect("error set");
        assert_eq!(error.kind, WizardErrorKind::Handshake);
        assert!(error.message.contains("resetting your device"));
        assert!(error.message.contains("BOOT"));
        assert_eq!(error.details.as_deref(), Some("no serial data received"));
        assert!(next.configuration_handle.is_none());
        assert_eq!(actions, vec![WizardAction::CloseTransport]);
    }

    #[test]
    fn wizard_state_machine_chip_overrides_mismatched_platform_board() {
        let mut session = session_in(WizardState::Connecting, true);
        session.device_config.platform = Some(Platform::Esp8266);
        session.device_config.board_id = Some("nodemcuv2".to_string());
        let (next, _) = WizardStateMachine::transition(
            session,
            WizardEvent::ChipIdentified {
                chip: "ESP32-S3".to_string(),
            },
        );
        assert_eq!(next.state, WizardState::Preparing);
        assert_eq!(next.device_config.platform, Some(Platform::Esp32S3));
        assert_eq!(
            next.device_config.board_id.as_deref(),
            Some("esp32-s3-devkitc-1")
        );
    }

    #[test]
    fn wizard_state_machine_handle_is_never_reassigned() {
        let session = session_in(WizardState::Preparing, true);
        let (next, _) = WizardStateMachine::transition(
            session,
            WizardEvent::ConfigurationCreated {
                handle: ConfigurationHandle::from("kitchen"),
            },
        );
        let (next, actions) = WizardStateMachine::transition(
            next,
            WizardEvent::ConfigurationCreated {
                handle: ConfigurationHandle::from("other"),
            },
        );
        assert_eq!(
            next.configuration_handle,
            Some(ConfigurationHandle::from("kitchen"))
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn wizard_state_machine_compile_failure_releases_configuration() {
        let mut session = session_in(WizardState::Preparing, true);
        session.configuration_handle = Some(ConfigurationHandle::from("kitchen"));
        session.config_locked = true;
        let (next, actions) = WizardStateMachine::transition(
            session,
            WizardEvent::PreparationFailed {
                error: crate::wizard::WizardError::build("see compile logs"),
            },
        );
        assert_eq!(next.state, WizardState::ConnectTransport);
        assert!(next.configuration_handle.is_none());
        assert!(!next.config_locked);
        assert_eq!(
            actions,
            vec![
                WizardAction::DeleteConfiguration {
                    handle: ConfigurationHandle::from("kitchen")
                },
                WizardAction::CloseTransport,
            ]
        );
    }

    #[test]
    fn wizard_state_machine_progress_only_exists_while_flashing() {
        let mut session = session_in(WizardState::Preparing, true);
        session.configuration_handle = Some(ConfigurationHandle::from("kitchen"));
        let (flashing, actions) = WizardStateMachine::transition(
            session,
            WizardEvent::ConfigurationCompiled {
                images: vec![FirmwareImage::new(0, vec![1, 2, 3])],
            },
        );
        assert_eq!(flashing.transfer_progress, Some(TransferProgress::Percent(0)));
        assert!(matches!(
            actions.as_slice(),
            [WizardAction::TransferFirmware { erase: true, .. }]
        ));

        let (flashing, _) = WizardStateMachine::transition(
            flashing,
            WizardEvent::TransferProgressed {
                progress: TransferProgress::Percent(42),
            },
        );
        assert_eq!(flashing.transfer_progress, Some(TransferProgress::Percent(42)));

        let (waiting, actions) =
            WizardStateMachine::transition(flashing, WizardEvent::TransferCompleted);
        assert_eq!(waiting.state, WizardState::WaitingNetwork);
        assert!(waiting.transfer_progress.is_none());
        assert!(waiting.flashed);
        assert_eq!(
            actions,
            vec![
                WizardAction::HardReset,
                WizardAction::AwaitPresence {
                    handle: ConfigurationHandle::from("kitchen")
                },
            ]
        );

        // Late progress after the transfer finished is dropped.
        let (waiting, _) = WizardStateMachine::transition(
            waiting,
            WizardEvent::TransferProgressed {
                progress: TransferProgress::Percent(99),
            },
        );
        assert!(waiting.transfer_progress.is_none());
    }

    #[test]
    fn wizard_state_machine_presence_timeout_is_a_soft_warning() {
        let mut session = session_in(WizardState::WaitingNetwork, true);
        session.configuration_handle = Some(ConfigurationHandle::from("kitchen"));
        session.flashed = true;
        let (next, actions) =
            WizardStateMachine::transition(session, WizardEvent::PresenceTimedOut);
        assert_eq!(next.state, WizardState::Done);
        assert_eq!(next.error.as_ref().map(|e| e.kind), Some(WizardErrorKind::Timeout));
        assert!(next.succeeded());
        assert_eq!(actions, vec![WizardAction::CloseTransport]);
    }

    #[test]
    fn wizard_state_machine_cancel_during_flashing_deletes_configuration() {
        let mut session = session_in(WizardState::Flashing, true);
        session.configuration_handle = Some(ConfigurationHandle::from("kitchen"));
        let (next, actions) = WizardStateMachine::transition(session, WizardEvent::Cancel);
        assert_eq!(next.state, WizardState::Done);
        assert!(next.cancelled);
        assert!(next.error.is_none());
        assert!(actions.contains(&WizardAction::DeleteConfiguration {
            handle: ConfigurationHandle::from("kitchen")
        }));
    }

    #[test]
    fn wizard_state_machine_cancel_after_flashing_keeps_configuration() {
        let mut session = session_in(WizardState::WaitingNetwork, true);
        session.configuration_handle = Some(ConfigurationHandle::from("kitchen"));
        session.flashed = true;
        let (next, actions) = WizardStateMachine::transition(session, WizardEvent::Cancel);
        assert_eq!(next.state, WizardState::Done);
        assert_eq!(
            actions,
            vec![WizardAction::CancelPresence, WizardAction::CloseTransport]
        );
        assert!(next.configuration_handle.is_some());
    }

    #[test]
    fn wizard_state_machine_unexpected_event_is_ignored() {
        let session = session_in(WizardState::BasicConfig, true);
        let before = session.clone();
        let (next, actions) = WizardStateMachine::transition(session, WizardEvent::TransferCompleted);
        assert_eq!(next, before);
        assert!(actions.is_empty());
    }
}
