//! Install wizard orchestrator / 安装向导编排器
//!
//! This module coordinates the wizard state machine and the collaborators
//! that carry out its actions.
//! 此模块协调向导状态机与执行其动作的协作者。

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use pv_core::{
    device::{FirmwareImage, Platform},
    ids::ConfigurationHandle,
    ports::{
        ConfigStoreError, ConfigurationStorePort, NetworkPresencePort, PortRequestError,
        PresenceSubscription, SecretStorePort, TransferSessionPort, WizardEventPort,
    },
    security::SecretString,
    wizard::{
        TransferProgress, WizardAction, WizardError, WizardEvent, WizardOptions, WizardSession,
        WizardStateMachine,
    },
    DeviceConfig,
};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::deps::{TransportDeps, WizardDeps, WizardSettings};
use crate::usecases::install_wizard::context::WizardContext;
use crate::usecases::install_wizard::presence_wait::wait_for_device;

const PROGRESS_CHANNEL_CAPACITY: usize = 32;

/// Errors produced by the install wizard orchestrator.
/// 安装向导编排器产生的错误。
///
/// Collaborator failures never surface here; they become the session's
/// `error` and a rollback.
#[derive(Debug, thiserror::Error)]
pub enum InstallWizardError {
    #[error("install wizard already closed")]
    Closed,
    #[error("install wizard closed while an operation was in flight")]
    Interrupted,
}

/// Orchestrator that drives the install wizard and its side effects.
pub struct InstallWizardOrchestrator {
    context: Arc<WizardContext>,
    settings: WizardSettings,
    cancel: CancellationToken,

    // Captured from the basic config step until it reaches the secret store.
    wifi_password: Mutex<Option<SecretString>>,
    transfer_session: Mutex<Option<Box<dyn TransferSessionPort>>>,
    presence_subscription: Mutex<Option<PresenceSubscription>>,

    configuration_store: Arc<dyn ConfigurationStorePort>,
    secret_store: Arc<dyn SecretStorePort>,
    presence: Arc<dyn NetworkPresencePort>,
    events: Arc<dyn WizardEventPort>,
    transport: Option<TransportDeps>,
}

impl InstallWizardOrchestrator {
    pub fn new(deps: WizardDeps, settings: WizardSettings) -> Self {
        let session = WizardSession::new(
            deps.transport.is_some(),
            WizardOptions {
                erase_before_flash: settings.erase_before_flash,
            },
        );
        info!(
            transport_capable = session.transport_capable,
            state = ?session.state,
            "install wizard opened"
        );

        Self {
            context: WizardContext::new(session).arc(),
            settings,
            cancel: CancellationToken::new(),
            wifi_password: Mutex::new(None),
            transfer_session: Mutex::new(None),
            presence_subscription: Mutex::new(None),
            configuration_store: deps.configuration_store,
            secret_store: deps.secret_store,
            presence: deps.presence,
            events: deps.events,
            transport: deps.transport,
        }
    }

    pub async fn acknowledge_capability(&self) -> Result<WizardSession, InstallWizardError> {
        self.dispatch(WizardEvent::AcknowledgeCapability).await
    }

    /// Submit the basic config step. `wifi_password` is kept out of the
    /// session and handed to the secret store together with the SSID.
    pub async fn submit_basic_config(
        &self,
        name: String,
        wifi_ssid: String,
        wifi_password: SecretString,
    ) -> Result<WizardSession, InstallWizardError> {
        let stored_secret = match self.secret_store.has_wifi_secret().await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "failed to query stored wifi secret");
                false
            }
        };
        *self.wifi_password.lock().await = Some(wifi_password);

        self.dispatch(WizardEvent::SubmitBasicConfig {
            name,
            wifi_ssid,
            stored_secret,
        })
        .await
    }

    pub async fn select_platform(
        &self,
        platform: Platform,
    ) -> Result<WizardSession, InstallWizardError> {
        self.select_platform_with(platform, self.settings.use_recommended_settings)
            .await
    }

    pub async fn select_platform_with(
        &self,
        platform: Platform,
        use_recommended: bool,
    ) -> Result<WizardSession, InstallWizardError> {
        self.dispatch(WizardEvent::SelectPlatform {
            platform,
            use_recommended,
        })
        .await
    }

    pub async fn select_board(&self, board_id: String) -> Result<WizardSession, InstallWizardError> {
        self.dispatch(WizardEvent::SelectBoard { board_id }).await
    }

    pub async fn back(&self) -> Result<WizardSession, InstallWizardError> {
        self.dispatch(WizardEvent::Back).await
    }

    /// Pick a port and run the install through to the end (or the next
    /// rollback).
    pub async fn connect(&self) -> Result<WizardSession, InstallWizardError> {
        self.dispatch(WizardEvent::RequestTransport).await
    }

    pub async fn get_session(&self) -> WizardSession {
        self.context.get_session().await
    }

    /// The API key of the created configuration. Returns it once.
    pub async fn take_api_key(&self) -> Option<String> {
        self.context.take_api_key().await
    }

    /// Close the wizard.
    ///
    /// Interrupts any in-flight operation, then runs the abort cleanup:
    /// pending presence subscription, transport session, and the
    /// configuration artifact unless the device was already flashed.
    pub async fn close(&self) -> WizardSession {
        self.cancel.cancel();
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;

        match self.run_dispatch(WizardEvent::Cancel).await {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "install wizard cleanup did not finish");
                self.context.get_session().await
            }
        }
    }

    pub async fn dispatch(&self, event: WizardEvent) -> Result<WizardSession, InstallWizardError> {
        if self.cancel.is_cancelled() {
            return Err(InstallWizardError::Closed);
        }
        // Serialize dispatches so concurrent callers never run the same
        // actions twice against one session.
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        if self.cancel.is_cancelled() {
            return Err(InstallWizardError::Closed);
        }

        self.run_dispatch(event).await
    }

    async fn run_dispatch(&self, event: WizardEvent) -> Result<WizardSession, InstallWizardError> {
        let span = info_span!("usecase.install_wizard.dispatch", event = event.name());
        async {
            let mut pending_events = VecDeque::from([event]);

            while let Some(event) = pending_events.pop_front() {
                let current = self.context.get_session().await;
                let from = current.state;
                let event_name = event.name();
                let (next, actions) = WizardStateMachine::transition(current, event);
                info!(from = ?from, to = ?next.state, event = event_name, "wizard state transition");

                // Published before the actions run so the dialog reflects the
                // step while it is in flight.
                self.set_session_and_emit(next).await;

                for action in actions {
                    if let Some(follow_up) = self.execute_action(action).await? {
                        pending_events.push_back(follow_up);
                    }
                }
            }

            Ok(self.context.get_session().await)
        }
        .instrument(span)
        .await
    }

    async fn execute_action(
        &self,
        action: WizardAction,
    ) -> Result<Option<WizardEvent>, InstallWizardError> {
        debug!(?action, "wizard executing action");
        let follow_up = match action {
            WizardAction::PersistWifiSecret { ssid } => self.persist_wifi_secret(&ssid).await?,
            WizardAction::AcquireTransport => self.acquire_transport().await?,
            WizardAction::IdentifyChip => self.identify_chip().await?,
            WizardAction::CreateConfiguration { config } => {
                Some(self.create_configuration(&config).await)
            }
            WizardAction::FetchApiKey { handle } => self.fetch_api_key(&handle).await?,
            WizardAction::CompileConfiguration { handle } => {
                Some(self.compile_configuration(&handle).await?)
            }
            WizardAction::TransferFirmware { images, erase } => {
                Some(self.transfer_firmware(&images, erase).await?)
            }
            WizardAction::HardReset => {
                self.hard_reset().await;
                None
            }
            WizardAction::AwaitPresence { handle } => Some(self.await_presence(&handle).await?),
            WizardAction::ShowCapabilityFallback => {
                self.events.show_capability_fallback().await;
                None
            }
            WizardAction::CloseTransport => {
                self.close_transport().await;
                None
            }
            WizardAction::DeleteConfiguration { handle } => {
                self.delete_configuration(&handle).await;
                None
            }
            WizardAction::CancelPresence => {
                self.cancel_presence().await;
                None
            }
        };
        Ok(follow_up)
    }

    /// Race `future` against closing the wizard.
    async fn cancellable<F: Future>(&self, future: F) -> Result<F::Output, InstallWizardError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(InstallWizardError::Interrupted),
            output = future => Ok(output),
        }
    }

    async fn persist_wifi_secret(
        &self,
        ssid: &str,
    ) -> Result<Option<WizardEvent>, InstallWizardError> {
        // No captured password means an open network.
        let password = self
            .wifi_password
            .lock()
            .await
            .take()
            .unwrap_or_else(|| SecretString::new(String::new()));

        let result = self
            .cancellable(self.secret_store.set_wifi_secret(ssid, &password))
            .await?;
        Ok(Some(match result {
            Ok(()) => {
                debug!(ssid = %ssid, "wifi secret stored");
                WizardEvent::WifiSecretPersisted
            }
            Err(err) => {
                error!(error = %err, ssid = %ssid, "failed to store wifi secret");
                WizardEvent::WifiSecretFailed {
                    message: err.to_string(),
                }
            }
        }))
    }

    async fn acquire_transport(&self) -> Result<Option<WizardEvent>, InstallWizardError> {
        let Some(transport) = &self.transport else {
            return Ok(Some(WizardEvent::TransportFailed {
                message: "serial transport is not available".to_string(),
            }));
        };

        let port = match self.cancellable(transport.picker.request_port()).await? {
            Ok(port) => port,
            Err(PortRequestError::NotFound) => {
                info!("no serial port selected");
                return Ok(Some(WizardEvent::TransportNotFound));
            }
            Err(PortRequestError::Failed(message)) => {
                warn!(error = %message, "serial port request failed");
                return Ok(Some(WizardEvent::TransportFailed { message }));
            }
        };

        // Not raced against close: an opened session must land in
        // `transfer_session` so the abort path can close it.
        match transport.firmware.open(&port).await {
            Ok(session) => {
                let previous = self.transfer_session.lock().await.replace(session);
                if let Some(mut previous) = previous {
                    if let Err(err) = previous.close().await {
                        warn!(error = %err, "failed to close previous transfer session");
                    }
                }
                info!(port = %port, "transfer session opened");
                Ok(Some(WizardEvent::TransportAcquired))
            }
            Err(err) => {
                error!(error = %err, port = %port, "failed to open transfer session");
                Ok(Some(WizardEvent::TransportFailed {
                    message: err.to_string(),
                }))
            }
        }
    }

    async fn identify_chip(&self) -> Result<Option<WizardEvent>, InstallWizardError> {
        let mut guard = self.transfer_session.lock().await;
        let Some(session) = guard.as_mut() else {
            return Ok(Some(WizardEvent::HandshakeFailed {
                message: "transfer session is not open".to_string(),
            }));
        };

        Ok(Some(match self.cancellable(session.identify_chip()).await? {
            Ok(chip) => {
                info!(chip = %chip, "chip identified");
                WizardEvent::ChipIdentified { chip }
            }
            Err(err) => {
                error!(error = %err, "chip identification failed");
                WizardEvent::HandshakeFailed {
                    message: err.to_string(),
                }
            }
        }))
    }

    /// Not raced against close: a created artifact must be recorded on the
    /// session so the abort path can delete it.
    async fn create_configuration(&self, config: &DeviceConfig) -> WizardEvent {
        match self.configuration_store.create(config).await {
            Ok(handle) => {
                info!(handle = %handle, platform = ?config.platform, "configuration created");
                WizardEvent::ConfigurationCreated { handle }
            }
            Err(err) => {
                error!(error = %err, name = %config.name, "configuration create failed");
                WizardEvent::PreparationFailed {
                    error: WizardError::configuration(&err.to_string()),
                }
            }
        }
    }

    /// Best effort: a missing key never fails the install.
    async fn fetch_api_key(
        &self,
        handle: &ConfigurationHandle,
    ) -> Result<Option<WizardEvent>, InstallWizardError> {
        let meta = match self
            .cancellable(self.configuration_store.read(handle))
            .await?
        {
            Ok(meta) => meta,
            Err(err) => {
                warn!(error = %err, handle = %handle, "failed to read configuration");
                return Ok(None);
            }
        };
        if !meta.has_integration("api") {
            debug!(handle = %handle, "configuration has no api integration");
            return Ok(None);
        }

        match self
            .cancellable(self.configuration_store.api_key(handle))
            .await?
        {
            Ok(api_key) => Ok(Some(WizardEvent::ApiKeyFetched { api_key })),
            Err(err) => {
                warn!(error = %err, handle = %handle, "failed to read api key");
                Ok(None)
            }
        }
    }

    async fn compile_configuration(
        &self,
        handle: &ConfigurationHandle,
    ) -> Result<WizardEvent, InstallWizardError> {
        let compiled = self
            .cancellable(self.configuration_store.compile(handle))
            .await?;
        if let Err(err) = compiled {
            error!(error = %err, handle = %handle, "configuration compile failed");
            let error = match err {
                ConfigStoreError::Build { logs, .. } => WizardError::build(&logs),
                other => WizardError::build(&other.to_string()),
            };
            return Ok(WizardEvent::PreparationFailed { error });
        }

        let images = self
            .cancellable(self.configuration_store.firmware(handle))
            .await?;
        Ok(match images {
            Ok(images) if !images.is_empty() => {
                let total: usize = images.iter().map(FirmwareImage::len).sum();
                info!(handle = %handle, images = images.len(), bytes = total, "firmware ready");
                WizardEvent::ConfigurationCompiled { images }
            }
            Ok(_) => WizardEvent::PreparationFailed {
                error: WizardError::build("compile produced no firmware"),
            },
            Err(err) => {
                error!(error = %err, handle = %handle, "firmware download failed");
                WizardEvent::PreparationFailed {
                    error: WizardError::build(&err.to_string()),
                }
            }
        })
    }

    async fn transfer_firmware(
        &self,
        images: &[FirmwareImage],
        erase: bool,
    ) -> Result<WizardEvent, InstallWizardError> {
        let mut guard = self.transfer_session.lock().await;
        let Some(session) = guard.as_mut() else {
            return Ok(WizardEvent::TransferFailed {
                message: "transfer session is not open".to_string(),
            });
        };

        let (progress_tx, mut progress_rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        let transfer = session.transfer(images, erase, progress_tx);
        tokio::pin!(transfer);

        // A finished transfer wins over close: a flashed device must be
        // recorded as flashed so the abort path keeps its configuration.
        let result = loop {
            tokio::select! {
                biased;
                result = &mut transfer => break result,
                _ = self.cancel.cancelled() => return Err(InstallWizardError::Interrupted),
                Some(progress) = progress_rx.recv() => self.apply_progress(progress).await,
            }
        };
        while let Ok(progress) = progress_rx.try_recv() {
            self.apply_progress(progress).await;
        }

        Ok(match result {
            Ok(()) => {
                info!(erase, "firmware transfer completed");
                WizardEvent::TransferCompleted
            }
            Err(err) => {
                error!(error = %err, "firmware transfer failed");
                WizardEvent::TransferFailed {
                    message: err.to_string(),
                }
            }
        })
    }

    async fn apply_progress(&self, progress: TransferProgress) {
        debug!(?progress, "firmware transfer progress");
        let current = self.context.get_session().await;
        let (next, _) =
            WizardStateMachine::transition(current, WizardEvent::TransferProgressed { progress });
        self.set_session_and_emit(next).await;
    }

    async fn hard_reset(&self) {
        let mut guard = self.transfer_session.lock().await;
        match guard.as_mut() {
            Some(session) => {
                if let Err(err) = session.hard_reset().await {
                    warn!(error = %err, "hard reset failed");
                }
            }
            None => warn!("hard reset requested without transfer session"),
        }
    }

    async fn await_presence(
        &self,
        handle: &ConfigurationHandle,
    ) -> Result<WizardEvent, InstallWizardError> {
        let subscription = match self.cancellable(self.presence.subscribe()).await? {
            Ok(subscription) => subscription,
            Err(err) => {
                warn!(error = %err, "presence subscription failed");
                return Ok(WizardEvent::PresenceFailed {
                    message: err.to_string(),
                });
            }
        };

        // Kept on `self` while waiting so the abort path can unsubscribe it.
        let outcome = {
            let mut guard = self.presence_subscription.lock().await;
            let subscription = guard.insert(subscription);
            self.cancellable(wait_for_device(
                subscription,
                handle,
                self.settings.presence_timeout,
            ))
            .await?
        };
        self.cancel_presence().await;

        info!(handle = %handle, outcome = outcome.name(), "presence wait finished");
        Ok(outcome)
    }

    async fn cancel_presence(&self) {
        if let Some(subscription) = self.presence_subscription.lock().await.take() {
            subscription.unsubscribe();
            debug!("presence subscription released");
        }
    }

    async fn close_transport(&self) {
        let session = self.transfer_session.lock().await.take();
        if let Some(mut session) = session {
            match session.close().await {
                Ok(()) => debug!("transfer session closed"),
                Err(err) => warn!(error = %err, "failed to close transfer session"),
            }
        }
    }

    async fn delete_configuration(&self, handle: &ConfigurationHandle) {
        match self.configuration_store.delete(handle).await {
            Ok(()) => info!(handle = %handle, "configuration deleted"),
            Err(err) => warn!(error = %err, handle = %handle, "failed to delete configuration"),
        }
    }

    async fn set_session_and_emit(&self, session: WizardSession) {
        self.context.set_session(session.clone()).await;
        self.events.emit_state_changed(&session).await;
    }
}
