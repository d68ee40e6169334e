//! Poll cycle.
//!
//! One cycle: read status → spin the state machine → refresh the
//! connection indicator → threshold alarms and data record if a snapshot
//! arrived. Cycles are driven serially by the caller; nothing here spawns.

use crate::alarms::{AlarmLatches, AlarmMonitor};
use crate::annunciator::Annunciator;
use crate::error::ControlError;
use crate::publish::{DataPublisher, RecordSink};
use crate::state::DriveState;
use crate::state::machine::ControlStateMachine;
use tracing::{debug, info, warn};
use vfd_common::clock::{Clock, SystemClock};
use vfd_common::config::DriveAppConfig;
use vfd_common::drive::transport::RegisterTransport;
use vfd_common::drive::types::DriveStatus;
use vfd_hal::DriveClient;

/// Outcome of one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub state: DriveState,
    pub status: Option<DriveStatus>,
    pub connected: bool,
    pub error_count: u64,
    pub alarms: AlarmLatches,
    pub published: bool,
}

/// Drive application: client, state machine and the per-cycle collaborators
/// for one drive.
pub struct DriveApplication<T, N, S, C = SystemClock>
where
    T: RegisterTransport,
    N: Annunciator,
    S: RecordSink,
    C: Clock + Clone,
{
    pub(crate) config: DriveAppConfig,
    pub(crate) client: DriveClient<T>,
    pub(crate) machine: ControlStateMachine<C>,
    pub(crate) annunciator: N,
    alarms: AlarmMonitor,
    publisher: DataPublisher<C>,
    sink: S,
    last_status: Option<DriveStatus>,
}

impl<T, N, S> DriveApplication<T, N, S, SystemClock>
where
    T: RegisterTransport,
    N: Annunciator,
    S: RecordSink,
{
    pub fn new(config: DriveAppConfig, transport: T, annunciator: N, sink: S) -> Self {
        Self::with_clock(config, transport, annunciator, sink, SystemClock)
    }
}

impl<T, N, S, C> DriveApplication<T, N, S, C>
where
    T: RegisterTransport,
    N: Annunciator,
    S: RecordSink,
    C: Clock + Clone,
{
    pub fn with_clock(
        config: DriveAppConfig,
        transport: T,
        annunciator: N,
        sink: S,
        clock: C,
    ) -> Self {
        if let Err(e) = config.validate() {
            warn!("Running with an unvalidated configuration: {}", e);
        }
        let client = DriveClient::new(transport, &config.connection);
        let machine = ControlStateMachine::with_clock(clock.clone());
        let alarms = AlarmMonitor::new(config.alarms.clone(), config.load.rated_current_a);
        let publisher = DataPublisher::new(config.monitoring.log_data, config.load.clone(), clock);

        info!(
            "{} configured: {}:{} unit {} ({})",
            config.display_name,
            config.connection.host,
            config.connection.port,
            config.connection.unit_id,
            client.transport().name()
        );

        Self {
            config,
            client,
            machine,
            annunciator,
            alarms,
            publisher,
            sink,
            last_status: None,
        }
    }

    #[inline]
    pub fn state(&self) -> DriveState {
        self.machine.state()
    }

    pub fn config(&self) -> &DriveAppConfig {
        &self.config
    }

    pub fn client(&self) -> &DriveClient<T> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut DriveClient<T> {
        &mut self.client
    }

    pub fn machine(&self) -> &ControlStateMachine<C> {
        &self.machine
    }

    pub fn annunciator(&self) -> &N {
        &self.annunciator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Snapshot from the most recent cycle, `None` if it failed.
    pub fn last_status(&self) -> Option<&DriveStatus> {
        self.last_status.as_ref()
    }

    /// Run one poll cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, ControlError> {
        let status = self.client.read_status().await;

        let state = self
            .machine
            .spin(status.as_ref(), &mut self.client, &mut self.annunciator)
            .await?;

        let connected = self.client.connected();
        let error_count = self.client.error_count();
        self.annunciator.update_connection(connected, error_count);
        self.annunciator.update_status(state, status.as_ref());

        let mut alarms = AlarmLatches::default();
        let mut published = false;
        if let Some(status) = &status {
            alarms = self.alarms.check(status, &mut self.annunciator);
            published = self.publisher.publish(status, &mut self.sink);
        }

        debug!("State: {}, Connected: {}", state, connected);
        self.last_status = status.clone();

        Ok(CycleReport {
            state,
            status,
            connected,
            error_count,
            alarms,
            published,
        })
    }

    /// Close the drive session.
    pub async fn shutdown(&mut self) {
        info!("Shutting down {}", self.config.display_name);
        self.client.disconnect().await;
    }
}
