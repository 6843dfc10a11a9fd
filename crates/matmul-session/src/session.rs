use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use matmul_codec::{RandomValues, ValueSource};
use matmul_transport::{Device, Transport};
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::consumer::Consumer;
use crate::error::{Result, SessionError};
use crate::handoff::RoundCoordinator;
use crate::producer::Producer;
use crate::report::Reporter;

/// Outcome of a session that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub rounds_sent: u64,
    pub rounds_reported: u64,
}

/// One producer/consumer exchange over an open device.
pub struct Session {
    config: SessionConfig,
    device: Device,
    reporter: Arc<dyn Reporter>,
    source: Option<Box<dyn ValueSource>>,
    stop: Option<Arc<AtomicBool>>,
}

impl Session {
    /// Prepare a session. Fails if the config is unusable.
    pub fn new(config: SessionConfig, device: Device, reporter: Arc<dyn Reporter>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            device,
            reporter,
            source: None,
            stop: None,
        })
    }

    /// Use `source` for operand values instead of the configured generator.
    pub fn with_value_source(mut self, source: Box<dyn ValueSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Stop starting new rounds once `stop` is set.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Run every round on two threads and wait for both to finish.
    ///
    /// If either task fails, the coordinator is shut down so the other task
    /// exits too, and the first error is returned.
    pub fn run(self) -> Result<SessionSummary> {
        let Session {
            config,
            device,
            reporter,
            source,
            stop,
        } = self;

        let source = match source {
            Some(source) => source,
            None => default_source(config.seed),
        };
        let reader = device.try_clone()?;
        let coordinator = Arc::new(RoundCoordinator::new());

        info!(
            rounds = config.round_count,
            dimension = config.dimension,
            device = ?device.path(),
            kind = device.kind_name(),
            "starting session"
        );

        let consumer = Consumer::new(
            Transport::new(reader),
            Arc::clone(&coordinator),
            Arc::clone(&reporter),
            config.dimension,
        );
        let consumer_handle = spawn_task("consumer", &coordinator, move || consumer.run())?;

        let mut producer = Producer::new(
            Transport::new(device),
            Arc::clone(&coordinator),
            source,
            reporter,
            config,
        );
        if let Some(stop) = stop {
            producer = producer.with_stop_flag(stop);
        }
        let producer_handle = match spawn_task("producer", &coordinator, move || producer.run()) {
            Ok(handle) => handle,
            Err(err) => {
                coordinator.request_shutdown();
                let _ = join_task("consumer", consumer_handle);
                return Err(err);
            }
        };

        let produced = join_task("producer", producer_handle);
        let consumed = join_task("consumer", consumer_handle);
        let summary = SessionSummary {
            rounds_sent: produced?,
            rounds_reported: consumed?,
        };

        if summary.rounds_sent != summary.rounds_reported {
            warn!(?summary, "session ended with unreported rounds");
        }
        info!(
            sent = summary.rounds_sent,
            reported = summary.rounds_reported,
            "session complete"
        );
        Ok(summary)
    }
}

fn default_source(seed: Option<u64>) -> Box<dyn ValueSource> {
    match seed {
        Some(seed) => Box::new(RandomValues::seeded(seed)),
        None => Box::new(RandomValues::from_entropy()),
    }
}

/// Shuts the coordinator down when a task exits, however it exits.
struct ShutdownOnExit(Arc<RoundCoordinator>);

impl Drop for ShutdownOnExit {
    fn drop(&mut self) {
        self.0.request_shutdown();
    }
}

fn spawn_task<F>(
    task: &'static str,
    coordinator: &Arc<RoundCoordinator>,
    body: F,
) -> Result<JoinHandle<Result<u64>>>
where
    F: FnOnce() -> Result<u64> + Send + 'static,
{
    let guard = ShutdownOnExit(Arc::clone(coordinator));
    thread::Builder::new()
        .name(format!("matmul-{task}"))
        .spawn(move || {
            let _guard = guard;
            body()
        })
        .map_err(|source| SessionError::Spawn { task, source })
}

fn join_task(task: &'static str, handle: JoinHandle<Result<u64>>) -> Result<u64> {
    handle
        .join()
        .map_err(|_| SessionError::TaskPanicked(task))?
}
