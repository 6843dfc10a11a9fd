use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use matmul_codec::{encode_batch, generate_batch_bounded, ValueSource, OPERANDS_PER_ROUND};
use matmul_transport::Transport;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::handoff::{RoundCoordinator, Turn};
use crate::report::Reporter;

/// The data-generating task.
///
/// Owns the write half of the device and the input buffer. Each round it
/// waits for its turn, generates and sends two operands, then hands off.
pub struct Producer<W> {
    transport: Transport<W>,
    coordinator: Arc<RoundCoordinator>,
    source: Box<dyn ValueSource>,
    reporter: Arc<dyn Reporter>,
    config: SessionConfig,
    stop: Option<Arc<AtomicBool>>,
}

impl<W: Write> Producer<W> {
    pub fn new(
        transport: Transport<W>,
        coordinator: Arc<RoundCoordinator>,
        source: Box<dyn ValueSource>,
        reporter: Arc<dyn Reporter>,
        config: SessionConfig,
    ) -> Self {
        Self {
            transport,
            coordinator,
            source,
            reporter,
            config,
            stop: None,
        }
    }

    /// Stop starting new rounds once `stop` is set.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Run all configured rounds, then shut the session down.
    ///
    /// Returns the number of rounds sent. On error the caller must still
    /// shut the coordinator down so the consumer is released.
    pub fn run(mut self) -> Result<u64> {
        let dimension = self.config.dimension;
        let mut sent = 0u64;

        for _ in 0..self.config.round_count {
            if self.stop_requested() {
                warn!(sent, "stop requested, not starting further rounds");
                break;
            }
            let index = match self.coordinator.producer_acquire() {
                Turn::Producer(index) => index,
                _ => {
                    warn!(sent, "session shut down before all rounds were sent");
                    break;
                }
            };

            info!(round = index, "starting round");
            let batch = generate_batch_bounded(
                OPERANDS_PER_ROUND,
                dimension,
                self.config.element_bound,
                self.source.as_mut(),
            )?;
            self.reporter.batch(index, &batch);

            let payload = encode_batch(&batch, dimension)?;
            debug!(round = index, bytes = payload.len(), "writing operands");
            self.transport.write_all(&payload)?;
            self.coordinator.mark_sent();
            self.coordinator.produce_done();
            sent += 1;

            if !self.config.pace.is_zero() {
                std::thread::sleep(self.config.pace);
            }
        }

        self.coordinator.finish();
        info!(sent, "producer finished");
        Ok(sent)
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|stop| stop.load(Ordering::SeqCst))
    }
}
