use std::io::Read;
use std::sync::Arc;

use matmul_codec::{decode_matrix, record_size};
use matmul_transport::Transport;
use tracing::{debug, info};

use crate::error::Result;
use crate::handoff::{RoundCoordinator, Turn};
use crate::report::Reporter;

/// The result-consuming task.
///
/// Owns the read half of the device and the result buffer. Each round it
/// waits for the handoff, reads exactly one result record, reports it and
/// hands back.
pub struct Consumer<R> {
    transport: Transport<R>,
    coordinator: Arc<RoundCoordinator>,
    reporter: Arc<dyn Reporter>,
    buf: Vec<u8>,
    dimension: usize,
}

impl<R: Read> Consumer<R> {
    pub fn new(
        transport: Transport<R>,
        coordinator: Arc<RoundCoordinator>,
        reporter: Arc<dyn Reporter>,
        dimension: usize,
    ) -> Self {
        Self {
            transport,
            coordinator,
            reporter,
            buf: vec![0; record_size(dimension)],
            dimension,
        }
    }

    /// Report rounds until the session shuts down.
    ///
    /// Returns the number of rounds reported. Read and decode failures end
    /// the loop; the caller must shut the coordinator down so the producer
    /// is released.
    pub fn run(mut self) -> Result<u64> {
        let mut reported = 0u64;

        while let Turn::Consumer(index) = self.coordinator.consumer_acquire() {
            self.transport.read_exact_into(&mut self.buf)?;
            debug!(round = index, bytes = self.buf.len(), "received result");

            let product = decode_matrix(&self.buf, self.dimension)?;
            self.reporter.result(index, &product);
            self.coordinator.consumer_done();
            reported += 1;
        }

        info!(reported, "consumer finished");
        Ok(reported)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use matmul_codec::{encode_batch, FormatError, Matrix};
    use matmul_transport::TransportError;

    use super::*;
    use crate::error::SessionError;
    use crate::handoff::HandoffState;

    #[derive(Default)]
    struct Results(Mutex<Vec<(u64, Matrix)>>);

    impl Reporter for Results {
        fn result(&self, round: u64, product: &Matrix) {
            self.0.lock().unwrap().push((round, product.clone()));
        }
    }

    fn wire(matrices: &[Matrix]) -> Vec<u8> {
        encode_batch(matrices, matrices[0].dimension())
            .unwrap()
            .to_vec()
    }

    fn hand_off(coordinator: &RoundCoordinator) {
        assert!(matches!(coordinator.producer_acquire(), Turn::Producer(_)));
        coordinator.produce_done();
    }

    #[test]
    fn reports_each_handed_off_round() {
        let first = Matrix::from_rows(&[[19, 22], [43, 50]]).unwrap();
        let second = Matrix::from_rows(&[[1, 0], [0, 1]]).unwrap();
        let coordinator = Arc::new(RoundCoordinator::new());
        let reporter = Arc::new(Results::default());

        let consumer = Consumer::new(
            Transport::new(Cursor::new(wire(&[first.clone(), second.clone()]))),
            Arc::clone(&coordinator),
            reporter.clone(),
            2,
        );
        let handle = std::thread::spawn(move || consumer.run());

        hand_off(&coordinator);
        hand_off(&coordinator);
        coordinator.finish();

        assert_eq!(handle.join().unwrap().unwrap(), 2);
        let results = reporter.0.lock().unwrap();
        assert_eq!(*results, vec![(0, first), (1, second)]);
    }

    #[test]
    fn read_error_terminates_without_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let coordinator = Arc::new(RoundCoordinator::new());
        let reporter = Arc::new(Results::default());
        hand_off(&coordinator);

        let consumer = Consumer::new(
            Transport::new(FailingReader {
                calls: Arc::clone(&calls),
            }),
            Arc::clone(&coordinator),
            reporter.clone(),
            6,
        );

        let err = consumer.run().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Transport(TransportError::Io(ref e)) if e.kind() == ErrorKind::Other
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(reporter.0.lock().unwrap().is_empty());
        assert_eq!(coordinator.state(), HandoffState::ConsumerTurn);
    }

    #[test]
    fn truncated_result_is_transport_error() {
        let coordinator = Arc::new(RoundCoordinator::new());
        hand_off(&coordinator);

        let consumer = Consumer::new(
            Transport::new(Cursor::new(vec![0u8; 10])),
            Arc::clone(&coordinator),
            Arc::new(Results::default()),
            2,
        );
        assert!(matches!(
            consumer.run(),
            Err(SessionError::Transport(TransportError::UnexpectedEof {
                expected: 20,
                received: 10
            }))
        ));
    }

    #[test]
    fn wrong_header_is_format_error() {
        let coordinator = Arc::new(RoundCoordinator::new());
        hand_off(&coordinator);

        // A 1×1 record followed by padding has the right length for N=2
        // but the wrong size header.
        let mut bytes = wire(&[Matrix::from_rows(&[[5]]).unwrap()]);
        bytes.resize(20, 0);

        let consumer = Consumer::new(
            Transport::new(Cursor::new(bytes)),
            Arc::clone(&coordinator),
            Arc::new(Results::default()),
            2,
        );
        assert!(matches!(
            consumer.run(),
            Err(SessionError::Format(FormatError::HeaderMismatch {
                expected: 2,
                found: 1
            }))
        ));
    }

    #[test]
    fn shutdown_before_any_round_reads_nothing() {
        let coordinator = Arc::new(RoundCoordinator::new());
        coordinator.request_shutdown();

        let consumer = Consumer::new(
            Transport::new(FailingReader {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            coordinator,
            Arc::new(Results::default()),
            6,
        );
        assert_eq!(consumer.run().unwrap(), 0);
    }

    struct FailingReader {
        calls: Arc<AtomicUsize>,
    }

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::other("device error"))
        }
    }
}
