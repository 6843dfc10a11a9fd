use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

/// Whose turn it is on the shared device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffState {
    /// The producer may generate and send the next round.
    ProducerTurn,
    /// The consumer may read and report the current round's result.
    ConsumerTurn,
    /// No further rounds. Terminal.
    Shutdown,
}

/// What a blocked task was woken for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Producer holds the turn for the round with this index.
    Producer(u64),
    /// Consumer holds the turn for the round with this index.
    Consumer(u64),
    /// The session is over; leave the loop.
    Shutdown,
}

/// Progress of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// Producer is generating operands.
    Pending,
    /// Operands are fully written to the device.
    Sent,
    /// Handed to the consumer, result not yet reported.
    AwaitingResult,
    /// Consumer reported the result.
    Reported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    pub index: u64,
    pub state: RoundState,
}

#[derive(Debug)]
struct Inner {
    state: HandoffState,
    round: Option<Round>,
    completed: u64,
}

/// Single-token handoff between one producer and one consumer.
///
/// The token starts with the producer. `produce_done` passes it to the
/// consumer, `consumer_done` passes it back, and `request_shutdown` ends
/// the exchange and wakes whoever is waiting. Because only the token
/// holder acts, the two tasks never work on a round at the same time.
#[derive(Debug)]
pub struct RoundCoordinator {
    inner: Mutex<Inner>,
    turn_changed: Condvar,
}

impl Default for RoundCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundCoordinator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: HandoffState::ProducerTurn,
                round: None,
                completed: 0,
            }),
            turn_changed: Condvar::new(),
        }
    }

    // The state is a few plain values updated atomically under the lock, so
    // a panic elsewhere cannot leave it half-written.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_while<'a, F>(
        &'a self,
        guard: MutexGuard<'a, Inner>,
        condition: F,
    ) -> MutexGuard<'a, Inner>
    where
        F: FnMut(&mut Inner) -> bool,
    {
        self.turn_changed
            .wait_while(guard, condition)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the producer holds the turn, then open the next round.
    ///
    /// Returns `Turn::Producer(index)` with the new round's index, or
    /// `Turn::Shutdown` once the session is over.
    pub fn producer_acquire(&self) -> Turn {
        let guard = self.lock();
        let mut inner = self.wait_while(guard, |inner| {
            inner.state == HandoffState::ConsumerTurn
        });
        if inner.state == HandoffState::Shutdown {
            return Turn::Shutdown;
        }

        let index = inner.completed;
        inner.round = Some(Round {
            index,
            state: RoundState::Pending,
        });
        Turn::Producer(index)
    }

    /// Record that the current round's operands are fully written.
    pub fn mark_sent(&self) {
        let mut inner = self.lock();
        if let Some(round) = inner.round.as_mut() {
            if round.state == RoundState::Pending {
                round.state = RoundState::Sent;
            }
        }
    }

    /// Hand the turn to the consumer. Call once per round, after the write.
    pub fn produce_done(&self) {
        let mut inner = self.lock();
        match inner.state {
            HandoffState::ProducerTurn => {
                inner.state = HandoffState::ConsumerTurn;
                if let Some(round) = inner.round.as_mut() {
                    round.state = RoundState::AwaitingResult;
                }
                debug!(round = ?inner.round.map(|r| r.index), "handed off to consumer");
                self.turn_changed.notify_all();
            }
            HandoffState::ConsumerTurn => warn!("produce_done called during consumer turn"),
            HandoffState::Shutdown => {}
        }
    }

    /// Block until the consumer holds the turn or the session is over.
    ///
    /// Does not hand the turn back; call [`consumer_done`](Self::consumer_done)
    /// after reporting.
    pub fn consumer_acquire(&self) -> Turn {
        let guard = self.lock();
        let inner = self.wait_while(guard, |inner| {
            inner.state == HandoffState::ProducerTurn
        });
        match (inner.state, inner.round) {
            (HandoffState::ConsumerTurn, Some(round)) => Turn::Consumer(round.index),
            _ => Turn::Shutdown,
        }
    }

    /// Mark the round reported and hand the turn back to the producer.
    ///
    /// After shutdown the state stays `Shutdown`.
    pub fn consumer_done(&self) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if let Some(round) = inner.round.as_mut() {
            if round.state == RoundState::AwaitingResult {
                round.state = RoundState::Reported;
                inner.completed += 1;
            }
        }
        if inner.state == HandoffState::ConsumerTurn {
            inner.state = HandoffState::ProducerTurn;
            debug!(completed = inner.completed, "handed back to producer");
            self.turn_changed.notify_all();
        }
    }

    /// End the session and wake any waiting task. Idempotent.
    pub fn request_shutdown(&self) {
        let mut inner = self.lock();
        if inner.state != HandoffState::Shutdown {
            debug!(from = ?inner.state, completed = inner.completed, "shutting down");
            inner.state = HandoffState::Shutdown;
        }
        self.turn_changed.notify_all();
    }

    /// Wait for the outstanding round to be reported, then shut down.
    pub fn finish(&self) {
        {
            let guard = self.lock();
            let _idle = self.wait_while(guard, |inner| {
                inner.state == HandoffState::ConsumerTurn
            });
        }
        self.request_shutdown();
    }

    pub fn state(&self) -> HandoffState {
        self.lock().state
    }

    /// Snapshot of the most recent round.
    pub fn round(&self) -> Option<Round> {
        self.lock().round
    }

    /// Rounds reported so far.
    pub fn rounds_completed(&self) -> u64 {
        self.lock().completed
    }

    /// False once shutdown has been requested.
    pub fn is_running(&self) -> bool {
        self.state() != HandoffState::Shutdown
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn starts_with_producer_turn() {
        let coordinator = RoundCoordinator::new();
        assert_eq!(coordinator.state(), HandoffState::ProducerTurn);
        assert!(coordinator.is_running());
        assert_eq!(coordinator.round(), None);
        assert_eq!(coordinator.producer_acquire(), Turn::Producer(0));
    }

    #[test]
    fn round_state_follows_the_handoff() {
        let coordinator = RoundCoordinator::new();
        let state = |c: &RoundCoordinator| c.round().map(|r| r.state);

        assert_eq!(coordinator.producer_acquire(), Turn::Producer(0));
        assert_eq!(state(&coordinator), Some(RoundState::Pending));
        coordinator.mark_sent();
        assert_eq!(state(&coordinator), Some(RoundState::Sent));
        coordinator.produce_done();
        assert_eq!(coordinator.state(), HandoffState::ConsumerTurn);
        assert_eq!(state(&coordinator), Some(RoundState::AwaitingResult));
        assert_eq!(coordinator.consumer_acquire(), Turn::Consumer(0));
        coordinator.consumer_done();
        assert_eq!(state(&coordinator), Some(RoundState::Reported));
        assert_eq!(coordinator.state(), HandoffState::ProducerTurn);
        assert_eq!(coordinator.rounds_completed(), 1);
        assert_eq!(coordinator.producer_acquire(), Turn::Producer(1));
    }

    #[test]
    fn consumer_blocks_until_produce_done() {
        let coordinator = Arc::new(RoundCoordinator::new());
        let acquired = Arc::new(AtomicBool::new(false));

        let consumer = {
            let coordinator = Arc::clone(&coordinator);
            let acquired = Arc::clone(&acquired);
            thread::spawn(move || {
                let turn = coordinator.consumer_acquire();
                acquired.store(true, Ordering::SeqCst);
                turn
            })
        };

        assert_eq!(coordinator.producer_acquire(), Turn::Producer(0));
        thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::SeqCst));

        coordinator.produce_done();
        assert_eq!(consumer.join().unwrap(), Turn::Consumer(0));
    }

    #[test]
    fn producer_blocks_until_consumer_done() {
        let coordinator = Arc::new(RoundCoordinator::new());
        assert_eq!(coordinator.producer_acquire(), Turn::Producer(0));
        coordinator.produce_done();

        let producer = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || {
                let started = Instant::now();
                (coordinator.producer_acquire(), started.elapsed())
            })
        };

        assert_eq!(coordinator.consumer_acquire(), Turn::Consumer(0));
        thread::sleep(Duration::from_millis(50));
        coordinator.consumer_done();

        let (turn, waited) = producer.join().unwrap();
        assert_eq!(turn, Turn::Producer(1));
        assert!(waited >= Duration::from_millis(40));
    }

    #[test]
    fn strict_alternation_across_threads() {
        const ROUNDS: u64 = 25;
        let coordinator = Arc::new(RoundCoordinator::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let consumer = {
            let coordinator = Arc::clone(&coordinator);
            let log = Arc::clone(&log);
            thread::spawn(move || loop {
                match coordinator.consumer_acquire() {
                    Turn::Consumer(index) => {
                        log.lock().unwrap().push(("consume", index));
                        coordinator.consumer_done();
                    }
                    _ => break,
                }
            })
        };

        for _ in 0..ROUNDS {
            let Turn::Producer(index) = coordinator.producer_acquire() else {
                panic!("unexpected shutdown");
            };
            log.lock().unwrap().push(("produce", index));
            coordinator.produce_done();
        }
        coordinator.finish();
        consumer.join().unwrap();

        let log = log.lock().unwrap();
        let expected: Vec<(&str, u64)> = (0..ROUNDS)
            .flat_map(|i| [("produce", i), ("consume", i)])
            .collect();
        assert_eq!(*log, expected);
        assert_eq!(coordinator.rounds_completed(), ROUNDS);
    }

    #[test]
    fn shutdown_wakes_blocked_consumer() {
        let coordinator = Arc::new(RoundCoordinator::new());
        let consumer = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || coordinator.consumer_acquire())
        };

        thread::sleep(Duration::from_millis(20));
        coordinator.request_shutdown();
        assert_eq!(consumer.join().unwrap(), Turn::Shutdown);
        assert!(!coordinator.is_running());
    }

    #[test]
    fn shutdown_wakes_blocked_producer() {
        let coordinator = Arc::new(RoundCoordinator::new());
        assert_eq!(coordinator.producer_acquire(), Turn::Producer(0));
        coordinator.produce_done();

        let producer = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || coordinator.producer_acquire())
        };

        thread::sleep(Duration::from_millis(20));
        coordinator.request_shutdown();
        assert_eq!(producer.join().unwrap(), Turn::Shutdown);
    }

    #[test]
    fn shutdown_is_terminal() {
        let coordinator = RoundCoordinator::new();
        coordinator.request_shutdown();
        coordinator.request_shutdown();

        coordinator.produce_done();
        assert_eq!(coordinator.state(), HandoffState::Shutdown);
        coordinator.consumer_done();
        assert_eq!(coordinator.state(), HandoffState::Shutdown);
        assert_eq!(coordinator.consumer_acquire(), Turn::Shutdown);
        assert_eq!(coordinator.producer_acquire(), Turn::Shutdown);
    }

    #[test]
    fn consumer_done_after_shutdown_still_counts_the_round() {
        let coordinator = RoundCoordinator::new();
        coordinator.producer_acquire();
        coordinator.produce_done();
        assert_eq!(coordinator.consumer_acquire(), Turn::Consumer(0));

        coordinator.request_shutdown();
        coordinator.consumer_done();
        assert_eq!(coordinator.rounds_completed(), 1);
        assert_eq!(coordinator.state(), HandoffState::Shutdown);
    }

    #[test]
    fn finish_waits_for_outstanding_report() {
        let coordinator = Arc::new(RoundCoordinator::new());
        coordinator.producer_acquire();
        coordinator.produce_done();

        let finisher = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || coordinator.finish())
        };

        assert_eq!(coordinator.consumer_acquire(), Turn::Consumer(0));
        thread::sleep(Duration::from_millis(20));
        assert!(coordinator.is_running());
        coordinator.consumer_done();

        finisher.join().unwrap();
        assert_eq!(coordinator.state(), HandoffState::Shutdown);
        assert_eq!(coordinator.rounds_completed(), 1);
    }

    #[test]
    fn finish_with_no_rounds_shuts_down_immediately() {
        let coordinator = RoundCoordinator::new();
        coordinator.finish();
        assert_eq!(coordinator.consumer_acquire(), Turn::Shutdown);
    }
}
