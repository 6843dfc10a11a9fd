//! Round-based producer/consumer sessions over a shared device.
//!
//! A session runs two tasks against one byte stream. The producer sends
//! each round's operands, the consumer reads and reports the product, and a
//! [`RoundCoordinator`] makes them take strict turns so rounds never
//! overlap and neither task touches the other's buffer.

pub mod config;
pub mod consumer;
pub mod error;
pub mod handoff;
pub mod producer;
pub mod remote;
pub mod report;
pub mod session;

pub use config::SessionConfig;
pub use consumer::Consumer;
pub use error::{Result, SessionError};
pub use handoff::{HandoffState, Round, RoundCoordinator, RoundState, Turn};
pub use producer::Producer;
pub use report::Reporter;
pub use session::{Session, SessionSummary};
