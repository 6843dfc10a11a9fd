//! Offload square matrix products to a remote processor.
//!
//! A session alternates two tasks over one byte-stream device (an rpmsg
//! character device, or a Unix socket standing in for one): the producer
//! sends a pair of operands, the consumer reads back their product, and
//! neither starts a round before the other has finished its half.
//!
//! # Crate Structure
//!
//! - [`transport`]: device handles and exact-length blocking I/O
//! - [`codec`]: matrix records, wire layout and workload generation
//! - [`session`]: round handoff, producer/consumer tasks and the remote side

/// Re-export transport types.
pub mod transport {
    pub use matmul_transport::*;
}

/// Re-export codec types.
pub mod codec {
    pub use matmul_codec::*;
}

/// Re-export session types.
pub mod session {
    pub use matmul_session::*;
}
