//! Blocking byte-stream transport for the matmul offload protocol.
//!
//! Provides the device handle both session tasks talk through and the
//! exact-length I/O contract layered on top of it:
//! - [`Device`] opens an rpmsg-style character device or a Unix socket
//! - [`Transport`] writes whole buffers and reads exactly `n` bytes
//!
//! This is the lowest layer of matmul. The codec and session crates build
//! on top of it.

pub mod device;
pub mod error;
pub mod stream;

#[cfg(unix)]
pub mod uds;

pub use device::{Device, DEFAULT_DEVICE_PATH};
pub use error::{Result, TransportError};
pub use stream::Transport;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
