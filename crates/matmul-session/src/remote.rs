//! The remote compute side of a session.
//!
//! On hardware the remote processor multiplies each pair of operands and
//! writes the product back. [`serve`] does the same over any stream, so a
//! session can run against a socket instead of an rpmsg device.

use std::io::{Read, Write};

use matmul_codec::{batch_size, decode_batch, encode_batch, OPERANDS_PER_ROUND};
use matmul_transport::Transport;
use tracing::{debug, info};

use crate::error::{Result, SessionError};

/// Answer requests on `stream` until the peer disconnects.
///
/// Each request is two records of `dimension`; each response is their
/// product. A disconnect between requests ends service normally and
/// returns the number of requests answered. A disconnect mid-request is a
/// transport error.
pub fn serve<T: Read + Write>(stream: T, dimension: usize) -> Result<u64> {
    if dimension == 0 || dimension > matmul_codec::MAX_DIMENSION {
        return Err(SessionError::InvalidConfig(format!(
            "unsupported dimension {dimension}"
        )));
    }

    let mut transport = Transport::new(stream);
    let request_len = batch_size(OPERANDS_PER_ROUND, dimension);
    let mut served = 0u64;

    loop {
        let request = match transport.read_exact(request_len) {
            Ok(request) => request,
            Err(err) if err.is_clean_eof() => {
                info!(served, "peer disconnected");
                return Ok(served);
            }
            Err(err) => return Err(err.into()),
        };

        let operands = decode_batch(&request, OPERANDS_PER_ROUND, dimension)?;
        let product = operands[0].multiply(&operands[1])?;
        let response = encode_batch(std::slice::from_ref(&product), dimension)?;
        transport.write_all(&response)?;

        debug!(request = served, bytes = response.len(), "sent product");
        served += 1;
    }
}
