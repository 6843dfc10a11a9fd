use std::sync::atomic::Ordering;

use matmul_session::{remote, SessionConfig};
use matmul_transport::UnixDomainSocket;
use tracing::{info, warn};

use crate::cmd::{install_ctrlc_handler, RemoteArgs};
use crate::exit::{session_error, transport_error, CliResult, SUCCESS};

pub fn run(args: RemoteArgs) -> CliResult<i32> {
    SessionConfig {
        dimension: args.dimension,
        ..SessionConfig::default()
    }
    .validate()
    .map_err(|err| session_error("invalid configuration", err))?;

    let listener =
        UnixDomainSocket::bind(&args.path).map_err(|err| transport_error("bind failed", err))?;

    // A blocked accept() never sees the flag; a throwaway connection wakes it.
    let wake_path = listener.path().to_path_buf();
    let stop = install_ctrlc_handler(move || {
        let _ = std::os::unix::net::UnixStream::connect(&wake_path);
    })?;

    let mut connections = 0u64;
    while !stop.load(Ordering::SeqCst) {
        if args.connections.is_some_and(|limit| connections >= limit) {
            break;
        }

        let device = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        if stop.load(Ordering::SeqCst) {
            break;
        }
        connections += 1;

        match remote::serve(device, args.dimension) {
            Ok(served) => info!(connection = connections, served, "connection closed"),
            Err(err) => warn!(connection = connections, error = %err, "connection failed"),
        }
    }

    info!(connections, "remote stopped");
    Ok(SUCCESS)
}
