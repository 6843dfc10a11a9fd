//! Run a short session against an in-process remote over a socket pair.
//!
//! Run with:
//!   cargo run --example loopback
//!
//! Against real hardware, use the CLI instead:
//!   cargo run -- -d /dev/rpmsg0 -n 3

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::net::UnixStream;
    use std::sync::Arc;
    use std::time::Duration;

    use matmul::codec::Matrix;
    use matmul::session::{remote, Reporter, Session, SessionConfig};
    use matmul::transport::Device;

    struct Print;

    impl Reporter for Print {
        fn batch(&self, round: u64, operands: &[Matrix]) {
            for (index, matrix) in operands.iter().enumerate() {
                eprintln!("round {round} operand {index}: {:?}", matrix.rows().collect::<Vec<_>>());
            }
        }

        fn result(&self, round: u64, product: &Matrix) {
            eprintln!("round {round} product:   {:?}", product.rows().collect::<Vec<_>>());
        }
    }

    let config = SessionConfig {
        round_count: 3,
        dimension: 3,
        pace: Duration::ZERO,
        seed: Some(42),
        ..SessionConfig::default()
    };

    let (local, far) = UnixStream::pair()?;
    let dimension = config.dimension;
    let remote = std::thread::spawn(move || remote::serve(far, dimension));

    let summary = Session::new(config, Device::from_unix(local, "loopback"), Arc::new(Print))?.run()?;
    eprintln!("sent {} rounds, reported {}", summary.rounds_sent, summary.rounds_reported);

    let served = remote
        .join()
        .map_err(|_| "remote thread panicked")??;
    eprintln!("remote served {served} requests");
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("the loopback example needs Unix sockets");
}
