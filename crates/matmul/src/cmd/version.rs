use matmul_codec::{DEFAULT_DIMENSION, HEADER_SIZE, MAX_DIMENSION};
use matmul_transport::DEFAULT_DEVICE_PATH;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("matmul {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: matmul");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("MATMUL_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("MATMUL_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("default_device: {DEFAULT_DEVICE_PATH}");
    println!(
        "wire: u32-le header ({HEADER_SIZE} bytes) + u32-le elements, default N={DEFAULT_DIMENSION}, max N={MAX_DIMENSION}"
    );

    Ok(SUCCESS)
}
