use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("whts {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: whts");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", env!("WHTS_BUILD_TARGET"));
    println!("profile: {}", env!("WHTS_BUILD_PROFILE"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("default_mtu: {}", whts::frame::DEFAULT_MTU);
    println!(
        "max_receive_buffer: {}",
        whts::frame::MAX_RECEIVE_BUFFER_SIZE
    );
    println!("features: {}", env!("WHTS_BUILD_FEATURES"));
    println!("log_filter_env: {}", crate::logging::LOG_ENV);

    Ok(SUCCESS)
}
