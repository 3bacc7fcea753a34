use std::io::Write;
use std::process::ExitCode;

use cascade_assets::assetservice;
use cascade_cli::{run, Args};
use clap::Parser;
use mimalloc::MiMalloc;
use tracing::error;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let args = Args::parse();

    let tracing_handle = match cascade_tracing::TracingBuilder::default()
        .level(args.log_level)
        .enable_progressbar()
        .build()
    {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("unable to set up tracing: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let asset_service = match assetservice::from_addr(&args.asset_service_addr) {
        Ok(asset_service) => asset_service,
        Err(e) => {
            error!(err = %e, addr = %args.asset_service_addr, "unable to set up asset service");
            return ExitCode::FAILURE;
        }
    };

    match run(asset_service, &args.command) {
        Ok(output) => {
            if let Err(e) = write!(tracing_handle.get_stdout_writer(), "{}", output) {
                error!(err = %e, "unable to write output");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(err = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}
