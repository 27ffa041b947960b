//! Stand-alone `podfix verify`. Exits non-zero when any check fails.

use clap::Parser;
use podfix::{CommonArgs, VerifyArgs};
use std::process::ExitCode;

/// Check the iOS include files, base configurations and Pods support files.
#[derive(Parser, Debug)]
#[command(name = "verify-ios-pods", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    args: VerifyArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    podfix::init_tracing(cli.common.verbose);
    podfix::exit_code(podfix::verify(&cli.common, &cli.args))
}
