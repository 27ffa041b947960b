//! Stand-alone `podfix set-bundle-id`.

use clap::Parser;
use podfix::{CommonArgs, SetBundleIdArgs};
use std::process::ExitCode;

/// Set PRODUCT_BUNDLE_IDENTIFIER on every build configuration of the Runner target.
#[derive(Parser, Debug)]
#[command(name = "ios-set-bundle-id", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    args: SetBundleIdArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    podfix::init_tracing(cli.common.verbose);
    podfix::exit_code(podfix::set_bundle_id(&cli.common, &cli.args).map(|()| true))
}
