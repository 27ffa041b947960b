//! Stand-alone `podfix fix-pods`.

use clap::Parser;
use podfix::{CommonArgs, FixPodsArgs};
use std::process::ExitCode;

/// Rewrite Flutter/{Debug,Profile,Release}.xcconfig and set them as the Runner target's base configurations.
#[derive(Parser, Debug)]
#[command(name = "fix-ios-pods", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    args: FixPodsArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    podfix::init_tracing(cli.common.verbose);
    podfix::exit_code(podfix::fix_pods(&cli.common, &cli.args).map(|()| true))
}
