use std::process::ExitCode;

fn main() -> ExitCode {
    podfix::run()
}
