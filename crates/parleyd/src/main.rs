use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match parleyd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            writeln!(io::stderr().lock(), "parleyd: {error}").ok();
            ExitCode::FAILURE
        }
    }
}
