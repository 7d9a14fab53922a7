use clap::Parser;
use registry_tag_check::cli::{Args, Runner};
use std::process::ExitCode;

const EXIT_FOUND: u8 = 0;
const EXIT_NOT_FOUND: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let runner = Runner::new(Args::parse());

    let report = match runner.run().await {
        Ok(report) => report,
        Err(e) => {
            runner.output().error(&e.to_string());
            if e.is_auth_related() {
                if let Some(hint) = runner.credential_hint() {
                    runner.output().error(&hint);
                }
            }
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match report.render(runner.format()) {
        Ok(line) => println!("{}", line),
        Err(e) => {
            runner.output().error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    }

    ExitCode::from(if report.exists { EXIT_FOUND } else { EXIT_NOT_FOUND })
}
