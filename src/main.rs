use clap::Parser;
use clap::error::ErrorKind;
use filegroup::cli::{Args, EXAMPLE, run_cli};
use filegroup::output::OutputFormatter;
use std::process::ExitCode;

mod logging;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return ExitCode::SUCCESS;
            }
            _ => {
                // Usage goes to stdout.
                println!("{}", e.render());
                println!("{}", EXAMPLE);
                return ExitCode::FAILURE;
            }
        },
    };

    logging::init_tracing(args.verbose);

    match run_cli(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
