//! dedup - duplicate file finder
//!
//! Entry point for the dedup CLI application.

use clap::Parser;
use dedup::{
    cli::Cli,
    error::{already_reported, ExitCode, StructuredError},
    logging::init_logging,
};

fn main() {
    // Missing paths or bad flags exit here with usage on stderr
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    init_logging(cli.verbose, cli.quiet);

    match dedup::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::for_error(&err);

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                match serde_json::to_string_pretty(&structured) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("error: {:#}", err),
                }
            } else if !already_reported(&err) {
                eprintln!("error: {:#}", err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
