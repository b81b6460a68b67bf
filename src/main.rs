use std::{
    fs::File,
    io::{self, BufReader},
    process::ExitCode,
};

use anyhow::{Context, Result};
use cot_guard::{
    check::run_check,
    cli::{CheckArgs, Command, command_from_args},
    config::Config,
    contracts::{ContractValidator, ValidationMode},
    logging::init_tracing,
};

fn main() -> Result<ExitCode> {
    match command_from_args()? {
        Command::Schema { shape, strict } => {
            let mode = if strict {
                ValidationMode::Strict
            } else {
                ValidationMode::Lenient
            };
            let schema = serde_json::to_string_pretty(&shape.schema(mode))
                .context("failed to encode schema")?;
            println!("{schema}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Check(args) => check(args),
    }
}

fn check(args: CheckArgs) -> Result<ExitCode> {
    let config = Config::resolve(args.config.as_deref())?;
    let _logging_guard = init_tracing(&config.logging)?;

    let mode = if args.strict {
        ValidationMode::Strict
    } else {
        config.validation.mode
    };
    let validator = ContractValidator::new(mode)?;
    let stdout = io::stdout();

    let summary = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            run_check(BufReader::new(file), stdout.lock(), &validator, args.shape)?
        }
        None => run_check(io::stdin().lock(), stdout.lock(), &validator, args.shape)?,
    };

    if summary.rejected > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
