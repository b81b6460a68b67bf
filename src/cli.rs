use std::{env, path::PathBuf};

use anyhow::{Result, anyhow};

use crate::contracts::ContractShape;

const USAGE: &str = "usage: cot-guard check <response|transaction> [--input <path>] [--config <path>] [--strict]\n       cot-guard schema <response|transaction> [--strict]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check(CheckArgs),
    Schema { shape: ContractShape, strict: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckArgs {
    pub shape: ContractShape,
    /// NDJSON source; stdin when unset.
    pub input: Option<PathBuf>,
    pub config: Option<PathBuf>,
    /// Overrides `validation.mode` from config.
    pub strict: bool,
}

pub fn command_from_args() -> Result<Command> {
    parse_command(env::args().skip(1))
}

pub fn parse_command(args: impl IntoIterator<Item = String>) -> Result<Command> {
    let mut args = args.into_iter();
    let subcommand = args.next().ok_or_else(|| anyhow!("missing command. {USAGE}"))?;
    let shape = args
        .next()
        .ok_or_else(|| anyhow!("missing shape. {USAGE}"))?
        .parse::<ContractShape>()
        .map_err(|err| anyhow!("{err}. {USAGE}"))?;

    let mut input = None;
    let mut config = None;
    let mut strict = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--strict" => strict = true,
            "--input" if subcommand == "check" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --input"))?;
                input = Some(PathBuf::from(value));
            }
            "--config" if subcommand == "check" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --config"))?;
                config = Some(PathBuf::from(value));
            }
            other => {
                return Err(anyhow!("unknown argument: {other}. {USAGE}"));
            }
        }
    }

    match subcommand.as_str() {
        "check" => Ok(Command::Check(CheckArgs {
            shape,
            input,
            config,
            strict,
        })),
        "schema" => Ok(Command::Schema { shape, strict }),
        other => Err(anyhow!("unknown command: {other}. {USAGE}")),
    }
}
