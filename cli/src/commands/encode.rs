use std::io::{self, Write};

use clap::Args;

use crate::error::Result;
use crate::json::to_object;
use crate::mapper::MapperArgs;
use crate::utils::{format_hex_dump, read_input};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the JSON document. If not specified, reads from stdin
    file: Option<String>,

    /// Output as hexadecimal dump instead of binary
    #[arg(long)]
    hex: bool,

    #[command(flatten)]
    mapper: MapperArgs,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input = read_input(config.file.as_deref())?;
    let json: serde_json::Value = serde_json::from_str(&String::from_utf8(input)?)?;
    let object = to_object(&json)?;

    let bytes = config.mapper.mapper()?.marshal(&object)?;

    if config.hex {
        print!("{}", format_hex_dump(&bytes));
    } else {
        io::stdout().write_all(&bytes)?;
    }

    Ok(())
}
