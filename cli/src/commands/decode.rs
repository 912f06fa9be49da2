use clap::Args;

use crate::error::Result;
use crate::format::format_document;
use crate::mapper::MapperArgs;
use crate::output::OutputFormat;
use crate::utils::read_input;

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the document file. If not specified, reads from stdin
    file: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(flatten)]
    mapper: MapperArgs,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input = read_input(config.file.as_deref())?;
    let mapper = config.mapper.mapper()?;
    let document = mapper.unmarshal(&input)?;

    match config.output {
        OutputFormat::Text => print!("{}", format_document(&document)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&document)?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&document)?),
    }

    Ok(())
}
