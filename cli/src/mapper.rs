use std::fs;

use bson::{Mapper, MapperBuilder};
use clap::Args;

use crate::error::Result;

/// Mapper policy from the command line. `--options` or `--config` give the
/// base policy and the switches turn options on top of it.
#[derive(Args)]
pub(crate) struct MapperArgs {
    /// Carry tuples and bytearrays through `__metadata__` type metadata
    #[arg(long)]
    keep_types: bool,

    /// Reject element types and binary subtypes instead of skipping them
    #[arg(long)]
    python_only: bool,

    /// Mapper options, e.g. `keep_types=true,python_only`
    #[arg(long, value_name = "OPTIONS", conflicts_with = "config")]
    options: Option<String>,

    /// JSON file with mapper options, e.g. `{"keep_types": true}`
    #[arg(long, value_name = "FILE")]
    config: Option<String>,
}

impl MapperArgs {
    pub(crate) fn mapper(&self) -> Result<Mapper> {
        let base: Mapper = match (&self.options, &self.config) {
            (Some(options), _) => options.parse()?,
            (None, Some(path)) => serde_json::from_slice(&fs::read(path)?)?,
            (None, None) => Mapper::default(),
        };
        let mapper = MapperBuilder::from(base)
            .keep_types(base.keep_types() || self.keep_types)
            .python_only(base.python_only() || self.python_only)
            .build();
        tracing::debug!(?mapper, "resolved mapper");
        Ok(mapper)
    }
}
