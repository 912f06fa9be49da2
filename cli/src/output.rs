#[derive(Clone, Copy, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Indented tree with element types
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}
