pub(crate) mod decode;
pub(crate) mod dump;
pub(crate) mod encode;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Decode a document and print its contents
    Decode {
        #[command(flatten)]
        config: decode::Config,
    },
    /// Encode a JSON document
    Encode {
        #[command(flatten)]
        config: encode::Config,
    },
    /// Show the raw bytes of a document with its element layout
    Dump {
        #[command(flatten)]
        config: dump::Config,
    },
}
