use std::path::PathBuf;

use cascade_assets::TypeTag;
use clap::{Parser, Subcommand};
use tracing::Level;

/// Inspects and walks the assets of a Cascade site.
///
/// The asset service is selected with `--asset-service-addr`; `memory://`
/// starts out empty, `file:///path/to/snapshot.json` loads a JSON array of
/// asset payloads.
#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// A global log level to use when printing logs.
    /// It's also possible to set `RUST_LOG` according to
    /// `tracing_subscriber::filter::EnvFilter`, which will always have
    /// priority.
    #[arg(long, default_value_t=Level::INFO)]
    pub log_level: Level,

    #[arg(long, env = "CASCADE_ASSET_SERVICE_ADDR", default_value = "memory://")]
    pub asset_service_addr: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Builds the tree below a container and prints it.
    Tree {
        /// Type of the root container, e.g. `folder`.
        type_tag: TypeTag,
        id: String,

        /// Print XML instead of a nested list.
        #[arg(long)]
        xml: bool,
    },

    /// Determines which of the candidate types the asset behind an id is.
    Resolve {
        id: String,

        #[arg(required = true)]
        candidates: Vec<TypeTag>,
    },

    /// Applies a function table to every asset below a container and
    /// prints the collected results as JSON.
    Traverse {
        type_tag: TypeTag,
        id: String,

        /// JSON file mapping asset types to lists of function names.
        #[arg(long)]
        functions: PathBuf,

        /// Don't apply functions to the root container itself.
        #[arg(long)]
        skip_root: bool,

        /// Prefix used by `PathPrefixFilter:collect`.
        #[arg(long)]
        prefix: Option<String>,
    },
}
