use std::fmt::Write;
use std::sync::Arc;

use cascade_assets::assetservice::AssetService;
use cascade_assets::tree::{FunctionTable, TraversalParams};
use cascade_assets::visitors::{self, TraversalResults, PREFIX_KEY};
use cascade_assets::{create_id, resolve_type, AssetTree};
use tracing::{instrument, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

pub mod args;

pub use args::{Args, Commands};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Assets(#[from] cascade_assets::Error),

    #[error(transparent)]
    Identifier(#[from] cascade_assets::IdentifierError),

    #[error("unable to read function table: {0}")]
    FunctionTable(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Runs a single command against `asset_service`, returning what should
/// be printed to stdout.
#[instrument(skip_all, fields(indicatif.pb_show=1), err)]
pub fn run(asset_service: Arc<dyn AssetService>, command: &Commands) -> Result<String, Error> {
    let span = Span::current();
    span.pb_start();
    span.pb_set_style(&cascade_tracing::PB_SPINNER_STYLE);

    let mut output = String::new();
    match command {
        Commands::Tree { type_tag, id, xml } => {
            span.pb_set_message("Building tree…");
            let tree = AssetTree::from_identifier(asset_service, &create_id(*type_tag, id)?)?;

            if *xml {
                output.push_str(&tree.to_xml(0));
            } else {
                output.push_str(&tree.to_list_string());
            }
        }
        Commands::Resolve { id, candidates } => {
            span.pb_set_message("Resolving…");
            let type_tag = resolve_type(asset_service.as_ref(), id, candidates)?;
            let _ = writeln!(output, "{}", type_tag);
        }
        Commands::Traverse {
            type_tag,
            id,
            functions,
            skip_root,
            prefix,
        } => {
            let table: FunctionTable = serde_json::from_reader(std::io::BufReader::new(
                std::fs::File::open(functions)?,
            ))?;

            span.pb_set_message("Building tree…");
            let tree = AssetTree::from_identifier(asset_service, &create_id(*type_tag, id)?)?;

            let mut params = TraversalParams {
                skip_root_container: *skip_root,
                ..Default::default()
            };
            if let Some(prefix) = prefix {
                params = params.with_value(PREFIX_KEY, prefix.as_str());
            }

            span.pb_set_message("Traversing…");
            let mut results = TraversalResults::default();
            tree.traverse_named(&table, &visitors::registry(), &params, &mut results)?;

            output.push_str(&serde_json::to_string_pretty(&results)?);
            output.push('\n');
        }
    }

    Ok(output)
}
