mod container;
mod errors;
mod identifier;
mod nodes;
mod resolver;
mod types;

pub mod assetservice;
pub mod fixtures;
pub mod tree;
pub mod visitors;

pub use container::Container;
pub use errors::Error;
pub use identifier::{create_id, AssetId, Identifier, IdentifierError, ASSET_ID_LEN};
pub use nodes::{AssetPath, Node};
pub use resolver::{
    resolve_block_type, resolve_connector_type, resolve_format_type, resolve_transport_type,
    resolve_type,
};
pub use tree::{AssetTree, TreeChild};
pub use types::TypeTag;

#[cfg(test)]
mod tests;

// rstest_reuse's apply macro looks the crate up at the crate root.
#[cfg(test)]
#[allow(clippy::single_component_path_imports)]
use rstest_reuse;
