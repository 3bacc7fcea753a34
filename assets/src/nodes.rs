//! Entries of a container's child listing.
use serde::{Deserialize, Serialize};

use crate::assetservice::{AssetPayload, AssetService};
use crate::{AssetId, Error, Identifier, TypeTag};

/// Where an asset lives: its path inside a site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPath {
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<AssetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
}

impl AssetPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

impl std::fmt::Display for AssetPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// A lightweight reference to a child asset, as found in a container
/// listing. It doesn't carry the child's payload; use [Node::read] for that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: AssetId,
    #[serde(default)]
    pub path: AssetPath,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    #[serde(default)]
    pub recycled: bool,
}

impl Node {
    pub fn new(type_tag: TypeTag, id: AssetId, path: AssetPath) -> Self {
        Self {
            id,
            path,
            type_tag,
            recycled: false,
        }
    }

    pub fn identifier(&self) -> Identifier {
        Identifier::new(self.type_tag, self.id)
    }

    /// Fetches the full asset this node points to.
    pub fn read(&self, service: &dyn AssetService) -> Result<AssetPayload, Error> {
        service.read(&self.identifier())
    }
}
