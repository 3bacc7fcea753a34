use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::assetservice::{AssetPayload, AssetService};
use crate::{AssetId, AssetPath, Error, Identifier, Node, TypeTag};

/// The fields of a container record this crate cares about.
/// Everything else is kept verbatim in `properties`, so an edit round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerRecord {
    id: AssetId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    site_id: Option<AssetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_container_id: Option<AssetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_container_path: Option<String>,
    #[serde(default)]
    children: Vec<Node>,
    #[serde(flatten)]
    properties: Map<String, Value>,
}

/// A container asset (folder, asset factory container, ...) read from an
/// [AssetService], together with a handle to that service.
#[derive(Clone)]
pub struct Container {
    service: Arc<dyn AssetService>,
    type_tag: TypeTag,
    record: ContainerRecord,
}

impl Container {
    /// Reads the container behind `identifier`.
    #[instrument(skip_all, fields(container.identifier = %identifier), err)]
    pub fn read(service: Arc<dyn AssetService>, identifier: &Identifier) -> Result<Self, Error> {
        if !identifier.type_tag.is_container() {
            return Err(Error::InvalidRequest(format!(
                "{} is not a container type",
                identifier.type_tag
            )));
        }

        let payload = service.read(identifier)?;
        let container = Self::from_payload(service, identifier.type_tag, payload)?;

        if container.id() != identifier.id {
            return Err(Error::StorageError(format!(
                "requested {}, but got {}",
                identifier,
                container.identifier()
            )));
        }

        Ok(container)
    }

    /// Interprets a payload as a container of the given type.
    pub fn from_payload(
        service: Arc<dyn AssetService>,
        type_tag: TypeTag,
        payload: AssetPayload,
    ) -> Result<Self, Error> {
        let record = payload.into_record(type_tag).ok_or_else(|| {
            Error::NullAsset(format!(
                "payload carries no {} record",
                type_tag.property_name()
            ))
        })?;
        let record: ContainerRecord = serde_json::from_value(Value::Object(record))?;

        Ok(Self {
            service,
            type_tag,
            record,
        })
    }

    pub fn identifier(&self) -> Identifier {
        Identifier::new(self.type_tag, self.record.id)
    }

    pub fn id(&self) -> AssetId {
        self.record.id
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn path(&self) -> &str {
        &self.record.path
    }

    pub fn asset_path(&self) -> AssetPath {
        AssetPath {
            path: self.record.path.clone(),
            site_id: self.record.site_id,
            site_name: self.record.site_name.clone(),
        }
    }

    pub fn site_id(&self) -> Option<AssetId> {
        self.record.site_id
    }

    pub fn site_name(&self) -> Option<&str> {
        self.record.site_name.as_deref()
    }

    pub fn parent_container_path(&self) -> Option<&str> {
        self.record.parent_container_path.as_deref()
    }

    /// The identifier of the container this one is listed in, if any.
    pub fn parent_container_identifier(&self) -> Option<Identifier> {
        let parent_type = self.type_tag.parent_container()?;
        self.record
            .parent_container_id
            .map(|id| Identifier::new(parent_type, id))
    }

    /// Reads the container this one is listed in.
    pub fn read_parent(&self) -> Result<Option<Container>, Error> {
        self.parent_container_identifier()
            .map(|identifier| Container::read(self.service.clone(), &identifier))
            .transpose()
    }

    /// The direct children, in listing order.
    pub fn children(&self) -> &[Node] {
        &self.record.children
    }

    pub fn has_children(&self) -> bool {
        !self.record.children.is_empty()
    }

    pub fn has_child(&self, id: &AssetId) -> bool {
        self.record.children.iter().any(|c| &c.id == id)
    }

    /// Ids of the direct children of the given type, in listing order.
    pub fn child_ids(&self, type_tag: TypeTag) -> Vec<AssetId> {
        self.record
            .children
            .iter()
            .filter(|c| c.type_tag == type_tag)
            .map(|c| c.id)
            .collect()
    }

    /// Additional record fields not modelled explicitly.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.record.properties.get(key)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: Value) {
        self.record.properties.insert(key.into(), value);
    }

    pub fn service(&self) -> &dyn AssetService {
        self.service.as_ref()
    }

    pub fn service_handle(&self) -> Arc<dyn AssetService> {
        self.service.clone()
    }

    pub fn to_payload(&self) -> Result<AssetPayload, Error> {
        match serde_json::to_value(&self.record)? {
            Value::Object(record) => Ok(AssetPayload::new(self.type_tag, record)),
            _ => Err(Error::StorageError(
                "container record did not serialize to an object".to_string(),
            )),
        }
    }

    /// Sends the current state back to the service.
    #[instrument(skip_all, fields(container.identifier = %self.identifier()), err)]
    pub fn edit(&self) -> Result<(), Error> {
        self.service.edit(self.to_payload()?)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("type_tag", &self.type_tag)
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}
