use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{instrument, warn};

use super::{AssetPayload, AssetService, Operation, OperationResult};
use crate::{AssetId, Error, Identifier, Node, TypeTag};

#[derive(Debug, Clone)]
struct StoredAsset {
    type_tag: TypeTag,
    record: Map<String, Value>,
}

/// An asset service keeping everything in memory.
///
/// It behaves like the remote service where it matters for callers: reads
/// only succeed if the caller names the right type, and containers keep
/// their child listings in sync on moves.
#[derive(Clone, Default)]
pub struct MemoryAssetService {
    db: Arc<RwLock<HashMap<AssetId, StoredAsset>>>,
    published: Arc<RwLock<HashSet<AssetId>>>,
}

fn not_found(identifier: &Identifier) -> OperationResult {
    OperationResult::failure(format!(
        "Unable to identify an entity based on provided entity path or entity id: {}",
        identifier
    ))
}

/// Joins a container path and a child name the way the CMS does: children
/// of the site root ("/") have no leading slash.
fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() || parent == "/" {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

fn str_field<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

impl MemoryAssetService {
    /// Builds a service holding the given assets.
    pub fn from_payloads(payloads: impl IntoIterator<Item = AssetPayload>) -> Result<Self, Error> {
        let service = Self::default();
        for payload in payloads {
            service.put(payload)?;
        }
        Ok(service)
    }

    /// Stores (or replaces) an asset, returning its identifier.
    /// The payload must nest a record with an `id` under a registered
    /// property name.
    #[instrument(skip_all, err)]
    pub fn put(&self, payload: AssetPayload) -> Result<Identifier, Error> {
        let type_tag = payload
            .type_tag()
            .ok_or_else(|| Error::InvalidRequest("payload has no known asset type".to_string()))?;
        let id = payload
            .id()
            .ok_or_else(|| Error::InvalidRequest(format!("{} payload has no valid id", type_tag)))?;
        let record = payload
            .into_record(type_tag)
            .ok_or_else(|| Error::InvalidRequest(format!("{} payload is not an object", type_tag)))?;

        self.db.write().insert(id, StoredAsset { type_tag, record });

        Ok(Identifier::new(type_tag, id))
    }

    pub fn len(&self) -> usize {
        self.db.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.read().is_empty()
    }

    pub fn is_published(&self, id: &AssetId) -> bool {
        self.published.read().contains(id)
    }

    fn read_stored(&self, identifier: &Identifier) -> OperationResult {
        match self.db.read().get(&identifier.id) {
            Some(stored) if stored.type_tag == identifier.type_tag => OperationResult::with_asset(
                AssetPayload::new(stored.type_tag, stored.record.clone()),
            ),
            _ => not_found(identifier),
        }
    }

    fn edit_stored(&self, asset: AssetPayload) -> OperationResult {
        let Some(type_tag) = asset.type_tag() else {
            return OperationResult::failure("payload has no known asset type");
        };
        let Some(id) = asset.id() else {
            return OperationResult::failure(format!("{} payload has no valid id", type_tag));
        };
        let Some(mut record) = asset.into_record(type_tag) else {
            return OperationResult::failure(format!("{} payload is not an object", type_tag));
        };

        let mut db = self.db.write();
        match db.get_mut(&id) {
            Some(stored) if stored.type_tag == type_tag => {
                // The child listing is owned by the service, not the editor.
                if let Some(children) = stored.record.get("children") {
                    record.insert("children".to_string(), children.clone());
                }
                stored.record = record;
                OperationResult::ok()
            }
            _ => not_found(&Identifier::new(type_tag, id)),
        }
    }

    fn move_stored(
        &self,
        identifier: &Identifier,
        destination: Option<&Identifier>,
        new_name: Option<&str>,
    ) -> Result<OperationResult, Error> {
        let mut db = self.db.write();

        let asset = match db.get(&identifier.id) {
            Some(stored) if stored.type_tag == identifier.type_tag => stored.clone(),
            _ => return Ok(not_found(identifier)),
        };

        let old_parent = str_field(&asset.record, "parentContainerId")
            .and_then(|s| s.parse::<AssetId>().ok());

        let (parent_id, parent_path) = match destination {
            Some(destination) => {
                if Some(destination.type_tag) != identifier.type_tag.parent_container() {
                    return Ok(OperationResult::failure(format!(
                        "a {} cannot be moved into a {}",
                        identifier.type_tag, destination.type_tag
                    )));
                }
                match db.get(&destination.id) {
                    Some(stored) if stored.type_tag == destination.type_tag => (
                        Some(destination.id),
                        str_field(&stored.record, "path").unwrap_or_default().to_string(),
                    ),
                    _ => return Ok(not_found(destination)),
                }
            }
            None => (
                old_parent,
                str_field(&asset.record, "parentContainerPath")
                    .unwrap_or_default()
                    .to_string(),
            ),
        };

        if is_ancestor_or_self(&db, identifier.id, parent_id) {
            return Ok(OperationResult::failure(
                "cannot move an asset into itself or below itself",
            ));
        }

        let name = match new_name {
            Some(name) => name.to_string(),
            None => str_field(&asset.record, "name")
                .unwrap_or_default()
                .to_string(),
        };
        let path = join_path(&parent_path, &name);

        let mut node = Node::new(identifier.type_tag, identifier.id, Default::default());
        node.path.path = path.clone();

        // Drop the entry from the old parent's listing, unless this is a
        // rename in place, which keeps the listing position.
        let renamed_in_place = parent_id == old_parent;
        if let Some(stored) = old_parent.and_then(|id| db.get_mut(&id)) {
            if let Some(Value::Array(children)) = stored.record.get_mut("children") {
                if renamed_in_place {
                    for child in children
                        .iter_mut()
                        .filter(|c| child_id(c) == Some(identifier.id))
                    {
                        if let Some(entry) = child.get_mut("path").and_then(Value::as_object_mut) {
                            entry.insert("path".to_string(), Value::String(path.clone()));
                        }
                    }
                } else {
                    children.retain(|c| child_id(c) != Some(identifier.id));
                }
            }
        }

        // Append it to the new parent's listing.
        if let Some(stored) = parent_id
            .filter(|_| !renamed_in_place)
            .and_then(|id| db.get_mut(&id))
        {
            if let Some(site_id) = str_field(&stored.record, "siteId") {
                node.path.site_id = site_id.parse().ok();
            }
            let entry = serde_json::to_value(&node)?;
            match stored.record.get_mut("children") {
                Some(Value::Array(children)) => children.push(entry),
                _ => {
                    stored
                        .record
                        .insert("children".to_string(), Value::Array(vec![entry]));
                }
            }
        }

        let Some(stored) = db.get_mut(&identifier.id) else {
            warn!(asset.identifier = %identifier, "asset vanished while moving");
            return Err(Error::StorageError(format!("{} vanished", identifier)));
        };
        let record = &mut stored.record;
        record.insert("name".to_string(), Value::String(name));
        record.insert("path".to_string(), Value::String(path.clone()));
        record.insert("parentContainerPath".to_string(), Value::String(parent_path));
        if let Some(parent_id) = parent_id {
            record.insert(
                "parentContainerId".to_string(),
                Value::String(parent_id.to_string()),
            );
        }

        if identifier.type_tag.is_container() {
            rewrite_descendant_paths(&mut db, identifier.id, path);
        }

        Ok(OperationResult::ok())
    }

    fn set_published(&self, identifier: &Identifier, published: bool) -> OperationResult {
        match self.db.read().get(&identifier.id) {
            Some(stored) if stored.type_tag == identifier.type_tag => {}
            _ => return not_found(identifier),
        }
        if !identifier.type_tag.is_publishable() {
            return OperationResult::failure(format!(
                "assets of type {} cannot be published",
                identifier.type_tag
            ));
        }

        let mut set = self.published.write();
        if published {
            set.insert(identifier.id);
        } else {
            set.remove(&identifier.id);
        }
        OperationResult::ok()
    }
}

fn child_id(value: &Value) -> Option<AssetId> {
    value
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}

fn parent_of(db: &HashMap<AssetId, StoredAsset>, id: &AssetId) -> Option<AssetId> {
    db.get(id)
        .and_then(|stored| str_field(&stored.record, "parentContainerId"))
        .and_then(|s| s.parse().ok())
}

/// Whether `id` is `start` or one of its ancestors, following
/// `parentContainerId` links. The walk stops after visiting every stored
/// asset once, so a corrupt parent cycle cannot hang it.
fn is_ancestor_or_self(
    db: &HashMap<AssetId, StoredAsset>,
    id: AssetId,
    start: Option<AssetId>,
) -> bool {
    let mut cursor = start;
    for _ in 0..=db.len() {
        match cursor {
            Some(current) if current == id => return true,
            Some(current) => cursor = parent_of(db, &current),
            None => return false,
        }
    }
    false
}

/// Recomputes the stored paths of everything below a container after it
/// moved or was renamed: each child's record and its entry in the parent's
/// listing.
fn rewrite_descendant_paths(
    db: &mut HashMap<AssetId, StoredAsset>,
    root: AssetId,
    root_path: String,
) {
    let mut pending = vec![(root, root_path)];
    let mut seen = HashSet::new();

    while let Some((container_id, container_path)) = pending.pop() {
        if !seen.insert(container_id) {
            continue;
        }

        let moved: HashMap<AssetId, String> =
            match db.get(&container_id).and_then(|s| s.record.get("children")) {
                Some(Value::Array(children)) => children
                    .iter()
                    .filter_map(|child| {
                        let id = child_id(child)?;
                        let name = db
                            .get(&id)
                            .and_then(|stored| str_field(&stored.record, "name"))
                            .or_else(|| {
                                child
                                    .pointer("/path/path")
                                    .and_then(Value::as_str)
                                    .and_then(|p| p.rsplit('/').next())
                            })?;
                        Some((id, join_path(&container_path, name)))
                    })
                    .collect(),
                _ => continue,
            };

        if let Some(Value::Array(children)) = db
            .get_mut(&container_id)
            .and_then(|s| s.record.get_mut("children"))
        {
            for child in children.iter_mut() {
                let Some(path) = child_id(child).and_then(|id| moved.get(&id)) else {
                    continue;
                };
                if let Some(entry) = child.get_mut("path").and_then(Value::as_object_mut) {
                    entry.insert("path".to_string(), Value::String(path.clone()));
                }
            }
        }

        for (id, path) in moved {
            let Some(stored) = db.get_mut(&id) else {
                continue;
            };
            stored
                .record
                .insert("path".to_string(), Value::String(path.clone()));
            stored.record.insert(
                "parentContainerPath".to_string(),
                Value::String(container_path.clone()),
            );
            if stored.type_tag.is_container() {
                pending.push((id, path));
            }
        }
    }
}

impl AssetService for MemoryAssetService {
    #[instrument(skip_all, fields(operation = operation.kind()))]
    fn perform(&self, operation: Operation) -> Result<OperationResult, Error> {
        Ok(match operation {
            Operation::Read { identifier } => self.read_stored(&identifier),
            Operation::Edit { asset } => self.edit_stored(asset),
            Operation::Move {
                identifier,
                destination,
                new_name,
            } => self.move_stored(&identifier, destination.as_ref(), new_name.as_deref())?,
            Operation::Publish { identifier } => self.set_published(&identifier, true),
            Operation::Unpublish { identifier } => self.set_published(&identifier, false),
        })
    }
}
