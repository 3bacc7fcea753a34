use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::{AssetId, Error, Identifier, TypeTag};

mod from_addr;
mod memory;

#[cfg(test)]
pub mod tests;

pub use self::from_addr::from_addr;
pub use self::memory::MemoryAssetService;

/// A single request understood by the asset service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Read {
        identifier: Identifier,
    },
    Edit {
        asset: AssetPayload,
    },
    #[serde(rename_all = "camelCase")]
    Move {
        identifier: Identifier,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        destination: Option<Identifier>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_name: Option<String>,
    },
    Publish {
        identifier: Identifier,
    },
    Unpublish {
        identifier: Identifier,
    },
}

impl Operation {
    pub fn read(identifier: Identifier) -> Self {
        Operation::Read { identifier }
    }

    /// Short name, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Read { .. } => "read",
            Operation::Edit { .. } => "edit",
            Operation::Move { .. } => "move",
            Operation::Publish { .. } => "publish",
            Operation::Unpublish { .. } => "unpublish",
        }
    }
}

/// The reply to a single [Operation].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetPayload>,
}

impl OperationResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn with_asset(asset: AssetPayload) -> Self {
        Self {
            success: true,
            message: None,
            asset: Some(asset),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            asset: None,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    /// Turns an unsuccessful reply into [Error::RemoteOperation], carrying
    /// the service's message.
    pub fn into_checked(self) -> Result<Self, Error> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::RemoteOperation(self.message().to_string()))
        }
    }
}

/// An asset as the service returns it: an object with a single key (the
/// property name of the asset type) nesting the asset record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetPayload(Map<String, Value>);

impl AssetPayload {
    pub fn new(type_tag: TypeTag, record: Map<String, Value>) -> Self {
        let mut inner = Map::new();
        inner.insert(type_tag.property_name().to_string(), Value::Object(record));
        Self(inner)
    }

    pub fn contains_key(&self, property: &str) -> bool {
        self.0.contains_key(property)
    }

    /// The type of the first registered property present in the payload.
    pub fn type_tag(&self) -> Option<TypeTag> {
        self.0.keys().find_map(|k| TypeTag::from_property_name(k))
    }

    /// The asset record nested under `type_tag`'s property name.
    pub fn record(&self, type_tag: TypeTag) -> Option<&Map<String, Value>> {
        self.0.get(type_tag.property_name()).and_then(Value::as_object)
    }

    pub fn into_record(mut self, type_tag: TypeTag) -> Option<Map<String, Value>> {
        match self.0.remove(type_tag.property_name()) {
            Some(Value::Object(record)) => Some(record),
            _ => None,
        }
    }

    /// The id stored in the record, if any.
    pub fn id(&self) -> Option<AssetId> {
        let type_tag = self.type_tag()?;
        self.record(type_tag)?
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }
}

/// The asset service is the remote side of the CMS. Every call is a
/// blocking round trip.
///
/// Implementations report transport or storage problems as `Err`, and
/// service-level refusals (unknown asset, wrong type, ...) as an
/// [OperationResult] with `success` unset.
pub trait AssetService: Send + Sync {
    /// Performs a single operation.
    fn perform(&self, operation: Operation) -> Result<OperationResult, Error>;

    /// Performs a list of independent operations in one round trip.
    /// Replies come back in request order, one per operation.
    fn batch(&self, operations: Vec<Operation>) -> Result<Vec<OperationResult>, Error> {
        operations.into_iter().map(|op| self.perform(op)).collect()
    }

    /// Reads the asset behind `identifier`.
    #[instrument(skip_all, fields(asset.identifier = %identifier), err)]
    fn read(&self, identifier: &Identifier) -> Result<AssetPayload, Error> {
        self.perform(Operation::read(*identifier))?
            .into_checked()?
            .asset
            .ok_or_else(|| Error::NullAsset(identifier.to_string()))
    }

    fn edit(&self, asset: AssetPayload) -> Result<(), Error> {
        self.perform(Operation::Edit { asset })?.into_checked()?;
        Ok(())
    }

    /// Moves and/or renames an asset.
    fn move_asset(
        &self,
        identifier: &Identifier,
        destination: Option<&Identifier>,
        new_name: Option<&str>,
    ) -> Result<(), Error> {
        self.perform(Operation::Move {
            identifier: *identifier,
            destination: destination.copied(),
            new_name: new_name.map(str::to_string),
        })?
        .into_checked()?;
        Ok(())
    }

    fn publish(&self, identifier: &Identifier) -> Result<(), Error> {
        self.perform(Operation::Publish {
            identifier: *identifier,
        })?
        .into_checked()?;
        Ok(())
    }

    fn unpublish(&self, identifier: &Identifier) -> Result<(), Error> {
        self.perform(Operation::Unpublish {
            identifier: *identifier,
        })?
        .into_checked()?;
        Ok(())
    }
}

impl<A> AssetService for A
where
    A: AsRef<dyn AssetService> + Send + Sync,
{
    fn perform(&self, operation: Operation) -> Result<OperationResult, Error> {
        self.as_ref().perform(operation)
    }

    fn batch(&self, operations: Vec<Operation>) -> Result<Vec<OperationResult>, Error> {
        self.as_ref().batch(operations)
    }

    fn read(&self, identifier: &Identifier) -> Result<AssetPayload, Error> {
        self.as_ref().read(identifier)
    }
}
