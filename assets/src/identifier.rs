use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::TypeTag;

pub const ASSET_ID_LEN: usize = 16;

/// The opaque id the CMS hands out for every asset.
/// It carries no type information; 32 hex digits on the wire.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct AssetId([u8; ASSET_ID_LEN]);

#[derive(Error, Debug, PartialEq)]
pub enum IdentifierError {
    #[error("invalid asset id length: {0}")]
    InvalidLen(usize),

    #[error("invalid asset id encoding: {0}")]
    InvalidEncoding(String),
}

impl AssetId {
    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }
}

impl From<[u8; ASSET_ID_LEN]> for AssetId {
    fn from(value: [u8; ASSET_ID_LEN]) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for AssetId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != ASSET_ID_LEN * 2 {
            return Err(IdentifierError::InvalidLen(s.len()));
        }

        let decoded = HEXLOWER_PERMISSIVE
            .decode(s.as_bytes())
            .map_err(|e| IdentifierError::InvalidEncoding(e.to_string()))?;

        let bytes: [u8; ASSET_ID_LEN] = decoded
            .try_into()
            .map_err(|v: Vec<u8>| IdentifierError::InvalidLen(v.len() * 2))?;

        Ok(Self(bytes))
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&HEXLOWER.encode(&self.0))
    }
}

impl std::fmt::Debug for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AssetId({})", HEXLOWER.encode(&self.0))
    }
}

/// Addresses exactly one remote asset: its id together with the type the
/// service expects to be told when reading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Identifier {
    pub id: AssetId,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
}

impl Identifier {
    pub fn new(type_tag: TypeTag, id: AssetId) -> Self {
        Self { id, type_tag }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.type_tag, self.id)
    }
}

/// Pairs a raw id string with a type, validating the id.
pub fn create_id(type_tag: TypeTag, id: &str) -> Result<Identifier, IdentifierError> {
    Ok(Identifier::new(type_tag, id.parse()?))
}
