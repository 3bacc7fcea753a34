use std::sync::Arc;

use tracing::{debug, instrument};
use url::Url;

use super::{AssetPayload, AssetService, MemoryAssetService};
use crate::Error;

/// Constructs a new instance of an [AssetService] from an URI.
///
/// The following URIs are supported:
/// - `memory:`
///   Uses an empty in-memory implementation.
/// - `file:///absolute/path/to/snapshot.json`
///   Loads a JSON array of asset payloads (`[{"folder": {...}}, ...]`) into
///   an in-memory implementation.
#[instrument(err)]
pub fn from_addr(uri: &str) -> Result<Arc<dyn AssetService>, Error> {
    let url =
        Url::parse(uri).map_err(|e| Error::InvalidRequest(format!("unable to parse url: {}", e)))?;

    let asset_service: Arc<dyn AssetService> = match url.scheme() {
        "memory" => {
            // memory doesn't support host or path in the URL.
            if url.has_host() || !url.path().is_empty() {
                return Err(Error::InvalidRequest("invalid url".to_string()));
            }
            Arc::new(MemoryAssetService::default())
        }
        "file" => {
            if url.path().is_empty() || url.path() == "/" {
                return Err(Error::InvalidRequest(
                    "a snapshot path is required".to_string(),
                ));
            }
            let path = url
                .to_file_path()
                .map_err(|_| Error::InvalidRequest(format!("invalid file url: {}", url)))?;

            let payloads: Vec<AssetPayload> =
                serde_json::from_reader(std::io::BufReader::new(std::fs::File::open(&path)?))?;
            debug!(path = %path.display(), assets = payloads.len(), "loaded snapshot");

            Arc::new(MemoryAssetService::from_payloads(payloads)?)
        }
        _ => {
            return Err(Error::InvalidRequest(format!(
                "unknown scheme: {}",
                url.scheme()
            )))
        }
    };

    Ok(asset_service)
}
