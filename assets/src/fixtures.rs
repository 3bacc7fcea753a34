use lazy_static::lazy_static;
use serde_json::{json, Value};

use crate::assetservice::{AssetPayload, MemoryAssetService};

pub const SITE_ID: &str = "5173e5c17f000001000000000000000a";
pub const SITE_NAME: &str = "www.example.edu";

pub const FOLDER_ROOT_ID: &str = "5173e5c17f0000010000000000000001";
pub const FOLDER_IMAGES_ID: &str = "5173e5c17f0000010000000000000002";
pub const FOLDER_ICONS_ID: &str = "5173e5c17f0000010000000000000003";
pub const FOLDER_BLOCKS_ID: &str = "5173e5c17f0000010000000000000004";
pub const PAGE_INDEX_ID: &str = "5173e5c17f0000010000000000000005";
pub const FILE_LOGO_ID: &str = "5173e5c17f0000010000000000000006";
pub const FILE_ARROW_ID: &str = "5173e5c17f0000010000000000000007";
pub const BLOCK_XML_ID: &str = "5173e5c17f0000010000000000000008";
pub const FORMAT_XSLT_ID: &str = "5173e5c17f0000010000000000000009";
pub const ASSET_FACTORY_CONTAINER_ID: &str = "5173e5c17f0000010000000000000010";
pub const ASSET_FACTORY_ID: &str = "5173e5c17f0000010000000000000011";
pub const FOLDER_EMPTY_ID: &str = "5173e5c17f0000010000000000000012";

pub const EXAMPLE_ROOT_ID: &str = "5173e5c17f0000010000000000000020";
pub const EXAMPLE_ABOUT_ID: &str = "5173e5c17f0000010000000000000021";
pub const EXAMPLE_INDEX_ID: &str = "5173e5c17f0000010000000000000022";

pub const DUMMY_ID_1: &str = "00000000000000000000000000000001";
pub const DUMMY_ID_2: &str = "00000000000000000000000000000002";

fn child(type_tag: &str, id: &str, path: &str, recycled: bool) -> Value {
    json!({
        "id": id,
        "path": {"path": path, "siteId": SITE_ID},
        "type": type_tag,
        "recycled": recycled,
    })
}

fn record(id: &str, name: &str, path: &str, parent: Option<(&str, &str)>) -> Value {
    let mut record = json!({
        "id": id,
        "name": name,
        "path": path,
        "siteId": SITE_ID,
        "siteName": SITE_NAME,
    });
    if let Some((parent_id, parent_path)) = parent {
        record["parentContainerId"] = json!(parent_id);
        record["parentContainerPath"] = json!(parent_path);
    }
    record
}

fn payload(property: &str, record: Value) -> AssetPayload {
    let mut payload = serde_json::Map::new();
    payload.insert(property.to_string(), record);
    serde_json::from_value(Value::Object(payload)).expect("fixture payload must deserialize")
}

fn with_children(mut record: Value, children: Vec<Value>) -> Value {
    record["children"] = Value::Array(children);
    record
}

lazy_static! {
    /// A small site:
    ///
    /// ```text
    /// /                       folder
    /// ├── images              folder
    /// │   ├── logo.png        file
    /// │   └── icons           folder
    /// │       └── arrow.svg   file (recycled)
    /// ├── blocks              folder
    /// │   ├── nav             block_XML
    /// │   └── style           format_XSLT
    /// ├── index               page
    /// └── _factories          assetfactorycontainer
    ///     └── new-page        assetfactory
    /// ```
    ///
    /// Plus an empty folder that isn't listed anywhere.
    pub static ref SITE_PAYLOADS: Vec<AssetPayload> = vec![
        payload("folder", with_children(record(FOLDER_ROOT_ID, "/", "/", None), vec![
            child("folder", FOLDER_IMAGES_ID, "images", false),
            child("folder", FOLDER_BLOCKS_ID, "blocks", false),
            child("page", PAGE_INDEX_ID, "index", false),
            child("assetfactorycontainer", ASSET_FACTORY_CONTAINER_ID, "_factories", false),
        ])),
        payload("folder", with_children(record(FOLDER_IMAGES_ID, "images", "images", Some((FOLDER_ROOT_ID, "/"))), vec![
            child("file", FILE_LOGO_ID, "images/logo.png", false),
            child("folder", FOLDER_ICONS_ID, "images/icons", false),
        ])),
        payload("folder", with_children(record(FOLDER_ICONS_ID, "icons", "images/icons", Some((FOLDER_IMAGES_ID, "images"))), vec![
            child("file", FILE_ARROW_ID, "images/icons/arrow.svg", true),
        ])),
        payload("folder", with_children(record(FOLDER_BLOCKS_ID, "blocks", "blocks", Some((FOLDER_ROOT_ID, "/"))), vec![
            child("block_XML", BLOCK_XML_ID, "blocks/nav", false),
            child("format_XSLT", FORMAT_XSLT_ID, "blocks/style", false),
        ])),
        payload("page", record(PAGE_INDEX_ID, "index", "index", Some((FOLDER_ROOT_ID, "/")))),
        payload("file", record(FILE_LOGO_ID, "logo.png", "images/logo.png", Some((FOLDER_IMAGES_ID, "images")))),
        payload("file", record(FILE_ARROW_ID, "arrow.svg", "images/icons/arrow.svg", Some((FOLDER_ICONS_ID, "images/icons")))),
        payload("xmlBlock", record(BLOCK_XML_ID, "nav", "blocks/nav", Some((FOLDER_BLOCKS_ID, "blocks")))),
        payload("xsltFormat", record(FORMAT_XSLT_ID, "style", "blocks/style", Some((FOLDER_BLOCKS_ID, "blocks")))),
        payload("assetFactoryContainer", with_children(record(ASSET_FACTORY_CONTAINER_ID, "_factories", "_factories", None), vec![
            child("assetfactory", ASSET_FACTORY_ID, "_factories/new-page", false),
        ])),
        payload("assetFactory", record(ASSET_FACTORY_ID, "new-page", "_factories/new-page", Some((ASSET_FACTORY_CONTAINER_ID, "_factories")))),
        payload("folder", record(FOLDER_EMPTY_ID, "empty", "empty", None)),
    ];

    /// root has [about (folder, no children), index (page)].
    pub static ref EXAMPLE_PAYLOADS: Vec<AssetPayload> = vec![
        payload("folder", with_children(record(EXAMPLE_ROOT_ID, "/", "/", None), vec![
            child("folder", EXAMPLE_ABOUT_ID, "about", false),
            child("page", EXAMPLE_INDEX_ID, "index", false),
        ])),
        payload("folder", record(EXAMPLE_ABOUT_ID, "about", "about", Some((EXAMPLE_ROOT_ID, "/")))),
        payload("page", record(EXAMPLE_INDEX_ID, "index", "index", Some((EXAMPLE_ROOT_ID, "/")))),
    ];
}

/// A [MemoryAssetService] holding [SITE_PAYLOADS].
pub fn memory_service() -> MemoryAssetService {
    MemoryAssetService::from_payloads(SITE_PAYLOADS.iter().cloned())
        .expect("fixtures must load")
}

/// A [MemoryAssetService] holding [EXAMPLE_PAYLOADS].
pub fn example_service() -> MemoryAssetService {
    MemoryAssetService::from_payloads(EXAMPLE_PAYLOADS.iter().cloned())
        .expect("fixtures must load")
}
