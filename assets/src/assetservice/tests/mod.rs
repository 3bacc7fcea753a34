//! This contains test scenarios that a given [AssetService] needs to pass.
//! We use [rstest] and [rstest_reuse] to provide all services we want to test
//! against, and then apply this template to all test functions.

use std::sync::Arc;

use rstest::*;
use rstest_reuse::{self, *};

use super::{AssetService, Operation};
use crate::assetservice;
use crate::fixtures::{self, *};
use crate::{create_id, Error, TypeTag};

/// Writes the site fixtures to a snapshot file and loads it back.
fn snapshot_service() -> Arc<dyn AssetService> {
    let dir = tempfile::tempdir().expect("must create tempdir");
    let path = dir.path().join("snapshot.json");
    std::fs::write(
        &path,
        serde_json::to_vec(&*SITE_PAYLOADS).expect("must serialize"),
    )
    .expect("must write snapshot");

    assetservice::from_addr(&format!("file://{}", path.display())).expect("must load snapshot")
}

/// This produces a template, which will be applied to all individual test functions.
/// See https://github.com/la10736/rstest/issues/130#issuecomment-968864832
#[template]
#[rstest]
#[case::memory(Arc::new(fixtures::memory_service()) as Arc<dyn AssetService>)]
#[case::snapshot(snapshot_service())]
pub fn asset_services(#[case] asset_service: Arc<dyn AssetService>) {}

/// Reading an asset with its right type returns its payload.
#[apply(asset_services)]
fn read(asset_service: Arc<dyn AssetService>) {
    let payload = asset_service
        .read(&create_id(TypeTag::Page, PAGE_INDEX_ID).unwrap())
        .expect("must read");

    assert_eq!(Some(TypeTag::Page), payload.type_tag());
    assert_eq!(PAGE_INDEX_ID.parse().ok(), payload.id());
}

/// The service refuses reads naming the wrong type.
#[apply(asset_services)]
fn read_type_mismatch(asset_service: Arc<dyn AssetService>) {
    assert!(matches!(
        asset_service.read(&create_id(TypeTag::Page, FOLDER_ROOT_ID).unwrap()),
        Err(Error::RemoteOperation(_))
    ));
}

#[apply(asset_services)]
fn read_unknown(asset_service: Arc<dyn AssetService>) {
    assert!(matches!(
        asset_service.read(&create_id(TypeTag::Folder, DUMMY_ID_1).unwrap()),
        Err(Error::RemoteOperation(_))
    ));
}

/// Replies come back in request order, failures included.
#[apply(asset_services)]
fn batch_order(asset_service: Arc<dyn AssetService>) {
    let replies = asset_service
        .batch(vec![
            Operation::read(create_id(TypeTag::Folder, FOLDER_ROOT_ID).unwrap()),
            Operation::read(create_id(TypeTag::Page, FOLDER_ROOT_ID).unwrap()),
            Operation::read(create_id(TypeTag::Page, PAGE_INDEX_ID).unwrap()),
        ])
        .expect("must succeed");

    assert_eq!(
        vec![true, false, true],
        replies.iter().map(|r| r.is_successful()).collect::<Vec<_>>()
    );
    assert!(!replies[1].message().is_empty(), "failures carry a message");
    assert_eq!(
        Some(TypeTag::Page),
        replies[2].asset.as_ref().and_then(|a| a.type_tag())
    );
}

#[apply(asset_services)]
fn publish(asset_service: Arc<dyn AssetService>) {
    asset_service
        .publish(&create_id(TypeTag::Page, PAGE_INDEX_ID).unwrap())
        .expect("pages are publishable");
    asset_service
        .unpublish(&create_id(TypeTag::Page, PAGE_INDEX_ID).unwrap())
        .expect("pages are publishable");

    assert!(matches!(
        asset_service.publish(&create_id(TypeTag::XmlBlock, BLOCK_XML_ID).unwrap()),
        Err(Error::RemoteOperation(_))
    ));
}

#[apply(asset_services)]
fn edit(asset_service: Arc<dyn AssetService>) {
    let identifier = create_id(TypeTag::Page, PAGE_INDEX_ID).unwrap();
    let payload = asset_service.read(&identifier).expect("must read");

    let mut record = payload.record(TypeTag::Page).expect("must have record").clone();
    record.insert("metadata".to_string(), serde_json::json!({"title": "Home"}));
    asset_service
        .edit(assetservice::AssetPayload::new(TypeTag::Page, record))
        .expect("must edit");

    let payload = asset_service.read(&identifier).expect("must read");
    assert_eq!(
        Some(&serde_json::json!({"title": "Home"})),
        payload.record(TypeTag::Page).and_then(|r| r.get("metadata"))
    );
}

#[apply(asset_services)]
fn move_page(asset_service: Arc<dyn AssetService>) {
    let page = create_id(TypeTag::Page, PAGE_INDEX_ID).unwrap();
    asset_service
        .move_asset(
            &page,
            Some(&create_id(TypeTag::Folder, FOLDER_BLOCKS_ID).unwrap()),
            Some("home"),
        )
        .expect("must move");

    let payload = asset_service.read(&page).expect("must read");
    let record = payload.record(TypeTag::Page).expect("must have record");
    assert_eq!(Some("blocks/home"), record.get("path").and_then(|v| v.as_str()));
}
