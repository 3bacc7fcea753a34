//! Discovering the type of an asset from a bare id.
//!
//! Asset ids carry no type information, and the service refuses a read
//! unless it is told the right type. We ask for every candidate type in a
//! single batch, so resolution costs one round trip no matter how many
//! candidates there are.
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::assetservice::{AssetService, Operation};
use crate::{create_id, Error, TypeTag};

/// Determines which of `candidates` the asset behind `id` is.
///
/// The first successful read in candidate order decides: its payload is
/// matched against the property names of the whole registry. The result is
/// always one of `candidates`; anything else is [Error::TypeResolution].
#[instrument(skip(service), err)]
pub fn resolve_type(
    service: &dyn AssetService,
    id: &str,
    candidates: &[TypeTag],
) -> Result<TypeTag, Error> {
    let resolution_error = || Error::TypeResolution {
        id: id.to_string(),
        candidates: candidates.iter().join(", "),
    };

    if candidates.is_empty() {
        return Err(resolution_error());
    }

    let operations = candidates
        .iter()
        .map(|type_tag| Ok::<_, Error>(Operation::read(create_id(*type_tag, id)?)))
        .collect::<Result<Vec<_>, _>>()?;

    let replies = service.batch(operations)?;
    if replies.len() != candidates.len() {
        return Err(Error::RemoteOperation(format!(
            "batch returned {} replies for {} operations",
            replies.len(),
            candidates.len()
        )));
    }

    let Some(payload) = replies
        .iter()
        .find(|reply| reply.is_successful())
        .and_then(|reply| reply.asset.as_ref())
    else {
        debug!("no candidate read succeeded");
        return Err(resolution_error());
    };

    match TypeTag::ALL
        .iter()
        .find(|type_tag| payload.contains_key(type_tag.property_name()))
    {
        Some(type_tag) if candidates.contains(type_tag) => Ok(*type_tag),
        Some(type_tag) => {
            debug!(%type_tag, "payload matched a type outside the candidates");
            Err(resolution_error())
        }
        None => {
            debug!("payload matched no registered property name");
            Err(resolution_error())
        }
    }
}

/// Resolves which kind of block `id` is.
pub fn resolve_block_type(service: &dyn AssetService, id: &str) -> Result<TypeTag, Error> {
    resolve_type(service, id, TypeTag::BLOCK_TYPES)
}

/// Resolves which kind of format `id` is.
pub fn resolve_format_type(service: &dyn AssetService, id: &str) -> Result<TypeTag, Error> {
    resolve_type(service, id, TypeTag::FORMAT_TYPES)
}

pub fn resolve_transport_type(service: &dyn AssetService, id: &str) -> Result<TypeTag, Error> {
    resolve_type(service, id, TypeTag::TRANSPORT_TYPES)
}

pub fn resolve_connector_type(service: &dyn AssetService, id: &str) -> Result<TypeTag, Error> {
    resolve_type(service, id, TypeTag::CONNECTOR_TYPES)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{resolve_block_type, resolve_format_type, resolve_type};
    use crate::assetservice::{AssetPayload, AssetService, Operation, OperationResult};
    use crate::fixtures::{self, BLOCK_XML_ID, FOLDER_ROOT_ID, FORMAT_XSLT_ID};
    use crate::tests::CountingAssetService;
    use crate::{Error, TypeTag};

    #[rstest]
    #[case::xml_block(BLOCK_XML_ID, TypeTag::XmlBlock)]
    #[case::xslt_format(FORMAT_XSLT_ID, TypeTag::XsltFormat)]
    #[case::folder(FOLDER_ROOT_ID, TypeTag::Folder)]
    fn resolves_among_all_types(#[case] id: &str, #[case] expected: TypeTag) {
        let service = CountingAssetService::new(fixtures::memory_service());

        assert_eq!(Ok(expected), resolve_type(&service, id, TypeTag::ALL));
        assert_eq!(1, service.batches(), "resolution must be a single batch");
        assert_eq!(0, service.performed(), "no single reads may be issued");
    }

    #[test]
    fn resolves_block_and_format() {
        let service = fixtures::memory_service();

        assert_eq!(Ok(TypeTag::XmlBlock), resolve_block_type(&service, BLOCK_XML_ID));
        assert_eq!(
            Ok(TypeTag::XsltFormat),
            resolve_format_type(&service, FORMAT_XSLT_ID)
        );
    }

    #[test]
    fn no_candidate_matches() {
        let service = fixtures::memory_service();

        // a folder is neither of the format types.
        assert!(matches!(
            resolve_format_type(&service, FOLDER_ROOT_ID),
            Err(Error::TypeResolution { .. })
        ));
    }

    #[test]
    fn unknown_id() {
        let service = fixtures::memory_service();

        assert!(matches!(
            resolve_type(&service, "ffffffffffffffffffffffffffffffff", TypeTag::ALL),
            Err(Error::TypeResolution { .. })
        ));
    }

    #[test]
    fn empty_candidates() {
        let service = CountingAssetService::new(fixtures::memory_service());

        assert!(matches!(
            resolve_type(&service, BLOCK_XML_ID, &[]),
            Err(Error::TypeResolution { .. })
        ));
        assert_eq!(0, service.batches());
    }

    #[test]
    fn invalid_id() {
        let service = fixtures::memory_service();

        assert!(matches!(
            resolve_block_type(&service, "not-an-id"),
            Err(Error::InvalidRequest(_))
        ));
    }

    /// A service that claims success for every read, and answers with a
    /// fixed payload.
    struct FixedReplyService(Option<AssetPayload>);

    impl AssetService for FixedReplyService {
        fn perform(&self, _operation: Operation) -> Result<OperationResult, Error> {
            Ok(OperationResult {
                success: true,
                message: None,
                asset: self.0.clone(),
            })
        }
    }

    #[test]
    fn successful_read_with_unknown_property() {
        let payload: AssetPayload =
            serde_json::from_value(json!({"somethingElse": {"id": BLOCK_XML_ID}})).unwrap();
        let service = FixedReplyService(Some(payload));

        assert!(matches!(
            resolve_block_type(&service, BLOCK_XML_ID),
            Err(Error::TypeResolution { .. })
        ));
    }

    #[test]
    fn successful_read_without_payload() {
        let service = FixedReplyService(None);

        assert!(matches!(
            resolve_block_type(&service, BLOCK_XML_ID),
            Err(Error::TypeResolution { .. })
        ));
    }

    #[test]
    fn payload_outside_candidates() {
        let payload: AssetPayload =
            serde_json::from_value(json!({"folder": {"id": BLOCK_XML_ID}})).unwrap();
        let service = FixedReplyService(Some(payload));

        assert!(matches!(
            resolve_block_type(&service, BLOCK_XML_ID),
            Err(Error::TypeResolution { .. })
        ));
    }

    #[test]
    fn first_success_wins() {
        // Every read "succeeds" with a text block payload, so the first
        // candidate's reply decides, and it names textBlock.
        let payload: AssetPayload =
            serde_json::from_value(json!({"textBlock": {"id": BLOCK_XML_ID}})).unwrap();
        let service = FixedReplyService(Some(payload));

        assert_eq!(
            Ok(TypeTag::TextBlock),
            resolve_type(&service, BLOCK_XML_ID, &[TypeTag::XmlBlock, TypeTag::TextBlock])
        );
    }
}
