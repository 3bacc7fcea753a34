//! Ready-made [TreeFunction]s, all writing into [TraversalResults].
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assetservice::AssetService;
use crate::tree::{FunctionRegistry, TraversalParams, TreeFunction, Visited};
use crate::{Error, Identifier, TypeTag};

/// The [TraversalParams] value [PathPrefixFilter] reads its prefix from.
pub const PREFIX_KEY: &str = "prefix";

/// What the built-in functions found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalResults {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub counts: BTreeMap<TypeTag, usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recycled: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub published: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unpublished: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched: Vec<String>,
}

impl TraversalResults {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Counts visited assets per type.
pub fn count(
    _: &dyn AssetService,
    visited: &Visited<'_>,
    _: &TraversalParams,
    results: &mut TraversalResults,
) -> Result<(), Error> {
    *results.counts.entry(visited.type_tag()).or_default() += 1;
    Ok(())
}

pub fn collect_paths(
    _: &dyn AssetService,
    visited: &Visited<'_>,
    _: &TraversalParams,
    results: &mut TraversalResults,
) -> Result<(), Error> {
    results.paths.push(visited.path().to_string());
    Ok(())
}

pub fn collect_identifiers(
    _: &dyn AssetService,
    visited: &Visited<'_>,
    _: &TraversalParams,
    results: &mut TraversalResults,
) -> Result<(), Error> {
    results.identifiers.push(visited.identifier());
    Ok(())
}

/// Records the paths of listing entries sitting in the recycle bin.
pub fn report_recycled(
    _: &dyn AssetService,
    visited: &Visited<'_>,
    _: &TraversalParams,
    results: &mut TraversalResults,
) -> Result<(), Error> {
    if visited.recycled() {
        warn!(asset.identifier = %visited.identifier(), path = visited.path(), "asset is recycled");
        results.recycled.push(visited.path().to_string());
    }
    Ok(())
}

pub fn publish(
    service: &dyn AssetService,
    visited: &Visited<'_>,
    _: &TraversalParams,
    results: &mut TraversalResults,
) -> Result<(), Error> {
    let identifier = visited.identifier();
    service.publish(&identifier)?;
    results.published.push(identifier);
    Ok(())
}

pub fn unpublish(
    service: &dyn AssetService,
    visited: &Visited<'_>,
    _: &TraversalParams,
    results: &mut TraversalResults,
) -> Result<(), Error> {
    let identifier = visited.identifier();
    service.unpublish(&identifier)?;
    results.unpublished.push(identifier);
    Ok(())
}

pub fn log(
    _: &dyn AssetService,
    visited: &Visited<'_>,
    _: &TraversalParams,
    _: &mut TraversalResults,
) -> Result<(), Error> {
    info!(asset.identifier = %visited.identifier(), path = visited.path(), "visited");
    Ok(())
}

/// Collects the paths of assets below a prefix.
///
/// The prefix given at construction can be overridden per traversal with
/// the [PREFIX_KEY] param.
#[derive(Debug, Clone, Default)]
pub struct PathPrefixFilter {
    prefix: String,
}

impl PathPrefixFilter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn collect(
        &self,
        visited: &Visited<'_>,
        params: &TraversalParams,
        results: &mut TraversalResults,
    ) -> Result<(), Error> {
        let prefix = params.value_str(PREFIX_KEY).unwrap_or(&self.prefix);
        if visited.path().starts_with(prefix) {
            results.matched.push(visited.path().to_string());
        }
        Ok(())
    }

    /// Binds this filter as `PathPrefixFilter:collect`.
    pub fn into_function(self) -> TreeFunction<TraversalResults> {
        TreeFunction::method(
            "PathPrefixFilter",
            "collect",
            move |_, visited, params, results: &mut TraversalResults| {
                self.collect(visited, params, results)
            },
        )
    }
}

/// A registry holding every function in this module.
pub fn registry() -> FunctionRegistry<TraversalResults> {
    let mut registry = FunctionRegistry::new();
    registry
        .register(TreeFunction::function("count", count))
        .register(TreeFunction::function("collect_paths", collect_paths))
        .register(TreeFunction::function("collect_identifiers", collect_identifiers))
        .register(TreeFunction::function("report_recycled", report_recycled))
        .register(TreeFunction::function("publish", publish))
        .register(TreeFunction::function("unpublish", unpublish))
        .register(TreeFunction::function("log", log))
        .register(PathPrefixFilter::default().into_function());
    registry
}
