//! Walking an [AssetTree] and applying functions per asset type.
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::{AssetTree, TreeChild};
use crate::assetservice::AssetService;
use crate::{AssetId, Container, Error, Identifier, Node, TypeTag};

/// Signature of a free function that can be applied to visited assets.
pub type TreeFunctionFn<R> =
    fn(&dyn AssetService, &Visited<'_>, &TraversalParams, &mut R) -> Result<(), Error>;

type BoundMethodFn<R> = Arc<
    dyn Fn(&dyn AssetService, &Visited<'_>, &TraversalParams, &mut R) -> Result<(), Error>
        + Send
        + Sync,
>;

/// Something applied to an asset during a traversal.
pub enum TreeFunction<R> {
    /// A free function, registered under `name`.
    Function { name: String, f: TreeFunctionFn<R> },
    /// A method bound to some state, registered under `class:method`.
    Method {
        class: String,
        method: String,
        f: BoundMethodFn<R>,
    },
}

impl<R> TreeFunction<R> {
    pub fn function(name: impl Into<String>, f: TreeFunctionFn<R>) -> Self {
        TreeFunction::Function {
            name: name.into(),
            f,
        }
    }

    pub fn method<F>(class: impl Into<String>, method: impl Into<String>, f: F) -> Self
    where
        F: Fn(&dyn AssetService, &Visited<'_>, &TraversalParams, &mut R) -> Result<(), Error>
            + Send
            + Sync
            + 'static,
    {
        TreeFunction::Method {
            class: class.into(),
            method: method.into(),
            f: Arc::new(f),
        }
    }

    /// The name this function is looked up by in a [FunctionTable].
    pub fn name(&self) -> String {
        match self {
            TreeFunction::Function { name, .. } => name.clone(),
            TreeFunction::Method { class, method, .. } => format!("{}:{}", class, method),
        }
    }

    pub fn call(
        &self,
        service: &dyn AssetService,
        visited: &Visited<'_>,
        params: &TraversalParams,
        results: &mut R,
    ) -> Result<(), Error> {
        match self {
            TreeFunction::Function { f, .. } => f(service, visited, params, results),
            TreeFunction::Method { f, .. } => f(service, visited, params, results),
        }
    }
}

impl<R> Clone for TreeFunction<R> {
    fn clone(&self) -> Self {
        match self {
            TreeFunction::Function { name, f } => TreeFunction::Function {
                name: name.clone(),
                f: *f,
            },
            TreeFunction::Method { class, method, f } => TreeFunction::Method {
                class: class.clone(),
                method: method.clone(),
                f: f.clone(),
            },
        }
    }
}

impl<R> std::fmt::Debug for TreeFunction<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeFunction({})", self.name())
    }
}

/// The asset a [TreeFunction] is applied to: the root of a (sub)tree, or a
/// leaf from a listing.
#[derive(Debug, Clone, Copy)]
pub enum Visited<'a> {
    Container(&'a Container),
    Node(&'a Node),
}

impl Visited<'_> {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Visited::Container(container) => container.type_tag(),
            Visited::Node(node) => node.type_tag,
        }
    }

    pub fn id(&self) -> AssetId {
        match self {
            Visited::Container(container) => container.id(),
            Visited::Node(node) => node.id,
        }
    }

    pub fn identifier(&self) -> Identifier {
        Identifier::new(self.type_tag(), self.id())
    }

    pub fn path(&self) -> &str {
        match self {
            Visited::Container(container) => container.path(),
            Visited::Node(node) => &node.path.path,
        }
    }

    /// Containers are never reported as recycled, only listing entries are.
    pub fn recycled(&self) -> bool {
        match self {
            Visited::Container(_) => false,
            Visited::Node(node) => node.recycled,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Visited::Container(_))
    }
}

/// Known [TreeFunction]s, by name.
pub struct FunctionRegistry<R> {
    functions: HashMap<String, TreeFunction<R>>,
}

impl<R> Default for FunctionRegistry<R> {
    fn default() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }
}

impl<R> FunctionRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function under its name, replacing any previous one.
    pub fn register(&mut self, function: TreeFunction<R>) -> &mut Self {
        self.functions.insert(function.name(), function);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TreeFunction<R>> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Function names per asset type, as loaded from configuration.
///
/// Empty and null entries are accepted and do nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionTable(BTreeMap<TypeTag, Vec<Option<String>>>);

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a function name to the list for `type_tag`.
    pub fn with(mut self, type_tag: TypeTag, name: impl Into<String>) -> Self {
        self.0.entry(type_tag).or_default().push(Some(name.into()));
        self
    }

    pub fn entries(&self, type_tag: TypeTag) -> &[Option<String>] {
        self.0.get(&type_tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// Looks up every name in `registry`, failing on the first unknown
    /// one.
    pub fn resolve<R>(&self, registry: &FunctionRegistry<R>) -> Result<DispatchTable<R>, Error> {
        let mut table = DispatchTable::new();
        for (type_tag, names) in &self.0 {
            let names = names
                .iter()
                .flatten()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty());

            for name in names {
                let function = registry.get(name).ok_or_else(|| {
                    Error::NoSuchFunction(format!("{} (listed for {})", name, type_tag))
                })?;
                table = table.with(*type_tag, function.clone());
            }
        }
        Ok(table)
    }
}

/// Validated functions per asset type, ready to be applied.
pub struct DispatchTable<R> {
    functions: HashMap<TypeTag, Vec<TreeFunction<R>>>,
}

impl<R> Default for DispatchTable<R> {
    fn default() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }
}

impl<R> Clone for DispatchTable<R> {
    fn clone(&self) -> Self {
        Self {
            functions: self.functions.clone(),
        }
    }
}

impl<R> std::fmt::Debug for DispatchTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.functions.iter()).finish()
    }
}

impl<R> DispatchTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, type_tag: TypeTag, function: TreeFunction<R>) -> Self {
        self.functions.entry(type_tag).or_default().push(function);
        self
    }

    pub fn functions(&self, type_tag: TypeTag) -> &[TreeFunction<R>] {
        self.functions
            .get(&type_tag)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.values().all(Vec::is_empty)
    }

    fn apply(
        &self,
        service: &dyn AssetService,
        visited: Visited<'_>,
        params: &TraversalParams,
        results: &mut R,
    ) -> Result<(), Error> {
        for function in self.functions(visited.type_tag()) {
            debug!(asset.identifier = %visited.identifier(), function = %function.name(), "applying");
            function.call(service, &visited, params, results)?;
        }
        Ok(())
    }
}

/// Parameters handed to every function during a traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalParams {
    /// Don't apply functions to the root of the traversed tree. Nested
    /// containers are still visited.
    #[serde(default)]
    pub skip_root_container: bool,
    /// Free-form values for functions to pick up.
    #[serde(default)]
    pub values: Map<String, Value>,
}

impl TraversalParams {
    pub fn skipping_root() -> Self {
        Self {
            skip_root_container: true,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn value_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }
}

impl AssetTree {
    /// Applies `table` to every asset in the tree, depth first, each
    /// container before its children, children in listing order.
    ///
    /// The first failing function aborts the traversal; whatever was
    /// written to `results` until then stays there.
    #[instrument(skip_all, fields(container.identifier = %self.root().identifier()), err)]
    pub fn traverse<R>(
        &self,
        table: &DispatchTable<R>,
        params: &TraversalParams,
        results: &mut R,
    ) -> Result<&Self, Error> {
        let service = self.root().service();

        let params = if params.skip_root_container {
            debug!("skipping root container");
            Cow::Owned(TraversalParams {
                skip_root_container: false,
                ..params.clone()
            })
        } else {
            table.apply(service, Visited::Container(self.root()), params, results)?;
            Cow::Borrowed(params)
        };

        for child in self.children().into_iter().flatten() {
            match child {
                TreeChild::Tree(tree) => {
                    tree.traverse(table, &params, results)?;
                }
                TreeChild::Node(node) => {
                    table.apply(service, Visited::Node(node), &params, results)?
                }
            }
        }

        Ok(self)
    }

    /// Resolves `table` against `registry`, then traverses. Nothing is
    /// applied if any name is unknown.
    pub fn traverse_named<R>(
        &self,
        table: &FunctionTable,
        registry: &FunctionRegistry<R>,
        params: &TraversalParams,
        results: &mut R,
    ) -> Result<&Self, Error> {
        let table = table.resolve(registry)?;
        self.traverse(&table, params, results)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::fixtures::{self, *};
    use crate::create_id;

    type Trace = Vec<String>;

    fn record(
        _: &dyn AssetService,
        visited: &Visited<'_>,
        _: &TraversalParams,
        trace: &mut Trace,
    ) -> Result<(), Error> {
        trace.push(format!("{} {}", visited.type_tag(), visited.path()));
        Ok(())
    }

    fn fail(
        _: &dyn AssetService,
        visited: &Visited<'_>,
        _: &TraversalParams,
        _: &mut Trace,
    ) -> Result<(), Error> {
        Err(Error::RemoteOperation(format!("refusing {}", visited.path())))
    }

    #[fixture]
    fn site_tree() -> AssetTree {
        AssetTree::from_identifier(
            Arc::new(fixtures::memory_service()),
            &create_id(TypeTag::Folder, FOLDER_ROOT_ID).unwrap(),
        )
        .expect("must build")
    }

    fn registry() -> FunctionRegistry<Trace> {
        let mut registry = FunctionRegistry::new();
        registry
            .register(TreeFunction::function("record", record))
            .register(TreeFunction::function("fail", fail));
        registry
    }

    fn record_everything() -> DispatchTable<Trace> {
        [
            TypeTag::Folder,
            TypeTag::File,
            TypeTag::Page,
            TypeTag::XmlBlock,
            TypeTag::XsltFormat,
            TypeTag::AssetFactoryContainer,
        ]
        .into_iter()
        .fold(DispatchTable::new(), |table, type_tag| {
            table.with(type_tag, TreeFunction::function("record", record))
        })
    }

    #[rstest]
    fn pre_order(site_tree: AssetTree) {
        let mut trace = Trace::new();
        site_tree
            .traverse(&record_everything(), &TraversalParams::default(), &mut trace)
            .expect("must succeed");

        assert_eq!(
            vec![
                "folder /",
                "folder images",
                "file images/logo.png",
                "folder images/icons",
                "file images/icons/arrow.svg",
                "folder blocks",
                "block_XML blocks/nav",
                "format_XSLT blocks/style",
                "page index",
                "assetfactorycontainer _factories",
            ],
            trace
        );
    }

    #[rstest]
    fn skip_root_container(site_tree: AssetTree) {
        let table = DispatchTable::new().with(TypeTag::Folder, TreeFunction::function("record", record));

        let mut trace = Trace::new();
        site_tree
            .traverse(&table, &TraversalParams::skipping_root(), &mut trace)
            .expect("must succeed");

        // The root is skipped, nested folders are not.
        assert_eq!(
            vec!["folder images", "folder images/icons", "folder blocks"],
            trace
        );
    }

    #[rstest]
    fn skip_flag_is_not_mutated(site_tree: AssetTree) {
        let params = TraversalParams::skipping_root();
        site_tree
            .traverse(&record_everything(), &params, &mut Trace::new())
            .expect("must succeed");

        assert!(params.skip_root_container);
    }

    #[rstest]
    fn missing_function(site_tree: AssetTree) {
        let table = FunctionTable::new()
            .with(TypeTag::Folder, "record")
            .with(TypeTag::Page, "does_not_exist");

        let mut trace = Trace::new();
        let err = site_tree
            .traverse_named(&table, &registry(), &TraversalParams::default(), &mut trace)
            .expect_err("must fail");

        assert!(matches!(err, Error::NoSuchFunction(name) if name.starts_with("does_not_exist")));
        assert!(trace.is_empty(), "nothing may run before validation");
    }

    #[rstest]
    fn empty_entries_are_skipped(site_tree: AssetTree) {
        let table: FunctionTable = serde_json::from_value(json!({
            "page": [null, "", "record", "  "],
            "folder": []
        }))
        .expect("must deserialize");

        let mut trace = Trace::new();
        site_tree
            .traverse_named(&table, &registry(), &TraversalParams::default(), &mut trace)
            .expect("must succeed");

        assert_eq!(vec!["page index"], trace);
    }

    #[rstest]
    fn failure_aborts(site_tree: AssetTree) {
        let table = FunctionTable::new()
            .with(TypeTag::Folder, "record")
            .with(TypeTag::File, "fail");

        let mut trace = Trace::new();
        let err = site_tree
            .traverse_named(&table, &registry(), &TraversalParams::default(), &mut trace)
            .expect_err("must fail");

        assert_eq!(
            Error::RemoteOperation("refusing images/logo.png".to_string()),
            err
        );
        // Everything before the failing file was applied, nothing after.
        assert_eq!(vec!["folder /", "folder images"], trace);
    }

    #[rstest]
    fn functions_run_in_order(site_tree: AssetTree) {
        let mut registry = registry();
        registry.register(TreeFunction::method("Marker", "mark", |_, visited, _, trace: &mut Trace| {
            trace.push(format!("mark {}", visited.path()));
            Ok(())
        }));
        let table = FunctionTable::new()
            .with(TypeTag::Page, "Marker:mark")
            .with(TypeTag::Page, "record");

        let mut trace = Trace::new();
        site_tree
            .traverse_named(&table, &registry, &TraversalParams::default(), &mut trace)
            .expect("must succeed");

        assert_eq!(vec!["mark index", "page index"], trace);
    }

    #[rstest]
    fn params_reach_functions(site_tree: AssetTree) {
        let table = DispatchTable::new().with(
            TypeTag::Page,
            TreeFunction::method("Greeter", "greet", |_, visited, params, trace: &mut Trace| {
                trace.push(format!(
                    "{} {}",
                    params.value_str("greeting").unwrap_or("?"),
                    visited.path()
                ));
                Ok(())
            }),
        );

        let mut trace = Trace::new();
        site_tree
            .traverse(
                &table,
                &TraversalParams::default().with_value("greeting", "hello"),
                &mut trace,
            )
            .expect("must succeed");

        assert_eq!(vec!["hello index"], trace);
    }

    #[test]
    fn method_names() {
        let function: TreeFunction<Trace> = TreeFunction::method("Class", "method", |_, _, _, _| Ok(()));
        assert_eq!("Class:method", function.name());
        assert_eq!("record", TreeFunction::<Trace>::function("record", record).name());
        assert_eq!(vec!["fail", "record"], registry().names());
    }
}
