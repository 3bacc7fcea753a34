//! A fully materialized view of a container and everything below it.
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::assetservice::AssetService;
use crate::{AssetId, Container, Error, Identifier, Node};

mod render;
mod traverse;

pub use self::traverse::{
    DispatchTable, FunctionRegistry, FunctionTable, TraversalParams, TreeFunction, TreeFunctionFn,
    Visited,
};

/// A child of an [AssetTree]: either a nested container of the same type,
/// expanded into its own tree, or any other listing entry, kept as a [Node].
#[derive(Debug, Clone)]
pub enum TreeChild {
    Tree(AssetTree),
    Node(Node),
}

/// An [AssetTree] wraps a container and, recursively, every nested
/// container of the very same type below it.
///
/// Construction is eager: every nested container costs one read.
/// Children of other types (including other container types) stay leaves.
#[derive(Debug, Clone)]
pub struct AssetTree {
    root: Container,
    /// Present iff the root's listing is non-empty, in listing order.
    children: Option<Vec<TreeChild>>,
}

impl AssetTree {
    /// Builds the tree below `root`.
    pub fn new(root: Container) -> Result<Self, Error> {
        Self::build(root, &mut Vec::new())
    }

    /// Reads the container behind `identifier` and builds its tree.
    pub fn from_identifier(
        service: Arc<dyn AssetService>,
        identifier: &Identifier,
    ) -> Result<Self, Error> {
        Self::new(Container::read(service, identifier)?)
    }

    #[instrument(skip_all, fields(container.identifier = %root.identifier(), children = root.children().len()), err)]
    fn build(root: Container, ancestors: &mut Vec<AssetId>) -> Result<Self, Error> {
        if !root.has_children() {
            return Ok(Self {
                root,
                children: None,
            });
        }

        ancestors.push(root.id());

        let mut children = Vec::with_capacity(root.children().len());
        for child in root.children() {
            if child.type_tag == root.type_tag() {
                if ancestors.contains(&child.id) {
                    return Err(Error::InvalidRequest(format!(
                        "{} lists its ancestor {} as a child",
                        root.identifier(),
                        child.identifier()
                    )));
                }

                debug!(child.identifier = %child.identifier(), "expanding nested container");
                let container = Container::read(root.service_handle(), &child.identifier())?;
                children.push(TreeChild::Tree(Self::build(container, ancestors)?));
            } else {
                if child.type_tag.parent_container() != Some(root.type_tag()) {
                    warn!(
                        child.identifier = %child.identifier(),
                        container.type = %root.type_tag(),
                        "unexpected child type in container listing"
                    );
                }
                children.push(TreeChild::Node(child.clone()));
            }
        }

        ancestors.pop();

        Ok(Self {
            root,
            children: Some(children),
        })
    }

    pub fn root(&self) -> &Container {
        &self.root
    }

    pub fn into_root(self) -> Container {
        self.root
    }

    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    /// The children in listing order, or None for a leafless tree.
    pub fn children(&self) -> Option<&[TreeChild]> {
        self.children.as_deref()
    }

    fn child_iter(&self) -> impl Iterator<Item = &TreeChild> {
        self.children.iter().flatten()
    }

    /// Number of nested trees directly below the root.
    pub fn subtree_count(&self) -> usize {
        self.child_iter()
            .filter(|c| matches!(c, TreeChild::Tree(_)))
            .count()
    }

    /// Number of nodes in the whole tree: the root, every nested container
    /// and every leaf.
    pub fn node_count(&self) -> usize {
        1 + self
            .child_iter()
            .map(|child| match child {
                TreeChild::Tree(tree) => tree.node_count(),
                TreeChild::Node(_) => 1,
            })
            .sum::<usize>()
    }

    /// Depth of the tree, counting the root as one level.
    pub fn depth(&self) -> usize {
        1 + self
            .child_iter()
            .map(|child| match child {
                TreeChild::Tree(tree) => tree.depth(),
                TreeChild::Node(_) => 1,
            })
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{AssetTree, TreeChild};
    use crate::assetservice::{AssetPayload, MemoryAssetService};
    use crate::fixtures::{self, *};
    use crate::tests::CountingAssetService;
    use crate::{create_id, Container, Error, TypeTag};

    #[test]
    fn empty_container() {
        let service = Arc::new(fixtures::memory_service());
        let tree = AssetTree::from_identifier(
            service,
            &create_id(TypeTag::Folder, FOLDER_EMPTY_ID).unwrap(),
        )
        .expect("must build");

        assert!(!tree.has_children());
        assert!(tree.children().is_none());
        assert_eq!(1, tree.node_count());
        assert_eq!(1, tree.depth());
    }

    /// root has [about (folder, empty), index (page)]
    #[test]
    fn two_level_example() {
        let service = Arc::new(fixtures::example_service());
        let tree = AssetTree::from_identifier(
            service,
            &create_id(TypeTag::Folder, EXAMPLE_ROOT_ID).unwrap(),
        )
        .expect("must build");

        assert!(tree.has_children());
        let children = tree.children().expect("must have children");
        assert_eq!(2, children.len());

        match &children[0] {
            TreeChild::Tree(subtree) => {
                assert_eq!(EXAMPLE_ABOUT_ID, subtree.root().id().to_string());
                assert!(!subtree.has_children());
            }
            other => panic!("expected a subtree, got {:?}", other),
        }
        match &children[1] {
            TreeChild::Node(node) => {
                assert_eq!(EXAMPLE_INDEX_ID, node.id.to_string());
                assert_eq!(TypeTag::Page, node.type_tag);
            }
            other => panic!("expected a node, got {:?}", other),
        }
    }

    /// One read per nested container of the same type, plus the root.
    #[test]
    fn reads_once_per_nested_container() {
        let service = Arc::new(CountingAssetService::new(fixtures::memory_service()));
        let tree = AssetTree::from_identifier(
            service.clone(),
            &create_id(TypeTag::Folder, FOLDER_ROOT_ID).unwrap(),
        )
        .expect("must build");

        // root lists: images (folder), blocks (folder), index (page),
        // factories (assetfactorycontainer).
        let children = tree.children().expect("must have children");
        assert_eq!(4, children.len());
        assert_eq!(2, tree.subtree_count());

        // only the root and the two nested folders (plus the one folder
        // nested inside images) are read, the asset factory container isn't.
        assert_eq!(4, service.performed());

        let kinds: Vec<_> = children
            .iter()
            .map(|c| match c {
                TreeChild::Tree(t) => format!("tree {}", t.root().name()),
                TreeChild::Node(n) => format!("node {}", n.path),
            })
            .collect();
        assert_eq!(
            vec![
                "tree images".to_string(),
                "tree blocks".to_string(),
                "node index".to_string(),
                "node _factories".to_string(),
            ],
            kinds
        );

        assert_eq!(10, tree.node_count());
        assert_eq!(4, tree.depth());
    }

    #[test]
    fn non_container_type() {
        let service = Arc::new(fixtures::memory_service());

        assert!(matches!(
            AssetTree::from_identifier(service, &create_id(TypeTag::Page, PAGE_INDEX_ID).unwrap()),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn missing_nested_container() {
        let service = MemoryAssetService::default();
        service
            .put(
                serde_json::from_value::<AssetPayload>(json!({"folder": {
                    "id": DUMMY_ID_1,
                    "path": "/",
                    "children": [
                        {"id": DUMMY_ID_2, "type": "folder", "path": {"path": "gone"}}
                    ]
                }}))
                .unwrap(),
            )
            .unwrap();

        assert!(matches!(
            AssetTree::from_identifier(
                Arc::new(service),
                &create_id(TypeTag::Folder, DUMMY_ID_1).unwrap()
            ),
            Err(Error::RemoteOperation(_))
        ));
    }

    #[test]
    fn cyclic_listing() {
        let service = MemoryAssetService::default();
        service
            .put(
                serde_json::from_value::<AssetPayload>(json!({"folder": {
                    "id": DUMMY_ID_1,
                    "path": "/",
                    "children": [
                        {"id": DUMMY_ID_2, "type": "folder", "path": {"path": "a"}}
                    ]
                }}))
                .unwrap(),
            )
            .unwrap();
        service
            .put(
                serde_json::from_value::<AssetPayload>(json!({"folder": {
                    "id": DUMMY_ID_2,
                    "path": "a",
                    "children": [
                        {"id": DUMMY_ID_1, "type": "folder", "path": {"path": "/"}}
                    ]
                }}))
                .unwrap(),
            )
            .unwrap();

        assert!(matches!(
            AssetTree::from_identifier(
                Arc::new(service),
                &create_id(TypeTag::Folder, DUMMY_ID_1).unwrap()
            ),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn payload_without_record() {
        let service = Arc::new(fixtures::memory_service());
        let payload: AssetPayload = serde_json::from_value(json!({"page": {}})).unwrap();

        assert!(matches!(
            Container::from_payload(service, TypeTag::Folder, payload),
            Err(Error::NullAsset(_))
        ));
    }
}
