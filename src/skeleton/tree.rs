use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashSet;

use crate::errors::{Result, RigError};
use crate::source::records::{GameObjectRecord, TransformRecord, fetch, fetch_ptr};
use crate::source::{AssetGraphProvider, ObjectRef};

/// Local translation / rotation / scale of a bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTrs {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for LocalTrs {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl LocalTrs {
    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// `Translation · Rotation · Scale`.
    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// A node of the source bone hierarchy.
///
/// `parent` is a back-reference by arena index; `children` are owned, in
/// source order.
#[derive(Debug, Clone)]
pub struct BoneNode {
    pub name: String,
    pub local: LocalTrs,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Transform object this node was read from, if any.
    pub source: Option<ObjectRef>,
}

impl BoneNode {
    #[must_use]
    pub fn new(name: impl Into<String>, local: LocalTrs) -> Self {
        Self {
            name: name.into(),
            local,
            parent: None,
            children: Vec::new(),
            source: None,
        }
    }
}

/// Arena-backed bone hierarchy with a single root.
#[derive(Debug, Clone, Default)]
pub struct BoneTree {
    nodes: Vec<BoneNode>,
    root: usize,
}

impl BoneTree {
    /// Creates a tree holding only `root`.
    #[must_use]
    pub fn new(root: BoneNode) -> Self {
        Self {
            nodes: vec![root],
            root: 0,
        }
    }

    /// Wraps pre-linked nodes without checking them; walks still detect
    /// cycles and dangling child indices.
    #[must_use]
    pub fn from_nodes(nodes: Vec<BoneNode>, root: usize) -> Self {
        Self { nodes, root }
    }

    /// Appends `node` as the last child of `parent` and returns its index.
    pub fn add_child(&mut self, parent: usize, mut node: BoneNode) -> usize {
        let index = self.nodes.len();
        node.parent = Some(parent);
        self.nodes.push(node);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(index);
        }
        index
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> usize {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&BoneNode> {
        self.nodes.get(index)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order walk from the root.
    ///
    /// `visit` receives the node index, the node and the state its parent
    /// produced (`None` for the root) and returns the state handed to the
    /// node's children. Revisiting a node fails with
    /// [`RigError::CycleDetected`].
    pub fn walk<S, F>(&self, mut visit: F) -> Result<()>
    where
        S: Clone,
        F: FnMut(usize, &BoneNode, Option<&S>) -> Result<S>,
    {
        let mut visited = FxHashSet::default();
        let mut stack: Vec<(usize, Option<S>)> = Vec::with_capacity(64);
        stack.push((self.root, None));

        while let Some((index, parent_state)) = stack.pop() {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| RigError::unresolved("bone node", format!("arena index {index}")))?;
            if !visited.insert(index) {
                return Err(RigError::CycleDetected {
                    node: node.name.clone(),
                });
            }

            let state = visit(index, node, parent_state.as_ref())?;

            for &child in node.children.iter().rev() {
                stack.push((child, Some(state.clone())));
            }
        }
        Ok(())
    }

    /// Node indices in pre-order.
    pub fn preorder(&self) -> Result<Vec<usize>> {
        let mut order = Vec::with_capacity(self.nodes.len());
        self.walk(|index, _, _: Option<&()>| {
            order.push(index);
            Ok(())
        })?;
        Ok(order)
    }

    /// Reads the hierarchy below `root` from the asset graph.
    pub fn load(provider: &dyn AssetGraphProvider, root: ObjectRef) -> Result<Self> {
        let mut tree = BoneTree::default();
        let mut visited = FxHashSet::default();
        let mut stack: Vec<(ObjectRef, Option<usize>)> = vec![(root, None)];

        while let Some((object, parent)) = stack.pop() {
            let transform: TransformRecord = fetch(provider, object)?;
            let (_, game_object) = fetch_ptr::<GameObjectRecord>(
                provider,
                transform.game_object,
                &object.to_string(),
            )?;

            if !visited.insert(object) {
                return Err(RigError::CycleDetected {
                    node: game_object.name,
                });
            }

            let mut node = BoneNode::new(
                game_object.name,
                LocalTrs::new(
                    transform.local_position.into(),
                    transform.local_rotation.into(),
                    transform.local_scale.into(),
                ),
            );
            node.source = Some(object);

            let index = match parent {
                Some(parent) => tree.add_child(parent, node),
                None => {
                    tree.nodes.push(node);
                    tree.root = tree.nodes.len() - 1;
                    tree.root
                }
            };

            for &child in transform.children.iter().rev() {
                let child_ref = provider.resolve(child).ok_or_else(|| {
                    RigError::unresolved(
                        "child transform",
                        format!("{}:{} under {object}", child.file_id, child.path_id),
                    )
                })?;
                stack.push((child_ref, Some(index)));
            }
        }

        log::debug!("Loaded bone tree with {} nodes from {root}", tree.len());
        Ok(tree)
    }
}

/// Follows `m_Father` links from `start` to the top-most transform.
pub fn find_root_transform(provider: &dyn AssetGraphProvider, start: ObjectRef) -> Result<ObjectRef> {
    let mut visited = FxHashSet::default();
    let mut current = start;

    loop {
        if !visited.insert(current) {
            return Err(RigError::CycleDetected {
                node: current.to_string(),
            });
        }
        let transform: TransformRecord = fetch(provider, current)?;
        if transform.father.is_null() {
            return Ok(current);
        }
        match provider.resolve(transform.father) {
            Some(father) => current = father,
            None => return Ok(current),
        }
    }
}
