use generational_arena::Arena;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::dynamic_array::DynamicArray;
use crate::domain::entities::{Item, ItemId, NodeId};
use crate::domain::error::{DomainError, DomainResult};

/// Separator between category names in a path.
pub const PATH_SEPARATOR: char = '/';

/// Splits a category path into its non-empty segments.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(PATH_SEPARATOR).filter(|segment| !segment.is_empty())
}

/// One category in the arena-based hierarchy.
///
/// Nodes are read-only outside the tree; every mutation goes through
/// [`CategoryTree`] so the aggregate counts stay consistent.
#[derive(Debug)]
pub struct TreeNode {
    name: String,
    /// Items stored here and in all descendants
    item_count: usize,
    /// None only for the root
    parent: Option<NodeId>,
    children: DynamicArray<NodeId>,
    items: DynamicArray<ItemId>,
}

impl TreeNode {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            item_count: 0,
            parent,
            children: DynamicArray::new(),
            items: DynamicArray::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &DynamicArray<NodeId> {
        &self.children
    }

    pub fn items(&self) -> &DynamicArray<ItemId> {
        &self.items
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Nodes and items dropped by a subtree removal.
#[derive(Debug, Default)]
pub struct RemovedSubtree {
    /// Number of category nodes destroyed
    pub nodes: usize,
    /// Items that were filed anywhere in the subtree
    pub items: Vec<(ItemId, Item)>,
}

/// Arena-based category tree.
///
/// Owns every node and every item through two generational arenas; nodes
/// refer to children, parent and items by handle only. The root exists for
/// the whole lifetime of the tree and cannot be removed. New nodes are only
/// ever attached to an existing parent, so the structure stays acyclic.
#[derive(Debug)]
pub struct CategoryTree {
    nodes: Arena<TreeNode>,
    items: Arena<Item>,
    root: NodeId,
}

impl Default for CategoryTree {
    fn default() -> Self {
        Self::new("Library")
    }
}

impl CategoryTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut nodes = Arena::new();
        let root = NodeId(nodes.insert(TreeNode::new(root_name.into(), None)));
        Self {
            nodes,
            items: Arena::new(),
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> DomainResult<&TreeNode> {
        self.nodes.get(id.0).ok_or(DomainError::StaleNode)
    }

    fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut TreeNode> {
        self.nodes.get_mut(id.0).ok_or(DomainError::StaleNode)
    }

    pub fn item(&self, id: ItemId) -> DomainResult<&Item> {
        self.items.get(id.0).ok_or(DomainError::StaleItem)
    }

    pub fn item_mut(&mut self, id: ItemId) -> DomainResult<&mut Item> {
        self.items.get_mut(id.0).ok_or(DomainError::StaleItem)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn item_total(&self) -> usize {
        self.items.len()
    }

    /// True when the root has neither children nor items.
    pub fn is_empty(&self) -> bool {
        self.node(self.root)
            .map(|root| root.children.is_empty() && root.items.is_empty())
            .unwrap_or(true)
    }

    /// Names from `id` up to (optionally including) the root, leaf first.
    fn names_to_root(&self, id: NodeId, include_root: bool) -> DomainResult<Vec<&str>> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            if include_root || !node.is_root() {
                names.push(node.name.as_str());
            }
            current = node.parent;
        }
        Ok(names)
    }

    /// Slash-joined names from the root down to `id`; the root's path is its name.
    #[instrument(level = "trace", skip(self))]
    pub fn full_path(&self, id: NodeId) -> DomainResult<String> {
        let names = self.names_to_root(id, true)?;
        Ok(names.iter().rev().join("/"))
    }

    /// Like [`full_path`](Self::full_path) without the root segment; empty for the root.
    /// This is the form accepted by [`resolve_path`](Self::resolve_path).
    pub fn category_path(&self, id: NodeId) -> DomainResult<String> {
        let names = self.names_to_root(id, false)?;
        Ok(names.iter().rev().join("/"))
    }

    /// First direct child of `parent` named exactly `name`.
    pub fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let node = self.nodes.get(parent.0)?;
        node.children
            .iter()
            .copied()
            .find(|child| self.nodes.get(child.0).is_some_and(|c| c.name == name))
    }

    /// Walks `path` from the root; `None` at the first segment without a match.
    #[instrument(level = "trace", skip(self))]
    pub fn resolve_path(&self, path: &str) -> Option<NodeId> {
        let mut current = self.root;
        for segment in path_segments(path) {
            current = self.child_named(current, segment)?;
        }
        Some(current)
    }

    /// Resolves `path`, creating every missing segment on the way (mkdir -p).
    #[instrument(level = "debug", skip(self))]
    pub fn materialize_path(&mut self, path: &str) -> NodeId {
        let mut current = self.root;
        for segment in path_segments(path) {
            current = match self.child_named(current, segment) {
                Some(child) => child,
                None => self.attach_child(current, segment),
            };
        }
        current
    }

    fn attach_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let child = NodeId(
            self.nodes
                .insert(TreeNode::new(name.to_string(), Some(parent))),
        );
        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.children.push(child);
        }
        debug!("attached category '{}'", name);
        child
    }

    /// Creates one child named `name` under `parent`.
    ///
    /// Sibling names are unique: a second child with the same name is rejected.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_child(&mut self, parent: NodeId, name: &str) -> DomainResult<NodeId> {
        if name.is_empty() || name.contains(PATH_SEPARATOR) {
            return Err(DomainError::InvalidCategoryName(name.to_string()));
        }
        self.node(parent)?;
        if self.child_named(parent, name).is_some() {
            let parent_path = self.category_path(parent)?;
            let path = if parent_path.is_empty() {
                name.to_string()
            } else {
                format!("{parent_path}/{name}")
            };
            return Err(DomainError::DuplicateCategory(path));
        }
        Ok(self.attach_child(parent, name))
    }

    /// Removes the first child of `parent` named `name`, with its whole subtree.
    ///
    /// See [`remove_node`](Self::remove_node) for the count bookkeeping.
    pub fn remove_child(&mut self, parent: NodeId, name: &str) -> DomainResult<RemovedSubtree> {
        self.node(parent)?;
        let child = self
            .child_named(parent, name)
            .ok_or_else(|| DomainError::CategoryNotFound(name.to_string()))?;
        self.remove_node(child)
    }

    /// Destroys `id`, all its descendants and every item filed in them.
    ///
    /// The subtree's aggregate count is subtracted from every ancestor first,
    /// while the parent chain is still intact; callers never adjust counts
    /// for removals themselves. The root is rejected with `RootViolation`.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, id: NodeId) -> DomainResult<RemovedSubtree> {
        let (parent, total) = {
            let node = self.node(id)?;
            (node.parent.ok_or(DomainError::RootViolation)?, node.item_count)
        };

        self.update_aggregate_count(parent, -(total as isize))?;

        let siblings = &mut self.node_mut(parent)?.children;
        if let Some(position) = siblings.position(|child| *child == id) {
            siblings.remove(position)?;
        }

        let mut removed = RemovedSubtree::default();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current.0) {
                removed.nodes += 1;
                stack.extend(node.children.iter().copied());
                for item_id in node.items {
                    if let Some(item) = self.items.remove(item_id.0) {
                        removed.items.push((item_id, item));
                    }
                }
            }
        }
        debug!(
            "removed {} categories and {} items",
            removed.nodes,
            removed.items.len()
        );
        Ok(removed)
    }

    /// Adds `delta` to the aggregate count of `node` and every ancestor. O(depth).
    ///
    /// Fails without touching any count if a count would drop below zero.
    #[instrument(level = "trace", skip(self))]
    pub fn update_aggregate_count(&mut self, node: NodeId, delta: isize) -> DomainResult<()> {
        let mut updated = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let node = self.node(id)?;
            let count = node
                .item_count
                .checked_add_signed(delta)
                .ok_or(DomainError::CountUnderflow {
                    count: node.item_count,
                    delta,
                })?;
            updated.push((id, count));
            current = node.parent;
        }
        // All ancestors validated, apply in one pass
        for (id, count) in updated {
            self.node_mut(id)?.item_count = count;
        }
        Ok(())
    }

    /// Appends `item` to the items of `node` and propagates +1 up to the root.
    #[instrument(level = "debug", skip(self, item), fields(title = %item.title))]
    pub fn file_item(&mut self, node: NodeId, item: Item) -> DomainResult<ItemId> {
        self.node(node)?;
        let item_id = ItemId(self.items.insert(item));
        self.node_mut(node)?.items.push(item_id);
        self.update_aggregate_count(node, 1)?;
        Ok(item_id)
    }

    /// Detaches `item_id` from `node`, propagates -1 and hands the item back.
    #[instrument(level = "debug", skip(self))]
    pub fn unfile_item(&mut self, node: NodeId, item_id: ItemId) -> DomainResult<Item> {
        let items = &mut self.node_mut(node)?.items;
        let position = items
            .position(|id| *id == item_id)
            .ok_or(DomainError::StaleItem)?;
        items.remove(position)?;
        self.update_aggregate_count(node, -1)?;
        self.items.remove(item_id.0).ok_or(DomainError::StaleItem)
    }

    /// Moves every item filed directly in `from` to the end of `to`.
    ///
    /// Items keep their handles; only ownership by node changes.
    #[instrument(level = "debug", skip(self))]
    pub fn move_items(&mut self, from: NodeId, to: NodeId) -> DomainResult<usize> {
        self.node(to)?;
        let moved = std::mem::take(&mut self.node_mut(from)?.items);
        let count = moved.len();
        if count == 0 {
            return Ok(0);
        }
        self.update_aggregate_count(from, -(count as isize))?;
        self.node_mut(to)?.items.extend(moved);
        self.update_aggregate_count(to, count as isize)?;
        Ok(count)
    }

    /// Depth-first pre-order search starting at `start`: the node's own items
    /// first, then its children in order. First match wins.
    #[instrument(level = "debug", skip(self))]
    pub fn find_item_by_title(&self, start: NodeId, title: &str) -> Option<(NodeId, ItemId)> {
        self.iter_subtree(start).find_map(|(node_id, node)| {
            node.items
                .iter()
                .copied()
                .find(|item_id| {
                    self.items
                        .get(item_id.0)
                        .is_some_and(|item| item.title == title)
                })
                .map(|item_id| (node_id, item_id))
        })
    }

    /// Every item in `start` and its descendants. Order is not part of the contract.
    #[instrument(level = "debug", skip(self))]
    pub fn collect_all_under_subtree(&self, start: NodeId) -> Vec<ItemId> {
        self.iter_subtree(start)
            .flat_map(|(_, node)| node.items.iter().copied())
            .collect()
    }

    /// Pre-order iterator over `start` and its descendants.
    pub fn iter_subtree(&self, start: NodeId) -> SubtreeIterator<'_> {
        SubtreeIterator::new(self, start)
    }
}

pub struct SubtreeIterator<'a> {
    tree: &'a CategoryTree,
    stack: Vec<NodeId>,
}

impl<'a> SubtreeIterator<'a> {
    fn new(tree: &'a CategoryTree, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for SubtreeIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Ok(node) = self.tree.node(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev().copied());
                return Some((current, node));
            }
        }
        None
    }
}
