//! Catalog facade: category tree plus the flat borrower registry.
//!
//! Every operation that touches both sides of a borrower/item link does so in
//! a single method, so the pairing can never be left half-updated.

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::domain::arena::{path_segments, CategoryTree, RemovedSubtree};
use crate::domain::dynamic_array::DynamicArray;
use crate::domain::entities::{Borrower, BorrowerId, Item, ItemEdit, ItemId, NodeId};
use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Default)]
pub struct Catalog {
    tree: CategoryTree,
    borrowers: DynamicArray<Borrower>,
}

impl Catalog {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            tree: CategoryTree::new(root_name),
            borrowers: DynamicArray::new(),
        }
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn borrowers(&self) -> &DynamicArray<Borrower> {
        &self.borrowers
    }

    pub fn borrower(&self, id: BorrowerId) -> DomainResult<&Borrower> {
        self.borrowers.get(id.0)
    }

    fn locate(&self, title: &str) -> DomainResult<(NodeId, ItemId)> {
        self.tree
            .find_item_by_title(self.tree.root(), title)
            .ok_or_else(|| DomainError::ItemNotFound(title.to_string()))
    }

    fn resolve(&self, category: &str) -> DomainResult<NodeId> {
        self.tree
            .resolve_path(category)
            .ok_or_else(|| DomainError::CategoryNotFound(category.to_string()))
    }

    /// Files `item` under `category`, creating the category when missing.
    #[instrument(level = "debug", skip(self, item), fields(title = %item.title))]
    pub fn add_item(&mut self, category: &str, item: Item) -> DomainResult<ItemId> {
        let node = self.tree.materialize_path(category);
        self.tree.file_item(node, item)
    }

    pub fn find_item(&self, title: &str) -> DomainResult<&Item> {
        let (_, item_id) = self.locate(title)?;
        self.tree.item(item_id)
    }

    /// Items in `category` and all its subcategories.
    pub fn find_all(&self, category: &str) -> DomainResult<Vec<&Item>> {
        let node = self.resolve(category)?;
        self.tree
            .collect_all_under_subtree(node)
            .into_iter()
            .map(|item_id| self.tree.item(item_id))
            .collect()
    }

    /// Rejects copy counts where available plus on-loan copies exceed the total.
    #[instrument(level = "debug", skip(self))]
    pub fn edit_item(&mut self, title: &str, edit: &ItemEdit) -> DomainResult<&Item> {
        let (_, item_id) = self.locate(title)?;
        let item = self.tree.item_mut(item_id)?;
        let total = edit.total_copies.unwrap_or(item.total_copies);
        let available = edit.available_copies.unwrap_or(item.available_copies);
        let on_loan = u32::try_from(item.current_borrowers.len()).unwrap_or(u32::MAX);
        if available.saturating_add(on_loan) > total {
            return Err(DomainError::InvalidCopies {
                title: item.title.clone(),
                available,
                on_loan,
                total,
            });
        }
        edit.apply(item);
        Ok(&*item)
    }

    /// Removes the first item titled `title`, releasing any borrower links.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_item(&mut self, title: &str) -> DomainResult<Item> {
        let (node, item_id) = self.locate(title)?;
        let item = self.tree.unfile_item(node, item_id)?;
        self.release_borrowers(item_id, &item);
        Ok(item)
    }

    pub fn add_category(&mut self, path: &str) -> NodeId {
        self.tree.materialize_path(path)
    }

    pub fn find_category(&self, path: &str) -> DomainResult<NodeId> {
        self.resolve(path)
    }

    /// Removes the category at `path` with everything below it.
    /// Returns the number of items destroyed.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_category(&mut self, path: &str) -> DomainResult<usize> {
        let node = self.resolve(path)?;
        let removed = self.tree.remove_node(node)?;
        Ok(self.release_subtree(removed))
    }

    /// Replaces the category at `path` by a new one at `new_path`.
    ///
    /// Every item of the old subtree moves to the same relative position
    /// under `new_path`; the emptied old subtree is then removed. The target
    /// must not exist yet and must not lie inside the old subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn rename_category(&mut self, path: &str, new_path: &str) -> DomainResult<NodeId> {
        let source = self.resolve(path)?;
        if self.tree.node(source)?.is_root() {
            return Err(DomainError::RootViolation);
        }

        let from: Vec<&str> = path_segments(path).collect();
        let to: Vec<&str> = path_segments(new_path).collect();
        if to.is_empty() {
            return Err(DomainError::RootViolation);
        }
        if self.tree.resolve_path(new_path).is_some() {
            return Err(DomainError::DuplicateCategory(to.join("/")));
        }
        if to.starts_with(&from) {
            return Err(DomainError::InvalidMove {
                from: from.join("/"),
                to: to.join("/"),
            });
        }
        let target_path = to.join("/");

        let target = self.tree.materialize_path(&target_path);
        let mut stack = vec![(source, target_path.clone())];
        while let Some((node_id, destination)) = stack.pop() {
            let destination_node = self.tree.materialize_path(&destination);
            let moved = self.tree.move_items(node_id, destination_node)?;
            debug!("moved {} items to '{}'", moved, destination);

            let node = self.tree.node(node_id)?;
            for &child_id in node.children().iter().rev() {
                let child = self.tree.node(child_id)?;
                stack.push((child_id, format!("{}/{}", destination, child.name())));
            }
        }

        let removed = self.tree.remove_node(source)?;
        debug_assert!(removed.items.is_empty());
        info!("renamed category '{}' to '{}'", from.join("/"), target_path);
        Ok(target)
    }

    /// Issues one copy of `title` to the borrower (name, id), registering the
    /// borrower on first use.
    #[instrument(level = "debug", skip(self))]
    pub fn borrow(&mut self, title: &str, name: &str, id: &str) -> DomainResult<BorrowerId> {
        let (_, item_id) = self.locate(title)?;
        if self.tree.item(item_id)?.available_copies == 0 {
            return Err(DomainError::NoCopiesAvailable(title.to_string()));
        }

        let borrower_id = self.find_or_register(name, id);
        let item = self.tree.item_mut(item_id)?;
        item.current_borrowers.push(borrower_id);
        if !item.all_borrowers.contains(&borrower_id) {
            item.all_borrowers.push(borrower_id);
        }
        item.available_copies -= 1;
        self.borrowers.get_mut(borrower_id.0)?.borrowed.push(item_id);

        debug!("issued '{}' to {} ({})", title, name, id);
        Ok(borrower_id)
    }

    /// Takes back one copy of `title` from the borrower (name, id).
    #[instrument(level = "debug", skip(self))]
    pub fn return_item(&mut self, title: &str, name: &str, id: &str) -> DomainResult<()> {
        let (_, item_id) = self.locate(title)?;
        let not_borrowed = || DomainError::NotBorrowedBy {
            title: title.to_string(),
            name: name.to_string(),
            id: id.to_string(),
        };

        let borrower_id = self
            .tree
            .item(item_id)?
            .current_borrowers
            .iter()
            .copied()
            .find(|b| self.borrowers.get(b.0).is_ok_and(|b| b.matches(name, id)))
            .ok_or_else(not_borrowed)?;

        let item = self.tree.item_mut(item_id)?;
        let position = item
            .current_borrowers
            .position(|b| *b == borrower_id)
            .ok_or_else(not_borrowed)?;
        item.current_borrowers.remove(position)?;
        item.available_copies += 1;

        let borrowed = &mut self.borrowers.get_mut(borrower_id.0)?.borrowed;
        if let Some(position) = borrowed.position(|i| *i == item_id) {
            borrowed.remove(position)?;
        }

        debug!("returned '{}' from {} ({})", title, name, id);
        Ok(())
    }

    pub fn current_borrowers(&self, title: &str) -> DomainResult<Vec<&Borrower>> {
        let item = self.find_item(title)?;
        self.borrowers_of(item.current_borrowers())
    }

    pub fn all_borrowers(&self, title: &str) -> DomainResult<Vec<&Borrower>> {
        let item = self.find_item(title)?;
        self.borrowers_of(item.all_borrowers())
    }

    /// Items currently held by the borrower (name, id).
    pub fn borrowed_items(&self, name: &str, id: &str) -> DomainResult<Vec<&Item>> {
        let borrower = self
            .borrowers
            .iter()
            .find(|b| b.matches(name, id))
            .ok_or_else(|| DomainError::BorrowerNotFound {
                name: name.to_string(),
                id: id.to_string(),
            })?;
        borrower
            .borrowed
            .iter()
            .map(|item_id| self.tree.item(*item_id))
            .collect()
    }

    fn borrowers_of(&self, ids: &DynamicArray<BorrowerId>) -> DomainResult<Vec<&Borrower>> {
        ids.iter().map(|id| self.borrower(*id)).collect()
    }

    fn find_or_register(&mut self, name: &str, id: &str) -> BorrowerId {
        match self.borrowers.position(|b| b.matches(name, id)) {
            Some(position) => BorrowerId(position),
            None => {
                self.borrowers.push(Borrower::new(name, id));
                debug!("registered borrower {} ({})", name, id);
                BorrowerId(self.borrowers.len() - 1)
            }
        }
    }

    /// Drops every reference a borrower holds to the removed item.
    fn release_borrowers(&mut self, item_id: ItemId, item: &Item) {
        for borrower_id in item.current_borrowers().iter().unique_by(|b| b.0) {
            if let Ok(borrower) = self.borrowers.get_mut(borrower_id.0) {
                while let Some(position) = borrower.borrowed.position(|i| *i == item_id) {
                    // position came from the same array
                    let _ = borrower.borrowed.remove(position);
                }
            }
        }
    }

    fn release_subtree(&mut self, removed: RemovedSubtree) -> usize {
        let count = removed.items.len();
        for (item_id, item) in &removed.items {
            self.release_borrowers(*item_id, item);
        }
        count
    }
}
