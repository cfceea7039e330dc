//! Nested category listing annotated with aggregate counts.

use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{CategoryTree, TreeNode};
use crate::domain::entities::NodeId;
use crate::domain::error::DomainResult;

pub trait TreeRender {
    fn render(&self, start: NodeId) -> DomainResult<Tree<String>>;
}

fn label(node: &TreeNode) -> String {
    format!("{}({})", node.name(), node.item_count())
}

impl TreeRender for CategoryTree {
    #[instrument(level = "debug", skip(self))]
    fn render(&self, start: NodeId) -> DomainResult<Tree<String>> {
        fn build_tree(tree: &CategoryTree, node_id: NodeId, parent_tree: &mut Tree<String>) {
            if let Ok(node) = tree.node(node_id) {
                for &child_id in node.children() {
                    if let Ok(child) = tree.node(child_id) {
                        let mut child_tree = Tree::new(label(child));
                        build_tree(tree, child_id, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        let mut rendered = Tree::new(label(self.node(start)?));
        build_tree(self, start, &mut rendered);
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Item;

    #[test]
    fn given_nested_categories_when_rendering_then_labels_carry_counts() {
        let mut tree = CategoryTree::new("Library");
        let noir = tree.materialize_path("Fiction/Mystery/Noir");
        tree.materialize_path("Science");
        tree.file_item(noir, Item::new("The Big Sleep", "Chandler", "i1", 1939, 1, 1))
            .unwrap();

        let text = tree.render(tree.root()).unwrap().to_string();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Library(1)");
        assert!(lines[1].ends_with("Fiction(1)"));
        assert!(lines[2].ends_with("Mystery(1)"));
        assert!(lines[3].ends_with("Noir(1)"));
        assert!(lines[4].ends_with("Science(0)"));
    }
}
