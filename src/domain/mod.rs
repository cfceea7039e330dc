//! Domain layer: container, category tree, catalog facade
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod catalog;
pub mod dynamic_array;
pub mod entities;
pub mod error;
pub mod render;

pub use arena::{path_segments, CategoryTree, RemovedSubtree, SubtreeIterator, TreeNode};
pub use catalog::Catalog;
pub use dynamic_array::DynamicArray;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use render::TreeRender;
