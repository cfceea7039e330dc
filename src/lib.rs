//! shelftree: a library catalog of nested categories, items and borrowers.
//!
//! Layers, innermost first: `domain` (containers, category tree, catalog
//! facade), `application` (snapshot import/export), `infrastructure`
//! (filesystem, service wiring), `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
