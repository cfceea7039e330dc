//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Library catalog manager: nested categories, items, and borrower tracking
#[derive(Parser, Debug)]
#[command(name = "shelftree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Snapshot file (overrides `catalog_file` from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub catalog: Option<PathBuf>,

    /// Additional config file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// One line of an interactive session: a subcommand without a binary name.
#[derive(Parser, Debug)]
#[command(name = "shelftree", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Load records from a snapshot file into the catalog
    Import {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Write the whole catalog to a snapshot file
    Export {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show categories as a tree with item counts
    Tree {
        /// Start category (default: root)
        category: Option<String>,
    },

    /// List every item in a category and its subcategories
    FindAll { category: String },

    /// Show the first item with this title
    FindItem { title: String },

    /// Add an item, creating its category when missing
    AddItem(AddItemArgs),

    /// Change fields of an item
    EditItem(EditItemArgs),

    /// Remove an item
    RemoveItem {
        title: String,
        /// Confirm removal
        #[arg(short, long)]
        yes: bool,
    },

    /// Create a category path
    AddCategory { path: String },

    /// Show a category and its aggregate item count
    FindCategory { path: String },

    /// Remove a category with all its subcategories and items
    RemoveCategory {
        path: String,
        /// Confirm removal
        #[arg(short, long)]
        yes: bool,
    },

    /// Move a category's contents to a new path
    RenameCategory { path: String, new_path: String },

    /// Issue a copy of an item to a borrower
    Borrow(BorrowerArgs),

    /// Take back a copy from a borrower
    Return(BorrowerArgs),

    /// List borrowers of an item
    Borrowers {
        title: String,
        /// Everyone who ever borrowed it, not only current holders
        #[arg(short, long)]
        all: bool,
    },

    /// List items held by a borrower, given as "NAME,ID"
    Borrowed { borrower: String },

    /// Read commands line by line from stdin
    Shell,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddItemArgs {
    pub title: String,
    #[arg(long)]
    pub author: String,
    #[arg(long)]
    pub isbn: String,
    #[arg(long, allow_negative_numbers = true)]
    pub year: i32,
    /// Category path, e.g. "Fiction/Mystery"
    #[arg(long, default_value = "")]
    pub category: String,
    #[arg(long, default_value_t = 1)]
    pub total: u32,
    /// Defaults to `--total`
    #[arg(long)]
    pub available: Option<u32>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EditItemArgs {
    pub title: String,
    #[arg(long)]
    pub new_title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub isbn: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub year: Option<i32>,
    #[arg(long)]
    pub total: Option<u32>,
    #[arg(long)]
    pub available: Option<u32>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct BorrowerArgs {
    pub title: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub id: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
}
