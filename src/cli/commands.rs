//! Command dispatch
//!
//! One-shot commands and the interactive shell share [`Session`]: load the
//! snapshot once, apply commands, save after every state change.
//! Loans are not persisted, so `borrow` and `return` only run inside `shell`.

use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::SnapshotService;
use crate::cli::args::{
    AddItemArgs, BorrowerArgs, Cli, Commands, ConfigCommands, EditItemArgs, ShellLine,
};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{Catalog, Item, ItemEdit, TreeRender};
use crate::infrastructure::ServiceContainer;
use crate::util::fields::{split_record, split_words};

const SHELL_PROMPT: &str = "shelftree>";

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Commands::Completion { shell } = &cli.command {
        generate(*shell, &mut Cli::command(), "shelftree", &mut io::stdout());
        return Ok(());
    }

    let settings =
        Settings::load(cli.config.as_deref())?.with_catalog_file(cli.catalog.as_deref());
    debug!("catalog file: {}", settings.catalog_file.display());

    if let Commands::Config { command } = &cli.command {
        return _config(command, &settings, cli.config.as_deref());
    }

    let container = ServiceContainer::new(settings);
    let mut session = Session::open(&container)?;
    match &cli.command {
        Commands::Shell => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            run_shell(&mut session, stdin.lock(), interactive)
        }
        command => session.dispatch(command),
    }
}

fn _config(
    command: &ConfigCommands,
    settings: &Settings,
    config_file: Option<&Path>,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", &"<no home directory>"),
            }
            if let Some(path) = config_file {
                output::action("explicit", &path.display());
            }
            output::action("catalog", &settings.catalog_file.display());
        }
    }
    Ok(())
}

/// A loaded catalog bound to its snapshot file.
pub struct Session {
    catalog: Catalog,
    snapshots: SnapshotService,
    catalog_file: PathBuf,
    in_shell: bool,
}

impl Session {
    pub fn open(container: &ServiceContainer) -> CliResult<Self> {
        let snapshots = container.snapshot_service();
        let catalog_file = container.settings.catalog_file.clone();
        let catalog = snapshots.load(&catalog_file)?;
        Ok(Self {
            catalog,
            snapshots,
            catalog_file,
            in_shell: false,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_file(&self) -> &Path {
        &self.catalog_file
    }

    /// Runs one command and saves the snapshot when it changed the catalog.
    #[instrument(level = "debug", skip(self))]
    pub fn dispatch(&mut self, command: &Commands) -> CliResult<()> {
        if self.apply(command)? {
            let count = self.snapshots.save(&self.catalog, &self.catalog_file)?;
            debug!("saved {} records", count);
        }
        Ok(())
    }

    /// Returns true when the catalog changed.
    fn apply(&mut self, command: &Commands) -> CliResult<bool> {
        match command {
            Commands::Import { file } => self._import(file).map(|_| true),
            Commands::Export { file } => self._export(file).map(|_| false),
            Commands::Tree { category } => self._tree(category.as_deref()).map(|_| false),
            Commands::FindAll { category } => self._find_all(category).map(|_| false),
            Commands::FindItem { title } => self._find_item(title).map(|_| false),
            Commands::AddItem(args) => self._add_item(args).map(|_| true),
            Commands::EditItem(args) => self._edit_item(args).map(|_| true),
            Commands::RemoveItem { title, yes } => self._remove_item(title, *yes).map(|_| true),
            Commands::AddCategory { path } => self._add_category(path).map(|_| true),
            Commands::FindCategory { path } => self._find_category(path).map(|_| false),
            Commands::RemoveCategory { path, yes } => {
                self._remove_category(path, *yes).map(|_| true)
            }
            Commands::RenameCategory { path, new_path } => {
                self._rename_category(path, new_path).map(|_| true)
            }
            // Snapshots record copies on loan as available, nothing to save
            Commands::Borrow(args) => self._borrow(args).map(|_| false),
            Commands::Return(args) => self._return(args).map(|_| false),
            Commands::Borrowers { title, all } => self._borrowers(title, *all).map(|_| false),
            Commands::Borrowed { borrower } => self._borrowed(borrower).map(|_| false),
            Commands::Shell | Commands::Config { .. } | Commands::Completion { .. } => Err(
                CliError::Usage("not available inside a running session".to_string()),
            ),
        }
    }

    fn _import(&mut self, file: &Path) -> CliResult<()> {
        let summary = self.snapshots.import(&mut self.catalog, file)?;
        for rejected in &summary.rejected {
            output::warning(rejected);
        }
        output::success(&format!(
            "{} records have been imported from {}",
            summary.accepted,
            file.display()
        ));
        Ok(())
    }

    fn _export(&self, file: &Path) -> CliResult<()> {
        let count = self.snapshots.export(&self.catalog, file)?;
        output::success(&format!("{} records exported to {}", count, file.display()));
        Ok(())
    }

    fn _tree(&self, category: Option<&str>) -> CliResult<()> {
        let tree = self.catalog.tree();
        let start = match category {
            Some(path) => self.catalog.find_category(path)?,
            None => tree.root(),
        };
        output::info(&tree.render(start)?);
        Ok(())
    }

    fn _find_all(&self, category: &str) -> CliResult<()> {
        let items = self.catalog.find_all(category)?;
        output::header(&format!("{} items in '{}'", items.len(), category));
        for item in items {
            output::block(item);
        }
        Ok(())
    }

    fn _find_item(&self, title: &str) -> CliResult<()> {
        let item = self.catalog.find_item(title)?;
        output::block(item);
        Ok(())
    }

    fn _add_item(&mut self, args: &AddItemArgs) -> CliResult<()> {
        let available = args.available.unwrap_or(args.total);
        if available > args.total {
            return Err(CliError::InvalidArgs(format!(
                "available copies ({}) exceed total copies ({})",
                available, args.total
            )));
        }
        let item = Item::new(
            args.title.as_str(),
            args.author.as_str(),
            args.isbn.as_str(),
            args.year,
            args.total,
            available,
        );
        self.catalog.add_item(&args.category, item)?;
        output::success(&format!("Item '{}' added", args.title));
        Ok(())
    }

    fn _edit_item(&mut self, args: &EditItemArgs) -> CliResult<()> {
        let edit = ItemEdit {
            title: args.new_title.clone(),
            author: args.author.clone(),
            isbn: args.isbn.clone(),
            publication_year: args.year,
            total_copies: args.total,
            available_copies: args.available,
        };
        if edit.is_empty() {
            return Err(CliError::InvalidArgs("nothing to change".to_string()));
        }
        let item = self.catalog.edit_item(&args.title, &edit)?;
        output::success(&format!("Item '{}' updated", item.title));
        Ok(())
    }

    fn _remove_item(&mut self, title: &str, yes: bool) -> CliResult<()> {
        if !yes {
            return Err(CliError::Usage(format!(
                "refusing to remove item '{}' without --yes",
                title
            )));
        }
        let item = self.catalog.remove_item(title)?;
        output::success(&format!("Item '{}' removed", item.title));
        Ok(())
    }

    fn _add_category(&mut self, path: &str) -> CliResult<()> {
        let node = self.catalog.add_category(path);
        let full_path = self.catalog.tree().full_path(node)?;
        output::success(&format!("Category '{}' ready", full_path));
        Ok(())
    }

    fn _find_category(&self, path: &str) -> CliResult<()> {
        let tree = self.catalog.tree();
        let node_id = self.catalog.find_category(path)?;
        let node = tree.node(node_id)?;
        output::info(&format!(
            "{} ({} items)",
            tree.full_path(node_id)?,
            node.item_count()
        ));
        for child in node.children() {
            output::detail(&tree.node(*child)?.name());
        }
        Ok(())
    }

    fn _remove_category(&mut self, path: &str, yes: bool) -> CliResult<()> {
        if !yes {
            return Err(CliError::Usage(format!(
                "refusing to remove category '{}' without --yes",
                path
            )));
        }
        let removed = self.catalog.remove_category(path)?;
        output::success(&format!(
            "Category '{}' removed with {} items",
            path, removed
        ));
        Ok(())
    }

    fn _rename_category(&mut self, path: &str, new_path: &str) -> CliResult<()> {
        let node = self.catalog.rename_category(path, new_path)?;
        let full_path = self.catalog.tree().full_path(node)?;
        output::success(&format!("Category '{}' is now '{}'", path, full_path));
        Ok(())
    }

    fn require_shell(&self, command: &str) -> CliResult<()> {
        if self.in_shell {
            return Ok(());
        }
        Err(CliError::Usage(format!(
            "'{}' needs a running shell: loans are not saved between runs",
            command
        )))
    }

    fn _borrow(&mut self, args: &BorrowerArgs) -> CliResult<()> {
        self.require_shell("borrow")?;
        self.catalog.borrow(&args.title, &args.name, &args.id)?;
        output::success(&format!(
            "'{}' issued to {} (ID: {})",
            args.title, args.name, args.id
        ));
        Ok(())
    }

    fn _return(&mut self, args: &BorrowerArgs) -> CliResult<()> {
        self.require_shell("return")?;
        self.catalog.return_item(&args.title, &args.name, &args.id)?;
        output::success(&format!(
            "'{}' returned by {} (ID: {})",
            args.title, args.name, args.id
        ));
        Ok(())
    }

    fn _borrowers(&self, title: &str, all: bool) -> CliResult<()> {
        let borrowers = if all {
            self.catalog.all_borrowers(title)?
        } else {
            self.catalog.current_borrowers(title)?
        };
        if borrowers.is_empty() {
            output::info(&format!("No borrowers for '{}'", title));
        }
        for borrower in borrowers {
            output::detail(borrower);
        }
        Ok(())
    }

    fn _borrowed(&self, borrower: &str) -> CliResult<()> {
        let (name, id) = parse_borrower(borrower)?;
        let items = self.catalog.borrowed_items(&name, &id)?;
        output::header(&format!("{} (ID: {}) holds {} items", name, id, items.len()));
        for item in items {
            output::block(item);
        }
        Ok(())
    }
}

/// Splits `"NAME,ID"` into its two parts.
fn parse_borrower(text: &str) -> CliResult<(String, String)> {
    let mut fields = split_record(text).into_iter();
    match (fields.next(), fields.next()) {
        (Some(name), Some(id)) if !name.is_empty() && !id.is_empty() => Ok((name, id)),
        _ => Err(CliError::InvalidArgs(format!(
            "expected \"NAME,ID\", got '{}'",
            text
        ))),
    }
}

/// Reads commands from `input` until `exit`, `quit` or end of input.
///
/// Bad lines and failing commands are reported and the session continues.
pub fn run_shell<R: BufRead>(session: &mut Session, input: R, interactive: bool) -> CliResult<()> {
    session.in_shell = true;
    if interactive {
        output::prompt(&SHELL_PROMPT);
    }
    for line in input.lines() {
        let line = line.map_err(|e| CliError::Usage(format!("cannot read input: {e}")))?;
        let words = split_words(&line);
        match words.first().map(String::as_str) {
            None => {}
            Some("exit") | Some("quit") => break,
            Some(_) => match ShellLine::try_parse_from(&words) {
                Ok(parsed) => {
                    if let Err(e) = session.dispatch(&parsed.command) {
                        output::error(&e);
                    }
                }
                Err(e) => match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                        output::info(&e.render())
                    }
                    _ => output::error(&e.render()),
                },
            },
        }
        if interactive {
            output::prompt(&SHELL_PROMPT);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("John Doe,12345", "John Doe", "12345")]
    #[case("\"Doe, John\",7", "Doe, John", "7")]
    fn given_borrower_text_when_parsing_then_split(
        #[case] text: &str,
        #[case] name: &str,
        #[case] id: &str,
    ) {
        assert_eq!(
            parse_borrower(text).unwrap(),
            (name.to_string(), id.to_string())
        );
    }

    #[rstest]
    #[case("John Doe")]
    #[case(",12345")]
    #[case("")]
    fn given_incomplete_borrower_when_parsing_then_invalid_args(#[case] text: &str) {
        assert!(matches!(
            parse_borrower(text),
            Err(CliError::InvalidArgs(_))
        ));
    }

    #[test]
    fn verify_shell_line() {
        ShellLine::command().debug_assert();
    }

    #[test]
    fn given_shell_words_when_parsing_then_subcommand_found() {
        let words = split_words("borrow \"Dune\" --name \"Ann Lee\" --id 42");
        let parsed = ShellLine::try_parse_from(&words).unwrap();
        assert_eq!(
            parsed.command,
            Commands::Borrow(BorrowerArgs {
                title: "Dune".into(),
                name: "Ann Lee".into(),
                id: "42".into(),
            })
        );
    }
}
