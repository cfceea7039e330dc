//! Flat-file catalog snapshots
//!
//! One header line, then one record per item:
//! `title,author,isbn,publication year,category path,total copies,available copies`.
//! Import is lenient per record: malformed records are reported and skipped.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationResult, PathContext};
use crate::config::Settings;
use crate::domain::{Catalog, DomainError, DomainResult, Item};
use crate::infrastructure::traits::FileSystem;
use crate::util::fields::{format_field, split_record};

pub const HEADER: &str =
    "Title,Author,ISBN,Publication Year,Category,Total Copies,Available Copies";

/// Number of fields a record must have; extra fields are ignored.
pub const FIELD_COUNT: usize = 7;

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records filed into the catalog
    pub accepted: usize,
    /// Skipped records, in file order
    pub rejected: Vec<DomainError>,
}

/// A parsed record: where to file the item, and the item itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub category: String,
    pub item: Item,
}

/// Service for importing and exporting catalog snapshots.
pub struct SnapshotService {
    fs: Arc<dyn FileSystem>,
    root_name: String,
    has_header: bool,
}

impl SnapshotService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: &Settings) -> Self {
        Self {
            fs,
            root_name: settings.root_name.clone(),
            has_header: settings.import.has_header,
        }
    }

    /// Reads the snapshot at `path` into a fresh catalog.
    ///
    /// A missing file is a first run and yields an empty catalog.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Catalog> {
        let mut catalog = Catalog::new(self.root_name.as_str());
        if !self.fs.exists(path) {
            debug!("no snapshot at {}, starting empty", path.display());
            return Ok(catalog);
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read snapshot", path)?;
        // Snapshots are always written with a header
        let summary = import_lines(&mut catalog, &content, true);
        debug!(
            "loaded {} records ({} skipped)",
            summary.accepted,
            summary.rejected.len()
        );
        Ok(catalog)
    }

    /// Writes the whole catalog to `path`.
    pub fn save(&self, catalog: &Catalog, path: &Path) -> ApplicationResult<usize> {
        self.export(catalog, path)
    }

    /// Imports every record of the file at `path` into `catalog`.
    #[instrument(level = "debug", skip(self, catalog))]
    pub fn import(&self, catalog: &mut Catalog, path: &Path) -> ApplicationResult<ImportSummary> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read snapshot", path)?;
        let summary = self.import_str(catalog, &content);
        info!(
            "{} records have been imported from {}",
            summary.accepted,
            path.display()
        );
        Ok(summary)
    }

    /// Imports records from already loaded text, honoring `import.has_header`.
    pub fn import_str(&self, catalog: &mut Catalog, content: &str) -> ImportSummary {
        import_lines(catalog, content, self.has_header)
    }

    /// Writes the catalog snapshot to `path`, returning the number of records.
    #[instrument(level = "debug", skip(self, catalog))]
    pub fn export(&self, catalog: &Catalog, path: &Path) -> ApplicationResult<usize> {
        let (content, count) = render_snapshot(catalog)?;
        self.fs
            .write(path, &content)
            .with_path_context("write snapshot", path)?;
        info!("{} records exported to {}", count, path.display());
        Ok(count)
    }
}

fn import_lines(catalog: &mut Catalog, content: &str, skip_header: bool) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for (index, line) in content.lines().enumerate().skip(usize::from(skip_header)) {
        if line.trim().is_empty() {
            continue;
        }
        let filed = parse_record(line, index + 1)
            .and_then(|record| catalog.add_item(&record.category, record.item));
        match filed {
            Ok(_) => summary.accepted += 1,
            Err(e) => {
                warn!("skipping record: {}", e);
                summary.rejected.push(e);
            }
        }
    }
    summary
}

/// Parses one record line; `line` is the 1-based line number for reporting.
pub fn parse_record(text: &str, line: usize) -> DomainResult<Record> {
    let fields = split_record(text);
    if fields.len() < FIELD_COUNT {
        return Err(DomainError::MalformedRecord {
            line,
            reason: format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        });
    }

    let total_copies = parse_number(&fields[5], "total copies", line)?;
    let available_copies = parse_number(&fields[6], "available copies", line)?;
    let publication_year = parse_number(&fields[3], "publication year", line)?;

    Ok(Record {
        category: fields[4].clone(),
        item: Item::new(
            fields[0].as_str(),
            fields[1].as_str(),
            fields[2].as_str(),
            publication_year,
            total_copies,
            available_copies,
        ),
    })
}

fn parse_number<T: FromStr>(field: &str, label: &str, line: usize) -> DomainResult<T> {
    field
        .trim()
        .parse()
        .map_err(|_| DomainError::MalformedRecord {
            line,
            reason: format!("invalid {}: '{}'", label, field),
        })
}

/// Renders the catalog as snapshot text, pre-order from the root.
///
/// Loans end with the session, so copies on loan are written as available.
pub fn render_snapshot(catalog: &Catalog) -> DomainResult<(String, usize)> {
    let tree = catalog.tree();
    let mut content = String::from(HEADER);
    content.push('\n');
    let mut count = 0;

    for (node_id, node) in tree.iter_subtree(tree.root()) {
        let category = tree.category_path(node_id)?;
        for item_id in node.items() {
            let item = tree.item(*item_id)?;
            let record = [
                format_field(&item.title),
                format_field(&item.author),
                format_field(&item.isbn),
                item.publication_year.to_string(),
                format_field(&category),
                item.total_copies.to_string(),
                item.copies_at_rest().to_string(),
            ];
            content.push_str(&record.join(","));
            content.push('\n');
            count += 1;
        }
    }
    Ok((content, count))
}
