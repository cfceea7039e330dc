//! Domain entities: core data structures

use std::fmt;

use generational_arena::Index;

use crate::domain::dynamic_array::DynamicArray;

/// Handle of a category node inside a [`CategoryTree`](crate::domain::CategoryTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(pub(crate) Index);

/// Handle of an item owned by a [`CategoryTree`](crate::domain::CategoryTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemId(pub(crate) Index);

/// Position of a borrower in the catalog registry.
/// Borrowers are never removed, so positions stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowerId(pub(crate) usize);

/// A catalog item (book).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Lookup key, not enforced unique
    pub title: String,
    pub author: String,
    /// External identifier (ISBN)
    pub isbn: String,
    pub publication_year: i32,
    pub total_copies: u32,
    pub available_copies: u32,
    /// Borrowers currently holding a copy, one entry per copy
    pub(crate) current_borrowers: DynamicArray<BorrowerId>,
    /// Everyone who ever borrowed this item, each once
    pub(crate) all_borrowers: DynamicArray<BorrowerId>,
}

impl Item {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        publication_year: i32,
        total_copies: u32,
        available_copies: u32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            publication_year,
            total_copies,
            available_copies,
            current_borrowers: DynamicArray::new(),
            all_borrowers: DynamicArray::new(),
        }
    }

    pub fn current_borrowers(&self) -> &DynamicArray<BorrowerId> {
        &self.current_borrowers
    }

    pub fn all_borrowers(&self) -> &DynamicArray<BorrowerId> {
        &self.all_borrowers
    }

    /// Copies that would be on the shelf once every current loan is returned.
    pub fn copies_at_rest(&self) -> u32 {
        let on_loan = u32::try_from(self.current_borrowers.len()).unwrap_or(u32::MAX);
        self.available_copies.saturating_add(on_loan)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Author: {}", self.author)?;
        writeln!(f, "ISBN: {}", self.isbn)?;
        writeln!(f, "Publication Year: {}", self.publication_year)?;
        writeln!(f, "Total copies: {}", self.total_copies)?;
        write!(f, "Available copies: {}", self.available_copies)
    }
}

/// Partial update of an item's fields.
///
/// `None` and empty strings leave the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemEdit {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub total_copies: Option<u32>,
    pub available_copies: Option<u32>,
}

impl ItemEdit {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(&self, item: &mut Item) {
        fn set_text(target: &mut String, value: &Option<String>) {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                *target = value.to_string();
            }
        }

        set_text(&mut item.title, &self.title);
        set_text(&mut item.author, &self.author);
        set_text(&mut item.isbn, &self.isbn);
        if let Some(year) = self.publication_year {
            item.publication_year = year;
        }
        if let Some(total) = self.total_copies {
            item.total_copies = total;
        }
        if let Some(available) = self.available_copies {
            item.available_copies = available;
        }
    }
}

/// A person holding items, identified by the (name, id) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Borrower {
    pub name: String,
    pub id: String,
    /// Items currently borrowed, non-owning
    pub(crate) borrowed: DynamicArray<ItemId>,
}

impl Borrower {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            borrowed: DynamicArray::new(),
        }
    }

    pub fn matches(&self, name: &str, id: &str) -> bool {
        self.name == name && self.id == id
    }

    pub fn borrowed(&self) -> &DynamicArray<ItemId> {
        &self.borrowed
    }
}

impl fmt::Display for Borrower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_edit_with_empty_strings_when_applying_then_keeps_text_fields() {
        let mut item = Item::new("Dune", "Herbert", "isbn-1", 1965, 3, 2);
        let edit = ItemEdit {
            title: Some(String::new()),
            author: Some("Frank Herbert".into()),
            available_copies: Some(1),
            ..ItemEdit::default()
        };

        edit.apply(&mut item);

        assert_eq!(item.title, "Dune");
        assert_eq!(item.author, "Frank Herbert");
        assert_eq!(item.available_copies, 1);
        assert_eq!(item.total_copies, 3);
    }

    #[test]
    fn given_item_when_displaying_then_lists_all_fields() {
        let item = Item::new("Dune", "Herbert", "isbn-1", 1965, 3, 2);
        let text = item.to_string();
        assert!(text.starts_with("Title: Dune\n"));
        assert!(text.ends_with("Available copies: 2"));
    }
}
