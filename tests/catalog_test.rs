//! Tests for the Catalog facade: items, categories, borrowers

use rstest::{fixture, rstest};

use shelftree::domain::{Catalog, DomainError, Item, ItemEdit};
use shelftree::util::testing;

fn book(title: &str, total: u32, available: u32) -> Item {
    Item::new(title, "Author", format!("isbn-{title}"), 1965, total, available)
}

#[fixture]
fn catalog() -> Catalog {
    testing::init_test_setup();
    let mut catalog = Catalog::new("Library");
    catalog.add_item("Fiction/SciFi", book("Dune", 2, 2)).unwrap();
    catalog.add_item("Fiction/SciFi", book("Foundation", 1, 1)).unwrap();
    catalog.add_item("Fiction/Mystery", book("The Big Sleep", 1, 1)).unwrap();
    catalog.add_item("History", book("SPQR", 1, 0)).unwrap();
    catalog
}

fn titles(items: Vec<&Item>) -> Vec<String> {
    let mut titles: Vec<String> = items.into_iter().map(|i| i.title.clone()).collect();
    titles.sort();
    titles
}

fn root_count(catalog: &Catalog) -> usize {
    let tree = catalog.tree();
    tree.node(tree.root()).unwrap().item_count()
}

#[rstest]
fn given_catalog_when_finding_item_then_first_match_returned(catalog: Catalog) {
    let item = catalog.find_item("Dune").unwrap();
    assert_eq!(item.total_copies, 2);
    assert_eq!(
        catalog.find_item("Neuromancer"),
        Err(DomainError::ItemNotFound("Neuromancer".into()))
    );
}

#[rstest]
fn given_catalog_when_finding_all_then_subtree_items(catalog: Catalog) {
    assert_eq!(
        titles(catalog.find_all("Fiction").unwrap()),
        vec!["Dune", "Foundation", "The Big Sleep"]
    );
    assert_eq!(catalog.find_all("").unwrap().len(), 4);
    assert!(matches!(
        catalog.find_all("Poetry"),
        Err(DomainError::CategoryNotFound(_))
    ));
}

#[rstest]
fn given_edit_when_applied_then_fields_change_and_empty_strings_ignored(mut catalog: Catalog) {
    // Arrange
    let edit = ItemEdit {
        title: Some("Dune Messiah".into()),
        author: Some(String::new()),
        total_copies: Some(5),
        ..ItemEdit::default()
    };

    // Act
    catalog.edit_item("Dune", &edit).unwrap();

    // Assert
    let item = catalog.find_item("Dune Messiah").unwrap();
    assert_eq!(item.author, "Author");
    assert_eq!(item.total_copies, 5);
    assert!(catalog.find_item("Dune").is_err());
}

#[rstest]
#[case(Some(1), Some(2))]
#[case(None, Some(3))]
#[case(Some(1), None)]
fn given_available_above_total_when_editing_then_rejected_and_unchanged(
    mut catalog: Catalog,
    #[case] total: Option<u32>,
    #[case] available: Option<u32>,
) {
    let edit = ItemEdit {
        total_copies: total,
        available_copies: available,
        ..ItemEdit::default()
    };

    let result = catalog.edit_item("Dune", &edit).map(|_| ());

    assert!(
        matches!(result, Err(DomainError::InvalidCopies { .. })),
        "{:?}",
        result
    );
    let item = catalog.find_item("Dune").unwrap();
    assert_eq!((item.total_copies, item.available_copies), (2, 2));
}

#[rstest]
fn given_copy_on_loan_when_editing_counts_then_loan_is_counted(mut catalog: Catalog) {
    // Arrange
    catalog.borrow("Dune", "Ann", "1").unwrap();
    let restock = ItemEdit {
        available_copies: Some(2),
        ..ItemEdit::default()
    };
    let shrink = ItemEdit {
        total_copies: Some(1),
        available_copies: Some(0),
        ..ItemEdit::default()
    };

    // Act
    let restocked = catalog.edit_item("Dune", &restock).map(|i| i.available_copies);
    let shrunk = catalog.edit_item("Dune", &shrink).map(|i| i.total_copies);

    // Assert
    assert_eq!(
        restocked,
        Err(DomainError::InvalidCopies {
            title: "Dune".into(),
            available: 2,
            on_loan: 1,
            total: 2,
        })
    );
    assert_eq!(shrunk, Ok(1));
}

#[rstest]
fn given_item_when_removed_then_counts_drop(mut catalog: Catalog) {
    let removed = catalog.remove_item("Foundation").unwrap();

    assert_eq!(removed.title, "Foundation");
    assert_eq!(root_count(&catalog), 3);
    let scifi = catalog.find_category("Fiction/SciFi").unwrap();
    assert_eq!(catalog.tree().node(scifi).unwrap().item_count(), 1);
}

#[rstest]
fn given_category_when_removed_then_items_destroyed(mut catalog: Catalog) {
    let removed = catalog.remove_category("Fiction").unwrap();

    assert_eq!(removed, 3);
    assert_eq!(root_count(&catalog), 1);
    assert!(catalog.find_category("Fiction/SciFi").is_err());
    assert!(catalog.find_item("Dune").is_err());
}

#[rstest]
#[case("")]
#[case("/")]
fn given_root_path_when_removing_category_then_root_violation(
    mut catalog: Catalog,
    #[case] path: &str,
) {
    assert_eq!(catalog.remove_category(path), Err(DomainError::RootViolation));
    assert_eq!(root_count(&catalog), 4);
}

#[rstest]
fn given_category_when_renamed_then_items_follow(mut catalog: Catalog) {
    // Act
    let target = catalog.rename_category("Fiction", "Novels/Fiction").unwrap();

    // Assert
    assert_eq!(catalog.tree().full_path(target).unwrap(), "Library/Novels/Fiction");
    assert!(catalog.find_category("Fiction").is_err());
    assert_eq!(
        titles(catalog.find_all("Novels/Fiction/SciFi").unwrap()),
        vec!["Dune", "Foundation"]
    );
    assert_eq!(
        titles(catalog.find_all("Novels/Fiction/Mystery").unwrap()),
        vec!["The Big Sleep"]
    );
    assert_eq!(root_count(&catalog), 4);
    let novels = catalog.find_category("Novels").unwrap();
    assert_eq!(catalog.tree().node(novels).unwrap().item_count(), 3);
}

#[rstest]
fn given_borrowed_item_when_category_renamed_then_link_survives(mut catalog: Catalog) {
    catalog.borrow("Dune", "Ann", "1").unwrap();

    catalog.rename_category("Fiction/SciFi", "SF").unwrap();

    let held = catalog.borrowed_items("Ann", "1").unwrap();
    assert_eq!(titles(held), vec!["Dune"]);
    catalog.return_item("Dune", "Ann", "1").unwrap();
    assert_eq!(catalog.find_item("Dune").unwrap().available_copies, 2);
}

#[rstest]
fn given_bad_targets_when_renaming_then_rejected(mut catalog: Catalog) {
    assert_eq!(
        catalog.rename_category("Fiction", "History"),
        Err(DomainError::DuplicateCategory("History".into()))
    );
    assert!(matches!(
        catalog.rename_category("Fiction", "Fiction/Inner"),
        Err(DomainError::InvalidMove { .. })
    ));
    assert_eq!(catalog.rename_category("", "X"), Err(DomainError::RootViolation));
    assert!(matches!(
        catalog.rename_category("Poetry", "Verse"),
        Err(DomainError::CategoryNotFound(_))
    ));
    assert_eq!(root_count(&catalog), 4);
}

#[rstest]
fn given_available_copy_when_borrowing_then_both_sides_linked(mut catalog: Catalog) {
    // Act
    let id = catalog.borrow("Dune", "Ann", "1").unwrap();

    // Assert
    assert_eq!(catalog.find_item("Dune").unwrap().available_copies, 1);
    let borrower = catalog.borrower(id).unwrap();
    assert_eq!(borrower.to_string(), "Ann (ID: 1)");
    assert_eq!(borrower.borrowed().len(), 1);
    let current: Vec<String> = catalog
        .current_borrowers("Dune")
        .unwrap()
        .iter()
        .map(|b| b.to_string())
        .collect();
    assert_eq!(current, vec!["Ann (ID: 1)"]);
}

#[rstest]
fn given_no_copies_left_when_borrowing_then_rejected(mut catalog: Catalog) {
    assert_eq!(
        catalog.borrow("SPQR", "Ann", "1"),
        Err(DomainError::NoCopiesAvailable("SPQR".into()))
    );
    assert!(catalog.borrowers().is_empty());
}

#[rstest]
fn given_same_borrower_twice_when_borrowing_then_registered_once(mut catalog: Catalog) {
    let first = catalog.borrow("Dune", "Ann", "1").unwrap();
    let second = catalog.borrow("Foundation", "Ann", "1").unwrap();
    catalog.borrow("The Big Sleep", "Bob", "2").unwrap();

    assert_eq!(first, second);
    assert_eq!(catalog.borrowers().len(), 2);
    assert_eq!(
        titles(catalog.borrowed_items("Ann", "1").unwrap()),
        vec!["Dune", "Foundation"]
    );
}

#[rstest]
fn given_returned_item_when_listing_then_all_time_keeps_borrower(mut catalog: Catalog) {
    // Arrange
    catalog.borrow("Dune", "Ann", "1").unwrap();
    catalog.borrow("Dune", "Bob", "2").unwrap();

    // Act
    catalog.return_item("Dune", "Ann", "1").unwrap();

    // Assert
    let item = catalog.find_item("Dune").unwrap();
    assert_eq!(item.available_copies, 1);
    let current: Vec<String> = catalog
        .current_borrowers("Dune")
        .unwrap()
        .iter()
        .map(|b| b.name.clone())
        .collect();
    let all: Vec<String> = catalog
        .all_borrowers("Dune")
        .unwrap()
        .iter()
        .map(|b| b.name.clone())
        .collect();
    assert_eq!(current, vec!["Bob"]);
    assert_eq!(all, vec!["Ann", "Bob"]);
    assert!(catalog.borrowed_items("Ann", "1").unwrap().is_empty());
}

#[rstest]
fn given_non_holder_when_returning_then_not_borrowed_by(mut catalog: Catalog) {
    catalog.borrow("Dune", "Ann", "1").unwrap();

    let result = catalog.return_item("Dune", "Ann", "2");

    assert!(matches!(result, Err(DomainError::NotBorrowedBy { .. })));
    assert_eq!(catalog.find_item("Dune").unwrap().available_copies, 1);
}

#[rstest]
fn given_unknown_borrower_when_listing_items_then_not_found(catalog: Catalog) {
    assert_eq!(
        catalog.borrowed_items("Zed", "9").unwrap_err(),
        DomainError::BorrowerNotFound {
            name: "Zed".into(),
            id: "9".into()
        }
    );
}

#[rstest]
fn given_borrowed_item_when_removed_then_borrower_released(mut catalog: Catalog) {
    catalog.borrow("Dune", "Ann", "1").unwrap();
    catalog.borrow("Foundation", "Ann", "1").unwrap();

    catalog.remove_item("Dune").unwrap();

    assert_eq!(
        titles(catalog.borrowed_items("Ann", "1").unwrap()),
        vec!["Foundation"]
    );
}

#[rstest]
fn given_borrowed_items_when_category_removed_then_borrower_released(mut catalog: Catalog) {
    catalog.borrow("Dune", "Ann", "1").unwrap();
    catalog.borrow("SPQR", "Bob", "2").unwrap_err();

    catalog.remove_category("Fiction").unwrap();

    assert!(catalog.borrowed_items("Ann", "1").unwrap().is_empty());
}

#[test]
fn given_new_catalog_when_adding_category_then_findable() {
    let mut catalog = Catalog::new("Stacks");

    let node = catalog.add_category("Reference/Maps");

    assert_eq!(catalog.find_category("Reference/Maps"), Ok(node));
    assert_eq!(catalog.tree().full_path(node).unwrap(), "Stacks/Reference/Maps");
}
