//! Markdown note access: file traversal, frontmatter, parsed notes and the store.

pub mod file_ops;
pub mod frontmatter;
pub mod note;
pub mod store;

pub use note::Note;
pub use store::{FilteredSearchResult, NoteListing, NoteSearchResult, NoteStore, SearchFilters, VaultStats};
