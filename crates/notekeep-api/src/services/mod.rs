//! Service layer for business logic.

pub mod labels;
pub mod note_labels;
pub mod notes;

pub use labels::LabelService;
pub use note_labels::NoteLabelService;
pub use notes::NoteService;
