pub mod draft;
pub mod field;
pub mod row;
pub mod session;

pub use draft::Draft;
pub use field::{normalize, FieldIssue};
pub use row::{CollectionRow, RowEditState};
pub use session::{WizardMode, WizardSession};
