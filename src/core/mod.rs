pub mod error;
pub mod types;

pub use error::{MigrationError, Result};
pub use types::{
    CandidateDocument, DocumentRef, ID_ATTRIBUTE, Patch, PatchOperations, REVISION_ATTRIBUTE,
    TYPE_ATTRIBUTE,
};
