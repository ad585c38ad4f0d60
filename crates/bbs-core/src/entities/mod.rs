//! Records the engine produces and persists.
//!
//! All structs derive `Serialize` and `Deserialize`; only
//! [`ThreadIndexEntry`] is durable; the rest are rebuilt per call.

mod fetch;
mod index;
mod post;
mod response;
mod subject;

pub use fetch::DatFetchOutcome;
pub use index::{EntryPatch, ThreadIndexEntry};
pub use post::{FormFields, PostAttempt, PostOutcome};
pub use response::{EMPTY_BODY_PLACEHOLDER, ResponseRecord};
pub use subject::SubjectRecord;
