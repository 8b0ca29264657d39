//! Editor write path.
//!
//! - [`MutationTranslator`] - turns create/edit/remove payloads into inserts,
//!   `$set`/`$unset` updates and deletes
//! - [`EditProcessor`] - applies them target by target and reports outcomes

mod processor;
mod translator;

pub use processor::EditProcessor;
pub use translator::{MutationOp, MutationTranslator};
