//! Document utilities shared by the read and write paths.
//!
//! - [`path`] - Dotted-path get/set, nesting and flattening
//! - [`extended`] - Extended-JSON ids and dates
//! - [`row`] - Grid row formatting

pub mod extended;
pub mod path;
pub mod row;

pub use extended::{as_date, as_object_id, format_value, id_to_string, is_object_id_hex};
pub use path::{flatten, get_path, nest, remove_path, set_path};
pub use row::to_row;
