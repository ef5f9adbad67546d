//! The pure filter domain: numeric coercion, bucket derivation, option
//! derivation, selection state, and per-record evaluation. Nothing in here
//! touches the terminal or the filesystem.

pub mod bins;
pub mod eval;
pub mod numeric;
pub mod options;
pub mod state;

pub use bins::{Bucket, BucketId};
pub use eval::{matches, FilterVisibility};
pub use options::{CategoricalField, DynamicFilter, FilterOption};
pub use state::FilterState;
