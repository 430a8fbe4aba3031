//! Unit tests for configuration loading and validation.
//!
//! - `helpers`: shared layer composition
//! - `precedence`: layer precedence
//! - `settings`: validation into `CollectionSettings`

mod helpers;
