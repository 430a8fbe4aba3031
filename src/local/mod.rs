//! Local bare mirrors of GitHub repositories.
//!
//! Diffs computed from a local mirror avoid one REST call per changed file
//! and work for pull requests whose head lives on a fork. [`GitMirror`]
//! creates, verifies and refreshes mirrors; [`MirrorHandle`] is what a
//! repository worker holds while it resolves diffs.

mod error;
mod mirror;
mod transport;
mod types;

pub use error::MirrorError;
pub use mirror::{GitMirror, MirrorHandle};
pub use types::CommitSha;

#[cfg(test)]
pub(crate) mod test_support;
