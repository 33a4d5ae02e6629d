//! Treesync: content-addressed directory trees and one-way diffing
//!
//! Builds memoized, content-hashed trees for two directories, diffs their
//! direct children by name and by content, and plans the actions that would
//! bring the "to" tree in line with the "from" tree.

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod logging;
pub mod reconcile;
pub mod report;
pub mod tree;
pub mod types;
