//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a single diagnostic line.
pub fn map_error(e: &ApiError) -> String {
    let mut line = format!("treesync: {}", e);
    if line.contains('\n') {
        line = line.lines().collect::<Vec<_>>().join(" ");
    }
    line
}
