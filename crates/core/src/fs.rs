//! Filesystem utilities

use std::path::Path;

/// Check if a path exists
pub fn path_exists(path: &str) -> bool {
    Path::new(path).exists()
}
