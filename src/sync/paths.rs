//! Path resolution for memosync directories.

use std::env;
use std::path::PathBuf;

/// Subdirectory of the working copy that new memos are written into.
pub const INBOX_DIR: &str = "00_inbox";

/// Get XDG-compliant data directory for memosync.
///
/// # Returns
/// Path to data directory: `~/.local/share/memosync/`
///
/// # Panics
/// Panics if neither XDG_DATA_HOME nor HOME is set.
pub fn get_data_dir() -> PathBuf {
    let data_home = env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".local/share")
        });

    data_home.join("memosync")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_dir_ends_with_memosync() {
        // Just verify the suffix (env vars are unreliable in parallel tests)
        let path = get_data_dir();
        assert!(path.ends_with("memosync"));
    }
}
