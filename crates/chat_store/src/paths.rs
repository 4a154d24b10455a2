use std::path::{Path, PathBuf};

pub const STORE_DIR: &str = ".chatline";

#[must_use]
pub fn store_root(cwd: &Path) -> PathBuf {
    cwd.join(STORE_DIR)
}

#[must_use]
pub fn sanitize_key_for_filename(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' | '.' => '-',
            _ => c,
        })
        .collect()
}

#[must_use]
pub fn key_file_name(key: &str) -> String {
    format!("{}.json", sanitize_key_for_filename(key))
}
