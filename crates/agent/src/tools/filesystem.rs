//! File system tools
//!
//! Each operation catches its own I/O errors, logs them and returns the
//! tool's failure value instead.

use std::path::Path;
use tokio::fs::OpenOptions;
use tracing::{debug, warn};

use super::Toolbox;

impl Toolbox {
    /// Touch `file_path/file_name`. An existing file is left as is.
    pub async fn create_file(&self, file_path: &str, file_name: &str) -> bool {
        let full_path = self.resolve(file_path).join(file_name);
        debug!("creating file {:?}", full_path);

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&full_path)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!("could not create {:?}: {}", full_path, e);
                false
            }
        }
    }

    /// Immediate children of `directory`, each joined onto it, sorted.
    /// Missing or unreadable directories give an empty list.
    pub async fn list_files_in_directory(&self, directory: &str) -> Vec<String> {
        let dir = self.resolve(directory);
        debug!("listing {:?}", dir);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("could not list {:?}: {}", dir, e);
                return Vec::new();
            }
        };

        let mut items = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => items.push(
                    Path::new(directory)
                        .join(entry.file_name())
                        .to_string_lossy()
                        .into_owned(),
                ),
                Ok(None) => break,
                Err(e) => {
                    warn!("error while listing {:?}: {}", dir, e);
                    return Vec::new();
                }
            }
        }
        items.sort();
        items
    }

    pub async fn read_file(&self, file_path: &str) -> String {
        let path = self.resolve(file_path);
        debug!("reading {:?}", path);

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("could not read {:?}: {}", path, e);
                String::new()
            }
        }
    }

    /// Replace the whole file with `content`
    pub async fn write_in_file(&self, file_path: &str, content: &str) -> bool {
        let path = self.resolve(file_path);
        debug!("writing {} bytes to {:?}", content.len(), path);

        match tokio::fs::write(&path, content).await {
            Ok(()) => true,
            Err(e) => {
                warn!("could not write {:?}: {}", path, e);
                false
            }
        }
    }

    /// Literal replace-all of `old` with `new`, then rewrite the file.
    /// A file without `old` is left untouched. No backup is kept and the
    /// rewrite is not atomic.
    pub async fn update_in_file(&self, file_path: &str, old: &str, new: &str) -> bool {
        let path = self.resolve(file_path);

        if old.is_empty() {
            warn!("refusing to update {:?}: empty search text", path);
            return false;
        }

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("could not read {:?} for update: {}", path, e);
                return false;
            }
        };

        let occurrences = content.matches(old).count();
        debug!("updating {:?}: {} occurrences", path, occurrences);
        if occurrences == 0 {
            return true;
        }

        match tokio::fs::write(&path, content.replace(old, new)).await {
            Ok(()) => true,
            Err(e) => {
                warn!("could not rewrite {:?}: {}", path, e);
                false
            }
        }
    }

    pub async fn delete_file(&self, file_path: &str) -> bool {
        let path = self.resolve(file_path);
        debug!("deleting {:?}", path);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) => {
                warn!("could not delete {:?}: {}", path, e);
                false
            }
        }
    }
}
