//! Storage directory grants.

use std::path::PathBuf;

use async_trait::async_trait;

/// Asks the user to pick (or allow) a directory for report storage.
#[async_trait]
pub trait DirectoryAccess: Send + Sync {
    /// Returns the granted directory, or `None` if the user refused.
    async fn request_directory(&self) -> Option<PathBuf>;
}

/// Grants a fixed directory without asking.
#[derive(Debug, Clone)]
pub struct FixedDirectory {
    path: PathBuf,
}

impl FixedDirectory {
    /// Creates a grant for `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DirectoryAccess for FixedDirectory {
    async fn request_directory(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

/// Always refuses; persistence is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedDirectory;

#[async_trait]
impl DirectoryAccess for DeniedDirectory {
    async fn request_directory(&self) -> Option<PathBuf> {
        None
    }
}
