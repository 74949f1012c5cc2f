use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{PrepError, Result};
use crate::storage::ObjectStore;

/// Object store backed by a local directory tree, laid out as
/// `{root}/{bucket}/{path}`. Used for local runs and tests.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn download_to_local(
        &self,
        bucket: &str,
        remote_path: &str,
        local_path: &Path,
        overwrite: bool,
    ) -> Result<()> {
        if !overwrite && local_path.exists() {
            debug!("Skipping existing file {}", local_path.display());
            return Ok(());
        }

        let source = self.root.join(bucket).join(remote_path.trim_start_matches('/'));
        if !source.exists() {
            return Err(PrepError::FileNotFound(source.display().to_string()));
        }

        info!(
            "Copying {} to {}",
            source.display(),
            local_path.display()
        );
        tokio::fs::copy(&source, local_path).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
