pub mod http;
pub mod local;

pub use http::HttpObjectStore;
pub use local::LocalObjectStore;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Remote store holding raw audio files, keyed by bucket and path.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch `{bucket}/{remote_path}` into `local_path`.
    ///
    /// When `overwrite` is false and `local_path` already exists, the
    /// download is skipped.
    async fn download_to_local(
        &self,
        bucket: &str,
        remote_path: &str,
        local_path: &Path,
        overwrite: bool,
    ) -> Result<()>;

    fn name(&self) -> &'static str;
}
