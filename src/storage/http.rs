use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{PrepError, Result};
use crate::storage::ObjectStore;

/// Object store backed by an HTTP server exposing `{base_url}/{bucket}/{path}`.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn object_url(&self, bucket: &str, remote_path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            bucket,
            remote_path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
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

        let url = self.object_url(bucket, remote_path);
        info!("Downloading {} to {}", url, local_path.display());

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(PrepError::Download(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        // Stream to a partial file, then rename into place so a failed
        // download never leaves a truncated file at the target path.
        let partial_path = local_path.with_extension("part");
        let mut file = tokio::fs::File::create(&partial_path).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        drop(file);
        tokio::fs::rename(&partial_path, local_path).await?;

        debug!("Downloaded {} bytes to {}", written, local_path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
