use std::path::PathBuf;

use anyhow::Context as _;
use url::Url;

use crate::fetcher::Fetcher;

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Accepts a finished document under a file name.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn put(&self, name: &str, body: &str) -> anyhow::Result<()>;
}

/// Writes documents into a local directory.
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        Ok(Self { dir })
    }
}

impl DocumentStore for DirStore {
    async fn put(&self, name: &str, body: &str) -> anyhow::Result<()> {
        let path = self.dir.join(name);
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved document");
        Ok(())
    }
}

/// Google Cloud Storage simple media upload.
pub struct GcsStore {
    fetcher: Fetcher,
    api_base: Url,
    bucket: String,
    token: String,
}

impl GcsStore {
    pub fn new(fetcher: Fetcher, api_base: Url, bucket: String, token: String) -> Self {
        Self {
            fetcher,
            api_base,
            bucket,
            token,
        }
    }

    fn upload_url(&self, name: &str) -> anyhow::Result<Url> {
        let mut url = self
            .api_base
            .join(&format!("upload/storage/v1/b/{}/o", self.bucket))
            .with_context(|| format!("build upload url for bucket {}", self.bucket))?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", name);
        Ok(url)
    }
}

impl DocumentStore for GcsStore {
    async fn put(&self, name: &str, body: &str) -> anyhow::Result<()> {
        let url = self.upload_url(name)?;
        self.fetcher
            .post_bytes(url, &self.token, SVG_CONTENT_TYPE, body.as_bytes().to_vec())
            .await
            .with_context(|| format!("upload {} to bucket {}", name, self.bucket))?;
        tracing::info!(bucket = %self.bucket, %name, "uploaded document");
        Ok(())
    }
}

/// Local copy first, then the bucket when one is configured.
pub struct Outputs {
    pub dir: DirStore,
    pub bucket: Option<GcsStore>,
}

impl DocumentStore for Outputs {
    async fn put(&self, name: &str, body: &str) -> anyhow::Result<()> {
        self.dir.put(name, body).await?;
        if let Some(bucket) = &self.bucket {
            bucket.put(name, body).await?;
        }
        Ok(())
    }
}
