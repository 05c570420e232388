use anyhow::{Context as _, anyhow};
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Shared HTTP client. Requests are issued one at a time and never retried.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(user_agent: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self { client })
    }

    pub async fn get_bytes(&self, url: Url) -> anyhow::Result<(Bytes, HeaderMap)> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        if !status.is_success() {
            return Err(anyhow!("GET {} failed with status {}", url, status));
        }
        let bytes = resp.bytes().await.context("read response body")?;
        Ok((bytes, headers))
    }

    /// `Ok(None)` for any non-success status.
    pub async fn get_text_if_ok(&self, url: Url) -> anyhow::Result<Option<String>> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(%url, %status, "document not available");
            return Ok(None);
        }
        let text = resp.text().await.context("read response body")?;
        Ok(Some(text))
    }

    pub async fn post_json<B, T>(&self, url: Url, bearer: &str, body: &B) -> anyhow::Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).context("encode request body")?;
        let resp = self
            .client
            .post(url.clone())
            .bearer_auth(bearer)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .with_context(|| format!("POST {}", url))?;

        let status = resp.status();
        let bytes = resp.bytes().await.context("read response body")?;
        if status != StatusCode::OK {
            return Err(anyhow!(
                "POST {} failed with status {}: {}",
                url,
                status,
                String::from_utf8_lossy(&bytes)
            ));
        }
        serde_json::from_slice(&bytes).with_context(|| format!("decode response from {}", url))
    }

    pub async fn post_bytes(
        &self,
        url: Url,
        bearer: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(url.clone())
            .bearer_auth(bearer)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .with_context(|| format!("POST {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("POST {} failed with status {}: {}", url, status, text));
        }
        Ok(())
    }
}
