use anyhow::Context as _;
use base64::Engine as _;
use bytes::Bytes;
use url::Url;

use crate::fetcher::Fetcher;

/// Produces raw avatar image bytes for an avatar reference.
#[allow(async_fn_in_trait)]
pub trait AvatarSource {
    async fn fetch_avatar(&self, avatar_url: &str) -> anyhow::Result<Bytes>;
}

impl AvatarSource for Fetcher {
    async fn fetch_avatar(&self, avatar_url: &str) -> anyhow::Result<Bytes> {
        let url =
            Url::parse(avatar_url).with_context(|| format!("parse avatar url {avatar_url}"))?;
        let (bytes, _headers) = self.get_bytes(url).await?;
        if bytes.is_empty() {
            anyhow::bail!("avatar at {avatar_url} is empty");
        }
        Ok(bytes)
    }
}

/// Inline `data:` URI for an image.
pub fn data_uri(bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", sniff_image_mime(bytes), b64)
}

/// Best-effort magic bytes; GitHub avatars are PNG unless told otherwise.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\xff\xd8\xff") {
        return "image/jpeg";
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP") {
        return "image/webp";
    }
    "image/png"
}
