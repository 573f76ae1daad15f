//! Rust client for the blog gateway's browser-facing API.

use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    #[serde(default)]
    pub content: String,
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub last_page: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostEnvelope {
    #[serde(default)]
    pub post: Option<Post>,
}

pub struct GatewayClient {
    client: Client,
    gateway_url: String,
}

impl GatewayClient {
    pub fn new(gateway_url: &str) -> Self {
        Self {
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
        }
    }

    /// One page of the post listing.
    pub async fn list_posts(&self, page: u32) -> Result<PostPage, Box<dyn std::error::Error>> {
        let url = self.url(&["api", "getters", "posts", &page.to_string()])?;
        self.get_json(url).await
    }

    /// One page of the posts carrying `tag`.
    pub async fn list_posts_by_tag(
        &self,
        tag: &str,
        page: u32,
    ) -> Result<PostPage, Box<dyn std::error::Error>> {
        let url = self.url(&["api", "filter", "tags", tag, &page.to_string()])?;
        self.get_json(url).await
    }

    /// A single post; `None` when the blog has no such slug.
    pub async fn get_post(&self, slug: &str) -> Result<Option<Post>, Box<dyn std::error::Error>> {
        let url = self.url(&["api", "getters", "post", slug])?;
        let envelope: PostEnvelope = self.get_json(url).await?;
        Ok(envelope.post)
    }

    /// Raw image response, for callers that want to stream it.
    pub async fn get_image(
        &self,
        slug: &str,
        image: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let url = self.url(&["posts", slug, image])?;
        Ok(self.client.get(url).send().await?)
    }

    /// The RSS feed as text.
    pub async fn get_feed(&self) -> Result<String, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .get(format!("{}/feed.rss", self.gateway_url))
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(format!("Gateway returned error status {}: {}", status, text).into());
        }
        Ok(text)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
        let mut url = Url::parse(&self.gateway_url)?;
        url.path_segments_mut()
            .map_err(|_| "gateway URL cannot carry a path")?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: Url,
    ) -> Result<T, Box<dyn std::error::Error>> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(format!("Gateway returned error status {}: {}", status, text).into());
        }

        match serde_json::from_str::<T>(&text) {
            Ok(value) => Ok(value),
            Err(e) => Err(e.into()),
        }
    }
}
