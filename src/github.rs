use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::discussion::Discussion;
use crate::fetcher::Fetcher;

const DISCUSSIONS_QUERY: &str = r#"
query($owner: String!, $name: String!, $categoryId: ID, $first: Int!, $comments: Int!, $replies: Int!, $labels: Int!) {
  repository(owner: $owner, name: $name) {
    discussions(first: $first, categoryId: $categoryId, orderBy: {field: UPDATED_AT, direction: DESC}) {
      nodes {
        title
        url
        createdAt
        upvoteCount
        comments(first: $comments) {
          nodes {
            author { login avatarUrl(size: 40) }
            createdAt
            replies(first: $replies) {
              nodes {
                author { login avatarUrl(size: 40) }
                createdAt
              }
            }
          }
        }
        labels(first: $labels) {
          nodes { name color }
        }
        category { name }
        author { login avatarUrl(size: 40) }
      }
    }
  }
}
"#;

/// Fixed page sizes; anything past them is silently not fetched.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageSizes {
    #[serde(rename = "first")]
    pub discussions: u32,
    pub comments: u32,
    pub replies: u32,
    pub labels: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            discussions: 100,
            comments: 20,
            replies: 20,
            labels: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscussionQuery {
    pub owner: String,
    pub name: String,
    pub category_id: Option<String>,
    pub pages: PageSizes,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables<'a> {
    owner: &'a str,
    name: &'a str,
    category_id: Option<&'a str>,
    #[serde(flatten)]
    pages: PageSizes,
}

#[derive(Serialize)]
struct Request<'a> {
    query: &'static str,
    variables: Variables<'a>,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    data: Option<Data>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Data {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    discussions: DiscussionNodes,
}

#[derive(Debug, Deserialize)]
struct DiscussionNodes {
    #[serde(default)]
    nodes: Vec<Discussion>,
}

/// Runs the discussions query, most recently updated first.
pub async fn fetch_discussions(
    fetcher: &Fetcher,
    api_url: &Url,
    token: &str,
    query: &DiscussionQuery,
) -> anyhow::Result<Vec<Discussion>> {
    let request = Request {
        query: DISCUSSIONS_QUERY,
        variables: Variables {
            owner: &query.owner,
            name: &query.name,
            category_id: query.category_id.as_deref(),
            pages: query.pages,
        },
    };

    let response: Response = fetcher
        .post_json(api_url.clone(), token, &request)
        .await
        .context("query discussions")?;

    if let Some(first) = response.errors.first() {
        anyhow::bail!(
            "graphql returned {} error(s), first: {}",
            response.errors.len(),
            first.message
        );
    }

    let repository = response
        .data
        .context("graphql response has no data")?
        .repository
        .with_context(|| format!("repository {}/{} not found", query.owner, query.name))?;

    tracing::info!(
        count = repository.discussions.nodes.len(),
        "fetched discussions"
    );
    Ok(repository.discussions.nodes)
}
