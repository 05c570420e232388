use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::Deserialize;

static GHOST: LazyLock<Identity> = LazyLock::new(|| Identity {
    login: "ghost".to_string(),
    avatar_url: String::new(),
});

/// A GitHub discussion as returned by the GraphQL query in `github.rs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub upvote_count: u64,
    #[serde(default)]
    pub author: Option<Identity>,
    #[serde(default)]
    pub comments: Connection<Comment>,
    #[serde(default)]
    pub labels: Connection<Label>,
    #[serde(default)]
    pub category: Option<Category>,
}

impl Discussion {
    /// Deleted accounts come back as `null`; they render as `ghost`.
    pub fn author(&self) -> &Identity {
        self.author.as_ref().unwrap_or(&GHOST)
    }

    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.nodes.iter().map(|l| l.name.as_str())
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T> Connection<T> {
    /// Only what was fetched; anything past the page size is not counted.
    pub fn len(&self) -> u64 {
        self.nodes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub author: Option<Identity>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Connection<Reply>,
}

impl Comment {
    pub fn author(&self) -> &Identity {
        self.author.as_ref().unwrap_or(&GHOST)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default)]
    pub author: Option<Identity>,
    pub created_at: DateTime<Utc>,
}

impl Reply {
    pub fn author(&self) -> &Identity {
        self.author.as_ref().unwrap_or(&GHOST)
    }
}

/// A participant. Two identities with the same `login` are the same person.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl Label {
    /// GitHub reports colors as bare hex (`3498db`).
    pub fn css_color(&self) -> String {
        let c = self.color.trim();
        if c.is_empty() {
            "#8b949e".to_string()
        } else if c.starts_with('#') {
            c.to_string()
        } else {
            format!("#{c}")
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
}
