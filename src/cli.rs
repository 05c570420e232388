use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use url::Url;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query discussions and write status + discussion cards.
    Render(RenderArgs),
    /// Serve `/discussion_<id>` redirects to the link embedded in a card.
    Serve(ServeArgs),
}

#[derive(Debug, Clone, ClapArgs)]
pub struct RenderArgs {
    /// GitHub token used for the GraphQL query.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository owner.
    #[arg(long)]
    pub owner: String,

    /// Repository name.
    #[arg(long)]
    pub repo: String,

    /// Only include discussions in this category (GraphQL node id).
    #[arg(long)]
    pub category_id: Option<String>,

    /// GraphQL endpoint.
    #[arg(long, default_value = "https://api.github.com/graphql")]
    pub api_url: Url,

    /// Directory the cards are written to.
    #[arg(long, default_value = "out")]
    pub out: PathBuf,

    /// Number of discussion cards, most recently updated first.
    #[arg(long, default_value_t = 5)]
    pub cards: usize,

    /// Emoji drawn in the card's icon box.
    #[arg(long, default_value = "💡")]
    pub emoji: String,

    /// Icon for one category, as `NAME=EMOJI`. Repeatable; other categories use `--emoji`.
    #[arg(long = "category-emoji", value_name = "NAME=EMOJI", value_parser = parse_category_emoji)]
    pub category_emoji: Vec<(String, String)>,

    /// Also upload every card to this Google Cloud Storage bucket.
    #[arg(long)]
    pub bucket: Option<String>,

    /// OAuth access token for the bucket upload.
    #[arg(long, env = "GCS_ACCESS_TOKEN", hide_env_values = true)]
    pub gcs_token: Option<String>,

    /// Storage JSON API base.
    #[arg(long, default_value = "https://storage.googleapis.com/")]
    pub storage_url: Url,

    /// HTTP User-Agent for the API, avatar and storage requests.
    #[arg(long, default_value = "discussion-cards/0.1")]
    pub user_agent: String,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Read cards from a local directory.
    #[arg(long, conflicts_with = "source_url", required_unless_present = "source_url")]
    pub source_dir: Option<PathBuf>,

    /// Read cards from `<url>/<name>` (e.g. `https://storage.googleapis.com/<bucket>`).
    #[arg(long)]
    pub source_url: Option<Url>,

    /// Only redirect to links starting with this prefix.
    #[arg(long)]
    pub allowed_prefix: Option<String>,

    /// HTTP User-Agent for fetching cards.
    #[arg(long, default_value = "discussion-cards/0.1")]
    pub user_agent: String,
}

fn parse_category_emoji(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, emoji)) if !name.trim().is_empty() && !emoji.trim().is_empty() => {
            Ok((name.trim().to_string(), emoji.trim().to_string()))
        }
        _ => Err(format!("expected NAME=EMOJI, got `{s}`")),
    }
}
