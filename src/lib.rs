mod activity;
mod avatars;
mod card;
mod cli;
mod discussion;
mod fetcher;
mod github;
mod layout;
mod participants;
mod progress;
mod redirect;
mod status;
mod storage;
mod strict;

use anyhow::Context as _;

pub use activity::{ActivityEvent, ActivitySummary, summarize_activity};
pub use avatars::{AvatarSource, data_uri};
pub use card::{CategoryEmoji, DiscussionCard, discussion_svg, render_discussion_card, status_svg};
pub use cli::{Args as CliArgs, Command, ProgressMode, RenderArgs, ServeArgs};
pub use discussion::{Comment, Discussion, Identity, Label, Reply};
pub use fetcher::Fetcher;
pub use layout::{BadgeMetrics, DiscussionLayout, LayoutBox, StatusLayout};
pub use participants::{ParticipantSet, collect_participants};
pub use redirect::{DocumentSource, RedirectState, Resolution, extract_discussion_url, router};
pub use status::{STATUSES, Status, StatusTally};
pub use storage::{DirStore, DocumentStore, GcsStore, Outputs};

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    match args.command {
        Command::Render(args) => render(args).await,
        Command::Serve(args) => serve(args).await,
    }
}

pub async fn render(args: RenderArgs) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let token = args
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .context("GITHUB_TOKEN is not set")?
        .to_string();
    let fetcher = Fetcher::new(&args.user_agent)?;
    let outputs = outputs_for_args(&args, &fetcher)?;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = progress::Progress::new(progress_enabled);

    progress.set_stage("querying discussions");
    let query = github::DiscussionQuery {
        owner: args.owner.clone(),
        name: args.repo.clone(),
        category_id: args.category_id.clone(),
        pages: github::PageSizes::default(),
    };
    let discussions = github::fetch_discussions(&fetcher, &args.api_url, &token, &query).await?;

    let card_count = discussions.len().min(args.cards);
    progress.set_cards_total(STATUSES.len() + card_count);

    let icons = CategoryEmoji::new(&args.emoji, &args.category_emoji);
    let res = render_all(&discussions, card_count, &icons, &fetcher, &outputs, &progress).await;
    progress.finish();
    res
}

/// Renders status cards for the whole set, then one card per leading discussion.
///
/// A card that cannot be stored is logged and skipped; the run still fails
/// once every other card has been written.
async fn render_all<A, S>(
    discussions: &[Discussion],
    card_count: usize,
    icons: &CategoryEmoji,
    avatars: &A,
    store: &S,
    progress: &progress::Progress,
) -> anyhow::Result<()>
where
    A: AvatarSource,
    S: DocumentStore,
{
    let mut failed = 0usize;

    progress.set_stage("rendering status cards");
    let tally = StatusTally::from_discussions(discussions);
    for (status, count) in tally.iter() {
        tracing::info!(status = status.key, count, "rendering status card");
        let name = format!("{}.svg", status.file_stem());
        let svg = status_svg(&status, count);
        if !publish_or_warn(store, &name, &svg).await {
            failed += 1;
        }
        progress.card_done(&name);
    }

    progress.set_stage("rendering discussion cards");
    for (i, discussion) in discussions.iter().take(card_count).enumerate() {
        tracing::info!(title = %discussion.title, "rendering discussion card");
        let name = format!("discussion_{i}.svg");
        let card = DiscussionCard::from_discussion(discussion, icons.for_discussion(discussion));
        let svg = render_discussion_card(&card, avatars).await;
        if !publish_or_warn(store, &name, &svg).await {
            failed += 1;
        }
        progress.card_done(&name);
    }

    if failed > 0 {
        anyhow::bail!(
            "{failed} of {} cards could not be stored",
            STATUSES.len() + card_count
        );
    }
    Ok(())
}

async fn publish_or_warn<S: DocumentStore>(store: &S, name: &str, svg: &str) -> bool {
    match publish(store, name, svg).await {
        Ok(()) => true,
        Err(e) => {
            let reason = format!("{e:#}");
            tracing::warn!(%name, %reason, "failed to store card; continuing");
            false
        }
    }
}

async fn publish<S: DocumentStore>(store: &S, name: &str, svg: &str) -> anyhow::Result<()> {
    strict::assert_self_contained(name, svg)?;
    store
        .put(name, svg)
        .await
        .with_context(|| format!("store {name}"))
}

fn outputs_for_args(args: &RenderArgs, fetcher: &Fetcher) -> anyhow::Result<Outputs> {
    let bucket = match &args.bucket {
        Some(bucket) => {
            let gcs_token = args
                .gcs_token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .context("--bucket is set but GCS_ACCESS_TOKEN is not")?;
            Some(GcsStore::new(
                fetcher.clone(),
                args.storage_url.clone(),
                bucket.clone(),
                gcs_token.to_string(),
            ))
        }
        None => None,
    };
    let dir = DirStore::new(args.out.clone())?;
    Ok(Outputs { dir, bucket })
}

pub async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let source = match (&args.source_dir, &args.source_url) {
        (Some(dir), _) => DocumentSource::Dir(dir.clone()),
        (None, Some(url)) => DocumentSource::Http {
            fetcher: Fetcher::new(&args.user_agent)?,
            base_url: url.clone(),
        },
        (None, None) => anyhow::bail!("one of --source-dir or --source-url is required"),
    };
    let state = RedirectState {
        source,
        allowed_prefix: args.allowed_prefix.clone(),
    };
    redirect::serve(&args.listen, state).await
}
