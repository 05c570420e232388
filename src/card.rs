use std::collections::HashMap;

use chrono::{DateTime, Utc};
use maud::{Markup, PreEscaped, html};

use crate::activity::{ActivityEvent, summarize_activity};
use crate::avatars::{AvatarSource, data_uri};
use crate::discussion::{Discussion, Label};
use crate::layout::{
    AVATAR_GAP, AVATAR_SIZE, AVATAR_START_X, COMMENT_Y, DISCUSSION_HEIGHT, DISCUSSION_WIDTH,
    DiscussionLayout, EMOJI_BOX_SIZE, EMOJI_BOX_X, LABEL_ORIGIN, STATUS_HEIGHT, STATUS_WIDTH,
    StatusLayout, UPVOTE_Y, avatar_slots,
};
use crate::participants::{ParticipantSet, collect_participants};
use crate::status::Status;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const CARD_FILL: &str = "#212830";
const TEXT_FILL: &str = "#9198a1";
const UPVOTE_FILL: &str = "#478be6";
const COMMENT_FILL: &str = "#8b949e";

const UPVOTE_ICON: &str = "M3.47 7.78a.75.75 0 0 1 0-1.06l4.25-4.25a.75.75 0 0 1 1.06 0l4.25 4.25a.751.751 0 0 1-.018 1.042.751.751 0 0 1-1.042.018L9 4.81v7.44a.75.75 0 0 1-1.5 0V4.81L4.53 7.78a.75.75 0 0 1-1.06 0Z";
const COMMENT_ICON: &str = "M1 2.75C1 1.784 1.784 1 2.75 1h10.5c.966 0 1.75.784 1.75 1.75v7.5A1.75 1.75 0 0 1 13.25 12H9.06l-2.573 2.573A1.458 1.458 0 0 1 4 13.543V12H2.75A1.75 1.75 0 0 1 1 10.25Zm1.75-.25a.25.25 0 0 0-.25.25v7.5c0 .138.112.25.25.25h2a.75.75 0 0 1 .75.75v2.19l2.72-2.72a.749.749 0 0 1 .53-.22h4.5a.25.25 0 0 0 .25-.25v-7.5a.25.25 0 0 0-.25-.25Z";

/// Icon per category name, with a fallback for everything else.
#[derive(Debug, Clone, Default)]
pub struct CategoryEmoji {
    fallback: String,
    by_category: HashMap<String, String>,
}

impl CategoryEmoji {
    pub fn new(fallback: &str, pairs: &[(String, String)]) -> Self {
        Self {
            fallback: fallback.to_string(),
            by_category: pairs.iter().cloned().collect(),
        }
    }

    pub fn for_discussion(&self, discussion: &Discussion) -> &str {
        discussion
            .category_name()
            .and_then(|name| self.by_category.get(name))
            .unwrap_or(&self.fallback)
    }
}

/// Everything a discussion card shows, already reduced from the raw tree.
#[derive(Debug, Clone)]
pub struct DiscussionCard {
    pub title: String,
    pub url: String,
    pub emoji: String,
    pub category: Option<String>,
    pub labels: Vec<Label>,
    pub upvotes: u64,
    pub total_comments: u64,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub latest: Option<ActivityEvent>,
    pub participants: ParticipantSet,
}

impl DiscussionCard {
    pub fn from_discussion(discussion: &Discussion, emoji: &str) -> Self {
        let activity = summarize_activity(discussion);
        Self {
            title: discussion.title.clone(),
            url: discussion.url.clone(),
            emoji: emoji.to_string(),
            category: discussion.category_name().map(str::to_string),
            labels: discussion.labels.nodes.clone(),
            upvotes: discussion.upvote_count,
            total_comments: activity.total_comments,
            author: discussion.author().login.clone(),
            created_at: discussion.created_at,
            latest: activity.latest,
            participants: collect_participants(discussion),
        }
    }
}

/// Fetches avatars in order and renders the card.
///
/// An avatar that cannot be fetched is logged and left out; the remaining
/// ones close the gap.
pub async fn render_discussion_card<A: AvatarSource>(card: &DiscussionCard, avatars: &A) -> String {
    let mut images = Vec::new();
    for participant in card.participants.rendered() {
        if participant.avatar_url.is_empty() {
            tracing::debug!(login = %participant.login, "no avatar reference");
            continue;
        }
        match avatars.fetch_avatar(&participant.avatar_url).await {
            Ok(bytes) => images.push(data_uri(&bytes)),
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::warn!(login = %participant.login, %reason, "avatar fetch failed; omitting");
            }
        }
    }
    discussion_svg(card, &DiscussionLayout::compute(card), &images)
}

/// The comment carrying the discussion link; read back by the redirect service.
///
/// XML comments may not contain `--`, so a `-` that follows another `-` is
/// written as `\-` and a literal backslash as `\\`.
pub fn url_comment(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len() + 2);
    let mut prev = None;
    for c in url.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '-' if prev == Some('-') => escaped.push_str("\\-"),
            c => escaped.push(c),
        }
        prev = Some(c);
    }
    format!("<!-- {escaped} -->")
}

pub fn discussion_svg(card: &DiscussionCard, layout: &DiscussionLayout, avatars: &[String]) -> String {
    let slots = avatar_slots(avatars.len(), AVATAR_START_X, AVATAR_GAP);
    let (emoji_x, emoji_y) = layout.emoji_text;

    let markup = html! {
        svg width=(DISCUSSION_WIDTH) height=(DISCUSSION_HEIGHT) xmlns=(SVG_NS) {
            (PreEscaped(url_comment(&card.url)))
            defs {
                (shadow_filter())
                clipPath id="circle-clip" {
                    circle cx="0" cy="0" r=(AVATAR_SIZE / 2.0) {}
                }
            }
            (background(DISCUSSION_WIDTH, DISCUSSION_HEIGHT))

            g {
                @if let Some(category) = &card.category {
                    title { (category) }
                }
                rect x=(EMOJI_BOX_X) y=(layout.emoji_box_y) width=(EMOJI_BOX_SIZE) height=(EMOJI_BOX_SIZE) rx="6" fill="#57606a" {}
                text x=(emoji_x) y=(emoji_y) font-size="16" { (card.emoji) }
            }

            text x="100" y="40" font-size="20" fill=(TEXT_FILL) font-family="Arial" font-weight="bold" { (card.title) }

            g transform=(translate(LABEL_ORIGIN.0, LABEL_ORIGIN.1)) {
                @for (label, b) in card.labels.iter().zip(&layout.labels) {
                    @let color = label.css_color();
                    rect x=(b.x) y="0" width=(b.width) height="24" rx="12" fill=(color) fill-opacity="0.2" stroke=(color) stroke-width="0.5" {}
                    text x=(b.center()) y="17" font-size="14" fill=(color) font-family="Arial" text-anchor="middle" { (label.name) }
                }
            }

            text x="100" y="95" font-size="14" fill=(TEXT_FILL) font-family="Arial" {
                tspan style="text-decoration: underline;" { (card.author) }
                " started on " (day(card.created_at)) "."
                @if let Some(latest) = &card.latest {
                    " Last comment by "
                    tspan style="text-decoration: underline;" { (latest.author) }
                    " on " (day(latest.at)) "."
                }
            }

            g transform=(translate(layout.upvote.x, UPVOTE_Y)) {
                rect x="0" y="-12" width=(layout.upvote.width) height="24" rx="12" fill=(UPVOTE_FILL) fill-opacity="0.2" stroke=(UPVOTE_FILL) stroke-width="0.5" {}
                path d=(UPVOTE_ICON) fill=(UPVOTE_FILL) transform="translate(5, -8) scale(1.14, 1.14)" {}
                text x=(layout.upvote.width / 2.0 + 8.0) y="6" font-size="16" fill=(UPVOTE_FILL) font-family="Arial" text-anchor="middle" { (card.upvotes) }
            }

            g transform=(translate(layout.comments.x, COMMENT_Y)) {
                path d=(COMMENT_ICON) fill=(COMMENT_FILL) transform="scale(1.14, 1.14)" {}
                text x="20" y="14" font-size="16" fill=(COMMENT_FILL) font-family="Arial" { (card.total_comments) }
            }

            @for (x, href) in slots.iter().zip(avatars) {
                g transform=(translate(*x, layout.avatar_y)) {
                    image x=(-AVATAR_SIZE / 2.0) y=(-AVATAR_SIZE / 2.0) width=(AVATAR_SIZE) height=(AVATAR_SIZE) href=(href) clip-path="url(#circle-clip)" {}
                }
            }
        }
    };
    markup.into_string()
}

pub fn status_svg(status: &Status, count: u64) -> String {
    let layout = StatusLayout::compute(status);
    let markup = html! {
        svg width=(STATUS_WIDTH) height=(STATUS_HEIGHT) xmlns=(SVG_NS) {
            defs {
                (shadow_filter())
            }
            (background(STATUS_WIDTH, STATUS_HEIGHT))

            g transform=(translate(layout.center_x, 20.0)) {
                rect x=(layout.badge.x) y="0" width=(layout.badge.width) height="24" rx="12" fill=(status.color) fill-opacity="0.2" stroke=(status.color) stroke-width="0.5" {}
                text x="0" y="17" font-size="14" fill=(status.color) font-family="Arial" text-anchor="middle" { (status.key) }
            }

            text x=(layout.center_x) y="90" font-size="40" fill=(TEXT_FILL) font-family="Arial" text-anchor="middle" { (count) }
        }
    };
    markup.into_string()
}

fn shadow_filter() -> Markup {
    html! {
        filter id="shadow" x="-10%" y="-10%" width="120%" height="120%" {
            feDropShadow dx="2" dy="2" stdDeviation="2" flood-color="black" {}
        }
    }
}

fn background(width: f64, height: f64) -> Markup {
    html! {
        rect x="5" y="5" width=(width - 10.0) height=(height - 10.0) rx="12" fill=(CARD_FILL) filter="url(#shadow)" {}
    }
}

fn translate(x: f64, y: f64) -> String {
    format!("translate({x}, {y})")
}

fn day(at: DateTime<Utc>) -> String {
    at.format("%d %b %Y").to_string()
}
