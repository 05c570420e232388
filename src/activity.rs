use chrono::{DateTime, Utc};

use crate::discussion::Discussion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
    pub author: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivitySummary {
    /// Top-level comments plus all of their replies.
    pub total_comments: u64,
    pub latest: Option<ActivityEvent>,
}

/// Finds the most recent comment or reply.
///
/// Only a strictly newer timestamp replaces the candidate, so among equal
/// timestamps the first one in document order is kept.
pub fn summarize_activity(discussion: &Discussion) -> ActivitySummary {
    let mut summary = ActivitySummary::default();

    for comment in &discussion.comments.nodes {
        summary.total_comments += 1 + comment.replies.len();
        consider(&mut summary.latest, &comment.author().login, comment.created_at);
        for reply in &comment.replies.nodes {
            consider(&mut summary.latest, &reply.author().login, reply.created_at);
        }
    }

    summary
}

fn consider(latest: &mut Option<ActivityEvent>, author: &str, at: DateTime<Utc>) {
    let newer = match latest {
        Some(current) => at > current.at,
        None => true,
    };
    if newer {
        *latest = Some(ActivityEvent {
            author: author.to_string(),
            at,
        });
    }
}
