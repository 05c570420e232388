use std::collections::HashSet;

use crate::discussion::{Discussion, Identity};
use crate::layout::MAX_AVATARS;

/// Identities in first-seen order, unique by login.
///
/// Re-inserting a known login keeps its original position and avatar.
#[derive(Debug, Clone, Default)]
pub struct ParticipantSet {
    ordered: Vec<Identity>,
    seen: HashSet<String>,
}

impl ParticipantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the login was not seen before.
    pub fn insert(&mut self, identity: &Identity) -> bool {
        if !self.seen.insert(identity.login.clone()) {
            return false;
        }
        self.ordered.push(identity.clone());
        true
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.ordered.iter()
    }

    /// The prefix that ends up on a card.
    pub fn rendered(&self) -> &[Identity] {
        &self.ordered[..self.ordered.len().min(MAX_AVATARS)]
    }

    pub fn logins(&self) -> Vec<&str> {
        self.ordered.iter().map(|i| i.login.as_str()).collect()
    }
}

/// Author first, then every comment author followed by its reply authors.
pub fn collect_participants(discussion: &Discussion) -> ParticipantSet {
    let mut set = ParticipantSet::new();
    set.insert(discussion.author());
    for comment in &discussion.comments.nodes {
        set.insert(comment.author());
        for reply in &comment.replies.nodes {
            set.insert(reply.author());
        }
    }
    set
}
