//! Pixel geometry for cards. Everything here is pure so the numbers can be
//! checked without parsing any markup.

use crate::card::DiscussionCard;
use crate::status::Status;

pub const DISCUSSION_WIDTH: f64 = 820.0;
pub const DISCUSSION_HEIGHT: f64 = 120.0;
pub const STATUS_WIDTH: f64 = 140.0;
pub const STATUS_HEIGHT: f64 = 120.0;

pub const EMOJI_BOX_X: f64 = 30.0;
pub const EMOJI_BOX_SIZE: f64 = 54.0;
/// A 16px emoji renders roughly 20x19.
pub const EMOJI_SIZE: f64 = 20.0;

pub const LABEL_ORIGIN: (f64, f64) = (100.0, 50.0);
pub const LABEL_GAP: f64 = 10.0;

pub const COUNTER_CENTER_X: f64 = 768.0;
pub const UPVOTE_Y: f64 = 45.0;
pub const COMMENT_Y: f64 = 75.0;

pub const AVATAR_SIZE: f64 = 40.0;
pub const AVATAR_START_X: f64 = 710.0;
pub const AVATAR_GAP: f64 = 20.0;
pub const MAX_AVATARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeMetrics {
    pub char_width: f64,
    pub padding: f64,
}

pub const LABEL_BADGE: BadgeMetrics = BadgeMetrics {
    char_width: 8.0,
    padding: 5.0,
};

pub const UPVOTE_BADGE: BadgeMetrics = BadgeMetrics {
    char_width: 10.0,
    padding: 30.0,
};

pub const COMMENT_COUNTER: BadgeMetrics = BadgeMetrics {
    char_width: 10.0,
    padding: 20.0,
};

impl BadgeMetrics {
    pub fn width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width + self.padding
    }
}

/// Horizontal extent of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    pub x: f64,
    pub width: f64,
}

impl LayoutBox {
    pub fn center(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

pub fn centered(center: f64, width: f64) -> LayoutBox {
    LayoutBox {
        x: center - width / 2.0,
        width,
    }
}

/// Packs badges left to right starting at x = 0.
pub fn pack_row<'a>(
    texts: impl IntoIterator<Item = &'a str>,
    metrics: BadgeMetrics,
    gap: f64,
) -> Vec<LayoutBox> {
    let mut x = 0.0;
    texts
        .into_iter()
        .map(|text| {
            let width = metrics.width(text);
            let b = LayoutBox { x, width };
            x += width + gap;
            b
        })
        .collect()
}

/// X positions for `count` avatars, stacked right to left.
pub fn avatar_slots(count: usize, start_x: f64, gap: f64) -> Vec<f64> {
    (0..count).map(|i| start_x - i as f64 * gap).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscussionLayout {
    pub emoji_box_y: f64,
    pub emoji_text: (f64, f64),
    pub labels: Vec<LayoutBox>,
    pub upvote: LayoutBox,
    pub comments: LayoutBox,
    pub avatar_y: f64,
}

impl DiscussionLayout {
    pub fn compute(card: &DiscussionCard) -> Self {
        let upvotes = card.upvotes.to_string();
        let comments = card.total_comments.to_string();
        Self {
            emoji_box_y: (DISCUSSION_HEIGHT - EMOJI_BOX_SIZE) / 2.0,
            emoji_text: (
                EMOJI_BOX_X + EMOJI_BOX_SIZE / 2.0 - EMOJI_SIZE / 2.0,
                (DISCUSSION_HEIGHT + EMOJI_SIZE) / 2.0 - 4.0,
            ),
            labels: pack_row(
                card.labels.iter().map(|l| l.name.as_str()),
                LABEL_BADGE,
                LABEL_GAP,
            ),
            upvote: centered(COUNTER_CENTER_X, UPVOTE_BADGE.width(&upvotes)),
            comments: centered(COUNTER_CENTER_X, COMMENT_COUNTER.width(&comments)),
            avatar_y: DISCUSSION_HEIGHT / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLayout {
    pub badge: LayoutBox,
    pub center_x: f64,
}

impl StatusLayout {
    pub fn compute(status: &Status) -> Self {
        let center_x = STATUS_WIDTH / 2.0;
        Self {
            badge: centered(0.0, LABEL_BADGE.width(status.key)),
            center_x,
        }
    }
}
