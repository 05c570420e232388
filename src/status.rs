use crate::discussion::Discussion;

/// A workflow status label and the color it is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub key: &'static str,
    pub color: &'static str,
}

impl Status {
    /// `status:todo` is stored as `todo.svg`.
    pub fn file_stem(&self) -> &'static str {
        self.key
            .split_once(':')
            .map(|(_, stem)| stem)
            .unwrap_or(self.key)
    }
}

pub const STATUSES: [Status; 5] = [
    Status {
        key: "status:idea",
        color: "#5DADE2",
    },
    Status {
        key: "status:todo",
        color: "#3498DB",
    },
    Status {
        key: "status:doing",
        color: "#F1C40F",
    },
    Status {
        key: "status:review",
        color: "#E67E22",
    },
    Status {
        key: "status:done",
        color: "#27AE60",
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTally {
    counts: [u64; STATUSES.len()],
}

impl StatusTally {
    /// Counts, per status, the discussions carrying that exact label.
    pub fn from_discussions<'a>(discussions: impl IntoIterator<Item = &'a Discussion>) -> Self {
        let mut tally = Self::default();
        for discussion in discussions {
            tally.add_labels(discussion.label_names());
        }
        tally
    }

    pub fn add_labels<'a>(&mut self, labels: impl IntoIterator<Item = &'a str>) {
        let labels: Vec<&str> = labels.into_iter().collect();
        for (status, count) in STATUSES.iter().zip(self.counts.iter_mut()) {
            if labels.contains(&status.key) {
                *count += 1;
            }
        }
    }

    pub fn count(&self, key: &str) -> Option<u64> {
        STATUSES
            .iter()
            .position(|s| s.key == key)
            .map(|i| self.counts[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Status, u64)> + '_ {
        STATUSES.iter().copied().zip(self.counts.iter().copied())
    }
}
