use std::time::{Duration, Instant};

use indicatif::{HumanDuration, MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

pub struct Progress {
    enabled: bool,
    start: Instant,

    // UI
    mp: Option<MultiProgress>,
    stage: ProgressBar,
    cards: ProgressBar,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        let start = Instant::now();

        if !enabled {
            return Self {
                enabled: false,
                start,
                mp: None,
                stage: ProgressBar::hidden(),
                cards: ProgressBar::hidden(),
            };
        }

        let mp = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());

        let stage = mp.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]") {
            stage.set_style(style);
        }
        stage.enable_steady_tick(Duration::from_millis(80));
        stage.set_message("starting");

        let cards = mp.add(ProgressBar::new(0));
        if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
            cards.set_style(style.progress_chars("##-"));
        }
        cards.set_message("cards");

        Self {
            enabled: true,
            start,
            mp: Some(mp),
            stage,
            cards,
        }
    }

    pub fn set_stage(&self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.stage.set_message(msg.into());
    }

    pub fn set_cards_total(&self, total: usize) {
        if self.enabled {
            self.cards.set_length(total as u64);
        }
    }

    /// Hidden bars still track their position.
    pub fn card_done(&self, name: &str) {
        self.cards.inc(1);
        if self.enabled {
            self.cards.set_message(name.to_string());
        }
    }

    pub fn cards_done(&self) -> u64 {
        self.cards.position()
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        self.stage.finish_with_message("done");
        self.cards.finish_and_clear();
        if let Some(mp) = &self.mp {
            // Best effort: ensure the last render flushes.
            let _ = mp.println(format!(
                "{} cards in {}",
                self.cards_done(),
                HumanDuration(self.start.elapsed())
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_progress_counts_cards() {
        let progress = Progress::new(false);
        progress.set_cards_total(3);
        progress.card_done("todo.svg");
        progress.card_done("discussion_0.svg");
        assert_eq!(progress.cards_done(), 2);
        progress.finish();
    }
}
