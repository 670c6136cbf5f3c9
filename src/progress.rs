//! Terminal progress bars.

use history_github::{FetchOrigin, FetchProgress, RepoProgress};
use history_protocol::{RepoId, TotalEstimator};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const FETCH_TEMPLATE: &str = "{prefix:>5} {msg:40!} [{bar:40}] {pos}/{len}";
const SNAPSHOT_TEMPLATE: &str = "{prefix:>5} {msg:40!} [{bar:40}] {pos}/{len} steps";

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// One progress bar per repository, stacked in a [`MultiProgress`].
#[derive(Debug, Clone, Default)]
pub struct TerminalProgress {
    multi: MultiProgress,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bar tracking the replay of batch `name`.
    ///
    /// The returned callback takes the number of completed steps.
    pub fn snapshot_bar(&self, name: &str) -> (ProgressBar, impl FnMut(usize)) {
        let bar = self.multi.add(ProgressBar::new(0));
        bar.set_style(style(SNAPSHOT_TEMPLATE));
        bar.set_prefix("snap");
        bar.set_message(name.to_string());

        let mut estimate = TotalEstimator::new(50, 50);
        let on_step = {
            let bar = bar.clone();
            move |steps: usize| {
                let steps = steps as u64;
                bar.set_length(estimate.report(steps));
                bar.set_position(steps);
            }
        };
        (bar, on_step)
    }
}

impl FetchProgress for TerminalProgress {
    fn begin(&self, repo: &RepoId, origin: FetchOrigin) -> Box<dyn RepoProgress> {
        let bar = self.multi.add(ProgressBar::new(0));
        bar.set_style(style(FETCH_TEMPLATE));
        bar.set_prefix(match origin {
            FetchOrigin::Cache => "cache",
            FetchOrigin::Live => "live",
        });
        bar.set_message(repo.to_string());
        Box::new(RepoBar(bar))
    }
}

struct RepoBar(ProgressBar);

impl RepoProgress for RepoBar {
    fn advance(&mut self, completed: u64, estimated_total: u64) {
        self.0.set_length(estimated_total);
        self.0.set_position(completed);
    }

    fn finish(&mut self, total: u64) {
        self.0.set_length(total);
        self.0.set_position(total);
        self.0.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_bar_length_grows_with_steps() {
        let progress = TerminalProgress::new();
        let (bar, mut on_step) = progress.snapshot_bar("recent");

        on_step(10);
        assert_eq!(bar.length(), Some(50));
        assert_eq!(bar.position(), 10);

        on_step(50);
        assert_eq!(bar.length(), Some(100));
    }
}
