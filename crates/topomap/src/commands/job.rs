//! Drive a job to completion with a progress bar and Ctrl-C handling.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use topomap_core::{Job, JobController, JobState};

use crate::error::CliError;

const BAR_TEMPLATE: &str = "{spinner:.cyan} {msg:<18} [{bar:32.cyan/blue}] {pos:>3}%";

fn progress_bar(name: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(name.to_owned());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Start `job`, poll its status every `poll` until it leaves `Running`,
/// and hand back its output.
///
/// Ctrl-C stops the job and surfaces as [`CliError::Aborted`].
pub async fn run_job<J: Job>(
    job: J,
    poll: Duration,
    show_progress: bool,
) -> Result<Arc<J::Output>, CliError> {
    let controller = JobController::<J>::new();
    controller.start(job).await?;

    let bar = progress_bar(J::NAME, show_progress);
    let mut ticker = tokio::time::interval(poll);

    let status = loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                bar.set_message("stopping");
                info!(job = J::NAME, "interrupted, stopping job");
                break controller.stop().await;
            }
            status = controller.wait() => break status,
            _ = ticker.tick() => {
                bar.set_position(u64::from(controller.status().progress));
            }
        }
    };
    bar.finish_and_clear();

    match status.state {
        JobState::Finished => controller.output().await.ok_or_else(|| CliError::JobFailed {
            job: J::NAME.into(),
            message: "finished without output".into(),
        }),
        JobState::Aborted => Err(CliError::Aborted {
            job: J::NAME.into(),
        }),
        state => Err(CliError::JobFailed {
            job: J::NAME.into(),
            message: status.error.unwrap_or_else(|| format!("ended in state {state}")),
        }),
    }
}
