//! Submit command
//!
//! Submits a job with its dataset, prints every phase change and the
//! training results. Ctrl-C cancels the session.

use anyhow::{Context, Result, bail};
use colored::*;
use mlpipe_core::domain::job::{JobSpec, ResultDocument};
use mlpipe_core::domain::phase::Phase;
use mlpipe_core::domain::session::SessionStatus;
use mlpipe_runner::{Dataset, JobOrchestrator, OrchestratorError};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;

pub async fn handle_submit(
    config: &Config,
    spec: &Path,
    dataset: PathBuf,
    interval: Option<u64>,
    max_failures: Option<u32>,
) -> Result<()> {
    let job_spec = load_job_spec(spec).await?;

    let mut runner_config = config.runner_config();
    if let Some(secs) = interval {
        runner_config = runner_config.with_poll_interval(Duration::from_secs(secs));
    }
    if let Some(ceiling) = max_failures {
        runner_config = runner_config.with_max_consecutive_failures(ceiling);
    }

    let orchestrator = JobOrchestrator::from_config(runner_config)?;
    let handle = orchestrator
        .submit(job_spec, Some(Dataset::from_path(&dataset)))
        .with_context(|| format!("Failed to submit job with {}", dataset.display()))?;

    println!(
        "{} {}",
        "Submitted session".bold(),
        handle.id().to_string().cyan()
    );

    let mut updates = orchestrator.subscribe(&handle)?;
    let mut shown: Option<Phase> = None;

    let status = loop {
        let status = updates.borrow_and_update().status.clone();
        if shown != Some(status.phase) {
            print_phase_change(&status);
            shown = Some(status.phase);
        }
        if status.is_terminal() {
            break status;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break orchestrator.status(&handle)?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Cancelling...".yellow());
                orchestrator.cancel(&handle)?;
            }
        }
    };

    match status.phase {
        Phase::Finished => match fetched_result(orchestrator.result(&handle))? {
            Some(result) => print_results(&result),
            None => println!("{}", "The job finished but no results were fetched.".yellow()),
        },
        Phase::Error => {
            let reason = status
                .last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            bail!("Session {} failed: {}", handle.id(), reason);
        }
        Phase::Killed => println!("{}", "The controller killed the job.".yellow()),
        _ => println!("{}", "Session cancelled.".yellow()),
    }

    orchestrator.release(&handle).await?;
    Ok(())
}

/// Results of a finished session, if the worker was ever asked for them
fn fetched_result(
    result: mlpipe_runner::Result<ResultDocument>,
) -> Result<Option<ResultDocument>> {
    match result {
        Ok(result) => Ok(Some(result)),
        Err(OrchestratorError::NotReady(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn load_job_spec(path: &Path) -> Result<JobSpec> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read job spec {}", path.display()))?;
    let value = serde_json::from_str(&text)
        .with_context(|| format!("Job spec {} is not valid JSON", path.display()))?;

    Ok(JobSpec(value))
}

fn print_phase_change(status: &SessionStatus) {
    print!("  {} {}", "→".dimmed(), colored_phase(status.phase));
    if let Some(endpoint) = status.worker_endpoint {
        print!(" {}", format!("({})", endpoint).dimmed());
    }
    if status.consecutive_failures > 0 {
        print!(
            " {}",
            format!("[{} failed attempts]", status.consecutive_failures).yellow()
        );
    }
    println!();
}

/// Phase name colored by outcome
pub fn colored_phase(phase: Phase) -> ColoredString {
    match phase {
        Phase::Finished => phase.as_str().green().bold(),
        Phase::Error => phase.as_str().red().bold(),
        Phase::Killed | Phase::Cancelled => phase.as_str().yellow().bold(),
        _ => phase.as_str().blue(),
    }
}

fn print_results(result: &ResultDocument) {
    println!();
    println!("{}", "Results:".bold());

    match result.model_scores() {
        Some(scores) if !scores.is_empty() => {
            println!("  {:<24} {}", "MODEL".bold(), "SCORE".bold());
            for entry in scores {
                let model = match &entry.model_id {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                println!("  {:<24} {:.4}", model.cyan(), entry.score);
            }
        }
        _ => match serde_json::to_string_pretty(result.as_json()) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", result.as_json()),
        },
    }
}
