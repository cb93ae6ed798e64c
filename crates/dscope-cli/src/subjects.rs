//! Read and maintenance commands over the record store.
//!
//! These never touch the platform or the model service, so they only need the
//! store path from configuration.

use std::fmt::{self, Write as _};

use clap::Subcommand;
use dscope_pipeline::normalize_handle;
use dscope_store::{RecordStore, StoreStats, SubjectRecord};

/// Sub-commands available under `subjects`.
#[derive(Debug, Subcommand)]
pub enum SubjectsCommands {
    /// Print the stored record for a handle as JSON
    Show {
        /// Handle, `@handle` or profile URL
        handle: String,
        /// Include archived history entries
        #[arg(long)]
        history: bool,
    },
    /// List the most recently analyzed subjects
    Recent {
        /// Maximum number of subjects to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Show store totals
    Stats,
    /// Remove a subject and its history
    Delete {
        /// Handle, `@handle` or profile URL
        handle: String,
    },
}

/// Dispatch a `subjects` sub-command.
///
/// # Errors
///
/// Returns an error if the handle is malformed, the subject is unknown, or the
/// store cannot be read or written.
pub(crate) async fn run_subjects(
    store: &dyn RecordStore,
    command: SubjectsCommands,
) -> anyhow::Result<()> {
    match command {
        SubjectsCommands::Show { handle, history } => {
            let key = parse_handle(&handle)?;
            let mut record = store
                .get(&key)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no analysis stored for '{key}'"))?;
            if !history {
                record.history.clear();
            }
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        SubjectsCommands::Recent { limit } => {
            let records = store.recent(limit).await?;
            if records.is_empty() {
                println!("no subjects stored yet; run `analyze <handle>` first");
            } else {
                print!("{}", render_recent(&records)?);
            }
        }
        SubjectsCommands::Stats => {
            print!("{}", render_stats(&store.stats().await?));
        }
        SubjectsCommands::Delete { handle } => {
            let key = parse_handle(&handle)?;
            if store.delete(&key).await? {
                println!("deleted '{key}'");
            } else {
                anyhow::bail!("no analysis stored for '{key}'");
            }
        }
    }
    Ok(())
}

fn parse_handle(raw: &str) -> anyhow::Result<String> {
    normalize_handle(raw).ok_or_else(|| anyhow::anyhow!("invalid handle: {raw:?}"))
}

pub(crate) fn render_recent(records: &[SubjectRecord]) -> Result<String, fmt::Error> {
    let mut out = format!("{:<18}{:<20}HISTORY\n", "HANDLE", "ANALYZED");
    for record in records {
        writeln!(
            out,
            "{:<18}{:<20}{}",
            record.handle,
            record.last_analyzed_at.format("%Y-%m-%d %H:%M"),
            record.history.len()
        )?;
    }
    Ok(out)
}

pub(crate) fn render_stats(stats: &StoreStats) -> String {
    let last = stats.last_analyzed_at.map_or_else(
        || "\u{2014}".to_string(),
        |at| at.format("%Y-%m-%d %H:%M UTC").to_string(),
    );
    format!(
        "subjects:          {}\narchived profiles: {}\nlast analysis:     {last}\n",
        stats.subjects, stats.archived_profiles
    )
}
