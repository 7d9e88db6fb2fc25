use std::io::Write;

use anyhow::{Context, Result};

use crate::external_time::{display_field, total_seconds, ExternalTimeEntry};

/// dry runで表示するエントリー数。
pub const PREVIEW_LIMIT: usize = 5;

/// Consoleに移行の状況を表示するためのtrait。
pub trait ConsolePresenter {
    /// メッセージを1行表示する。
    fn show_message(&mut self, message: &str) -> Result<()>;

    /// エントリー数と総時間を表示する。
    ///
    /// # Arguments
    ///
    /// * `entries` - 移行対象のエントリー
    fn show_summary(&mut self, entries: &[ExternalTimeEntry]) -> Result<()>;

    /// 移行されるエントリーの先頭を表示する。
    ///
    /// # Arguments
    ///
    /// * `entries` - 移行対象のエントリー
    fn show_preview(&mut self, entries: &[ExternalTimeEntry]) -> Result<()>;

    /// 移行の進捗を表示する。
    fn show_progress(&mut self, position: usize, total: usize) -> Result<()>;

    /// エントリーの移行に失敗したことを表示する。
    ///
    /// # Arguments
    ///
    /// * `position` - 1始まりのエントリーの位置
    /// * `error` - 失敗の原因
    fn show_entry_error(&mut self, position: usize, error: &anyhow::Error) -> Result<()>;

    /// 移行結果を表示する。
    fn show_migration_result(&mut self, succeeded: usize, failed: usize) -> Result<()>;
}

/// 移行の状況をテキストで表示する。
pub struct ConsoleText<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleText<'a, W> {
    /// 新しい`ConsoleText`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleText<'a, W> {
    fn show_message(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{}", message)
            .with_context(|| format!("Failed to write message: {}", message))
    }

    fn show_summary(&mut self, entries: &[ExternalTimeEntry]) -> Result<()> {
        writeln!(self.writer, "Found {} time entries", entries.len())
            .context("Failed to write entry count")?;
        if entries.is_empty() {
            writeln!(self.writer, "No entries to migrate").context("Failed to write summary")?;
            return Ok(());
        }

        let seconds = total_seconds(entries);
        let hours = seconds / 3600.0;
        writeln!(
            self.writer,
            "Total time: {:.2} hours ({} seconds)",
            hours, seconds
        )
        .context("Failed to write total time")?;
        writeln!(self.writer).context("Failed to write summary")?;

        Ok(())
    }

    // 先頭5件の詳細と残りの件数を表示する。
    fn show_preview(&mut self, entries: &[ExternalTimeEntry]) -> Result<()> {
        writeln!(
            self.writer,
            "DRY RUN - showing first {} entries that would be migrated:",
            PREVIEW_LIMIT
        )
        .context("Failed to write preview header")?;

        for (index, entry) in entries.iter().take(PREVIEW_LIMIT).enumerate() {
            writeln!(
                self.writer,
                "\n{}. {}\n   Date: {}\n   Duration: {} seconds\n   Type: {}\n   URL: {}",
                index + 1,
                display_field(entry, "description", "No description"),
                display_field(entry, "date", "N/A"),
                display_field(entry, "timeSeconds", "0"),
                display_field(entry, "type", "N/A"),
                display_field(entry, "url", "N/A"),
            )
            .with_context(|| format!("Failed to write entry: {:?}", entry))?;
        }

        if entries.len() > PREVIEW_LIMIT {
            writeln!(
                self.writer,
                "\n... and {} more entries",
                entries.len() - PREVIEW_LIMIT
            )
            .context("Failed to write remaining count")?;
        }
        writeln!(self.writer, "\nTo actually migrate, run with --execute flag")
            .context("Failed to write preview footer")?;

        Ok(())
    }

    fn show_progress(&mut self, position: usize, total: usize) -> Result<()> {
        writeln!(
            self.writer,
            "Progress: {}/{} entries migrated",
            position, total
        )
        .context("Failed to write progress")
    }

    fn show_entry_error(&mut self, position: usize, error: &anyhow::Error) -> Result<()> {
        writeln!(
            self.writer,
            "Error migrating entry {}: {:#}",
            position, error
        )
        .context("Failed to write entry error")
    }

    fn show_migration_result(&mut self, succeeded: usize, failed: usize) -> Result<()> {
        writeln!(
            self.writer,
            "\nMigration complete!\nSuccessfully migrated: {}\nErrors: {}",
            succeeded, failed
        )
        .context("Failed to write migration result")
    }
}
