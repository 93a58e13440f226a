//! Shell-integration command tracking (OSC 133 prompt markers).
//!
//! Partitions the output stream into prompt/input/output/exit regions so a
//! host can paint success/failure badges and command durations without its
//! own ANSI parsing. Retained for the lifetime of the primary grid; dropped
//! on a hard reset (RIS) along with everything else session-scoped.
//!
//! There is no regex-based prompt-detection fallback here — if the shell
//! never emits OSC 133, `command_count()` just stays zero. That heuristic,
//! if wanted, belongs in the host.

use std::time::Instant;

/// One shell command's lifecycle, as reported by OSC 133 markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRecord {
    /// Row where the prompt started (OSC 133;A), in grid coordinates —
    /// negative values mean the prompt has since scrolled into history.
    pub prompt_row: i32,
    /// Row where the command text started (OSC 133;B).
    pub command_start_row: i32,
    /// Exit code from `OSC 133;D;N`, if the shell reported one.
    pub exit_code: Option<i32>,
    /// Wall-clock milliseconds between `OSC 133;C` and `OSC 133;D`.
    pub duration_ms: Option<u64>,
}

/// Which marker is waiting to be stamped with a row once the current PTY
/// read chunk has finished updating the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingMark {
    Prompt,
    Command,
}

#[derive(Debug, Default)]
struct InFlight {
    prompt_row: Option<i32>,
    command_start_row: Option<i32>,
    output_started: Option<Instant>,
}

/// Tracks completed and in-progress shell commands for a primary grid's
/// lifetime.
#[derive(Debug, Default)]
pub struct ShellIntegration {
    records: Vec<CommandRecord>,
    in_flight: Option<InFlight>,
    pending_mark: Option<PendingMark>,
}

impl ShellIntegration {
    /// `OSC 133;A` — a new prompt is being drawn.
    pub(crate) fn mark_prompt_start(&mut self) {
        self.in_flight = Some(InFlight::default());
        self.pending_mark = Some(PendingMark::Prompt);
    }

    /// `OSC 133;B` — the prompt is done, command input begins.
    pub(crate) fn mark_command_start(&mut self) {
        if self.in_flight.is_none() {
            self.in_flight = Some(InFlight::default());
        }
        self.pending_mark = Some(PendingMark::Command);
    }

    /// `OSC 133;C` — the command is running; output follows.
    pub(crate) fn mark_output_start(&mut self) {
        if let Some(in_flight) = &mut self.in_flight {
            in_flight.output_started = Some(Instant::now());
        }
    }

    /// `OSC 133;D[;N]` — the command finished, optionally with exit code `N`.
    pub(crate) fn mark_command_end(&mut self, exit_code: Option<i32>) {
        self.pending_mark = None;
        let Some(in_flight) = self.in_flight.take() else { return };
        let duration_ms = in_flight
            .output_started
            .map(|start| u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX));
        self.records.push(CommandRecord {
            prompt_row: in_flight.prompt_row.unwrap_or_default(),
            command_start_row: in_flight.command_start_row.unwrap_or_default(),
            exit_code,
            duration_ms,
        });
    }

    /// Stamp whichever marker is pending with the cursor row observed after
    /// the PTY chunk that produced it has been fully processed.
    pub(crate) fn resolve_pending_row(&mut self, row: i32) {
        let Some(mark) = self.pending_mark.take() else { return };
        let Some(in_flight) = &mut self.in_flight else { return };
        match mark {
            PendingMark::Prompt => in_flight.prompt_row.get_or_insert(row),
            PendingMark::Command => in_flight.command_start_row.get_or_insert(row),
        };
    }

    /// Drop all records and any in-progress command (RIS).
    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.in_flight = None;
        self.pending_mark = None;
    }

    /// Number of completed command records.
    pub fn command_count(&self) -> usize {
        self.records.len()
    }

    /// The `index`-th completed command record, if it exists.
    pub fn command(&self, index: usize) -> Option<&CommandRecord> {
        self.records.get(index)
    }
}
