//! Thread-safe session façade: the one entry point a host drives.
//!
//! A `Session` bundles one `Term`, one `Pty`, and one `ConfigSnapshot`
//! behind a single coarse `parking_lot::Mutex`. The host is expected to
//! funnel all I/O through one thread (or serialize it itself) — under that
//! model a single lock is simpler than fine-grained locking and costs
//! nothing in practice, since there is never real contention. Every public
//! method takes the lock for its entire body, so a PTY-triggered reply
//! (DA, DSR, …) can never interleave with a host-issued write mid-sequence.
//!
//! This is a plain safe-Rust handle, not a C ABI: the spec's "opaque
//! handle" / "null on failure" / "string_free" vocabulary maps onto
//! ordinary Rust idioms here —
//! - the handle is `Session`, a cheap `Clone` wrapping `Arc<Mutex<..>>`;
//! - failure is `Option`/`Result`, not a null pointer;
//! - owned strings returned to the host (`title`, `working_dir`,
//!   `extract_text`) free themselves on `Drop`; there is no separate
//!   `string_free` call to make.

mod config;

pub use config::ConfigSnapshot;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{ClipboardType, Event, EventListener, Rgb};
use crate::index::{Column, Line, Point};
use crate::pty::{Pty, ReadOutcome};
use crate::term::{Term, TermMode};

/// Thread-safe handle to one terminal session: one `Term`, at most one
/// spawned `Pty`, and a config snapshot. Cheap to clone; every clone
/// refers to the same underlying session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    term: Term<Listener>,
    pty: Option<Pty>,
    config: ConfigSnapshot,
    config_generation: u64,
    shared: Arc<Mutex<Shared>>,
}

/// State the `Listener` writes into from inside `Term::process`, drained
/// by the session after each read. A second, uncontended lock: see the
/// module doc for why `EventListener::send_event(&self, ..)` can't reach
/// back into `Inner` directly.
#[derive(Default)]
struct Shared {
    pty_replies: Vec<u8>,
    events: Vec<Event>,
    bell: bool,
}

#[derive(Clone)]
struct Listener {
    shared: Arc<Mutex<Shared>>,
}

impl EventListener for Listener {
    fn send_event(&self, event: Event) {
        let mut shared = self.shared.lock();
        match event {
            Event::PtyWrite(text) => shared.pty_replies.extend_from_slice(text.as_bytes()),
            Event::Bell => {
                shared.bell = true;
                shared.events.push(Event::Bell);
            }
            other => shared.events.push(other),
        }
    }
}

const DEFAULT_SCROLLBACK: usize = 10_000;

impl Session {
    /// Create a session with a grid of `cols`x`rows`. No shell is spawned
    /// yet — call `spawn_shell` for that.
    pub fn new(cols: usize, rows: usize) -> Self {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let term = Term::new(rows.max(1), cols.max(1), DEFAULT_SCROLLBACK, Listener { shared: shared.clone() });
        Self {
            inner: Arc::new(Mutex::new(Inner {
                term,
                pty: None,
                config: ConfigSnapshot::default(),
                config_generation: 0,
                shared,
            })),
        }
    }

    /// Spawn `shell` (or the platform default) behind a PTY sized to the
    /// session's current grid. Replaces any previously spawned shell.
    pub fn spawn_shell(&self, shell: Option<&str>, cwd: Option<&str>) -> std::io::Result<()> {
        let mut inner = self.inner.lock();
        let (cols, rows) = inner.term.grid().grid_size();
        if let Some(mut old) = inner.pty.take() {
            old.shutdown();
        }
        let pty = Pty::spawn(shell, cols as u16, rows as u16, cwd)?;
        inner.pty = Some(pty);
        Ok(())
    }

    /// Whether a child has been spawned and not yet reaped.
    pub fn has_pty(&self) -> bool {
        let inner = self.inner.lock();
        inner.pty.as_ref().is_some_and(|p| !p.is_dead())
    }

    /// Non-blocking PTY read: pulls any buffered bytes, feeds them through
    /// the terminal parser, and flushes any reply bytes the parser queued
    /// (DA/DSR/etc.) back into the PTY — all under the same lock. Returns
    /// bytes consumed, `0` if nothing was ready, or `-1` on EOF/no PTY.
    pub fn read_pty(&self, out: &mut Vec<u8>) -> i64 {
        let mut inner = self.inner.lock();
        let Some(pty) = inner.pty.as_mut() else { return -1 };

        let mut chunk = Vec::new();
        let outcome = pty.read(&mut chunk);
        let result = match outcome {
            ReadOutcome::Data(n) => n as i64,
            ReadOutcome::WouldBlock => 0,
            ReadOutcome::Eof => -1,
        };

        if !chunk.is_empty() {
            inner.term.process(&chunk);
            out.extend_from_slice(&chunk);
        }

        let replies = std::mem::take(&mut inner.shared.lock().pty_replies);
        if !replies.is_empty() {
            if let Some(pty) = inner.pty.as_mut() {
                let _ = pty.write(&replies);
            }
        }

        result
    }

    /// Write `bytes` to the PTY. Returns bytes written, or `-1` if no PTY
    /// is spawned.
    pub fn write_pty(&self, bytes: &[u8]) -> i64 {
        let mut inner = self.inner.lock();
        match inner.pty.as_mut() {
            Some(pty) => pty.write(bytes).map(|n| n as i64).unwrap_or(-1),
            None => -1,
        }
    }

    /// Resize the grid and, if spawned, the PTY (including pixel geometry).
    pub fn resize(&self, cols: usize, rows: usize, pixel_width: u16, pixel_height: u16) {
        let mut inner = self.inner.lock();
        inner.term.resize(cols.max(1), rows.max(1));
        if let Some(pty) = inner.pty.as_ref() {
            let _ = pty.resize(cols.max(1) as u16, rows.max(1) as u16, pixel_width, pixel_height);
        }
    }

    /// `(cols, rows)` of the visible grid.
    pub fn grid_size(&self) -> (usize, usize) {
        self.inner.lock().term.grid().grid_size()
    }

    /// Character at `(row, col)`. Out-of-range returns `'\0'`.
    pub fn cell_char(&self, row: usize, col: usize) -> char {
        self.inner.lock().term.grid().cell_at(row, col).ch
    }

    /// Foreground color of the cell at `(row, col)`, packed `0x00RRGGBB`.
    pub fn cell_fg(&self, row: usize, col: usize) -> u32 {
        let inner = self.inner.lock();
        let cell = inner.term.grid().cell_at(row, col);
        pack_rgb(inner.term.palette().resolve(cell.fg))
    }

    /// Background color of the cell at `(row, col)`, packed `0x00RRGGBB`.
    pub fn cell_bg(&self, row: usize, col: usize) -> u32 {
        let inner = self.inner.lock();
        let cell = inner.term.grid().cell_at(row, col);
        pack_rgb(inner.term.palette().resolve(cell.bg))
    }

    /// Raw attribute bits (`CellFlags`) of the cell at `(row, col)`.
    pub fn cell_attr(&self, row: usize, col: usize) -> u16 {
        self.inner.lock().term.grid().cell_at(row, col).flags.bits()
    }

    /// `(row, col)` of the cursor in the visible grid.
    pub fn cursor_pos(&self) -> (usize, usize) {
        let pos = self.inner.lock().term.grid().cursor_position();
        (pos.line.0.max(0) as usize, pos.column.0)
    }

    /// Whether the cursor should currently be painted (`DECTCEM`).
    pub fn cursor_visible(&self) -> bool {
        self.inner.lock().term.mode().contains(TermMode::SHOW_CURSOR)
    }

    /// Whether application cursor-key mode (`DECCKM`) is set.
    pub fn cursor_keys_app(&self) -> bool {
        self.inner.lock().term.mode().contains(TermMode::APP_CURSOR)
    }

    /// Whether bracketed-paste mode is set.
    pub fn bracketed_paste(&self) -> bool {
        self.inner.lock().term.mode().contains(TermMode::BRACKETED_PASTE)
    }

    /// Number of rows currently held in scrollback.
    pub fn scrollback_len(&self) -> usize {
        self.inner.lock().term.grid().scrollback_length()
    }

    /// Character at scrollback `(offset, col)`, `offset = 0` being the most
    /// recently evicted row.
    pub fn scrollback_cell_char(&self, offset: usize, col: usize) -> char {
        self.inner.lock().term.grid().scrollback_cell(offset, col).ch
    }

    /// Foreground color at scrollback `(offset, col)`, packed `0x00RRGGBB`.
    pub fn scrollback_cell_fg(&self, offset: usize, col: usize) -> u32 {
        let inner = self.inner.lock();
        let cell = inner.term.grid().scrollback_cell(offset, col);
        pack_rgb(inner.term.palette().resolve(cell.fg))
    }

    /// Background color at scrollback `(offset, col)`, packed `0x00RRGGBB`.
    pub fn scrollback_cell_bg(&self, offset: usize, col: usize) -> u32 {
        let inner = self.inner.lock();
        let cell = inner.term.grid().scrollback_cell(offset, col);
        pack_rgb(inner.term.palette().resolve(cell.bg))
    }

    /// Plain text of the rectangular region `(start_row, start_col)` to
    /// `(end_row, end_col)` inclusive. Rows may be negative to reach into
    /// scrollback.
    pub fn extract_text(&self, start_row: i32, start_col: usize, end_row: i32, end_col: usize) -> String {
        let inner = self.inner.lock();
        inner.term.grid().extract_text(
            Point::new(Line(start_row), Column(start_col)),
            Point::new(Line(end_row), Column(end_col)),
        )
    }

    /// Current window title (OSC 0/2), empty string if never set.
    pub fn title(&self) -> String {
        self.inner.lock().term.title().to_owned()
    }

    /// Working directory last reported by the shell via OSC 7.
    pub fn working_dir(&self) -> Option<String> {
        self.inner.lock().term.working_dir().map(str::to_owned)
    }

    /// Number of completed shell commands tracked via OSC 133.
    pub fn command_count(&self) -> usize {
        self.inner.lock().term.command_count()
    }

    /// Prompt row of the `index`-th completed command.
    pub fn command_prompt_row(&self, index: usize) -> Option<i32> {
        self.inner.lock().term.command(index).map(|c| c.prompt_row)
    }

    /// Exit code of the `index`-th completed command, if the shell reported one.
    pub fn command_exit_code(&self, index: usize) -> Option<i32> {
        self.inner.lock().term.command(index).and_then(|c| c.exit_code)
    }

    /// Wall-clock duration (ms) of the `index`-th completed command, if known.
    pub fn command_duration_ms(&self, index: usize) -> Option<u64> {
        self.inner.lock().term.command(index).and_then(|c| c.duration_ms)
    }

    /// Clone of the current configuration snapshot.
    pub fn config(&self) -> ConfigSnapshot {
        self.inner.lock().config.clone()
    }

    /// Publish a new configuration snapshot and bump the generation
    /// counter. Called by the host's own config-file watcher, never by the
    /// engine itself.
    pub fn set_config(&self, snapshot: ConfigSnapshot) {
        let mut inner = self.inner.lock();
        if inner.config != snapshot {
            inner.config = snapshot;
            inner.config_generation += 1;
        }
    }

    /// Monotonic generation counter, bumped on every `set_config` that
    /// actually changes something. A render loop polls this instead of
    /// registering a callback.
    pub fn poll_config(&self) -> u64 {
        self.inner.lock().config_generation
    }

    /// Whether a bell has rung since the last call, clearing the flag.
    pub fn take_bell(&self) -> bool {
        let inner = self.inner.lock();
        let mut shared = inner.shared.lock();
        std::mem::take(&mut shared.bell)
    }

    /// Drain queued events (clipboard, color query, title, child-exit,
    /// …) that aren't otherwise exposed as pull accessors above.
    pub fn drain_events(&self) -> Vec<Event> {
        let inner = self.inner.lock();
        let mut shared = inner.shared.lock();
        std::mem::take(&mut shared.events)
    }

    /// Exit code of the spawned child, once it has terminated and been
    /// reaped.
    pub fn child_exit_code(&self) -> Option<i32> {
        self.inner.lock().pty.as_ref().and_then(|p| p.exit_status()).map(|s| s.code)
    }

    /// Request the clipboard contents be delivered as OSC 52 (`ClipboardType`).
    /// `text` is the clipboard content the host has already read.
    pub fn deliver_clipboard(&self, clipboard: ClipboardType, text: &str) {
        let mut inner = self.inner.lock();
        let taken = std::mem::take(&mut inner.shared.lock().events);
        let mut remaining = Vec::with_capacity(taken.len());
        let mut replies = Vec::new();
        for event in taken {
            match event {
                Event::ClipboardLoad(ty, format) if ty == clipboard => {
                    replies.extend_from_slice(format(text).as_bytes());
                }
                other => remaining.push(other),
            }
        }
        inner.shared.lock().events = remaining;
        if !replies.is_empty() {
            if let Some(pty) = inner.pty.as_mut() {
                let _ = pty.write(&replies);
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(pty) = self.pty.as_mut() {
            pty.shutdown();
        }
    }
}

fn pack_rgb(rgb: Rgb) -> u32 {
    (u32::from(rgb.r) << 16) | (u32::from(rgb.g) << 8) | u32::from(rgb.b)
}
