//! Terminal state machine.
//!
//! `Term<T: EventListener>` owns two grids (primary + alternate), mode flags,
//! color palette, charset state, and processes escape sequences via the
//! `vte::ansi::Handler` trait. Generic over `EventListener` for decoupling
//! from the UI layer.

pub mod charset;
pub mod command;
pub mod mode;

mod interceptor;

pub use charset::CharsetState;
pub use command::{CommandRecord, ShellIntegration};
pub use mode::TermMode;

use std::fmt;

use crate::color::Palette;
use crate::event::EventListener;
use crate::grid::{CursorShape, EraseMode, Grid};

use interceptor::RawInterceptor;

/// The terminal state machine.
///
/// Owns two grids (primary + alternate screen), terminal mode flags, color
/// palette, charset state, title, and keyboard mode stacks. Generic over
/// `T: EventListener` so tests can use `VoidListener` while the real app
/// routes events through winit.
pub struct Term<T: EventListener> {
    /// Primary grid (active when not in alt screen).
    grid: Grid,
    /// Alternate grid (active during alt screen; no scrollback).
    alt_grid: Grid,
    /// Which grid is currently active.
    active_is_alt: bool,
    /// Terminal mode flags (DECSET/DECRST).
    mode: TermMode,
    /// Color palette (270 entries).
    palette: Palette,
    /// Character set translation state (G0–G3).
    charset: CharsetState,
    /// Window title (set by OSC 0/2).
    title: String,
    /// Pushed title stack (xterm extension).
    title_stack: Vec<String>,
    /// Cursor shape for rendering.
    cursor_shape: CursorShape,
    /// Kitty keyboard enhancement mode stack (active screen).
    keyboard_mode_stack: Vec<u8>,
    /// Kitty keyboard enhancement mode stack (inactive screen).
    inactive_keyboard_mode_stack: Vec<u8>,
    /// Whether OSC 52 clipboard *read* queries are honored. Defaults to
    /// `false`: a program reading the system clipboard through an escape
    /// sequence is a real attack surface, so the host must opt in.
    osc52_read_enabled: bool,
    /// Working directory last reported via OSC 7.
    cwd: Option<String>,
    /// Shell-integration command tracking (OSC 133).
    shell_integration: ShellIntegration,
    /// Raw `vte::Perform` pass catching OSC 7/133 ahead of the main processor.
    raw_parser: vte::Parser,
    /// Drives `self` (as `vte::ansi::Handler`) from parsed escape sequences.
    processor: vte::ansi::Processor,
    /// Event sink for terminal events.
    event_listener: T,
}

impl<T: EventListener> fmt::Debug for Term<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Term")
            .field("grid", &self.grid)
            .field("alt_grid", &self.alt_grid)
            .field("active_is_alt", &self.active_is_alt)
            .field("mode", &self.mode)
            .field("title", &self.title)
            .field("cwd", &self.cwd)
            .field("shell_integration", &self.shell_integration)
            .finish_non_exhaustive()
    }
}

impl<T: EventListener> Term<T> {
    /// Create a new terminal with the given dimensions and scrollback capacity.
    pub fn new(lines: usize, cols: usize, scrollback: usize, listener: T) -> Self {
        Self {
            grid: Grid::with_scrollback(lines, cols, scrollback),
            alt_grid: Grid::with_scrollback(lines, cols, 0),
            active_is_alt: false,
            mode: TermMode::default(),
            palette: Palette::default(),
            charset: CharsetState::default(),
            title: String::new(),
            title_stack: Vec::new(),
            cursor_shape: CursorShape::default(),
            keyboard_mode_stack: Vec::new(),
            inactive_keyboard_mode_stack: Vec::new(),
            osc52_read_enabled: false,
            cwd: None,
            shell_integration: ShellIntegration::default(),
            raw_parser: vte::Parser::new(),
            processor: vte::ansi::Processor::new(),
            event_listener: listener,
        }
    }

    /// Feed a chunk of PTY output through the terminal.
    ///
    /// Runs two passes over `bytes`, matching the shape of dispatch a
    /// single `Handler` trait can't cover on its own: a raw `vte::Parser`
    /// pass first picks off OSC 7/133, which `vte::ansi::Handler` has no
    /// method for, then the normal `vte::ansi::Processor` pass drives every
    /// other escape sequence into `self` as usual.
    pub fn process(&mut self, bytes: &[u8]) {
        let mut interceptor = RawInterceptor { cwd: &mut self.cwd, shell: &mut self.shell_integration };
        self.raw_parser.advance(&mut interceptor, bytes);

        let mut processor = std::mem::replace(&mut self.processor, vte::ansi::Processor::new());
        processor.advance(self, bytes);
        self.processor = processor;

        let row = self.grid().cursor_position().line.0;
        self.shell_integration.resolve_pending_row(row);
    }

    /// Working directory last reported by the shell via OSC 7, if any.
    pub fn working_dir(&self) -> Option<&str> {
        self.cwd.as_deref()
    }

    /// Number of completed shell commands tracked via OSC 133.
    pub fn command_count(&self) -> usize {
        self.shell_integration.command_count()
    }

    /// The `index`-th completed command record.
    pub fn command(&self, index: usize) -> Option<&CommandRecord> {
        self.shell_integration.command(index)
    }

    /// Resize both grids: the active one reflows, the alternate one just
    /// reshapes (xterm never reflows the alt screen).
    pub fn resize(&mut self, cols: usize, lines: usize) {
        self.grid.resize(cols, lines);
        self.alt_grid.resize_no_reflow(cols, lines);
    }

    /// Whether OSC 52 clipboard read queries are currently honored.
    pub fn osc52_read_enabled(&self) -> bool {
        self.osc52_read_enabled
    }

    /// Opt in (or out) of honoring OSC 52 clipboard read queries. The host
    /// is responsible for deciding this is safe (e.g. only for a trusted
    /// local shell, never for a remote SSH session).
    pub fn set_osc52_read_enabled(&mut self, enabled: bool) {
        self.osc52_read_enabled = enabled;
    }

    /// Reference to the active grid.
    pub fn grid(&self) -> &Grid {
        if self.active_is_alt { &self.alt_grid } else { &self.grid }
    }

    /// Mutable reference to the active grid.
    pub fn grid_mut(&mut self) -> &mut Grid {
        if self.active_is_alt { &mut self.alt_grid } else { &mut self.grid }
    }

    /// Current terminal mode flags.
    pub fn mode(&self) -> TermMode {
        self.mode
    }

    /// Reference to the color palette.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Current window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current cursor shape.
    pub fn cursor_shape(&self) -> CursorShape {
        self.cursor_shape
    }

    /// Reference to the charset state.
    pub fn charset(&self) -> &CharsetState {
        &self.charset
    }

    /// Reference to the event listener.
    pub fn event_listener(&self) -> &T {
        &self.event_listener
    }

    /// The title stack (xterm push/pop title).
    pub fn title_stack(&self) -> &[String] {
        &self.title_stack
    }

    /// Switch between primary and alternate screen.
    ///
    /// Saves/restores cursor, toggles `active_is_alt`, swaps keyboard mode
    /// stacks, and marks all lines dirty. Entering the alternate screen
    /// always starts from a blank grid, matching xterm's mode 47/1047/1049
    /// behavior.
    pub fn swap_alt(&mut self) {
        if self.active_is_alt {
            // Switching back to primary: save alt cursor, restore primary cursor.
            self.alt_grid.save_cursor();
            self.grid.restore_cursor();
        } else {
            // Switching to alt: save primary cursor, restore alt cursor,
            // then clear whatever the alt grid held from its last use.
            self.grid.save_cursor();
            self.alt_grid.restore_cursor();
            self.alt_grid.erase_display(EraseMode::All);
        }

        self.active_is_alt = !self.active_is_alt;
        std::mem::swap(&mut self.keyboard_mode_stack, &mut self.inactive_keyboard_mode_stack);
        self.grid_mut().dirty_mut().mark_all();
    }

    /// Whether the alternate screen is currently active.
    pub fn is_alt_screen(&self) -> bool {
        self.active_is_alt
    }

    /// Mutable reference to the color palette.
    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    /// Set the window title, clearing it when `None` resets to default.
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title.unwrap_or_default();
    }

    /// Push the current title onto the title stack (XTWINOPS 22).
    pub fn push_title(&mut self) {
        self.title_stack.push(self.title.clone());
    }

    /// Pop the most recently pushed title (XTWINOPS 23), if any.
    pub fn pop_title(&mut self) {
        if let Some(title) = self.title_stack.pop() {
            self.title = title;
        }
    }

    /// Set the cursor shape (DECSCUSR).
    pub fn set_cursor_shape(&mut self, shape: CursorShape) {
        self.cursor_shape = shape;
    }

    /// Current keyboard enhancement mode (kitty protocol), or 0 if unset.
    pub fn keyboard_mode(&self) -> u8 {
        self.keyboard_mode_stack.last().copied().unwrap_or(0)
    }

    /// Push a keyboard mode onto the active-screen stack.
    pub fn push_keyboard_mode(&mut self, mode: u8) {
        self.keyboard_mode_stack.push(mode);
    }

    /// Pop `count` keyboard modes from the active-screen stack.
    pub fn pop_keyboard_modes(&mut self, count: u16) {
        let new_len = self.keyboard_mode_stack.len().saturating_sub(count as usize);
        self.keyboard_mode_stack.truncate(new_len);
    }

    /// Reset to power-on defaults (RIS): both grids cleared, modes and
    /// palette reset, title and command history dropped, primary screen
    /// active. Scrollback is cleared (spec invariant 5).
    pub fn hard_reset(&mut self) {
        let (cols, lines) = self.grid.grid_size();
        let scrollback_cap = self.grid.scrollback().max_scrollback();
        self.grid = Grid::with_scrollback(lines, cols, scrollback_cap);
        self.alt_grid = Grid::with_scrollback(lines, cols, 0);
        self.active_is_alt = false;
        self.mode = TermMode::default();
        self.palette = Palette::default();
        self.charset = CharsetState::default();
        self.title.clear();
        self.title_stack.clear();
        self.cursor_shape = CursorShape::default();
        self.keyboard_mode_stack.clear();
        self.inactive_keyboard_mode_stack.clear();
        self.shell_integration.clear();
    }

    /// Soft reset (DECSTR): cursor, attributes, modes, and scroll region
    /// return to defaults, but the grid contents and scrollback survive.
    pub fn soft_reset(&mut self) {
        self.mode = TermMode::default();
        let (_, lines) = self.grid_mut().grid_size();
        self.grid_mut().set_scroll_region(1, Some(lines));
        self.grid_mut().cursor_mut().template = crate::cell::Cell::default();
    }
}
