//! VTE handler implementation for `Term<T>`.
//!
//! Implements `vte::ansi::Handler` to process escape sequences, control
//! characters, and printable input. Each method delegates to the
//! appropriate grid/cursor/mode operation; reply-bearing sequences (DA,
//! DSR, OSC color queries) write their bytes back through
//! `Event::PtyWrite` — the session layer owns the actual PTY write.

use base64::Engine;
use vte::ansi::{
    Attr, CharsetIndex, ClearMode, Color, CursorShape as VteCursorShape, CursorStyle, Handler,
    Hyperlink as VteHyperlink, KeyboardModes, LineClearMode, Mode, NamedColor, NamedPrivateMode,
    PrivateMode, Rgb, StandardCharset, TabulationClearMode,
};

use crate::cell::{Cell, CellExtra, CellFlags, Hyperlink};
use crate::event::{ClipboardType, Event, EventListener};
use crate::grid::{CursorShape, EraseMode, TabClearMode};
use crate::index::Column;
use crate::term::TermMode;

use super::Term;

impl<T: EventListener> Handler for Term<T> {
    /// Print a character to the terminal.
    ///
    /// Translates through the active charset, then writes via `grid.put_char`.
    #[inline]
    fn input(&mut self, c: char) {
        let c = self.charset.translate(c);
        self.grid_mut().put_char(c);
    }

    /// Move cursor left by one column, clearing the wrap-pending state.
    ///
    /// The wrap-pending state is when the cursor has advanced past the last
    /// column (`col == cols`) after a character write. Backspace resets
    /// this to the last column position.
    fn backspace(&mut self) {
        let grid = self.grid_mut();
        let col = grid.cursor().col().0;
        let cols = grid.cols();

        if col >= cols {
            // Wrap-pending: snap to last column.
            grid.cursor_mut().set_col(Column(cols - 1));
        } else if col > 0 {
            grid.cursor_mut().set_col(Column(col - 1));
        } else {
            // Already at column 0: no-op.
        }
    }

    /// Advance cursor to the next tab stop (or end of line).
    fn put_tab(&mut self, count: u16) {
        for _ in 0..count {
            self.grid_mut().tab();
        }
    }

    /// Move cursor down one line, scrolling if at the bottom of the scroll
    /// region. Under LNM (mode 20) also returns to column 0.
    #[inline]
    fn linefeed(&mut self) {
        self.grid_mut().linefeed();
        if self.mode.contains(TermMode::LINE_FEED_NEW_LINE) {
            self.grid_mut().carriage_return();
        }
    }

    /// NEL: carriage return followed by linefeed.
    fn newline(&mut self) {
        self.grid_mut().next_line();
    }

    /// Move cursor to column 0.
    #[inline]
    fn carriage_return(&mut self) {
        self.grid_mut().carriage_return();
    }

    /// Ring the bell — send `Event::Bell` to the listener.
    #[inline]
    fn bell(&mut self) {
        self.event_listener.send_event(Event::Bell);
    }

    /// SUB: treated as a space character per ECMA-48.
    fn substitute(&mut self) {
        self.input(' ');
    }

    /// Switch the active charset slot (SO → G1, SI → G0).
    #[inline]
    fn set_active_charset(&mut self, index: CharsetIndex) {
        self.charset.set_active(index);
    }

    /// Assign a charset designation to a G0–G3 slot (ESC ( / ) / * / +).
    fn configure_charset(&mut self, index: CharsetIndex, charset: StandardCharset) {
        self.charset.set_charset(index, charset);
    }

    // -- Movement ---------------------------------------------------------

    /// CUU.
    fn move_up(&mut self, count: usize) {
        self.grid_mut().move_up(count);
    }

    /// CUD.
    fn move_down(&mut self, count: usize) {
        self.grid_mut().move_down(count);
    }

    /// CUF.
    fn move_forward(&mut self, count: usize) {
        self.grid_mut().move_forward(count);
    }

    /// CUB.
    fn move_backward(&mut self, count: usize) {
        self.grid_mut().move_backward(count);
    }

    /// CNL: move down `count` lines and to column 0.
    fn move_down_and_cr(&mut self, count: usize) {
        self.grid_mut().move_down(count);
        self.grid_mut().carriage_return();
    }

    /// CPL: move up `count` lines and to column 0.
    fn move_up_and_cr(&mut self, count: usize) {
        self.grid_mut().move_up(count);
        self.grid_mut().carriage_return();
    }

    /// CUP/HVP: absolute cursor position (1-based coordinates, already
    /// converted to 0-based by the parser).
    fn goto(&mut self, line: vte::ansi::Line, col: vte::ansi::Column) {
        let line = line.0.max(0) as usize;
        self.grid_mut().move_to(line, Column(col.0));
    }

    /// VPA: absolute row, column unchanged.
    fn goto_line(&mut self, line: vte::ansi::Line) {
        let line = line.0.max(0) as usize;
        self.grid_mut().move_to_line(line);
    }

    /// CHA/HPA: absolute column, row unchanged.
    fn goto_col(&mut self, col: vte::ansi::Column) {
        self.grid_mut().move_to_column(Column(col.0));
    }

    /// CHT: advance `count` tab stops.
    fn move_forward_tabs(&mut self, count: u16) {
        for _ in 0..count {
            self.grid_mut().tab();
        }
    }

    /// CBT: retreat `count` tab stops.
    fn move_backward_tabs(&mut self, count: u16) {
        for _ in 0..count {
            self.grid_mut().tab_backward();
        }
    }

    /// HTS: set a tab stop at the cursor column.
    fn set_horizontal_tabstop(&mut self) {
        self.grid_mut().set_tab_stop();
    }

    /// ESC 7 / CSI s: DECSC, save cursor position and attributes.
    fn save_cursor_position(&mut self) {
        self.grid_mut().save_cursor();
    }

    /// ESC 8 / CSI u: DECRC, restore cursor position and attributes.
    fn restore_cursor_position(&mut self) {
        self.grid_mut().restore_cursor();
    }

    /// RI: reverse index — move up, scrolling the region down if at the top.
    fn reverse_index(&mut self) {
        self.grid_mut().reverse_index();
    }

    // -- Erase / edit -----------------------------------------------------

    /// ICH: insert `count` blank cells at the cursor.
    fn insert_blank(&mut self, count: usize) {
        self.grid_mut().insert_blank(count);
    }

    /// DCH: delete `count` cells at the cursor.
    fn delete_chars(&mut self, count: usize) {
        self.grid_mut().delete_chars(count);
    }

    /// ECH: erase `count` cells at the cursor without shifting.
    fn erase_chars(&mut self, count: usize) {
        self.grid_mut().erase_chars(count);
    }

    /// IL: insert `count` blank lines at the cursor.
    fn insert_blank_lines(&mut self, count: usize) {
        self.grid_mut().insert_lines(count);
    }

    /// DL: delete `count` lines at the cursor.
    fn delete_lines(&mut self, count: usize) {
        self.grid_mut().delete_lines(count);
    }

    /// EL: erase part or all of the current line.
    fn clear_line(&mut self, mode: LineClearMode) {
        let mode = match mode {
            LineClearMode::Right => EraseMode::Below,
            LineClearMode::Left => EraseMode::Above,
            LineClearMode::All => EraseMode::All,
        };
        self.grid_mut().erase_line(mode);
    }

    /// ED: erase part or all of the display.
    fn clear_screen(&mut self, mode: ClearMode) {
        let mode = match mode {
            ClearMode::Below => EraseMode::Below,
            ClearMode::Above => EraseMode::Above,
            ClearMode::All => EraseMode::All,
            ClearMode::Saved => EraseMode::Scrollback,
        };
        self.grid_mut().erase_display(mode);
    }

    /// TBC: clear tab stop(s).
    fn clear_tabs(&mut self, mode: TabulationClearMode) {
        let mode = match mode {
            TabulationClearMode::Current => TabClearMode::Current,
            TabulationClearMode::All => TabClearMode::All,
        };
        self.grid_mut().clear_tab_stop(mode);
    }

    /// DECALN: fill the entire screen with 'E', used for alignment tests.
    fn decaln(&mut self) {
        let (cols, lines) = self.grid().grid_size();
        for line in 0..lines {
            for col in 0..cols {
                self.grid_mut()[crate::index::Line(line as i32)][Column(col)] = Cell {
                    ch: 'E',
                    ..Cell::default()
                };
            }
        }
        self.grid_mut().dirty_mut().mark_all();
    }

    // -- Scrolling ----------------------------------------------------------

    /// SU: scroll the scroll region up.
    fn scroll_up(&mut self, count: usize) {
        self.grid_mut().scroll_up(count);
    }

    /// SD: scroll the scroll region down.
    fn scroll_down(&mut self, count: usize) {
        self.grid_mut().scroll_down(count);
    }

    /// DECSTBM: set the scroll region.
    fn set_scrolling_region(&mut self, top: usize, bottom: Option<usize>) {
        self.grid_mut().set_scroll_region(top, bottom);
    }

    // -- Modes --------------------------------------------------------------

    fn set_mode(&mut self, mode: Mode) {
        match mode {
            Mode::Insert => self.mode.insert(TermMode::INSERT),
            Mode::LineFeedNewLine => self.mode.insert(TermMode::LINE_FEED_NEW_LINE),
        }
    }

    fn unset_mode(&mut self, mode: Mode) {
        match mode {
            Mode::Insert => self.mode.remove(TermMode::INSERT),
            Mode::LineFeedNewLine => self.mode.remove(TermMode::LINE_FEED_NEW_LINE),
        }
    }

    fn set_private_mode(&mut self, mode: PrivateMode) {
        let PrivateMode::Named(named) = mode else { return };
        match named {
            NamedPrivateMode::CursorKeys => self.mode.insert(TermMode::APP_CURSOR),
            NamedPrivateMode::ColumnMode => {} // 80/132 column switch: not supported.
            NamedPrivateMode::Origin => {
                self.mode.insert(TermMode::ORIGIN);
                self.grid_mut().move_to(0, Column(0));
            }
            NamedPrivateMode::LineWrap => self.mode.insert(TermMode::LINE_WRAP),
            NamedPrivateMode::BlinkingCursor => {
                self.mode.insert(TermMode::CURSOR_BLINKING);
                self.event_listener.send_event(Event::CursorBlinkingChange);
            }
            NamedPrivateMode::ShowCursor => self.mode.insert(TermMode::SHOW_CURSOR),
            NamedPrivateMode::ReportMouseClicks => self.mode.insert(TermMode::MOUSE_REPORT_CLICK),
            NamedPrivateMode::ReportCellMouseMotion => self.mode.insert(TermMode::MOUSE_DRAG),
            NamedPrivateMode::ReportAllMouseMotion => self.mode.insert(TermMode::MOUSE_MOTION),
            NamedPrivateMode::ReportFocusInOut => self.mode.insert(TermMode::FOCUS_IN_OUT),
            NamedPrivateMode::Utf8Mouse => self.mode.insert(TermMode::MOUSE_UTF8),
            NamedPrivateMode::SgrMouse => self.mode.insert(TermMode::MOUSE_SGR),
            NamedPrivateMode::UrgencyHints => self.mode.insert(TermMode::URGENCY_HINTS),
            NamedPrivateMode::SwapScreenAndSetRestoreCursor => {
                if !self.is_alt_screen() {
                    self.swap_alt();
                }
                self.mode.insert(TermMode::ALT_SCREEN);
            }
            NamedPrivateMode::BracketedPaste => self.mode.insert(TermMode::BRACKETED_PASTE),
            NamedPrivateMode::SyncUpdate => self.mode.insert(TermMode::SYNC_UPDATE),
            _ => {}
        }
    }

    fn unset_private_mode(&mut self, mode: PrivateMode) {
        let PrivateMode::Named(named) = mode else { return };
        match named {
            NamedPrivateMode::CursorKeys => self.mode.remove(TermMode::APP_CURSOR),
            NamedPrivateMode::ColumnMode => {}
            NamedPrivateMode::Origin => {
                self.mode.remove(TermMode::ORIGIN);
                self.grid_mut().move_to(0, Column(0));
            }
            NamedPrivateMode::LineWrap => self.mode.remove(TermMode::LINE_WRAP),
            NamedPrivateMode::BlinkingCursor => {
                self.mode.remove(TermMode::CURSOR_BLINKING);
                self.event_listener.send_event(Event::CursorBlinkingChange);
            }
            NamedPrivateMode::ShowCursor => self.mode.remove(TermMode::SHOW_CURSOR),
            NamedPrivateMode::ReportMouseClicks => self.mode.remove(TermMode::MOUSE_REPORT_CLICK),
            NamedPrivateMode::ReportCellMouseMotion => self.mode.remove(TermMode::MOUSE_DRAG),
            NamedPrivateMode::ReportAllMouseMotion => self.mode.remove(TermMode::MOUSE_MOTION),
            NamedPrivateMode::ReportFocusInOut => self.mode.remove(TermMode::FOCUS_IN_OUT),
            NamedPrivateMode::Utf8Mouse => self.mode.remove(TermMode::MOUSE_UTF8),
            NamedPrivateMode::SgrMouse => self.mode.remove(TermMode::MOUSE_SGR),
            NamedPrivateMode::UrgencyHints => self.mode.remove(TermMode::URGENCY_HINTS),
            NamedPrivateMode::SwapScreenAndSetRestoreCursor => {
                if self.is_alt_screen() {
                    self.swap_alt();
                }
                self.mode.remove(TermMode::ALT_SCREEN);
            }
            NamedPrivateMode::BracketedPaste => self.mode.remove(TermMode::BRACKETED_PASTE),
            NamedPrivateMode::SyncUpdate => self.mode.remove(TermMode::SYNC_UPDATE),
            _ => {}
        }
    }

    /// DECKPAM: application keypad mode.
    fn set_keypad_application_mode(&mut self) {
        self.mode.insert(TermMode::APP_KEYPAD);
    }

    /// DECKPNM: normal keypad mode.
    fn unset_keypad_application_mode(&mut self) {
        self.mode.remove(TermMode::APP_KEYPAD);
    }

    /// DECSCUSR: cursor shape/blink hint. `None` resets to the default
    /// (blinking block).
    fn set_cursor_style(&mut self, style: Option<CursorStyle>) {
        let Some(style) = style else {
            self.set_cursor_shape(CursorShape::Block);
            return;
        };
        let shape = match style.shape {
            VteCursorShape::Block => CursorShape::Block,
            VteCursorShape::Underline => CursorShape::Underline,
            VteCursorShape::Beam => CursorShape::Bar,
        };
        self.set_cursor_shape(shape);
    }

    // -- Keyboard enhancement (kitty protocol) -------------------------------

    fn push_keyboard_mode(&mut self, mode: KeyboardModes) {
        Term::push_keyboard_mode(self, mode.bits());
    }

    fn pop_keyboard_modes(&mut self, to_pop: u16) {
        Term::pop_keyboard_modes(self, to_pop);
    }

    // -- SGR ------------------------------------------------------------------

    fn terminal_attribute(&mut self, attr: Attr) {
        let template = &mut self.grid_mut().cursor_mut().template;
        match attr {
            Attr::Reset => {
                let default = Cell::default();
                template.fg = default.fg;
                template.bg = default.bg;
                template.flags = CellFlags::empty();
                template.extra = None;
            }
            Attr::Bold => template.flags.insert(CellFlags::BOLD),
            Attr::Dim => template.flags.insert(CellFlags::DIM),
            Attr::Italic => template.flags.insert(CellFlags::ITALIC),
            Attr::Underline => {
                template.flags.remove(CellFlags::ANY_UNDERLINE);
                template.flags.insert(CellFlags::UNDERLINE);
            }
            Attr::DoubleUnderline => {
                template.flags.remove(CellFlags::ANY_UNDERLINE);
                template.flags.insert(CellFlags::DOUBLE_UNDERLINE);
            }
            Attr::Undercurl => {
                template.flags.remove(CellFlags::ANY_UNDERLINE);
                template.flags.insert(CellFlags::CURLY_UNDERLINE);
            }
            Attr::DottedUnderline => {
                template.flags.remove(CellFlags::ANY_UNDERLINE);
                template.flags.insert(CellFlags::DOTTED_UNDERLINE);
            }
            Attr::DashedUnderline => {
                template.flags.remove(CellFlags::ANY_UNDERLINE);
                template.flags.insert(CellFlags::DASHED_UNDERLINE);
            }
            Attr::BlinkSlow | Attr::BlinkFast => template.flags.insert(CellFlags::BLINK),
            Attr::Reverse => template.flags.insert(CellFlags::INVERSE),
            Attr::Hidden => template.flags.insert(CellFlags::HIDDEN),
            Attr::Strike => template.flags.insert(CellFlags::STRIKETHROUGH),
            Attr::CancelBold => template.flags.remove(CellFlags::BOLD),
            Attr::CancelBoldDim => template.flags.remove(CellFlags::BOLD | CellFlags::DIM),
            Attr::CancelItalic => template.flags.remove(CellFlags::ITALIC),
            Attr::CancelUnderline => template.flags.remove(CellFlags::ANY_UNDERLINE),
            Attr::CancelBlink => template.flags.remove(CellFlags::BLINK),
            Attr::CancelReverse => template.flags.remove(CellFlags::INVERSE),
            Attr::CancelHidden => template.flags.remove(CellFlags::HIDDEN),
            Attr::CancelStrike => template.flags.remove(CellFlags::STRIKETHROUGH),
            Attr::Foreground(c) => template.fg = c,
            Attr::Background(c) => template.bg = c,
            Attr::UnderlineColor(c) => {
                let extra = template.extra.get_or_insert_with(|| Box::new(CellExtra::new()));
                extra.underline_color = Some(c);
            }
        }
    }

    // -- Device status / identification --------------------------------------

    /// DA1 (no intermediate) / DA2 (`>` intermediate).
    fn identify_terminal(&mut self, intermediate: Option<char>) {
        let reply = match intermediate {
            Some('>') => "\x1b[>0;0;0c".to_string(),
            _ => "\x1b[?1;2c".to_string(),
        };
        self.event_listener.send_event(Event::PtyWrite(reply));
    }

    /// DSR: 5 = device status, 6 = cursor position report.
    fn device_status(&mut self, arg: usize) {
        let reply = match arg {
            5 => "\x1b[0n".to_string(),
            6 => {
                let pos = self.grid().cursor_position();
                let row = pos.line.0.max(0) as usize + 1;
                let col = pos.column.0 + 1;
                format!("\x1b[{row};{col}R")
            }
            _ => return,
        };
        self.event_listener.send_event(Event::PtyWrite(reply));
    }

    // -- Title ----------------------------------------------------------------

    /// OSC 0/1/2: set window title.
    fn set_title(&mut self, title: Option<String>) {
        match &title {
            Some(t) => self.event_listener.send_event(Event::Title(t.clone())),
            None => self.event_listener.send_event(Event::ResetTitle),
        }
        Term::set_title(self, title);
    }

    /// XTWINOPS 22: push title onto the title stack.
    fn push_title(&mut self) {
        Term::push_title(self);
    }

    /// XTWINOPS 23: pop the most recently pushed title.
    fn pop_title(&mut self) {
        Term::pop_title(self);
        let title = self.title().to_string();
        self.event_listener.send_event(Event::Title(title));
    }

    // -- Color ------------------------------------------------------------------

    /// OSC 4: set an indexed palette color.
    fn set_color(&mut self, index: usize, color: Rgb) {
        self.palette_mut().set_indexed(index, color);
        self.grid_mut().dirty_mut().mark_all();
    }

    /// OSC 104: reset an indexed palette color to its default.
    fn reset_color(&mut self, index: usize) {
        self.palette_mut().reset_indexed(index);
        self.grid_mut().dirty_mut().mark_all();
    }

    /// OSC 10/11/12 `?` query: report the color at `index` in xterm's
    /// `rgb:RRRR/GGGG/BBBB` form (each 8-bit channel doubled to 16 bits).
    fn dynamic_color_sequence(&mut self, prefix: String, index: usize, terminator: &str) {
        let color = self.palette().resolve(Color::Named(named_color_for(index)));
        let reply = format!(
            "\x1b]{prefix};rgb:{r:02x}{r:02x}/{g:02x}{g:02x}/{b:02x}{b:02x}{terminator}",
            r = color.r,
            g = color.g,
            b = color.b,
        );
        self.event_listener.send_event(Event::PtyWrite(reply));
    }

    // -- Hyperlinks and clipboard -----------------------------------------------

    /// OSC 8: set or clear the hyperlink carried by subsequently-written cells.
    fn set_hyperlink(&mut self, hyperlink: Option<VteHyperlink>) {
        let template = &mut self.grid_mut().cursor_mut().template;
        match hyperlink {
            Some(h) => {
                let extra = template.extra.get_or_insert_with(|| Box::new(CellExtra::new()));
                extra.hyperlink = Some(Hyperlink { id: h.id, uri: h.uri });
            }
            None => {
                if let Some(extra) = &mut template.extra {
                    extra.hyperlink = None;
                }
            }
        }
    }

    /// OSC 52 set: base64-decode and surface the clipboard write to the host.
    fn clipboard_store(&mut self, clipboard: u8, base64_payload: &[u8]) {
        let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(base64_payload) else {
            return;
        };
        let text = String::from_utf8_lossy(&decoded).into_owned();
        self.event_listener
            .send_event(Event::ClipboardStore(clipboard_type(clipboard), text));
    }

    /// OSC 52 query: default-deny. The host must opt in via
    /// `Term::set_osc52_read_enabled` before reads are honored — an
    /// unprivileged program reading the system clipboard through an
    /// escape sequence is a real attack surface.
    fn clipboard_load(&mut self, clipboard: u8, terminator: &str) {
        if !self.osc52_read_enabled() {
            return;
        }
        let ty = clipboard_type(clipboard);
        let prefix = format!("\x1b]52;{};", clipboard as char);
        let terminator = terminator.to_string();
        let formatter = std::sync::Arc::new(move |text: &str| {
            let encoded = base64::engine::general_purpose::STANDARD.encode(text);
            format!("{prefix}{encoded}{terminator}")
        });
        self.event_listener.send_event(Event::ClipboardLoad(ty, formatter));
    }

    // -- Reset --------------------------------------------------------------

    /// ESC c: RIS, hard reset.
    fn reset_state(&mut self) {
        self.hard_reset();
    }
}

/// Map an OSC 10/11/12 dynamic-color index to the semantic palette slot
/// it queries (foreground, background, cursor).
fn named_color_for(index: usize) -> NamedColor {
    match index {
        // xterm's internal indices for the dynamic colors, as passed
        // through `dynamic_color_sequence`'s `index` parameter.
        768 => NamedColor::Background,
        769 => NamedColor::Cursor,
        _ => NamedColor::Foreground,
    }
}

/// Map an OSC 52 clipboard selector byte to our clipboard target enum.
fn clipboard_type(selector: u8) -> ClipboardType {
    match selector {
        b'p' | b's' => ClipboardType::Selection,
        _ => ClipboardType::Clipboard,
    }
}
