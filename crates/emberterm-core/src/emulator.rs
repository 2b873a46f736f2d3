//! The terminal engine: two screens, scroll region, scrollback, action
//! dispatch, and host notifications.
//!
//! [`Emulator`] is a synchronous state machine. Bytes from the PTY master
//! go in through [`Emulator::feed`]; replies and render notifications come
//! back out through the installed [`Host`] before `feed` returns. There are
//! no threads, no I/O, and no fallible paths on a live emulator.

use crate::cell::{Cell, CellFlags, Color};
use crate::keys::{self, Key, Modifiers};
use crate::logging;
use crate::parser::{Action, CsiSequence, Parser};
use crate::screen::Screen;
use crate::scrollback::Scrollback;

/// Implicit tab stops sit at every 8th column.
const TAB_WIDTH: u16 = 8;

/// Callbacks the engine raises toward its host.
///
/// Every method has a no-op default so hosts implement only what they
/// need. Callbacks are invoked inline from the mutating call; the `&mut`
/// borrow on the emulator makes reentry impossible.
pub trait Host {
    /// Deliver reply bytes (reports, key encodings) to the PTY master.
    fn write_to_master(&mut self, bytes: &[u8]) {
        let _ = bytes;
    }

    /// The visible screen changed; repaint it.
    fn refresh(&mut self) {}

    /// A single cell was written.
    fn set_character(&mut self, row: u16, col: u16, cell: Cell) {
        let _ = (row, col, cell);
    }

    /// The cursor moved.
    fn move_cursor(&mut self, old_row: u16, old_col: u16, new_row: u16, new_col: u16) {
        let _ = (old_row, old_col, new_row, new_col);
    }
}

/// Host that discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {}

/// Headless VT/ANSI terminal emulator.
pub struct Emulator {
    rows: u16,
    cols: u16,
    main: Screen,
    alternate: Screen,
    alt_active: bool,
    /// One save slot shared by both screens.
    saved_cursor: (u16, u16),
    /// Colors applied to blank fills and newly written cells.
    color: Color,
    /// Scroll region, 0-indexed inclusive.
    scroll_top: u16,
    scroll_bottom: u16,
    scrollback: Scrollback,
    parser: Parser,
    host: Box<dyn Host>,
}

impl Emulator {
    /// Create an emulator with two blank screens.
    ///
    /// # Panics
    ///
    /// Panics if `rows` or `cols` is 0.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        assert!(rows > 0 && cols > 0, "terminal dimensions must be > 0");
        let color = Color::DEFAULT;
        Self {
            rows,
            cols,
            main: Screen::new(rows, cols, color),
            alternate: Screen::new(rows, cols, color),
            alt_active: false,
            saved_cursor: (0, 0),
            color,
            scroll_top: 0,
            scroll_bottom: rows - 1,
            scrollback: Scrollback::new(cols),
            parser: Parser::new(),
            host: Box::new(NullHost),
        }
    }

    /// Install the host callback set, replacing the previous one.
    pub fn set_host(&mut self, host: Box<dyn Host>) {
        self.host = host;
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    /// Cursor row on the active screen.
    #[must_use]
    pub fn cursor_row(&self) -> u16 {
        self.screen().cursor().0
    }

    /// Cursor column on the active screen.
    #[must_use]
    pub fn cursor_column(&self) -> u16 {
        self.screen().cursor().1
    }

    /// Current scrollback view offset; 0 means live.
    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.scrollback.offset()
    }

    /// Number of committed history rows.
    #[must_use]
    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    /// Scroll region as `(top, bottom)`, 0-indexed inclusive.
    #[must_use]
    pub const fn scroll_region(&self) -> (u16, u16) {
        (self.scroll_top, self.scroll_bottom)
    }

    /// Colors used for blank fills and new cells.
    #[must_use]
    pub const fn default_color(&self) -> Color {
        self.color
    }

    /// Set the default foreground/background slots (masked to 0-15).
    pub fn set_default_color(&mut self, fg: u8, bg: u8) {
        self.color = Color::new(fg, bg);
    }

    /// The cells of view row `row` under the current scroll offset.
    ///
    /// With a nonzero offset the view spans history rows followed by the
    /// top of the live screen; with offset 0 it is the live screen.
    #[must_use]
    pub fn row_data(&self, row: u16) -> Option<&[Cell]> {
        if row >= self.rows {
            return None;
        }
        let offset = self.scrollback.offset();
        if offset == 0 {
            return self.screen().row_cells(row);
        }
        let index = self.scrollback.len() - offset + usize::from(row);
        if index < self.scrollback.len() {
            self.scrollback.get(index)
        } else {
            self.screen().row_cells(row - offset as u16)
        }
    }

    // ── Host-facing operations ──────────────────────────────────────

    /// Stream bytes from the PTY master through the parser.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if let Some(action) = self.parser.advance(byte) {
                self.apply(action);
            }
            // Output from the application cancels the scrollback view.
            if self.scrollback.offset() > 0 {
                self.scrollback.set_offset(0);
            }
        }
    }

    /// Encode a host key event and deliver it to the master.
    pub fn send_key(&mut self, modifiers: Modifiers, key: Key) {
        let bytes = keys::encode(modifiers, key);
        if !bytes.is_empty() {
            self.host.write_to_master(&bytes);
        }
    }

    /// Adjust the scrollback view offset (0 = live screen) and repaint.
    pub fn scroll(&mut self, offset: usize) {
        self.scrollback.set_offset(offset);
        self.host.refresh();
    }

    // ── Action dispatch ─────────────────────────────────────────────

    fn apply(&mut self, action: Action) {
        match action {
            Action::Print(byte) => self.put_byte(byte),
            Action::Esc(byte) => self.esc_dispatch(byte),
            Action::Csi(seq) => self.csi_dispatch(&seq),
            Action::Align => self.screen_alignment_test(),
        }
    }

    fn esc_dispatch(&mut self, byte: u8) {
        match byte {
            b'7' => self.saved_cursor = self.screen().cursor(),
            b'8' => {
                let (row, col) = self.saved_cursor;
                self.move_cursor(i32::from(row), i32::from(col));
            }
            b'c' => self.clear_screen(),
            b'D' => self.move_cursor_diff(1, 0),
            b'E' => {
                let row = self.screen().cursor().0;
                self.move_cursor(i32::from(row) + 1, 0);
            }
            b'M' => self.scroll_down_region(1),
            b'Z' => self.reply(b"\x1b[?6c"),
            b'\\' => {} // string terminator, nothing pending
            _ => logging::trace!(byte, "ignoring escape dispatch"),
        }
    }

    fn csi_dispatch(&mut self, seq: &CsiSequence) {
        let p1 = seq.param(0, 1);
        let p2 = seq.param(1, 1);
        match seq.final_byte {
            b'A' => self.move_cursor_diff(-p1, 0),
            b'B' => self.move_cursor_diff(p1, 0),
            b'C' => self.move_cursor_diff(0, p1),
            b'D' => self.move_cursor_diff(0, -p1),
            b'H' | b'f' => self.move_cursor((p1 - 1).max(0), (p2 - 1).max(0)),
            b'd' => {
                let col = self.screen().cursor().1;
                self.move_cursor((p1 - 1).max(0), i32::from(col));
            }
            b'G' => {
                let row = self.screen().cursor().0;
                self.move_cursor(i32::from(row), (p1 - 1).max(0));
            }
            b'n' if seq.params_raw() == b"6" => {
                let (row, col) = self.screen().cursor();
                let report = format!("\x1b[{};{}R", row + 1, col + 1);
                self.reply(report.as_bytes());
            }
            b'J' => {
                let (mode, color) = (seq.param(0, 0), self.color);
                self.screen_mut().erase_in_display(mode, color);
                self.host.refresh();
            }
            b'K' => {
                let (mode, color) = (seq.param(0, 0), self.color);
                self.screen_mut().erase_in_line(mode, color);
                self.host.refresh();
            }
            b'm' => self.select_graphic_rendition(seq),
            b'h' if seq.private => self.set_private_mode(seq, true),
            b'l' if seq.private => self.set_private_mode(seq, false),
            b't' => self.window_report(seq),
            b'c' => self.device_attributes(seq),
            b'@' => {
                let color = self.color;
                self.screen_mut().insert_chars(count(p1), color);
                self.host.refresh();
            }
            b'P' => {
                let color = self.color;
                self.screen_mut().delete_chars(count(p1), color);
                self.host.refresh();
            }
            b'r' => self.set_scroll_region(p1, p2),
            b'L' => {
                let row = self.screen().cursor().0;
                self.insert_lines(row, count(p1));
            }
            b'M' => {
                let row = self.screen().cursor().0;
                self.delete_lines(row, count(p1));
            }
            b'S' => self.scroll_up_region(count(p1)),
            b'T' => self.scroll_down_region(count(p1)),
            _ => {
                logging::debug!(
                    final_byte = seq.final_byte,
                    private = seq.private,
                    "unhandled control sequence"
                );
            }
        }
    }

    fn select_graphic_rendition(&mut self, seq: &CsiSequence) {
        if seq.params_raw().is_empty() {
            return;
        }
        for value in seq.fields() {
            match value {
                0 => self.screen_mut().set_attr_protected(false),
                8 => self.screen_mut().set_attr_protected(true),
                // Intensity and red foreground are accepted, not rendered.
                1 | 22 | 31 => {}
                _ => logging::trace!(value, "ignoring SGR parameter"),
            }
        }
    }

    fn set_private_mode(&mut self, seq: &CsiSequence, enable: bool) {
        let params = seq.params_raw();
        if params == b"1049" {
            if enable {
                self.enter_alternate_screen();
            } else {
                self.restore_main_screen();
            }
        } else if params == b"25" || params == b"12" || params == b"7" || params == b"2004" {
            // Cursor visibility/blink, autowrap, and bracketed paste
            // toggles are accepted without effect.
        } else {
            logging::debug!(enable, "unhandled private mode");
        }
    }

    fn window_report(&mut self, seq: &CsiSequence) {
        let params = seq.params_raw();
        if params == b"11" {
            // Window state report: always visible.
            self.reply(b"\x1b[1t");
        } else if params.starts_with(b"22;") || params.starts_with(b"23;") {
            // Title and icon stack operations are swallowed.
        } else {
            logging::debug!("unhandled window report");
        }
    }

    fn device_attributes(&mut self, seq: &CsiSequence) {
        if seq.private {
            self.reply(b"\x1b[>0;0;0c");
        } else if seq.params_raw() == b"0" {
            self.reply(b"\x1b[?1;0c");
        } else {
            logging::debug!("unhandled device attributes request");
        }
    }

    // ── Write path ──────────────────────────────────────────────────

    fn put_byte(&mut self, byte: u8) {
        match byte {
            b'\n' => self.linefeed(),
            b'\r' => {
                let row = self.screen().cursor().0;
                self.move_cursor(i32::from(row), 0);
            }
            0x08 => {
                if self.screen().cursor().1 > 0 {
                    self.move_cursor_diff(0, -1);
                }
            }
            b'\t' => {
                let col = self.screen().cursor().1;
                for _ in 0..TAB_WIDTH - col % TAB_WIDTH {
                    self.put_byte(b' ');
                }
            }
            _ => self.put_printable(byte),
        }
    }

    fn put_printable(&mut self, byte: u8) {
        let (row, col) = self.screen().cursor();
        let flags = if self.screen().attr_protected() {
            CellFlags::PROTECTED
        } else {
            CellFlags::empty()
        };
        let cell = Cell {
            ch: byte,
            color: self.color,
            flags,
        };
        self.screen_mut().put(row, col, cell);
        self.host.set_character(row, col, cell);

        if col + 1 < self.cols {
            self.move_cursor(i32::from(row), i32::from(col) + 1);
        } else if row == self.scroll_bottom {
            // Right margin on the last region row: wrap and scroll.
            self.move_cursor(i32::from(row), 0);
            self.scroll_up(1);
        } else {
            self.move_cursor(i32::from(row) + 1, 0);
        }
    }

    fn linefeed(&mut self) {
        if self.screen().cursor().0 == self.scroll_bottom {
            self.scroll_up(1);
        } else {
            self.move_cursor_diff(1, 0);
        }
    }

    // ── Cursor ──────────────────────────────────────────────────────

    fn move_cursor(&mut self, row: i32, col: i32) {
        let row = row.clamp(0, i32::from(self.rows) - 1) as u16;
        let col = col.clamp(0, i32::from(self.cols) - 1) as u16;
        let (old_row, old_col) = self.screen().cursor();
        if (row, col) != (old_row, old_col) {
            self.host.move_cursor(old_row, old_col, row, col);
            self.screen_mut().set_cursor(row, col);
        }
    }

    fn move_cursor_diff(&mut self, d_row: i32, d_col: i32) {
        let (row, col) = self.screen().cursor();
        self.move_cursor(
            i32::from(row).saturating_add(d_row),
            i32::from(col).saturating_add(d_col),
        );
    }

    // ── Screen-level operations ─────────────────────────────────────

    /// Blank the active screen (protection included) and home the cursor.
    fn clear_screen(&mut self) {
        let color = self.color;
        self.screen_mut().fill_blank(color);
        self.move_cursor(0, 0);
        self.host.refresh();
    }

    /// DECALN: fill the screen with `E` and home the cursor.
    fn screen_alignment_test(&mut self) {
        let color = self.color;
        self.screen_mut().fill_all(b'E', color);
        self.move_cursor(0, 0);
        self.host.refresh();
    }

    /// Scroll the region up, committing evicted top rows to history.
    ///
    /// The alternate screen never contributes to scrollback; its region
    /// still scrolls.
    fn scroll_up(&mut self, lines: u16) {
        let height = self.scroll_bottom - self.scroll_top + 1;
        let lines = lines.min(height);
        if !self.alt_active {
            for line in 0..lines {
                if let Some(cells) = self.main.row_cells(self.scroll_top + line) {
                    self.scrollback.push(cells);
                }
            }
        }
        self.scroll_up_region(lines);
    }

    fn scroll_up_region(&mut self, lines: u16) {
        let (top, bottom, color) = (self.scroll_top, self.scroll_bottom, self.color);
        self.screen_mut().scroll_up(top, bottom, lines, color);
        self.host.refresh();
    }

    fn scroll_down_region(&mut self, lines: u16) {
        let (top, bottom, color) = (self.scroll_top, self.scroll_bottom, self.color);
        self.screen_mut().scroll_down(top, bottom, lines, color);
        self.host.refresh();
    }

    fn insert_lines(&mut self, from_row: u16, lines: u16) {
        if from_row < self.scroll_top || from_row > self.scroll_bottom {
            return;
        }
        let (bottom, color) = (self.scroll_bottom, self.color);
        self.screen_mut().scroll_down(from_row, bottom, lines, color);
        self.host.refresh();
    }

    fn delete_lines(&mut self, from_row: u16, lines: u16) {
        if from_row < self.scroll_top || from_row > self.scroll_bottom {
            return;
        }
        let (bottom, color) = (self.scroll_bottom, self.color);
        self.screen_mut().scroll_up(from_row, bottom, lines, color);
        self.host.refresh();
    }

    fn set_scroll_region(&mut self, p1: i32, p2: i32) {
        if p1 >= 1 && p2 >= p1 && p2 <= i32::from(self.rows) {
            self.scroll_top = (p1 - 1) as u16;
            self.scroll_bottom = (p2 - 1) as u16;
        } else {
            self.scroll_top = 0;
            self.scroll_bottom = self.rows - 1;
        }
    }

    /// Activate and clear the alternate screen.
    fn enter_alternate_screen(&mut self) {
        self.alt_active = true;
        self.clear_screen();
    }

    /// Reactivate the main screen; its contents were never touched.
    fn restore_main_screen(&mut self) {
        self.alt_active = false;
        self.host.refresh();
    }

    // ── Internals ───────────────────────────────────────────────────

    fn reply(&mut self, bytes: &[u8]) {
        self.host.write_to_master(bytes);
    }

    fn screen(&self) -> &Screen {
        if self.alt_active {
            &self.alternate
        } else {
            &self.main
        }
    }

    fn screen_mut(&mut self) -> &mut Screen {
        if self.alt_active {
            &mut self.alternate
        } else {
            &mut self.main
        }
    }
}

/// Count-style parameter: values below 1 mean 1, large values saturate.
fn count(param: i32) -> u16 {
    if param > 0 {
        param.min(i32::from(u16::MAX)) as u16
    } else {
        1
    }
}
