//! Host key events and their VT byte encodings.
//!
//! Named keys become CSI or SS3 sequences, modifiers are folded in using
//! the xterm `modifyOtherKeys` parameter, and Ctrl chords collapse to the
//! classic C0 control bytes.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const LEFT_SHIFT = 1 << 0;
        const RIGHT_SHIFT = 1 << 1;
        const CTRL = 1 << 2;
        const ALT = 1 << 3;
    }
}

impl Modifiers {
    /// xterm `modifyOtherKeys` value: `1 + shift + 2*alt + 4*ctrl`.
    #[must_use]
    pub fn xterm_param(self) -> u8 {
        let mut value = 1;
        if self.intersects(Self::LEFT_SHIFT | Self::RIGHT_SHIFT) {
            value += 1;
        }
        if self.contains(Self::ALT) {
            value += 2;
        }
        if self.contains(Self::CTRL) {
            value += 4;
        }
        value
    }
}

/// Key codes accepted by [`Emulator::send_key`](crate::Emulator::send_key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A literal byte: printable character or raw control.
    Char(u8),
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Return,
    Backspace,
    Escape,
    Tab,
}

/// Encode a key event as the byte sequence a VT application expects.
#[must_use]
pub fn encode(modifiers: Modifiers, key: Key) -> Vec<u8> {
    let modifier = modifiers.xterm_param();
    match key {
        Key::F1 | Key::F2 | Key::F3 | Key::F4 => {
            let base = match key {
                Key::F1 => b'P',
                Key::F2 => b'Q',
                Key::F3 => b'R',
                _ => b'S',
            };
            if modifier == 1 {
                // Unmodified F1-F4 use the SS3 form.
                vec![0x1B, b'O', base]
            } else {
                csi_sequence(1, base, modifier)
            }
        }
        Key::F5 => csi_sequence(15, b'~', modifier),
        Key::F6 => csi_sequence(17, b'~', modifier),
        Key::F7 => csi_sequence(18, b'~', modifier),
        Key::F8 => csi_sequence(19, b'~', modifier),
        Key::F9 => csi_sequence(20, b'~', modifier),
        Key::F10 => csi_sequence(21, b'~', modifier),
        Key::F11 => csi_sequence(23, b'~', modifier),
        Key::F12 => csi_sequence(24, b'~', modifier),
        Key::Up => csi_sequence(1, b'A', modifier),
        Key::Down => csi_sequence(1, b'B', modifier),
        Key::Right => csi_sequence(1, b'C', modifier),
        Key::Left => csi_sequence(1, b'D', modifier),
        Key::Home => csi_sequence(1, b'H', modifier),
        Key::End => csi_sequence(1, b'F', modifier),
        Key::PageUp => csi_sequence(5, b'~', modifier),
        Key::PageDown => csi_sequence(6, b'~', modifier),
        Key::Insert => csi_sequence(2, b'~', modifier),
        Key::Delete => csi_sequence(3, b'~', modifier),
        Key::Return => vec![b'\r'],
        Key::Backspace => vec![0x7F],
        Key::Escape => vec![0x1B],
        Key::Tab => vec![b'\t'],
        Key::Char(byte) => {
            if modifiers == Modifiers::CTRL && byte.is_ascii_graphic() {
                vec![byte.to_ascii_uppercase() ^ 0x40]
            } else {
                vec![byte]
            }
        }
    }
}

/// Shared CSI layout: `ESC [ final` for code 1, `ESC [ code final`
/// otherwise, or `ESC [ code ; modifier final` when modified.
fn csi_sequence(code: u16, final_byte: u8, modifier: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(8);
    out.extend_from_slice(b"\x1b[");
    if modifier <= 1 {
        if code != 1 {
            out.extend_from_slice(code.to_string().as_bytes());
        }
    } else {
        out.extend_from_slice(code.to_string().as_bytes());
        out.push(b';');
        out.extend_from_slice(modifier.to_string().as_bytes());
    }
    out.push(final_byte);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_param_follows_xterm_convention() {
        assert_eq!(Modifiers::empty().xterm_param(), 1);
        assert_eq!(Modifiers::LEFT_SHIFT.xterm_param(), 2);
        assert_eq!(Modifiers::RIGHT_SHIFT.xterm_param(), 2);
        assert_eq!(Modifiers::ALT.xterm_param(), 3);
        assert_eq!(Modifiers::CTRL.xterm_param(), 5);
        assert_eq!(
            (Modifiers::LEFT_SHIFT | Modifiers::ALT | Modifiers::CTRL).xterm_param(),
            8
        );
    }

    #[test]
    fn unmodified_f1_to_f4_use_ss3() {
        assert_eq!(encode(Modifiers::empty(), Key::F1), b"\x1bOP");
        assert_eq!(encode(Modifiers::empty(), Key::F4), b"\x1bOS");
    }

    #[test]
    fn modified_function_keys_use_csi() {
        assert_eq!(encode(Modifiers::LEFT_SHIFT, Key::F1), b"\x1b[1;2P");
        assert_eq!(encode(Modifiers::CTRL, Key::F5), b"\x1b[15;5~");
    }

    #[test]
    fn high_function_keys_use_tilde_codes() {
        assert_eq!(encode(Modifiers::empty(), Key::F5), b"\x1b[15~");
        assert_eq!(encode(Modifiers::empty(), Key::F11), b"\x1b[23~");
        assert_eq!(encode(Modifiers::empty(), Key::F12), b"\x1b[24~");
    }

    #[test]
    fn arrows_and_home_end_collapse_code_one() {
        assert_eq!(encode(Modifiers::empty(), Key::Up), b"\x1b[A");
        assert_eq!(encode(Modifiers::empty(), Key::End), b"\x1b[F");
        assert_eq!(encode(Modifiers::ALT, Key::Left), b"\x1b[1;3D");
    }

    #[test]
    fn paging_and_editing_keys() {
        assert_eq!(encode(Modifiers::empty(), Key::PageUp), b"\x1b[5~");
        assert_eq!(encode(Modifiers::empty(), Key::PageDown), b"\x1b[6~");
        assert_eq!(encode(Modifiers::empty(), Key::Insert), b"\x1b[2~");
        assert_eq!(encode(Modifiers::empty(), Key::Delete), b"\x1b[3~");
    }

    #[test]
    fn bare_control_keys_are_single_bytes() {
        assert_eq!(encode(Modifiers::empty(), Key::Return), b"\r");
        assert_eq!(encode(Modifiers::empty(), Key::Backspace), [0x7F]);
        assert_eq!(encode(Modifiers::empty(), Key::Escape), [0x1B]);
        assert_eq!(encode(Modifiers::empty(), Key::Tab), b"\t");
    }

    #[test]
    fn ctrl_chords_fold_to_control_bytes() {
        assert_eq!(encode(Modifiers::CTRL, Key::Char(b'a')), [0x01]);
        assert_eq!(encode(Modifiers::CTRL, Key::Char(b'Z')), [0x1A]);
        // Non-letter graphics fold too.
        assert_eq!(encode(Modifiers::CTRL, Key::Char(b'[')), [0x1B]);
    }

    #[test]
    fn ctrl_with_other_modifiers_passes_the_byte_through() {
        let mods = Modifiers::CTRL | Modifiers::ALT;
        assert_eq!(encode(mods, Key::Char(b'a')), b"a");
    }

    #[test]
    fn plain_characters_pass_through() {
        assert_eq!(encode(Modifiers::empty(), Key::Char(b'q')), b"q");
        assert_eq!(encode(Modifiers::LEFT_SHIFT, Key::Char(b'Q')), b"Q");
    }
}
