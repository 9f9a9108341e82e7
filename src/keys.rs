use std::borrow::Cow;

/// Canonical identifier for a physical key, shared by the global hook and the
/// window's own key events so the same press de-duplicates across both
/// sources. Left and right modifier variants are distinct here; they collapse
/// to a single token only when a chord label is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyId {
    LCtrl,
    RCtrl,
    LShift,
    RShift,
    LAlt,
    RAlt,
    LWin,
    RWin,
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
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
    Return,
    Escape,
    Space,
    Tab,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    LeftArrow,
    RightArrow,
    UpArrow,
    DownArrow,
    CapsLock,
    NumLock,
    ScrollLock,
    PrintScreen,
    Pause,
    Apps,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadMultiply,
    NumpadAdd,
    NumpadSubtract,
    NumpadDecimal,
    NumpadDivide,
    Semicolon,
    Equals,
    Comma,
    Minus,
    Period,
    Slash,
    Backquote,
    LeftBracket,
    Backslash,
    RightBracket,
    Quote,
    /// Any virtual-key code without a named mapping. Classification is total:
    /// unknown codes still get a stable identity and a generic display token.
    Unknown(u32),
}

/// The four modifier families a chord label distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierGroup {
    Ctrl,
    Alt,
    Shift,
    Win,
}

impl ModifierGroup {
    pub fn token(self) -> &'static str {
        match self {
            ModifierGroup::Ctrl => "Ctrl",
            ModifierGroup::Alt => "Alt",
            ModifierGroup::Shift => "Shift",
            ModifierGroup::Win => "Win",
        }
    }
}

impl KeyId {
    /// Map a Windows virtual-key code to a canonical key. The generic
    /// VK_SHIFT/VK_CONTROL/VK_MENU codes delivered by window messages resolve
    /// to the left variant so they share identity with the low-level hook's
    /// left/right-specific codes in the common case.
    pub fn from_vk(vk: u32) -> KeyId {
        use KeyId::*;
        match vk {
            0x08 => Backspace,
            0x09 => Tab,
            0x0D => Return,
            0x10 | 0xA0 => LShift,
            0xA1 => RShift,
            0x11 | 0xA2 => LCtrl,
            0xA3 => RCtrl,
            0x12 | 0xA4 => LAlt,
            0xA5 => RAlt,
            0x13 => Pause,
            0x14 => CapsLock,
            0x1B => Escape,
            0x20 => Space,
            0x21 => PageUp,
            0x22 => PageDown,
            0x23 => End,
            0x24 => Home,
            0x25 => LeftArrow,
            0x26 => UpArrow,
            0x27 => RightArrow,
            0x28 => DownArrow,
            0x2C => PrintScreen,
            0x2D => Insert,
            0x2E => Delete,
            0x30 => Num0,
            0x31 => Num1,
            0x32 => Num2,
            0x33 => Num3,
            0x34 => Num4,
            0x35 => Num5,
            0x36 => Num6,
            0x37 => Num7,
            0x38 => Num8,
            0x39 => Num9,
            0x41 => KeyA,
            0x42 => KeyB,
            0x43 => KeyC,
            0x44 => KeyD,
            0x45 => KeyE,
            0x46 => KeyF,
            0x47 => KeyG,
            0x48 => KeyH,
            0x49 => KeyI,
            0x4A => KeyJ,
            0x4B => KeyK,
            0x4C => KeyL,
            0x4D => KeyM,
            0x4E => KeyN,
            0x4F => KeyO,
            0x50 => KeyP,
            0x51 => KeyQ,
            0x52 => KeyR,
            0x53 => KeyS,
            0x54 => KeyT,
            0x55 => KeyU,
            0x56 => KeyV,
            0x57 => KeyW,
            0x58 => KeyX,
            0x59 => KeyY,
            0x5A => KeyZ,
            0x5B => LWin,
            0x5C => RWin,
            0x5D => Apps,
            0x60 => Numpad0,
            0x61 => Numpad1,
            0x62 => Numpad2,
            0x63 => Numpad3,
            0x64 => Numpad4,
            0x65 => Numpad5,
            0x66 => Numpad6,
            0x67 => Numpad7,
            0x68 => Numpad8,
            0x69 => Numpad9,
            0x6A => NumpadMultiply,
            0x6B => NumpadAdd,
            0x6D => NumpadSubtract,
            0x6E => NumpadDecimal,
            0x6F => NumpadDivide,
            0x70 => F1,
            0x71 => F2,
            0x72 => F3,
            0x73 => F4,
            0x74 => F5,
            0x75 => F6,
            0x76 => F7,
            0x77 => F8,
            0x78 => F9,
            0x79 => F10,
            0x7A => F11,
            0x7B => F12,
            0x90 => NumLock,
            0x91 => ScrollLock,
            0xBA => Semicolon,
            0xBB => Equals,
            0xBC => Comma,
            0xBD => Minus,
            0xBE => Period,
            0xBF => Slash,
            0xC0 => Backquote,
            0xDB => LeftBracket,
            0xDC => Backslash,
            0xDD => RightBracket,
            0xDE => Quote,
            other => Unknown(other),
        }
    }

    pub fn is_modifier(self) -> bool {
        self.modifier_group().is_some()
    }

    /// The modifier family this key belongs to, if any. Left and right
    /// variants of the same modifier map to the same group.
    pub fn modifier_group(self) -> Option<ModifierGroup> {
        use KeyId::*;
        match self {
            LCtrl | RCtrl => Some(ModifierGroup::Ctrl),
            LAlt | RAlt => Some(ModifierGroup::Alt),
            LShift | RShift => Some(ModifierGroup::Shift),
            LWin | RWin => Some(ModifierGroup::Win),
            _ => None,
        }
    }

    /// The string fragment used when this key appears in a chord label.
    /// Modifier keys render through [`ModifierGroup::token`] instead.
    pub fn display_token(self) -> Cow<'static, str> {
        use KeyId::*;
        let token = match self {
            LCtrl | RCtrl => "Ctrl",
            LAlt | RAlt => "Alt",
            LShift | RShift => "Shift",
            LWin | RWin => "Win",
            KeyA => "A",
            KeyB => "B",
            KeyC => "C",
            KeyD => "D",
            KeyE => "E",
            KeyF => "F",
            KeyG => "G",
            KeyH => "H",
            KeyI => "I",
            KeyJ => "J",
            KeyK => "K",
            KeyL => "L",
            KeyM => "M",
            KeyN => "N",
            KeyO => "O",
            KeyP => "P",
            KeyQ => "Q",
            KeyR => "R",
            KeyS => "S",
            KeyT => "T",
            KeyU => "U",
            KeyV => "V",
            KeyW => "W",
            KeyX => "X",
            KeyY => "Y",
            KeyZ => "Z",
            Num0 => "0",
            Num1 => "1",
            Num2 => "2",
            Num3 => "3",
            Num4 => "4",
            Num5 => "5",
            Num6 => "6",
            Num7 => "7",
            Num8 => "8",
            Num9 => "9",
            F1 => "F1",
            F2 => "F2",
            F3 => "F3",
            F4 => "F4",
            F5 => "F5",
            F6 => "F6",
            F7 => "F7",
            F8 => "F8",
            F9 => "F9",
            F10 => "F10",
            F11 => "F11",
            F12 => "F12",
            Return => "Enter",
            Escape => "Esc",
            Space => "Space",
            Tab => "Tab",
            Backspace => "Backspace",
            Delete => "Del",
            Insert => "Ins",
            Home => "Home",
            End => "End",
            PageUp => "PgUp",
            PageDown => "PgDn",
            LeftArrow => "Left",
            RightArrow => "Right",
            UpArrow => "Up",
            DownArrow => "Down",
            CapsLock => "CapsLock",
            NumLock => "NumLock",
            ScrollLock => "ScrollLock",
            PrintScreen => "PrtSc",
            Pause => "Pause",
            Apps => "Menu",
            Numpad0 => "Num0",
            Numpad1 => "Num1",
            Numpad2 => "Num2",
            Numpad3 => "Num3",
            Numpad4 => "Num4",
            Numpad5 => "Num5",
            Numpad6 => "Num6",
            Numpad7 => "Num7",
            Numpad8 => "Num8",
            Numpad9 => "Num9",
            NumpadMultiply => "*",
            NumpadAdd => "+",
            NumpadSubtract => "-",
            NumpadDecimal => ".",
            NumpadDivide => "/",
            Semicolon => ";",
            Equals => "=",
            Comma => ",",
            Minus => "-",
            Period => ".",
            Slash => "/",
            Backquote => "`",
            LeftBracket => "[",
            Backslash => "\\",
            RightBracket => "]",
            Quote => "'",
            Unknown(vk) => return Cow::Owned(format!("VK_{vk:02X}")),
        };
        Cow::Borrowed(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_total() {
        // Every code yields an identity; unmapped codes keep a stable token.
        assert_eq!(KeyId::from_vk(0x41), KeyId::KeyA);
        assert_eq!(KeyId::from_vk(0xE7), KeyId::Unknown(0xE7));
        assert_eq!(KeyId::from_vk(0xE7).display_token(), "VK_E7");
    }

    #[test]
    fn generic_modifier_codes_resolve_to_left_variant() {
        assert_eq!(KeyId::from_vk(0x10), KeyId::LShift);
        assert_eq!(KeyId::from_vk(0x11), KeyId::LCtrl);
        assert_eq!(KeyId::from_vk(0x12), KeyId::LAlt);
        assert_eq!(KeyId::from_vk(0xA1), KeyId::RShift);
    }

    #[test]
    fn left_and_right_variants_share_a_modifier_group() {
        assert_eq!(KeyId::LCtrl.modifier_group(), KeyId::RCtrl.modifier_group());
        assert_eq!(KeyId::LWin.modifier_group(), Some(ModifierGroup::Win));
        assert!(KeyId::RAlt.is_modifier());
        assert!(!KeyId::KeyA.is_modifier());
        assert!(!KeyId::Unknown(0xFF).is_modifier());
    }

    #[test]
    fn punctuation_maps_to_readable_tokens() {
        assert_eq!(KeyId::from_vk(0x0D).display_token(), "Enter");
        assert_eq!(KeyId::from_vk(0x1B).display_token(), "Esc");
        assert_eq!(KeyId::from_vk(0xDB).display_token(), "[");
        assert_eq!(KeyId::from_vk(0xBD).display_token(), "-");
        assert_eq!(KeyId::from_vk(0x31).display_token(), "1");
    }
}
