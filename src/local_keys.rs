use eframe::egui;

use crate::keyboard_hook::KeyEvent;
use crate::keys::KeyId;

/// Observer for key events delivered to the overlay window itself.
///
/// While the overlay has focus a physical press reaches us twice: through the
/// global hook and through egui's own input. Both paths feed the same state
/// machine, which de-duplicates, so this observer does not try to suppress
/// anything. Its real job is the degraded mode where hook installation
/// failed and egui input is the only source.
///
/// egui reports modifier keys as state, not as key events, and without
/// left/right distinction; edges are synthesized against the previous frame's
/// state on the canonical left variant.
#[derive(Debug, Default)]
pub struct LocalKeyObserver {
    modifiers: egui::Modifiers,
}

impl LocalKeyObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one frame of egui input into key transitions, in the order
    /// egui delivered them. Repeats are forwarded as downs; the held-key set
    /// ignores them.
    pub fn collect(&mut self, events: &[egui::Event], modifiers: egui::Modifiers) -> Vec<KeyEvent> {
        let mut out = Vec::new();

        for event in events {
            if let egui::Event::Key { key, pressed, .. } = event {
                if let Some(id) = key_id_from_egui(*key) {
                    out.push(if *pressed {
                        KeyEvent::down(id)
                    } else {
                        KeyEvent::up(id)
                    });
                }
            }
        }

        out.extend(modifier_edges(self.modifiers, modifiers));
        self.modifiers = modifiers;
        out
    }
}

/// Edges for modifier-state changes between two frames.
///
/// egui cannot tell left from right, so edges use the left variant. While
/// the hook is also running, a right-side press can therefore briefly hold
/// two entries in the held set (the hook's true `KeyId` plus `LCtrl` etc.);
/// each entry is released by the source that added it, and the formatter
/// collapses the pair to one token, so the label never shows the difference.
fn modifier_edges(prev: egui::Modifiers, next: egui::Modifiers) -> Vec<KeyEvent> {
    let transitions = [
        (prev.ctrl, next.ctrl, KeyId::LCtrl),
        (prev.alt, next.alt, KeyId::LAlt),
        (prev.shift, next.shift, KeyId::LShift),
    ];

    let mut out = Vec::new();
    for (was, is, key) in transitions {
        match (was, is) {
            (false, true) => out.push(KeyEvent::down(key)),
            (true, false) => out.push(KeyEvent::up(key)),
            _ => {}
        }
    }
    out
}

/// Map an egui key to its canonical identity. Keys egui has no notion of
/// (numpad, lock keys, the apostrophe) only ever arrive through the global
/// hook.
pub fn key_id_from_egui(key: egui::Key) -> Option<KeyId> {
    use egui::Key as K;
    let id = match key {
        K::A => KeyId::KeyA,
        K::B => KeyId::KeyB,
        K::C => KeyId::KeyC,
        K::D => KeyId::KeyD,
        K::E => KeyId::KeyE,
        K::F => KeyId::KeyF,
        K::G => KeyId::KeyG,
        K::H => KeyId::KeyH,
        K::I => KeyId::KeyI,
        K::J => KeyId::KeyJ,
        K::K => KeyId::KeyK,
        K::L => KeyId::KeyL,
        K::M => KeyId::KeyM,
        K::N => KeyId::KeyN,
        K::O => KeyId::KeyO,
        K::P => KeyId::KeyP,
        K::Q => KeyId::KeyQ,
        K::R => KeyId::KeyR,
        K::S => KeyId::KeyS,
        K::T => KeyId::KeyT,
        K::U => KeyId::KeyU,
        K::V => KeyId::KeyV,
        K::W => KeyId::KeyW,
        K::X => KeyId::KeyX,
        K::Y => KeyId::KeyY,
        K::Z => KeyId::KeyZ,
        K::Num0 => KeyId::Num0,
        K::Num1 => KeyId::Num1,
        K::Num2 => KeyId::Num2,
        K::Num3 => KeyId::Num3,
        K::Num4 => KeyId::Num4,
        K::Num5 => KeyId::Num5,
        K::Num6 => KeyId::Num6,
        K::Num7 => KeyId::Num7,
        K::Num8 => KeyId::Num8,
        K::Num9 => KeyId::Num9,
        K::F1 => KeyId::F1,
        K::F2 => KeyId::F2,
        K::F3 => KeyId::F3,
        K::F4 => KeyId::F4,
        K::F5 => KeyId::F5,
        K::F6 => KeyId::F6,
        K::F7 => KeyId::F7,
        K::F8 => KeyId::F8,
        K::F9 => KeyId::F9,
        K::F10 => KeyId::F10,
        K::F11 => KeyId::F11,
        K::F12 => KeyId::F12,
        K::Enter => KeyId::Return,
        K::Escape => KeyId::Escape,
        K::Space => KeyId::Space,
        K::Tab => KeyId::Tab,
        K::Backspace => KeyId::Backspace,
        K::Delete => KeyId::Delete,
        K::Insert => KeyId::Insert,
        K::Home => KeyId::Home,
        K::End => KeyId::End,
        K::PageUp => KeyId::PageUp,
        K::PageDown => KeyId::PageDown,
        K::ArrowLeft => KeyId::LeftArrow,
        K::ArrowRight => KeyId::RightArrow,
        K::ArrowUp => KeyId::UpArrow,
        K::ArrowDown => KeyId::DownArrow,
        K::Minus => KeyId::Minus,
        K::Equals => KeyId::Equals,
        K::Comma => KeyId::Comma,
        K::Period => KeyId::Period,
        K::Semicolon => KeyId::Semicolon,
        K::Backslash => KeyId::Backslash,
        K::Slash => KeyId::Slash,
        K::OpenBracket => KeyId::LeftBracket,
        K::CloseBracket => KeyId::RightBracket,
        K::Backtick => KeyId::Backquote,
        _ => return None,
    };
    Some(id)
}
