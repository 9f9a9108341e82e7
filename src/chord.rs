use crate::keys::{KeyId, ModifierGroup};

/// The set of keys currently physically down, in insertion order.
///
/// Both input sources (the global hook and the focused window) mutate this
/// set, and for a focused press the same physical event can arrive from both.
/// `add`/`remove` are therefore idempotent: a repeat add and a release of an
/// absent key are no-ops, which is what keeps the two delivery paths from
/// double-counting. Callers must only touch the set from the UI thread; this
/// is a precondition, not something enforced here.
#[derive(Debug, Default, Clone)]
pub struct HeldKeySet {
    keys: Vec<KeyId>,
}

impl HeldKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key was newly inserted. `false` means the key is
    /// already held (OS auto-repeat, or the second of the two delivery paths)
    /// and the caller should skip any display work.
    pub fn add(&mut self, key: KeyId) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Returns `true` if the key was present. Removing an absent key is a
    /// no-op, never an error.
    pub fn remove(&mut self, key: KeyId) -> bool {
        match self.keys.iter().position(|k| *k == key) {
            Some(idx) => {
                self.keys.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Held keys in the order they were pressed.
    pub fn iter(&self) -> impl Iterator<Item = KeyId> + '_ {
        self.keys.iter().copied()
    }
}

/// Render a held-key set as a chord label like `Ctrl+Shift+A`.
///
/// Modifiers come first in fixed Ctrl, Alt, Shift, Win priority, each emitted
/// once even when both left and right variants are down. Non-modifier keys
/// follow in the order they were pressed. An empty set yields an empty
/// string. Pure: always recomputed from scratch, never diffed.
pub fn format_chord(held: &HeldKeySet) -> String {
    let mut parts: Vec<String> = Vec::new();

    for group in [
        ModifierGroup::Ctrl,
        ModifierGroup::Alt,
        ModifierGroup::Shift,
        ModifierGroup::Win,
    ] {
        if held.iter().any(|k| k.modifier_group() == Some(group)) {
            parts.push(group.token().to_string());
        }
    }

    for key in held.iter().filter(|k| !k.is_modifier()) {
        parts.push(key.display_token().into_owned());
    }

    parts.join("+")
}
