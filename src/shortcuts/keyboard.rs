// Key event model and shortcut matching
use serde::{Deserialize, Serialize};

/// Element that had focus when the key was pressed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FocusTarget {
    #[default]
    Other,
    Input,
    TextArea,
    ContentEditable,
}

impl FocusTarget {
    pub fn is_text_entry(self) -> bool {
        matches!(
            self,
            FocusTarget::Input | FocusTarget::TextArea | FocusTarget::ContentEditable
        )
    }
}

/// Physical key press as delivered by the UI layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// Logical key, e.g. "s", "Enter", "Escape"
    pub key: String,
    /// Physical key code, e.g. "KeyS", "Enter"
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub ctrl: bool,
    /// Command key on macOS
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub target: FocusTarget,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let code = physical_code(&key);
        Self {
            key,
            code,
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn in_target(mut self, target: FocusTarget) -> Self {
        self.target = target;
        self
    }

    /// Ctrl and Command both count as the ctrl modifier
    pub fn ctrl_pressed(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Escape and Enter fire even while typing
    pub fn is_special(&self) -> bool {
        self.key == "Escape" || self.key == "Enter"
    }
}

/// Best-effort physical code for a logical key ("s" -> "KeyS", "7" -> "Digit7")
fn physical_code(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => format!("Key{}", c.to_ascii_uppercase()),
        (Some(c), None) if c.is_ascii_digit() => format!("Digit{}", c),
        _ => key.to_string(),
    }
}

/// Key plus the exact modifier state a shortcut requires
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ShortcutConfig {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl ShortcutConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

pub fn matches_shortcut(event: &KeyEvent, config: &ShortcutConfig) -> bool {
    let key = config.key.to_lowercase();
    let event_key = event.key.to_lowercase();
    let event_code = event.code.to_lowercase();

    // Logical key, or physical code ("enter", or "keys" for 's')
    let key_match = event_key == key || event_code == key || event_code == format!("key{}", key);
    if !key_match {
        return false;
    }

    config.ctrl == event.ctrl_pressed() && config.shift == event.shift && config.alt == event.alt
}
