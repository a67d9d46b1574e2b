// Global keyboard shortcut registry
pub mod keyboard;

pub use keyboard::{matches_shortcut, FocusTarget, KeyEvent, ShortcutConfig};

use log::debug;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type ShortcutAction = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct Shortcut {
    pub config: ShortcutConfig,
    pub description: String,
    action: ShortcutAction,
}

impl Shortcut {
    pub fn new<F>(config: ShortcutConfig, description: impl Into<String>, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            config,
            description: description.into(),
            action: Arc::new(action),
        }
    }
}

impl fmt::Debug for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shortcut")
            .field("config", &self.config)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// What happened to one key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    pub fired: usize,
    pub suppressed: usize,
}

impl DispatchOutcome {
    /// The UI should cancel the event's default behaviour
    pub fn prevent_default(&self) -> bool {
        self.fired > 0
    }
}

/// Shortcut registrations for the whole process.
///
/// The registry has no subscribers: registering or removing a shortcut never
/// notifies anything, so components can do it from inside change handlers.
#[derive(Default)]
pub struct ShortcutRegistry {
    shortcuts: Mutex<Vec<Shortcut>>,
    attached: AtomicBool,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, shortcut: Shortcut) {
        debug!(
            "Registered shortcut {:?}: {}",
            shortcut.config, shortcut.description
        );
        self.shortcuts.lock().push(shortcut);
    }

    /// Remove every shortcut bound to `key` (case-insensitive). Returns how many were removed.
    pub fn unregister(&self, key: &str) -> usize {
        let key = key.to_lowercase();
        let mut shortcuts = self.shortcuts.lock();
        let before = shortcuts.len();
        shortcuts.retain(|s| s.config.key.to_lowercase() != key);
        before - shortcuts.len()
    }

    /// (config, description) pairs for a help overlay
    pub fn list(&self) -> Vec<(ShortcutConfig, String)> {
        self.shortcuts
            .lock()
            .iter()
            .map(|s| (s.config.clone(), s.description.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.shortcuts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.lock().is_empty()
    }

    /// Start routing key events. Returns false if already attached.
    pub fn attach(&self) -> bool {
        !self.attached.swap(true, Ordering::SeqCst)
    }

    /// Stop routing key events. Returns false if not attached.
    pub fn detach(&self) -> bool {
        self.attached.swap(false, Ordering::SeqCst)
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Fire every registered shortcut matching `event`.
    ///
    /// While a text field has focus, only shortcuts pressed with ctrl/cmd/alt,
    /// Escape and Enter fire.
    pub fn handle_key_event(&self, event: &KeyEvent) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        if !self.is_attached() {
            return outcome;
        }

        let typing = event.target.is_text_entry();
        let has_modifier = event.ctrl_pressed() || event.alt;

        // Collect first: actions run without the lock and may edit the registry
        let matched: Vec<ShortcutAction> = self
            .shortcuts
            .lock()
            .iter()
            .filter(|s| matches_shortcut(event, &s.config))
            .map(|s| s.action.clone())
            .collect();

        for action in matched {
            if typing && !has_modifier && !event.is_special() {
                outcome.suppressed += 1;
                continue;
            }
            action();
            outcome.fired += 1;
        }

        outcome
    }
}
