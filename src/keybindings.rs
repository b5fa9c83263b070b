use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    // On a top-level trigger
    TriggerOpen,
    TriggerOpenLast,
    Dismiss,
    // Inside a list
    FocusNext,
    FocusPrev,
    FocusFirst,
    FocusLast,
    Activate,
    // Nested menus
    SubmenuOpen,
    SubmenuClose,
    TabOut,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::TriggerOpen => "Open menu",
            Action::TriggerOpenLast => "Open menu at last item",
            Action::Dismiss => "Close menu",
            Action::FocusNext => "Next item",
            Action::FocusPrev => "Previous item",
            Action::FocusFirst => "First item",
            Action::FocusLast => "Last item",
            Action::Activate => "Activate item",
            Action::SubmenuOpen => "Open submenu",
            Action::SubmenuClose => "Close submenu",
            Action::TabOut => "Leave menu (Tab)",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(TriggerOpen, KeyCombo::plain(KeyCode::Enter));
        kb.add(TriggerOpen, KeyCombo::plain(KeyCode::Char(' ')));
        kb.add(TriggerOpen, KeyCombo::plain(KeyCode::Down));
        kb.add(TriggerOpenLast, KeyCombo::plain(KeyCode::Up));
        kb.add(Dismiss, KeyCombo::plain(KeyCode::Esc));

        kb.add(FocusNext, KeyCombo::plain(KeyCode::Down));
        kb.add(FocusPrev, KeyCombo::plain(KeyCode::Up));
        kb.add(FocusFirst, KeyCombo::plain(KeyCode::Home));
        kb.add(FocusFirst, KeyCombo::plain(KeyCode::PageUp));
        kb.add(FocusLast, KeyCombo::plain(KeyCode::End));
        kb.add(FocusLast, KeyCombo::plain(KeyCode::PageDown));
        kb.add(Activate, KeyCombo::plain(KeyCode::Enter));
        kb.add(Activate, KeyCombo::plain(KeyCode::Char(' ')));

        kb.add(SubmenuOpen, KeyCombo::plain(KeyCode::Right));
        kb.add(SubmenuClose, KeyCombo::plain(KeyCode::Left));
        kb.add(TabOut, KeyCombo::plain(KeyCode::Tab));
        kb.add(TabOut, KeyCombo::plain(KeyCode::BackTab));
        // Some terminals report Shift+Tab as BackTab with SHIFT still set.
        kb.add(TabOut, KeyCombo::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        kb
    }
}

impl KeyBindings {
    /// An empty table; see `KeyBindings::default()` for the standard keys.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    /// Drop every combo bound to `action`.
    pub fn clear(&mut self, action: Action) {
        self.map.remove(&action);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        if let Some(list) = self.map.get(&action) {
            list.iter().any(|c| c.matches(key))
        } else {
            false
        }
    }

    /// Bound actions with their display strings, in declaration order.
    pub fn help_entries(&self) -> Vec<(Action, Vec<String>)> {
        let mut v: Vec<_> = self
            .map
            .iter()
            .map(|(act, list)| (*act, list.iter().map(|c| c.display()).collect()))
            .collect();
        v.sort_by_key(|(act, _)| *act);
        v
    }

    /// Return the display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }
}
