use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::MenuSystem;
use crate::dom::NodeId;
use crate::keybindings::Action;
use crate::registry::MenuId;

impl MenuSystem {
    /// Route a key press that landed on `target`. Returns `true` when a menu
    /// consumed it; the host should then suppress its default handling.
    pub fn key_down(&mut self, target: NodeId, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let binding = self.registry.binding(target);
        let mut consumed = false;
        if let Some(menu) = binding.trigger_of {
            consumed = self.trigger_key(menu, key);
        }
        if !consumed && let Some(menu) = self.owning_menu(target) {
            consumed = self.list_key(menu, target, key);
        }
        tracing::trace!(target = ?target, code = ?key.code, consumed, "key down");
        self.flush_transitions();
        consumed
    }

    fn trigger_key(&mut self, id: MenuId, key: KeyEvent) -> bool {
        let Some(menu) = self.registry.get(id) else {
            return false;
        };
        if menu.is_inert() || menu.trigger.is_some_and(|t| self.document.is_disabled(t)) {
            return false;
        }
        if menu.is_submenu() {
            if self.bindings.matches(Action::SubmenuOpen, &key)
                || self.bindings.matches(Action::Activate, &key)
            {
                self.open(id);
                self.focus_edge(id, true);
                return true;
            }
            return false;
        }

        if self.bindings.matches(Action::Dismiss, &key) {
            if self.is_open(id) {
                self.close(id);
                return true;
            }
            return false;
        }
        if self.bindings.matches(Action::TriggerOpen, &key) {
            self.open(id);
            self.focus_edge(id, true);
            return true;
        }
        if self.bindings.matches(Action::TriggerOpenLast, &key) {
            self.open(id);
            self.focus_edge(id, false);
            return true;
        }
        false
    }

    fn list_key(&mut self, id: MenuId, target: NodeId, key: KeyEvent) -> bool {
        let Some(menu) = self.registry.get(id) else {
            return false;
        };
        if menu.is_inert() || !self.is_open(id) {
            return false;
        }
        let has_trigger = menu.trigger.is_some();
        let is_submenu = menu.is_submenu();
        let current = menu.items.contains(&target).then_some(target);

        if self.bindings.matches(Action::Dismiss, &key) {
            if has_trigger {
                self.close(id);
                return true;
            }
            return false;
        }
        if self.bindings.matches(Action::TabOut, &key) {
            if has_trigger && let Some(outer) = self.outermost_open(id) {
                self.close(outer);
            }
            // Tab always continues to the host's sequential navigation.
            return false;
        }
        if self.bindings.matches(Action::SubmenuClose, &key) {
            if is_submenu {
                self.close(id);
                return true;
            }
            return false;
        }
        if self.bindings.matches(Action::FocusNext, &key) {
            self.focus_step(id, current, true);
            return true;
        }
        if self.bindings.matches(Action::FocusPrev, &key) {
            self.focus_step(id, current, false);
            return true;
        }
        if self.bindings.matches(Action::FocusFirst, &key) {
            self.focus_edge(id, true);
            return true;
        }
        if self.bindings.matches(Action::FocusLast, &key) {
            self.focus_edge(id, false);
            return true;
        }
        if self.bindings.matches(Action::Activate, &key) {
            if let Some(item) = current {
                self.click(item);
            }
            return true;
        }
        if let Some(ch) = typeahead_char(&key) {
            let next = self
                .registry
                .get(id)
                .and_then(|m| m.typeahead(&self.document, current, ch));
            if let Some(next) = next {
                self.move_focus(Some(next));
                return true;
            }
        }
        false
    }

    fn focus_step(&mut self, id: MenuId, current: Option<NodeId>, forward: bool) {
        let next = self
            .registry
            .get(id)
            .and_then(|m| m.step(&self.document, current, forward));
        if next.is_some() {
            self.move_focus(next);
        }
    }

    /// Focus the first (or last) focusable item of `id`.
    fn focus_edge(&mut self, id: MenuId, first: bool) {
        let target = self.registry.get(id).and_then(|m| {
            if first {
                m.first_focusable(&self.document)
            } else {
                m.last_focusable(&self.document)
            }
        });
        if target.is_some() {
            self.move_focus(target);
        }
    }
}

/// Lowercased printable character for type-ahead, if `key` is one.
fn typeahead_char(key: &KeyEvent) -> Option<char> {
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    if !key.modifiers.difference(KeyModifiers::SHIFT).is_empty()
        || c.is_control()
        || c.is_whitespace()
    {
        return None;
    }
    c.to_lowercase().next()
}
