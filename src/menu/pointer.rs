//! Pointer routing, hover intent and focus bookkeeping.

use super::{MenuSystem, Task};
use crate::dom::NodeId;
use crate::registry::MenuId;

impl MenuSystem {
    /// Pointer entered `target`. Items that own a submenu arm the hover-intent
    /// timer; a named top-level trigger opens at once when a sibling of the
    /// same name is already open.
    pub fn pointer_over(&mut self, target: NodeId) {
        if let Some((menu, item)) = self.bound_item(target)
            && self.registry.binding(item).trigger_of.is_some()
        {
            self.arm_hover(menu, item);
        } else if let Some(menu) = self.bound_trigger(target) {
            self.switch_named(menu);
        }
        self.flush_transitions();
    }

    /// Pointer left `target` for `related`. Leaving a submenu item before the
    /// delay elapses cancels the pending open.
    pub fn pointer_out(&mut self, target: NodeId, related: Option<NodeId>) {
        let Some((menu, item)) = self.bound_item(target) else {
            return;
        };
        if self.registry.binding(item).trigger_of.is_none() {
            return;
        }
        if related.is_some_and(|r| self.document.contains_composed(item, r)) {
            return;
        }
        self.cancel_hover(menu);
    }

    /// Pointer pressed on `target`: every menu whose root does not contain it
    /// closes and has its roving tabindex reset.
    pub fn pointer_down(&mut self, target: NodeId) {
        let outside: Vec<MenuId> = self
            .registry
            .iter()
            .filter(|(_, m)| !m.is_inert() && !self.document.contains_composed(m.root, target))
            .map(|(id, _)| id)
            .collect();
        for id in outside {
            self.close(id);
            self.reset_tabindex(id);
        }
        self.flush_transitions();
    }

    pub fn focus(&mut self, target: NodeId) {
        self.move_focus(Some(target));
        self.flush_transitions();
    }

    pub fn blur(&mut self) {
        self.move_focus(None);
        self.flush_transitions();
    }

    /// Move document focus, then run blur/focusout handlers for the node that
    /// lost it and focusin/focus handlers for the node that gained it.
    pub(super) fn move_focus(&mut self, next: Option<NodeId>) {
        let previous = self.document.focused();
        self.document.set_focused(next);
        let next = self.document.focused();
        if previous == next {
            return;
        }
        tracing::trace!(from = ?previous, to = ?next, "focus moved");
        if let Some(previous) = previous {
            self.focus_left(previous, next);
        }
        if let Some(next) = next {
            self.focus_entered(next, previous);
        }
    }

    fn focus_left(&mut self, previous: NodeId, next: Option<NodeId>) {
        if self.registry.binding(previous).item_of.is_some() {
            self.document.set_attr(previous, "tabindex", "-1");
        }
        let left: Vec<MenuId> = self
            .registry
            .iter()
            .filter(|(_, m)| {
                !m.is_inert()
                    && self.document.contains_composed(m.root, previous)
                    && next.is_none_or(|n| !self.document.contains_composed(m.root, n))
            })
            .map(|(id, _)| id)
            .collect();
        for id in left {
            self.close(id);
            self.reset_tabindex(id);
        }
    }

    fn focus_entered(&mut self, next: NodeId, previous: Option<NodeId>) {
        let entered: Vec<MenuId> = self
            .registry
            .iter()
            .filter(|(_, m)| {
                !m.is_inert()
                    && self.document.contains_composed(m.root, next)
                    && previous.is_none_or(|p| !self.document.contains_composed(m.root, p))
            })
            .map(|(id, _)| id)
            .collect();
        for id in entered {
            let items = self.registry.get(id).map(|m| m.items.clone()).unwrap_or_default();
            for item in items {
                self.document.set_attr(item, "tabindex", "-1");
            }
        }
        if self.registry.binding(next).item_of.is_some() {
            self.document.set_attr(next, "tabindex", "0");
        }
    }

    /// Back to the resting state: every item `-1`, plus the first focusable
    /// item at `0` when there is no trigger to act as the tab stop.
    pub(super) fn reset_tabindex(&mut self, id: MenuId) {
        let Some(menu) = self.registry.get(id) else {
            return;
        };
        let items = menu.items.clone();
        let first = match menu.trigger {
            Some(_) => None,
            None => menu.first_focusable(&self.document),
        };
        for item in items {
            let value = if Some(item) == first { "0" } else { "-1" };
            self.document.set_attr(item, "tabindex", value);
        }
    }

    fn arm_hover(&mut self, menu: MenuId, item: NodeId) {
        if !self.is_open(menu) || self.document.is_disabled(item) {
            return;
        }
        let Some(delay) = self.registry.get(menu).map(|m| m.settings.config.hover_delay()) else {
            return;
        };
        self.cancel_hover(menu);
        let timer = self
            .scheduler
            .set_timeout(delay, Task::HoverIntent { menu, item });
        if let Some(m) = self.registry.get_mut(menu) {
            m.pending_hover = Some(timer);
        }
        tracing::debug!(menu = ?menu, item = ?item, ?delay, "hover intent armed");
    }

    fn cancel_hover(&mut self, menu: MenuId) {
        if let Some(timer) = self.registry.get_mut(menu).and_then(|m| m.pending_hover.take()) {
            self.scheduler.clear_timeout(timer);
            tracing::debug!(menu = ?menu, "hover intent cancelled");
        }
    }

    pub(super) fn hover_intent_elapsed(&mut self, menu: MenuId, item: NodeId) {
        let Some(parent) = self.registry.get_mut(menu) else {
            return;
        };
        parent.pending_hover = None;
        let siblings = parent.submenus.clone();
        let Some(submenu) = self.registry.binding(item).trigger_of else {
            return;
        };
        if !self.is_open(menu) || self.document.is_disabled(item) {
            return;
        }
        for sibling in siblings.into_iter().filter(|&s| s != submenu) {
            self.close(sibling);
        }
        self.open(submenu);
    }

    fn switch_named(&mut self, id: MenuId) {
        let Some(menu) = self.registry.get(id) else {
            return;
        };
        let Some(name) = menu.name.clone() else {
            return;
        };
        if menu.is_submenu() || menu.is_inert() || self.is_open(id) {
            return;
        }
        if menu.trigger.is_some_and(|t| self.document.is_disabled(t)) {
            return;
        }
        let sibling_open = self.registry.iter().any(|(other, m)| {
            other != id && m.parent.is_none() && m.name() == Some(name.as_str()) && self.is_open(other)
        });
        if sibling_open {
            tracing::debug!(menu = ?id, name = %name, "switching open menu on hover");
            self.open(id);
        }
    }

    /// Nearest inclusive ancestor of `node` that is a menu item.
    fn bound_item(&self, node: NodeId) -> Option<(MenuId, NodeId)> {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(menu) = self.registry.binding(id).item_of {
                return Some((menu, id));
            }
            current = self.document.composed_parent(id);
        }
        None
    }

    fn bound_trigger(&self, node: NodeId) -> Option<MenuId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(menu) = self.registry.binding(id).trigger_of {
                return Some(menu);
            }
            current = self.document.composed_parent(id);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use indoc::indoc;
    use std::time::Duration;

    const MENUBAR: &str = indoc! {r#"
        <div data-menu data-menu-name="bar">
          <button data-menu-trigger>File</button>
          <ul data-menu-list>
            <li role="menuitem">New</li>
            <li role="none">
              <span role="menuitem">Recent</span>
              <ul data-menu-list><li role="menuitem">a.txt</li></ul>
            </li>
          </ul>
        </div>
        <div data-menu data-menu-name="bar">
          <button data-menu-trigger>Edit</button>
          <ul data-menu-list><li role="menuitem">Undo</li></ul>
        </div>
        <button id="outside">Elsewhere</button>
    "#};

    fn setup() -> (MenuSystem, MenuId, MenuId) {
        let mut system = MenuSystem::new(Document::parse(MENUBAR).unwrap());
        system.set_reduced_motion(true);
        let ids = system.discover();
        (system, ids[0], ids[1])
    }

    #[test]
    fn named_trigger_switches_only_while_sibling_open() {
        let (mut system, file, edit) = setup();
        let edit_trigger = system.menu(edit).unwrap().trigger().unwrap();
        system.pointer_over(edit_trigger);
        assert!(!system.is_open(edit));

        system.open(file);
        system.pointer_over(edit_trigger);
        assert!(system.is_open(edit));
        assert!(!system.is_open(file));
        let undo = system.menu(edit).unwrap().items()[0];
        assert_eq!(system.document().focused(), Some(undo));
    }

    #[test]
    fn hover_intent_opens_after_delay() {
        let (mut system, file, _) = setup();
        system.open(file);
        let recent = system.menu(file).unwrap().items()[1];
        let sub = system.menu(file).unwrap().submenus()[0];
        system.pointer_over(recent);
        system.advance(Duration::from_millis(299));
        assert!(!system.is_open(sub));
        system.advance(Duration::from_millis(1));
        assert!(system.is_open(sub));
    }

    #[test]
    fn moving_into_child_of_item_keeps_timer() {
        let (mut system, file, _) = setup();
        system.open(file);
        let recent = system.menu(file).unwrap().items()[1];
        let sub = system.menu(file).unwrap().submenus()[0];
        let text = system.document().children(recent)[0];
        system.pointer_over(recent);
        system.pointer_out(recent, Some(text));
        system.advance(Duration::from_millis(300));
        assert!(system.is_open(sub));
    }

    #[test]
    fn pointer_down_outside_closes() {
        let (mut system, file, _) = setup();
        system.open(file);
        let inside = system.menu(file).unwrap().items()[0];
        system.pointer_down(inside);
        assert!(system.is_open(file));

        let outside = system.document().get_element_by_id("outside").unwrap();
        system.pointer_down(outside);
        assert!(!system.is_open(file));
        let doc = system.document();
        assert!(system
            .menu(file)
            .unwrap()
            .items()
            .iter()
            .all(|&i| doc.attr(i, "tabindex") == Some("-1")));
    }

    #[test]
    fn focus_leaving_root_closes() {
        let (mut system, file, _) = setup();
        system.open(file);
        let outside = system.document().get_element_by_id("outside").unwrap();
        system.focus(outside);
        assert!(!system.is_open(file));
        assert_eq!(system.document().focused(), Some(outside));
    }
}
