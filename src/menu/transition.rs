use std::time::Duration;

use super::{MenuEvent, MenuSystem, Phase, Task, TransitionKind};
use crate::constants::{ATTR_OPEN, ATTR_PLACEMENT};
use crate::dom::{Bounds, NodeId};
use crate::registry::MenuId;

impl MenuSystem {
    /// Whether the menu is shown, as recorded on its root. Menus without a
    /// trigger are always shown.
    pub fn is_open(&self, id: MenuId) -> bool {
        let Some(menu) = self.registry.get(id) else {
            return false;
        };
        if menu.is_inert() {
            return false;
        }
        match menu.trigger {
            Some(_) => self.document.attr_is(menu.root, ATTR_OPEN, "true"),
            None => true,
        }
    }

    pub fn phase(&self, id: MenuId) -> Option<Phase> {
        self.registry.get(id).map(|m| m.phase)
    }

    pub fn toggle(&mut self, id: MenuId) {
        if self.is_open(id) {
            self.close(id);
        } else {
            self.open(id);
        }
    }

    pub fn open(&mut self, id: MenuId) {
        let Some(menu) = self.registry.get(id) else {
            return;
        };
        if menu.is_inert() || menu.trigger.is_none() || self.is_open(id) {
            return;
        }
        let (root, list) = (menu.root, menu.list);
        let Some(list) = list else {
            return;
        };
        tracing::debug!(menu = ?id, "opening menu");

        let unrelated: Vec<MenuId> = self
            .registry
            .iter()
            .filter(|&(other, m)| {
                other != id
                    && !m.is_inert()
                    && !self.document.contains(m.root, root)
                    && !self.document.contains(root, m.root)
            })
            .map(|(other, _)| other)
            .collect();
        for other in unrelated {
            self.close(other);
        }

        self.document.set_attr(root, ATTR_OPEN, "true");
        self.document.remove_style(list, "display");
        let from = self.document.style_number(list, "opacity").unwrap_or(0.0);
        self.document.set_style(list, "opacity", format!("{from}"));
        if let Some(menu) = self.registry.get_mut(id) {
            menu.phase = Phase::Opening;
            menu.auto_update = true;
        }
        self.position(id);

        if let Some(first) = self
            .registry
            .get(id)
            .and_then(|m| m.first_focusable(&self.document))
        {
            self.move_focus(Some(first));
        }

        self.start_transition(id, list, from, 1.0, TransitionKind::Open);
        self.scheduler.request_frame(Task::SyncExpanded { menu: id });
        self.emit(MenuEvent::Opened(id));
        self.flush_transitions();
    }

    pub fn close(&mut self, id: MenuId) {
        let Some(menu) = self.registry.get(id) else {
            return;
        };
        if menu.is_inert() {
            return;
        }
        let submenus = menu.submenus.clone();
        let (root, trigger, list, pending) = (menu.root, menu.trigger, menu.list, menu.pending_hover);
        let (Some(trigger), Some(list)) = (trigger, list) else {
            for sub in submenus {
                self.close(sub);
            }
            return;
        };
        if !self.is_open(id) {
            return;
        }
        tracing::debug!(menu = ?id, "closing menu");

        self.document.set_attr(root, ATTR_OPEN, "false");
        if let Some(timer) = pending {
            self.scheduler.clear_timeout(timer);
        }
        if let Some(menu) = self.registry.get_mut(id) {
            menu.pending_hover = None;
            menu.phase = Phase::Closing;
        }
        for sub in submenus {
            self.close(sub);
        }

        if self.focus_within(root) {
            self.move_focus(Some(trigger));
        }

        let from = self.document.style_number(list, "opacity").unwrap_or(1.0);
        self.start_transition(id, list, from, 0.0, TransitionKind::Close);
        self.scheduler.request_frame(Task::SyncExpanded { menu: id });
        self.emit(MenuEvent::Closed(id));
        self.flush_transitions();
    }

    pub(super) fn focus_within(&self, root: NodeId) -> bool {
        let doc = &self.document;
        doc.deep_active_element()
            .is_some_and(|active| doc.contains_composed(root, active))
    }

    fn animation_duration(&self, id: MenuId) -> Duration {
        if self.reduced_motion {
            return Duration::ZERO;
        }
        self.registry
            .get(id)
            .map(|m| m.settings.config.animation_duration())
            .unwrap_or_default()
    }

    fn start_transition(&mut self, id: MenuId, list: NodeId, from: f32, to: f32, kind: TransitionKind) {
        let duration = self.animation_duration(id);
        if let Some(previous) = self.registry.get_mut(id).and_then(|m| m.active_animation.take()) {
            self.scheduler.cancel_animation(previous);
        }
        let animation = self.scheduler.animate(
            list,
            "opacity",
            from,
            to,
            duration,
            Task::TransitionEnd { menu: id, kind },
        );
        if let Some(menu) = self.registry.get_mut(id) {
            menu.active_animation = Some(animation);
        }
    }

    pub(super) fn transition_finished(&mut self, id: MenuId, kind: TransitionKind) {
        let Some(menu) = self.registry.get_mut(id) else {
            return;
        };
        menu.active_animation = None;
        match (kind, menu.phase) {
            (TransitionKind::Open, Phase::Opening) => {
                menu.phase = Phase::Open;
            }
            (TransitionKind::Close, Phase::Closing) => {
                menu.phase = Phase::Closed;
                menu.auto_update = false;
                if let Some(list) = menu.list {
                    self.document.set_style(list, "display", "none");
                    self.document.remove_attr(list, ATTR_PLACEMENT);
                    self.document.remove_style(list, "transform-origin");
                }
                tracing::trace!(menu = ?id, "close transition finished");
            }
            _ => {}
        }
    }

    pub(super) fn sync_expanded(&mut self, id: MenuId) {
        let Some(trigger) = self.registry.get(id).and_then(|m| m.trigger) else {
            return;
        };
        let expanded = if self.is_open(id) { "true" } else { "false" };
        self.document.set_attr(trigger, "aria-expanded", expanded);
    }

    /// Recompute the position of every open list.
    pub fn relayout(&mut self) {
        self.update_positions();
    }

    pub(super) fn update_positions(&mut self) {
        let live: Vec<MenuId> = self
            .registry
            .iter()
            .filter(|(_, m)| m.auto_update)
            .map(|(id, _)| id)
            .collect();
        for id in live {
            self.position(id);
        }
    }

    fn position(&mut self, id: MenuId) {
        let Some(menu) = self.registry.get(id) else {
            return;
        };
        let (Some(trigger), Some(list)) = (menu.trigger, menu.list) else {
            return;
        };
        let popover = &menu.settings.config.popover;
        let options = if menu.is_submenu() {
            &popover.submenu
        } else {
            &popover.menu
        };
        let anchor = self.document.bounds(trigger).unwrap_or_default();
        let floating = self.document.bounds(list).unwrap_or_default();
        let viewport = self.document.viewport();
        let resolved = self.positioner.compute(anchor, floating, viewport, options);
        let transform_origin = popover.transform_origin;

        let placed = Bounds::new(resolved.x, resolved.y, floating.width, floating.height);
        let unchanged = self.document.bounds(list) == Some(placed)
            && self.document.attr(list, ATTR_PLACEMENT) == Some(resolved.placement.as_str());
        if unchanged {
            return;
        }
        tracing::trace!(menu = ?id, placement = %resolved.placement, x = resolved.x, y = resolved.y, "positioned list");
        let doc = &mut self.document;
        doc.set_style(list, "left", format!("{}px", resolved.x));
        doc.set_style(list, "top", format!("{}px", resolved.y));
        doc.set_bounds(list, placed);
        doc.set_attr(list, ATTR_PLACEMENT, resolved.placement.as_str());
        if transform_origin {
            doc.set_style(list, "transform-origin", resolved.placement.transform_origin());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MenuConfig;
    use crate::dom::Document;
    use indoc::indoc;

    const MARKUP: &str = indoc! {r#"
        <div data-menu>
          <button data-menu-trigger>View</button>
          <ul data-menu-list>
            <li role="menuitem">Zoom in</li>
            <li role="menuitem">Zoom out</li>
          </ul>
        </div>
    "#};

    fn setup(config: MenuConfig) -> (MenuSystem, MenuId, NodeId, NodeId) {
        let mut system = MenuSystem::with_config(Document::parse(MARKUP).unwrap(), config).unwrap();
        let id = system.discover()[0];
        let menu = system.menu(id).unwrap();
        let (trigger, list) = (menu.trigger().unwrap(), menu.list().unwrap());
        system
            .document_mut()
            .set_bounds(trigger, Bounds::new(10.0, 10.0, 60.0, 20.0));
        system
            .document_mut()
            .set_bounds(list, Bounds::new(0.0, 0.0, 120.0, 40.0));
        (system, id, trigger, list)
    }

    #[test]
    fn open_runs_through_opening_to_open() {
        let (mut system, id, trigger, list) = setup(MenuConfig::default());
        system.open(id);
        assert!(system.is_open(id));
        assert_eq!(system.phase(id), Some(Phase::Opening));
        assert_eq!(system.document().style(list, "display"), None);
        // expanded state waits for the next frame
        assert_eq!(system.document().attr(trigger, "aria-expanded"), Some("false"));
        assert_eq!(system.document().attr(list, ATTR_PLACEMENT), Some("bottom-start"));
        assert_eq!(system.document().style(list, "left"), Some("10px"));
        assert_eq!(system.document().style(list, "top"), Some("30px"));

        system.advance(Duration::from_millis(150));
        assert_eq!(system.document().attr(trigger, "aria-expanded"), Some("true"));
        assert_eq!(system.document().style(list, "opacity"), Some("0.5"));
        system.advance(Duration::from_millis(150));
        assert_eq!(system.phase(id), Some(Phase::Open));
        assert_eq!(system.document().style(list, "opacity"), Some("1"));
    }

    #[test]
    fn close_hides_list_after_transition() {
        let (mut system, id, trigger, list) = setup(MenuConfig::default());
        system.open(id);
        system.advance(Duration::from_millis(300));
        system.close(id);
        assert!(!system.is_open(id));
        assert_eq!(system.phase(id), Some(Phase::Closing));
        assert_eq!(system.document().style(list, "display"), None);
        assert_eq!(system.document().focused(), Some(trigger));

        system.advance(Duration::from_millis(300));
        assert_eq!(system.phase(id), Some(Phase::Closed));
        assert_eq!(system.document().style(list, "display"), Some("none"));
        assert!(!system.document().has_attr(list, ATTR_PLACEMENT));
        assert_eq!(system.document().attr(trigger, "aria-expanded"), Some("false"));
    }

    #[test]
    fn reopening_mid_fade_starts_from_current_opacity() {
        let (mut system, id, _, list) = setup(MenuConfig::default());
        system.open(id);
        system.advance(Duration::from_millis(300));
        system.close(id);
        system.advance(Duration::from_millis(150));
        assert_eq!(system.document().style(list, "opacity"), Some("0.5"));
        system.open(id);
        assert_eq!(system.phase(id), Some(Phase::Opening));
        system.advance(Duration::from_millis(150));
        assert_eq!(system.document().style(list, "opacity"), Some("0.75"));
        // the cancelled close never hides the list
        system.advance(Duration::from_millis(300));
        assert_eq!(system.document().style(list, "display"), None);
        assert_eq!(system.phase(id), Some(Phase::Open));
    }

    #[test]
    fn reduced_motion_completes_immediately() {
        let (mut system, id, _, list) = setup(MenuConfig::default());
        system.set_reduced_motion(true);
        system.open(id);
        assert_eq!(system.phase(id), Some(Phase::Open));
        assert_eq!(system.document().style(list, "opacity"), Some("1"));
        system.close(id);
        assert_eq!(system.phase(id), Some(Phase::Closed));
        assert_eq!(system.document().style(list, "display"), Some("none"));
    }

    #[test]
    fn transform_origin_follows_placement() {
        let mut config = MenuConfig::default();
        config.popover.transform_origin = true;
        config.animation.duration = 0;
        let (mut system, id, trigger, list) = setup(config);
        // no room below: flips to the top
        system
            .document_mut()
            .set_bounds(trigger, Bounds::new(10.0, 740.0, 60.0, 20.0));
        system.open(id);
        assert_eq!(system.document().attr(list, ATTR_PLACEMENT), Some("top-start"));
        assert_eq!(system.document().style(list, "transform-origin"), Some("bottom left"));

        system
            .document_mut()
            .set_bounds(trigger, Bounds::new(10.0, 10.0, 60.0, 20.0));
        system.advance(Duration::ZERO);
        assert_eq!(system.document().attr(list, ATTR_PLACEMENT), Some("bottom-start"));
        assert_eq!(system.document().style(list, "transform-origin"), Some("top left"));

        system.close(id);
        assert_eq!(system.document().style(list, "transform-origin"), None);
    }
}
