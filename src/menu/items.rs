use super::{MenuEvent, MenuSystem};
use crate::dom::NodeId;
use crate::registry::MenuId;

impl MenuSystem {
    /// Activate whatever `target` belongs to: a trigger toggles its menu, an
    /// item is activated (and checked, for checkbox and radio items).
    pub fn click(&mut self, target: NodeId) {
        let mut current = Some(target);
        while let Some(node) = current {
            let binding = self.registry.binding(node);
            if let Some(menu) = binding.trigger_of {
                if !self.document.is_disabled(node) {
                    tracing::trace!(menu = ?menu, "trigger clicked");
                    self.toggle(menu);
                }
                break;
            }
            if let Some(menu) = binding.item_of {
                self.activate_item(menu, node);
                break;
            }
            current = self.document.composed_parent(node);
        }
        self.flush_transitions();
    }

    fn activate_item(&mut self, menu: MenuId, item: NodeId) {
        if self.document.is_disabled(item) {
            return;
        }
        let Some(instance) = self.registry.get(menu) else {
            return;
        };
        let close_on_select = instance.settings.config.close_on_select;
        if instance.is_checkbox(item) {
            let checked = !self.document.attr_is(item, "aria-checked", "true");
            self.document
                .set_attr(item, "aria-checked", if checked { "true" } else { "false" });
            self.emit(MenuEvent::CheckedChanged {
                menu,
                item,
                checked,
            });
        } else if let Some(group) = instance.radio_group_of(item).map(<[NodeId]>::to_vec) {
            let was_checked = self.document.attr_is(item, "aria-checked", "true");
            for radio in group {
                let value = if radio == item { "true" } else { "false" };
                self.document.set_attr(radio, "aria-checked", value);
            }
            if !was_checked {
                self.emit(MenuEvent::CheckedChanged {
                    menu,
                    item,
                    checked: true,
                });
            }
        } else if close_on_select {
            self.emit(MenuEvent::Activated { menu, item });
            if let Some(outer) = self.outermost_open(menu) {
                self.close(outer);
            }
            return;
        }
        self.emit(MenuEvent::Activated { menu, item });
    }
}
