use std::rc::Rc;

use super::{MenuInstance, MenuSettings, MenuSystem, Phase};
use crate::config::MenuConfig;
use crate::constants::{ATTR_INITIALIZED, ATTR_OPEN, ID_PREFIX};
use crate::dom::{Document, NodeId, SelectorError};
use crate::registry::MenuId;

impl MenuSystem {
    /// Construct a menu for every element matching the root selector.
    pub fn discover(&mut self) -> Vec<MenuId> {
        let roots = self
            .document
            .query_selector_all(self.document.root(), &self.settings.selectors.root);
        let settings = Rc::clone(&self.settings);
        roots
            .into_iter()
            .map(|root| self.construct(root, Rc::clone(&settings), None))
            .collect()
    }

    /// Construct one menu tree rooted at `root` with the system defaults.
    /// Returns `None` when `root` is not an element.
    pub fn init(&mut self, root: NodeId) -> Option<MenuId> {
        if !self.document.is_element(root) {
            return None;
        }
        let settings = Rc::clone(&self.settings);
        Some(self.construct(root, settings, None))
    }

    pub fn init_with(
        &mut self,
        root: NodeId,
        config: MenuConfig,
    ) -> Result<Option<MenuId>, SelectorError> {
        let settings = Rc::new(MenuSettings::new(config)?);
        if !self.document.is_element(root) {
            return Ok(None);
        }
        Ok(Some(self.construct(root, settings, None)))
    }

    fn construct(
        &mut self,
        root: NodeId,
        settings: Rc<MenuSettings>,
        parent: Option<(MenuId, NodeId)>,
    ) -> MenuId {
        if let Some(existing) = self.registry.find_by_root(root) {
            tracing::trace!(menu = ?existing, "menu root already initialized");
            return existing;
        }

        let doc = &self.document;
        let selectors = &settings.selectors;
        let list = doc
            .descendants(root)
            .into_iter()
            .find(|&n| doc.matches(n, &selectors.list));
        let trigger = match parent {
            Some((_, item)) => Some(item),
            None => doc.descendants(root).into_iter().find(|&n| {
                doc.matches(n, &selectors.trigger) && list.is_none_or(|l| !doc.contains(l, n))
            }),
        };
        let items: Vec<NodeId> = match list {
            Some(list) => doc
                .query_selector_all(list, &selectors.item)
                .into_iter()
                .filter(|&item| {
                    doc.parent(item)
                        .and_then(|p| doc.closest(p, &selectors.list))
                        == Some(list)
                })
                .collect(),
            None => Vec::new(),
        };

        let mut instance = MenuInstance::new(root, Rc::clone(&settings));
        instance.parent = parent.map(|(id, _)| id);
        instance.name = doc
            .attr(root, &selectors.name_attribute)
            .map(str::to_string);

        let (Some(list), false) = (list, items.is_empty()) else {
            let id = self.registry.insert(instance);
            tracing::debug!(menu = ?id, root = ?root, "menu has no list or items; left inert");
            return id;
        };
        instance.list = Some(list);
        instance.trigger = trigger;
        instance.items = items.clone();
        if trigger.is_none() {
            instance.phase = Phase::Open;
        }

        let uid = self.registry.next_uid();
        let already_initialized = self.document.has_attr(root, ATTR_INITIALIZED);
        if !already_initialized {
            self.assign_ids(uid, trigger, list);
        }
        if let Some(trigger) = trigger {
            self.wire_trigger(trigger, list, parent.is_some());
        }
        self.document.set_attr(list, "role", "menu");
        if trigger.is_some() {
            self.document.set_style(list, "display", "none");
            self.document.set_style(list, "opacity", "0");
            self.document.set_attr(root, ATTR_OPEN, "false");
        }

        let mut nested = Vec::new();
        for &item in &items {
            self.wire_item(&mut instance, item, root);
            if let Some(parent_el) = self.document.parent(item)
                && parent_el != list
                && let Some(sub_list) = self
                    .document
                    .query_selector(parent_el, &settings.selectors.list)
                && self.document.contains(list, sub_list)
            {
                nested.push((item, parent_el));
            }
        }
        if trigger.is_none()
            && let Some(first) = instance.first_focusable(&self.document)
        {
            self.document.set_attr(first, "tabindex", "0");
        }
        self.document.set_attr(root, ATTR_INITIALIZED, "");

        let id = self.registry.insert(instance);
        self.registry.bind(root, |b| b.root_of = Some(id));
        self.registry.bind(list, |b| b.list_of = Some(id));
        if let Some(trigger) = trigger {
            self.registry.bind(trigger, |b| b.trigger_of = Some(id));
        }
        for &item in &items {
            self.registry.bind(item, |b| b.item_of = Some(id));
        }
        tracing::debug!(
            menu = ?id,
            items = items.len(),
            submenu = parent.is_some(),
            "menu initialized"
        );

        let submenus: Vec<MenuId> = nested
            .into_iter()
            .map(|(item, sub_root)| self.construct(sub_root, Rc::clone(&settings), Some((id, item))))
            .collect();
        if let Some(inst) = self.registry.get_mut(id) {
            inst.submenus = submenus;
        }
        id
    }

    fn assign_ids(&mut self, uid: u64, trigger: Option<NodeId>, list: NodeId) {
        if let Some(trigger) = trigger
            && !self.document.has_attr(trigger, "id")
        {
            let value = unique_id(&self.document, uid, "trigger");
            self.document.set_attr(trigger, "id", value);
        }
        if !self.document.has_attr(list, "id") {
            let value = unique_id(&self.document, uid, "list");
            self.document.set_attr(list, "id", value);
        }
    }

    fn wire_trigger(&mut self, trigger: NodeId, list: NodeId, is_submenu: bool) {
        let doc = &mut self.document;
        doc.set_attr(trigger, "aria-haspopup", "menu");
        doc.set_attr(trigger, "aria-expanded", "false");
        if let Some(list_id) = doc.attr(list, "id").map(str::to_string)
            && !doc.has_attr(trigger, "aria-controls")
        {
            doc.set_attr(trigger, "aria-controls", list_id);
        }
        if !is_submenu {
            if doc.is_disabled(trigger) {
                doc.set_attr(trigger, "tabindex", "-1");
                doc.set_style(trigger, "pointer-events", "none");
            } else {
                doc.set_attr(trigger, "tabindex", "0");
            }
        }
        if let Some(trigger_id) = doc.attr(trigger, "id").map(str::to_string) {
            let labels = doc.attr(list, "aria-labelledby").unwrap_or_default();
            if !labels.split_whitespace().any(|l| l == trigger_id) {
                let joined = if labels.trim().is_empty() {
                    trigger_id
                } else {
                    format!("{} {}", labels.trim(), trigger_id)
                };
                doc.set_attr(list, "aria-labelledby", joined);
            }
        }
    }

    fn wire_item(&mut self, instance: &mut MenuInstance, item: NodeId, root: NodeId) {
        let settings = Rc::clone(&instance.settings);
        let selectors = &settings.selectors;
        let doc = &mut self.document;
        if !doc.has_attr(item, "role") {
            doc.set_attr(item, "role", "menuitem");
        }

        if let Some(initial) = doc
            .text_content(item)
            .trim_start()
            .chars()
            .next()
            .filter(|c| c.is_alphanumeric())
            .and_then(|c| c.to_lowercase().next())
        {
            instance
                .items_by_initial
                .entry(initial)
                .or_default()
                .push(item);
            if !doc.has_attr(item, "aria-keyshortcuts") {
                doc.set_attr(item, "aria-keyshortcuts", initial.to_string());
            }
        }

        if doc.matches(item, &selectors.checkbox_item) {
            instance.checkbox_items.push(item);
            if !doc.has_attr(item, "aria-checked") {
                doc.set_attr(item, "aria-checked", "false");
            }
        } else if doc.matches(item, &selectors.radio_item) {
            instance.radio_items.push(item);
            if !doc.has_attr(item, "aria-checked") {
                doc.set_attr(item, "aria-checked", "false");
            }
            let group = doc
                .parent(item)
                .and_then(|p| doc.closest(p, &selectors.group))
                .filter(|&g| doc.contains(root, g))
                .unwrap_or(root);
            instance.radio_groups.entry(group).or_default().push(item);
        }

        doc.set_attr(item, "tabindex", "-1");
    }
}

fn unique_id(doc: &Document, uid: u64, suffix: &str) -> String {
    let mut n = uid;
    loop {
        let candidate = format!("{ID_PREFIX}-{n}-{suffix}");
        if doc.get_element_by_id(&candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}
