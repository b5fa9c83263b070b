use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::config::{MenuConfig, Selectors};
use crate::dom::{Document, NodeId, SelectorError};
use crate::registry::MenuId;
use crate::scheduler::{AnimationId, TimerId};

/// Configuration shared by one menu tree; submenus hold the same `Rc`.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSettings {
    pub config: MenuConfig,
    pub selectors: Selectors,
}

impl MenuSettings {
    pub fn new(config: MenuConfig) -> Result<Self, SelectorError> {
        let selectors = Selectors::compile(&config.selector)?;
        Ok(Self { config, selectors })
    }
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            config: MenuConfig::default(),
            selectors: Selectors::default(),
        }
    }
}

/// Displayed state of a list. `Opening`/`Closing` last while the opacity
/// transition is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Debug)]
pub struct MenuInstance {
    pub(crate) root: NodeId,
    pub(crate) trigger: Option<NodeId>,
    pub(crate) list: Option<NodeId>,
    pub(crate) items: Vec<NodeId>,
    pub(crate) items_by_initial: HashMap<char, Vec<NodeId>>,
    pub(crate) checkbox_items: Vec<NodeId>,
    pub(crate) radio_items: Vec<NodeId>,
    /// Group element (or the root) to its radio items in document order.
    pub(crate) radio_groups: BTreeMap<NodeId, Vec<NodeId>>,
    pub(crate) submenus: Vec<MenuId>,
    pub(crate) parent: Option<MenuId>,
    pub(crate) name: Option<String>,
    pub(crate) pending_hover: Option<TimerId>,
    pub(crate) active_animation: Option<AnimationId>,
    pub(crate) auto_update: bool,
    pub(crate) phase: Phase,
    pub(crate) settings: Rc<MenuSettings>,
}

impl MenuInstance {
    pub(crate) fn new(root: NodeId, settings: Rc<MenuSettings>) -> Self {
        Self {
            root,
            trigger: None,
            list: None,
            items: Vec::new(),
            items_by_initial: HashMap::new(),
            checkbox_items: Vec::new(),
            radio_items: Vec::new(),
            radio_groups: BTreeMap::new(),
            submenus: Vec::new(),
            parent: None,
            name: None,
            pending_hover: None,
            active_animation: None,
            auto_update: false,
            phase: Phase::Closed,
            settings,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn trigger(&self) -> Option<NodeId> {
        self.trigger
    }

    pub fn list(&self) -> Option<NodeId> {
        self.list
    }

    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn submenus(&self) -> &[MenuId] {
        &self.submenus
    }

    pub fn parent(&self) -> Option<MenuId> {
        self.parent
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_submenu(&self) -> bool {
        self.parent.is_some()
    }

    /// No list or no items were found; the instance ignores every event.
    pub fn is_inert(&self) -> bool {
        self.list.is_none() || self.items.is_empty()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &MenuSettings {
        &self.settings
    }

    pub fn is_checkbox(&self, item: NodeId) -> bool {
        self.checkbox_items.contains(&item)
    }

    pub fn is_radio(&self, item: NodeId) -> bool {
        self.radio_items.contains(&item)
    }

    pub(crate) fn radio_group_of(&self, item: NodeId) -> Option<&[NodeId]> {
        self.radio_groups
            .values()
            .find(|group| group.contains(&item))
            .map(Vec::as_slice)
    }

    pub fn items_with_initial(&self, initial: char) -> &[NodeId] {
        self.items_by_initial
            .get(&initial)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn is_focusable(doc: &Document, item: NodeId) -> bool {
        !doc.is_disabled(item) && !doc.is_hidden(item)
    }

    pub fn focusable_items(&self, doc: &Document) -> Vec<NodeId> {
        self.items
            .iter()
            .copied()
            .filter(|&item| Self::is_focusable(doc, item))
            .collect()
    }

    pub(crate) fn first_focusable(&self, doc: &Document) -> Option<NodeId> {
        self.items
            .iter()
            .copied()
            .find(|&item| Self::is_focusable(doc, item))
    }

    pub(crate) fn last_focusable(&self, doc: &Document) -> Option<NodeId> {
        self.items
            .iter()
            .rev()
            .copied()
            .find(|&item| Self::is_focusable(doc, item))
    }

    /// Neighbour of `current` among focusable items, wrapping at both ends.
    /// Without a current item the walk starts from the matching end.
    pub(crate) fn step(&self, doc: &Document, current: Option<NodeId>, forward: bool) -> Option<NodeId> {
        let focusable = self.focusable_items(doc);
        if focusable.is_empty() {
            return None;
        }
        let len = focusable.len();
        let position = current.and_then(|c| focusable.iter().position(|&i| i == c));
        let next = match (position, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        focusable.get(next).copied()
    }

    /// Next focusable item after `current` whose initial is `ch`, wrapping to
    /// the first match.
    pub(crate) fn typeahead(&self, doc: &Document, current: Option<NodeId>, ch: char) -> Option<NodeId> {
        let candidates: Vec<NodeId> = self
            .items_with_initial(ch)
            .iter()
            .copied()
            .filter(|&item| Self::is_focusable(doc, item))
            .collect();
        let first = candidates.first().copied()?;
        let Some(current_index) = current.and_then(|c| self.items.iter().position(|&i| i == c))
        else {
            return Some(first);
        };
        candidates
            .iter()
            .copied()
            .find(|cand| {
                self.items
                    .iter()
                    .position(|i| i == cand)
                    .is_some_and(|index| index > current_index)
            })
            .or(Some(first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance_with(doc: &mut Document, labels: &[&str]) -> MenuInstance {
        let root = doc.create_element("div");
        let list = doc.create_element("ul");
        doc.append_child(doc.root(), root);
        doc.append_child(root, list);
        let mut menu = MenuInstance::new(root, Rc::new(MenuSettings::default()));
        menu.list = Some(list);
        for label in labels {
            let item = doc.create_element("li");
            let text = doc.create_text(label);
            doc.append_child(list, item);
            doc.append_child(item, text);
            if let Some(c) = label.chars().next() {
                menu.items_by_initial
                    .entry(c.to_ascii_lowercase())
                    .or_default()
                    .push(item);
            }
            menu.items.push(item);
        }
        menu
    }

    #[test]
    fn step_wraps_and_skips_disabled() {
        let mut doc = Document::new();
        let menu = instance_with(&mut doc, &["One", "Two", "Three"]);
        let [one, two, three] = [menu.items[0], menu.items[1], menu.items[2]];
        doc.set_attr(two, "aria-disabled", "true");

        assert_eq!(menu.step(&doc, Some(one), true), Some(three));
        assert_eq!(menu.step(&doc, Some(three), true), Some(one));
        assert_eq!(menu.step(&doc, Some(one), false), Some(three));
        assert_eq!(menu.step(&doc, None, false), Some(three));
        assert_eq!(menu.first_focusable(&doc), Some(one));
        assert_eq!(menu.last_focusable(&doc), Some(three));
    }

    #[test]
    fn typeahead_cycles_in_document_order() {
        let mut doc = Document::new();
        let menu = instance_with(&mut doc, &["Apple", "Banana", "Avocado"]);
        let [apple, banana, avocado] = [menu.items[0], menu.items[1], menu.items[2]];

        assert_eq!(menu.typeahead(&doc, None, 'a'), Some(apple));
        assert_eq!(menu.typeahead(&doc, Some(apple), 'a'), Some(avocado));
        assert_eq!(menu.typeahead(&doc, Some(avocado), 'a'), Some(apple));
        assert_eq!(menu.typeahead(&doc, Some(banana), 'a'), Some(avocado));
        assert_eq!(menu.typeahead(&doc, Some(apple), 'z'), None);
    }

    #[test]
    fn hidden_list_has_no_focusable_items() {
        let mut doc = Document::new();
        let menu = instance_with(&mut doc, &["One"]);
        let list = menu.list.unwrap();
        doc.set_style(list, "display", "none");
        assert!(menu.focusable_items(&doc).is_empty());
        assert!(!menu.is_inert());
    }
}
