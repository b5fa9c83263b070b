//! Page-wide set of constructed menus.
//!
//! Instances are stored in construction order and never removed, so a
//! `MenuId` stays valid for the lifetime of its `MenuSystem`. Element
//! bindings map the nodes events land on back to the instance that owns
//! them; inert instances are registered but never bound.

use std::collections::HashMap;
use std::fmt;

use crate::dom::NodeId;
use crate::menu::MenuInstance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(usize);

impl MenuId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menu#{}", self.0)
    }
}

/// Roles a single element plays. A submenu trigger is both an item of its
/// parent and the trigger of the child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NodeBinding {
    pub root_of: Option<MenuId>,
    pub trigger_of: Option<MenuId>,
    pub list_of: Option<MenuId>,
    pub item_of: Option<MenuId>,
}

#[derive(Debug, Default)]
pub struct Registry {
    menus: Vec<MenuInstance>,
    roots: HashMap<NodeId, MenuId>,
    bindings: HashMap<NodeId, NodeBinding>,
    next_uid: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    pub(crate) fn insert(&mut self, instance: MenuInstance) -> MenuId {
        let id = MenuId(self.menus.len());
        self.roots.insert(instance.root(), id);
        self.menus.push(instance);
        id
    }

    pub fn get(&self, id: MenuId) -> Option<&MenuInstance> {
        self.menus.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: MenuId) -> Option<&mut MenuInstance> {
        self.menus.get_mut(id.0)
    }

    /// All ids in construction order; parents precede their submenus.
    pub fn ids(&self) -> impl Iterator<Item = MenuId> + '_ {
        (0..self.menus.len()).map(MenuId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MenuId, &MenuInstance)> {
        self.menus.iter().enumerate().map(|(i, m)| (MenuId(i), m))
    }

    pub fn find_by_root(&self, root: NodeId) -> Option<MenuId> {
        self.roots.get(&root).copied()
    }

    pub(crate) fn binding(&self, node: NodeId) -> NodeBinding {
        self.bindings.get(&node).copied().unwrap_or_default()
    }

    pub(crate) fn bind(&mut self, node: NodeId, f: impl FnOnce(&mut NodeBinding)) {
        f(self.bindings.entry(node).or_default());
    }

    pub(crate) fn next_uid(&mut self) -> u64 {
        self.next_uid += 1;
        self.next_uid
    }

    /// `id` followed by its parent chain up to the top-level menu.
    pub fn ancestry(&self, id: MenuId) -> Vec<MenuId> {
        let mut chain = vec![id];
        let mut current = self.get(id).and_then(|m| m.parent());
        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent).and_then(|m| m.parent());
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_accumulate_roles() {
        let mut doc = crate::dom::Document::new();
        let node = doc.create_element("li");
        let mut registry = Registry::new();
        registry.bind(node, |b| b.item_of = Some(MenuId(0)));
        registry.bind(node, |b| b.trigger_of = Some(MenuId(1)));
        let binding = registry.binding(node);
        assert_eq!(binding.item_of, Some(MenuId(0)));
        assert_eq!(binding.trigger_of, Some(MenuId(1)));
        assert_eq!(binding.list_of, None);

        let other = doc.create_element("li");
        assert_eq!(registry.binding(other), NodeBinding::default());
    }

    #[test]
    fn uids_are_unique() {
        let mut registry = Registry::new();
        let a = registry.next_uid();
        let b = registry.next_uid();
        assert_ne!(a, b);
        assert_eq!(MenuId(3).to_string(), "menu#3");
    }
}
