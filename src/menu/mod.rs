//! The menu interaction state machine.
//!
//! [`MenuSystem`] owns the page ([`Document`]), every constructed
//! [`MenuInstance`] and the clock that drives deferred work. Host events are
//! fed in through `key_down`, `click`, `pointer_*`, `focus` and `blur`; time
//! moves through [`MenuSystem::advance`]. Observable results are DOM
//! mutations, focus movement and the [`MenuEvent`] outbox.

mod init;
mod instance;
mod items;
mod keyboard;
mod pointer;
mod transition;

use std::rc::Rc;
use std::time::Duration;

pub use instance::{MenuInstance, MenuSettings, Phase};

use crate::config::MenuConfig;
use crate::dom::{Document, NodeId, SelectorError};
use crate::keybindings::KeyBindings;
use crate::positioning::{AnchorPositioner, Positioner};
use crate::registry::{MenuId, Registry};
use crate::scheduler::Scheduler;

/// Something a host may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    Opened(MenuId),
    Closed(MenuId),
    Activated {
        menu: MenuId,
        item: NodeId,
    },
    CheckedChanged {
        menu: MenuId,
        item: NodeId,
        checked: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransitionKind {
    Open,
    Close,
}

/// Deferred work routed back through [`MenuSystem::run_task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Task {
    /// Hover-intent expiry on `menu`'s item that triggers a submenu.
    HoverIntent { menu: MenuId, item: NodeId },
    /// Mirror the open state into the trigger's `aria-expanded`.
    SyncExpanded { menu: MenuId },
    TransitionEnd { menu: MenuId, kind: TransitionKind },
}

pub struct MenuSystem {
    document: Document,
    registry: Registry,
    scheduler: Scheduler<Task>,
    positioner: Box<dyn Positioner>,
    bindings: KeyBindings,
    settings: Rc<MenuSettings>,
    reduced_motion: bool,
    events: Vec<MenuEvent>,
}

impl MenuSystem {
    pub fn new(document: Document) -> Self {
        Self::from_settings(document, MenuSettings::default())
    }

    pub fn with_config(document: Document, config: MenuConfig) -> Result<Self, SelectorError> {
        Ok(Self::from_settings(document, MenuSettings::new(config)?))
    }

    fn from_settings(document: Document, settings: MenuSettings) -> Self {
        Self {
            document,
            registry: Registry::new(),
            scheduler: Scheduler::new(),
            positioner: Box::new(AnchorPositioner),
            bindings: KeyBindings::default(),
            settings: Rc::new(settings),
            reduced_motion: false,
            events: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct page access for host-side layout. Menu state is re-read from
    /// the DOM on every operation, so external edits are tolerated.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn menu(&self, id: MenuId) -> Option<&MenuInstance> {
        self.registry.get(id)
    }

    /// Top-level menus (those without a parent) in construction order.
    pub fn top_level(&self) -> Vec<MenuId> {
        self.registry
            .iter()
            .filter(|(_, m)| m.parent().is_none())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn set_key_bindings(&mut self, bindings: KeyBindings) {
        self.bindings = bindings;
    }

    pub fn set_positioner(&mut self, positioner: Box<dyn Positioner>) {
        self.positioner = positioner;
    }

    /// Transitions started afterwards run with zero duration.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn has_pending_work(&self) -> bool {
        self.scheduler.has_pending_work()
    }

    pub fn take_events(&mut self) -> Vec<MenuEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: MenuEvent) {
        tracing::trace!(?event, "menu event");
        self.events.push(event);
    }

    /// Move the clock. Frame tasks queued before the call run first, then
    /// due timers, then transitions step; open menus are re-positioned last.
    pub fn advance(&mut self, dt: Duration) {
        let frame = self.scheduler.take_frame();
        self.scheduler.advance(dt);
        for task in frame {
            self.run_task(task);
        }
        loop {
            let due = self.scheduler.take_due_timers();
            if due.is_empty() {
                break;
            }
            for task in due {
                self.run_task(task);
            }
        }
        self.flush_transitions();
        self.update_positions();
    }

    /// Complete every transition that has reached its end value.
    fn flush_transitions(&mut self) {
        loop {
            let finished = self.scheduler.step_tweens(&mut self.document);
            if finished.is_empty() {
                break;
            }
            for task in finished {
                self.run_task(task);
            }
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::HoverIntent { menu, item } => self.hover_intent_elapsed(menu, item),
            Task::SyncExpanded { menu } => self.sync_expanded(menu),
            Task::TransitionEnd { menu, kind } => self.transition_finished(menu, kind),
        }
    }

    /// Menu that owns `node` as an item, or whose list contains it.
    fn owning_menu(&self, node: NodeId) -> Option<MenuId> {
        let mut current = Some(node);
        while let Some(id) = current {
            let binding = self.registry.binding(id);
            if let Some(menu) = binding.item_of.or(binding.list_of) {
                return Some(menu);
            }
            current = self.document.composed_parent(id);
        }
        None
    }

    /// Outermost open menu with a trigger in `id`'s ancestry.
    fn outermost_open(&self, id: MenuId) -> Option<MenuId> {
        self.registry
            .ancestry(id)
            .into_iter()
            .rev()
            .find(|&m| {
                self.registry.get(m).is_some_and(|inst| inst.trigger.is_some()) && self.is_open(m)
            })
    }
}
