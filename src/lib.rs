//! Accessible menu-button state machine.
//!
//! A [`MenuSystem`] discovers menu roots in a [`Document`], wires their ARIA
//! attributes and then keeps open state, roving tabindex, checkbox and radio
//! items and nested submenus consistent as keyboard, pointer and focus events
//! arrive. The `drivers`, `event_loop`, `ui` and `view` modules host a menu
//! tree in a terminal.

pub mod config;
pub mod constants;
pub mod dom;
pub mod drivers;
pub mod event_loop;
pub mod keybindings;
pub mod menu;
pub mod positioning;
pub mod registry;
pub mod scheduler;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod view;

pub use config::{ConfigError, MenuConfig};
pub use dom::{Bounds, Document, MarkupError, NodeId, Selector, SelectorError};
pub use keybindings::{Action, KeyBindings, KeyCombo};
pub use menu::{MenuEvent, MenuInstance, MenuSettings, MenuSystem, Phase};
pub use positioning::{AnchorPositioner, Placement, PopoverOptions, Positioner};
pub use registry::{MenuId, Registry};
