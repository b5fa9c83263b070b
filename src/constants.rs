//! Shared crate-wide constants.

/// Default opacity transition length in milliseconds.
pub const DEFAULT_ANIMATION_MS: u64 = 300;

/// Default hover-intent delay before a submenu opens, in milliseconds.
///
/// Leaving the item before this elapses cancels the open.
pub const DEFAULT_HOVER_DELAY_MS: u64 = 300;

/// Marks a root whose ids and ARIA wiring have already been generated.
pub const ATTR_INITIALIZED: &str = "data-menu-initialized";

/// Synchronous open/closed mirror on the menu root. `aria-expanded` on the
/// trigger follows it one frame later.
pub const ATTR_OPEN: &str = "data-menu-open";

/// Resolved placement of an open floating list, for styling hooks.
pub const ATTR_PLACEMENT: &str = "data-placement";

/// Default attribute carrying the shared name of top-level menus that switch
/// on hover once one of them is open.
pub const DEFAULT_NAME_ATTRIBUTE: &str = "data-menu-name";

/// Prefix for generated trigger/list ids.
pub const ID_PREFIX: &str = "menu";
