//! Menu configuration: timings, popover placement and selector overrides.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//! Selector overrides are plain strings here and are compiled into
//! [`Selectors`] when a menu tree is constructed.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{DEFAULT_ANIMATION_MS, DEFAULT_HOVER_DELAY_MS, DEFAULT_NAME_ATTRIBUTE};
use crate::dom::{Selector, SelectorError};
use crate::positioning::PopoverOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid selector: {0}")]
    Selector(#[from] SelectorError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Milliseconds; forced to zero under a reduced-motion preference.
    pub duration: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_ANIMATION_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PopoverConfig {
    pub menu: PopoverOptions,
    pub submenu: PopoverOptions,
    #[serde(rename = "transformOrigin", alias = "transform_origin")]
    pub transform_origin: bool,
}

impl Default for PopoverConfig {
    fn default() -> Self {
        Self {
            menu: PopoverOptions::menu_default(),
            submenu: PopoverOptions::submenu_default(),
            transform_origin: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub root: Option<String>,
    pub trigger: Option<String>,
    pub list: Option<String>,
    pub item: Option<String>,
    pub checkbox_item: Option<String>,
    pub radio_item: Option<String>,
    pub group: Option<String>,
    /// Attribute holding the shared name used for hover switching between
    /// top-level menus.
    pub name_attribute: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub animation: AnimationConfig,
    /// Hover-intent delay in milliseconds.
    pub delay: u64,
    pub popover: PopoverConfig,
    pub selector: SelectorConfig,
    pub close_on_select: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            animation: AnimationConfig::default(),
            delay: DEFAULT_HOVER_DELAY_MS,
            popover: PopoverConfig::default(),
            selector: SelectorConfig::default(),
            close_on_select: false,
        }
    }
}

impl MenuConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: MenuConfig = toml::from_str(source)?;
        // Surface selector typos at load time rather than at first use.
        Selectors::compile(&config.selector)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).inspect_err(|e| {
            tracing::error!(path = %path.display(), "failed to read menu config: {e}");
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation.duration)
    }

    pub fn hover_delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }
}

/// Compiled selectors for one menu tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub root: Selector,
    pub trigger: Selector,
    pub list: Selector,
    pub item: Selector,
    pub checkbox_item: Selector,
    pub radio_item: Selector,
    pub group: Selector,
    pub name_attribute: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            root: Selector::attr("data-menu"),
            trigger: Selector::attr("data-menu-trigger"),
            list: Selector::attr("data-menu-list"),
            item: Selector::attr_eq("role", "menuitem")
                .or(Selector::attr_eq("role", "menuitemcheckbox"))
                .or(Selector::attr_eq("role", "menuitemradio")),
            checkbox_item: Selector::attr_eq("role", "menuitemcheckbox"),
            radio_item: Selector::attr_eq("role", "menuitemradio"),
            group: Selector::attr_eq("role", "group"),
            name_attribute: DEFAULT_NAME_ATTRIBUTE.to_string(),
        }
    }
}

impl Selectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, SelectorError> {
        let defaults = Self::default();
        let pick = |custom: &Option<String>, default: Selector| match custom {
            Some(source) => Selector::parse(source),
            None => Ok(default),
        };
        Ok(Self {
            root: pick(&config.root, defaults.root)?,
            trigger: pick(&config.trigger, defaults.trigger)?,
            list: pick(&config.list, defaults.list)?,
            item: pick(&config.item, defaults.item)?,
            checkbox_item: pick(&config.checkbox_item, defaults.checkbox_item)?,
            radio_item: pick(&config.radio_item, defaults.radio_item)?,
            group: pick(&config.group, defaults.group)?,
            name_attribute: config
                .name_attribute
                .clone()
                .unwrap_or(defaults.name_attribute),
        })
    }
}
