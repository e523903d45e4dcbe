//! Menu groups: the client-side navigation over parameters and commands.
//!
//! Menus only reference OIDs; nothing here checks that they resolve.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::text::{PolyglotText, simple_text};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Menu {
    pub name: PolyglotText,
    pub order: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub param_oids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command_oids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuGroup {
    pub name: PolyglotText,
    pub order: u32,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub menus: BTreeMap<String, Menu>,
}

impl MenuGroup {
    /// Menus sorted by `order`, then id.
    pub fn ordered_menus(&self) -> Vec<(&str, &Menu)> {
        let mut menus: Vec<_> = self
            .menus
            .iter()
            .map(|(id, menu)| (id.as_str(), menu))
            .collect();
        menus.sort_by_key(|(id, menu)| (menu.order, *id));
        menus
    }
}

/// Builds the menu groups of a device. Groups and menus are created on
/// first mention.
#[derive(Debug, Clone, Default)]
pub struct MenuGroupManager {
    groups: BTreeMap<String, MenuGroup>,
}

impl MenuGroupManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_groups(groups: BTreeMap<String, MenuGroup>) -> Self {
        Self { groups }
    }

    fn create_or_get_group(&mut self, group_id: &str) -> &mut MenuGroup {
        self.groups.entry(group_id.to_string()).or_default()
    }

    fn create_or_get_menu(&mut self, group_id: &str, menu_id: &str) -> &mut Menu {
        self.create_or_get_group(group_id)
            .menus
            .entry(menu_id.to_string())
            .or_default()
    }

    pub fn create_menu_group(
        &mut self,
        group_id: &str,
        order: u32,
        name: &str,
    ) -> &mut MenuGroup {
        debug!("[MENU] Menu group {} ({})", group_id, name);
        let group = self.create_or_get_group(group_id);
        group.order = order;
        group.name = simple_text(name);
        group
    }

    pub fn create_menu(
        &mut self,
        group_id: &str,
        menu_id: &str,
        order: u32,
        name: &str,
    ) -> &mut Menu {
        debug!("[MENU] Menu {}/{} ({})", group_id, menu_id, name);
        let menu = self.create_or_get_menu(group_id, menu_id);
        menu.order = order;
        menu.name = simple_text(name);
        menu
    }

    /// Append parameter OIDs to a menu.
    pub fn add_params_menu<S: AsRef<str>>(
        &mut self,
        group_id: &str,
        menu_id: &str,
        oids: &[S],
    ) -> &mut Menu {
        let menu = self.create_or_get_menu(group_id, menu_id);
        menu.param_oids
            .extend(oids.iter().map(|oid| oid.as_ref().to_string()));
        menu
    }

    /// Append command OIDs to a menu.
    pub fn add_commands_menu<S: AsRef<str>>(
        &mut self,
        group_id: &str,
        menu_id: &str,
        oids: &[S],
    ) -> &mut Menu {
        let menu = self.create_or_get_menu(group_id, menu_id);
        menu.command_oids
            .extend(oids.iter().map(|oid| oid.as_ref().to_string()));
        menu
    }

    pub fn group(&self, group_id: &str) -> Option<&MenuGroup> {
        self.groups.get(group_id)
    }

    pub fn groups(&self) -> &BTreeMap<String, MenuGroup> {
        &self.groups
    }

    /// Groups sorted by `order`, then id.
    pub fn ordered_groups(&self) -> Vec<(&str, &MenuGroup)> {
        let mut groups: Vec<_> = self
            .groups
            .iter()
            .map(|(id, group)| (id.as_str(), group))
            .collect();
        groups.sort_by_key(|(id, group)| (group.order, *id));
        groups
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}
