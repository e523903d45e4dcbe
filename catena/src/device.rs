//! A device slot: parameters, commands and menus behind one API.
//!
//! `Device` is the seam the RPC layer talks to. It validates writes against
//! the declared definitions (read-only flag, type tag, constraint), stages
//! them in the [`ParamManager`], and pushes every accepted write to the
//! subscribers returned by [`Device::subscribe`]. Commits are explicit.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ParamError, Result};
use crate::menu::{MenuGroup, MenuGroupManager};
use crate::oid::OidPath;
use crate::param::yaml;
use crate::param::{CommandManager, Param, ParamManager, Value};

/// Per-device lock; one `set_value → commit` turn at a time.
pub type SharedDevice = Arc<Mutex<Device>>;

/// The serializable device document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceModel {
    pub slot: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default_scope: String,
    pub params: BTreeMap<String, Param>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, Param>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub menu_groups: BTreeMap<String, MenuGroup>,
}

impl DeviceModel {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ParamError::InvalidConfig(format!("Failed to read device model {:?}: {}", path, e))
        })?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A value change accepted by [`Device::set_value`].
#[derive(Debug, Clone, PartialEq)]
pub struct PushUpdate {
    pub slot: u32,
    pub oid: String,
    pub element_index: Option<u32>,
    pub value: Value,
}

#[derive(Debug, Default)]
pub struct Device {
    slot: u32,
    default_scope: String,
    params: ParamManager,
    commands: CommandManager,
    menus: MenuGroupManager,
    subscribers: Vec<flume::Sender<PushUpdate>>,
}

impl Device {
    pub fn new(slot: u32) -> Self {
        Self {
            slot,
            ..Default::default()
        }
    }

    pub fn from_model(model: DeviceModel) -> Result<Self> {
        let device = Self {
            slot: model.slot,
            default_scope: model.default_scope,
            params: ParamManager::from_document(model.params)?,
            commands: CommandManager::from_document(model.commands)?,
            menus: MenuGroupManager::from_groups(model.menu_groups),
            subscribers: Vec::new(),
        };
        info!(
            "[DEVICE] Loaded slot {} with {} params, {} commands",
            device.slot,
            device.params.document().len(),
            device.commands.document().len()
        );
        Ok(device)
    }

    pub fn into_shared(self) -> SharedDevice {
        Arc::new(Mutex::new(self))
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn default_scope(&self) -> &str {
        &self.default_scope
    }

    pub fn set_default_scope(&mut self, scope: impl Into<String>) {
        self.default_scope = scope.into();
    }

    pub fn params(&self) -> &ParamManager {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamManager {
        &mut self.params
    }

    pub fn commands(&self) -> &CommandManager {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandManager {
        &mut self.commands
    }

    pub fn menus(&self) -> &MenuGroupManager {
        &self.menus
    }

    pub fn menus_mut(&mut self) -> &mut MenuGroupManager {
        &mut self.menus
    }

    /// Receive every accepted write from now on.
    pub fn subscribe(&mut self) -> flume::Receiver<PushUpdate> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn get_value(&self, oid: &str, index: Option<u32>) -> Result<Value> {
        self.params
            .get_value(oid, index)?
            .ok_or_else(|| ParamError::UnknownOid(oid.to_string()))
    }

    pub fn get_param(&self, oid: &str) -> Result<Param> {
        self.params
            .get_param(oid)?
            .ok_or_else(|| ParamError::UnknownOid(oid.to_string()))
    }

    /// Resolve a command definition for dispatch.
    pub fn command(&self, oid: &str) -> Result<Param> {
        self.commands
            .get_param(oid)?
            .ok_or_else(|| ParamError::UnknownOid(oid.to_string()))
    }

    /// Validate and stage a client write, then notify subscribers.
    pub fn set_value(&mut self, oid: &str, index: Option<u32>, value: Value) -> Result<()> {
        self.stage(oid, index, value, true)
    }

    fn stage(
        &mut self,
        oid: &str,
        index: Option<u32>,
        value: Value,
        client: bool,
    ) -> Result<()> {
        let path = OidPath::parse(oid)?;
        let mut target = path.clone();
        if let Some(index) = index {
            target = target.with_element_index(index as usize);
        }
        let key = target.to_string();

        let value = self.validate(&target, value, client)?;
        self.params.set_value(&key, None, value.clone())?;

        let update = PushUpdate {
            slot: self.slot,
            oid: path.to_string(),
            element_index: index,
            value,
        };
        debug!("[DEVICE] {} set on slot {}", key, self.slot);
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
        Ok(())
    }

    /// Check `value` against the definition at `target` and coerce it into
    /// the definition's constraint.
    fn validate(&self, target: &OidPath, value: Value, client: bool) -> Result<Value> {
        let key = target.to_string();
        let definition = self.params.get_param(&key)?;
        let current = self.params.get_value(&key, None)?;

        let Some(definition) = definition else {
            // bare struct field without schema: keep the kind it already has
            return match current {
                Some(current) if current.param_type().accepts(&value) => Ok(value),
                Some(current) => Err(ParamError::TypeMismatch {
                    oid: key,
                    expected: current.param_type(),
                    actual: value.param_type(),
                }),
                None => Err(ParamError::UnknownOid(key)),
            };
        };

        if client && self.is_read_only(target, &definition)? {
            return Err(ParamError::ReadOnly(key));
        }
        if !definition.param_type.accepts(&value) {
            return Err(ParamError::TypeMismatch {
                oid: key,
                expected: definition.param_type,
                actual: value.param_type(),
            });
        }
        Ok(match &definition.constraint {
            Some(constraint) => constraint.apply(&value),
            None => value,
        })
    }

    /// A read-only root makes its whole subtree read-only.
    fn is_read_only(&self, target: &OidPath, definition: &Param) -> Result<bool> {
        if definition.read_only {
            return Ok(true);
        }
        if target.is_top_level() {
            return Ok(false);
        }
        Ok(self
            .params
            .get_param(target.root())?
            .is_some_and(|root| root.read_only))
    }

    /// Stage configuration overrides and commit them.
    ///
    /// Overrides may target read-only parameters. Entries that fail
    /// validation are skipped; the first failure is returned once the rest
    /// were committed.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, Value>) -> Result<()> {
        let mut first_error = None;
        for (oid, value) in overrides {
            if let Err(e) = self.stage(oid, None, value.clone(), false) {
                warn!("[DEVICE] Skipped override for {}: {}", oid, e);
                first_error.get_or_insert(e);
            }
        }
        let committed = self.params.commit_changes();
        match first_error {
            Some(e) => Err(e),
            None => committed,
        }
    }

    /// Load the overrides for this slot from a YAML file and apply them.
    pub fn apply_override_file(&mut self, path: &Path) -> Result<()> {
        let overrides = yaml::load_value_file(path, self.slot)?;
        info!(
            "[DEVICE] Applying {} overrides from {:?}",
            overrides.len(),
            path
        );
        self.apply_overrides(&overrides)
    }

    /// Commit both managers. The first failure is returned after both ran.
    pub fn commit(&mut self) -> Result<()> {
        let params = self.params.commit_changes();
        let commands = self.commands.commit_changes();
        params.and(commands)
    }

    /// Commit pending changes and snapshot the device document.
    pub fn model(&mut self) -> Result<DeviceModel> {
        self.commit()?;
        Ok(DeviceModel {
            slot: self.slot,
            default_scope: self.default_scope.clone(),
            params: self.params.document().clone(),
            commands: self.commands.document().clone(),
            menu_groups: self.menus.groups().clone(),
        })
    }
}
