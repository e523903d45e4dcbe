//! Staged parameter management.
//!
//! `ParamManager` is the API device code and request handlers use. Writes
//! land in two staging buffers (`staged_params` for definitions,
//! `staged_values` for values) keyed by canonical OID. Reads see staged data
//! first. `commit_changes` replays the staged entries into the [`ParamTable`]
//! in path order (parents before their descendants) and lets the table write
//! the committed definitions into the device document.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::constraint::Constraint;
use crate::error::{ParamError, Result};
use crate::oid::OidPath;
use crate::text::simple_text;

use super::table::ParamTable;
use super::types::{Param, ParamType, Value};

/// Everything needed to describe a parameter in one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamDescriptor {
    pub name: String,
    pub param_type: ParamType,
    pub read_only: bool,
    pub value: Value,
    pub constraint: Option<Constraint>,
    /// Widget hint name; `None` leaves the default widget
    pub widget: Option<String>,
    pub precision: u32,
    pub access_scope: String,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn with_widget(mut self, widget: impl Into<String>) -> Self {
        self.widget = Some(widget.into());
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_access_scope(mut self, scope: impl Into<String>) -> Self {
        self.access_scope = scope.into();
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Overwrite the described attributes of `param`. Child definitions and
    /// aliases already on `param` are kept.
    fn apply_to(self, param: &mut Param) {
        param.name = simple_text(self.name);
        param.param_type = self.param_type;
        param.read_only = self.read_only;
        param.value = self.value;
        param.constraint = self.constraint;
        param.precision = self.precision;
        param.access_scope = self.access_scope;
        param.widget = None;
        if let Some(widget) = self.widget {
            param.set_widget_hint_name(&widget);
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ParamManager {
    table: ParamTable,
    document: BTreeMap<String, Param>,
    staged_params: BTreeMap<String, Param>,
    staged_values: BTreeMap<String, Value>,
}

impl ParamManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager over an already committed document.
    pub fn from_document(document: BTreeMap<String, Param>) -> Result<Self> {
        let mut manager = Self::new();
        manager.load_document(document)?;
        Ok(manager)
    }

    /// Replace the canonical state with `document`, dropping staged data.
    pub fn load_document(&mut self, document: BTreeMap<String, Param>) -> Result<()> {
        self.table.update_from(&document)?;
        self.document = document;
        self.staged_params.clear();
        self.staged_values.clear();
        Ok(())
    }

    /// Resolve the definition at `oid`, creating it (and every missing
    /// ancestor) when it does not exist yet.
    ///
    /// The returned definition is staged: edits made through the reference
    /// become visible in the document on the next commit. Nothing is written
    /// to the table until then.
    pub fn create_or_get_param(&mut self, oid: &str) -> Result<&mut Param> {
        let path = OidPath::parse(oid)?;
        let key = path.to_string();
        if !self.staged_params.contains_key(&key) {
            let param = match self.table.get_param(&key) {
                Some(existing) => existing.clone(),
                None => self.create_param(&path)?,
            };
            self.staged_params.insert(key.clone(), param);
        }
        Ok(self.staged_params.entry(key).or_default())
    }

    fn create_param(&mut self, path: &OidPath) -> Result<Param> {
        if let (Some(parent), Some(step)) = (path.parent(), path.last()) {
            let parent_key = parent.to_string();
            // a committed parent is promoted by the table when the child lands
            if self.staged_params.contains_key(&parent_key)
                || !self.table.contains(&parent_key)
            {
                let parent_param = self.create_or_get_param(&parent_key)?;
                parent_param.promote_to_struct();
                if step.index.is_none() {
                    parent_param.params.entry(step.name.clone()).or_default();
                }
            }
        }
        debug!("[PARAMS] Created parameter {}", path);
        Ok(Param::default())
    }

    /// Describe the parameter at `oid` in one call and stage it.
    pub fn create_param_descriptor(
        &mut self,
        oid: &str,
        descriptor: ParamDescriptor,
    ) -> Result<&mut Param> {
        let param = self.create_or_get_param(oid)?;
        descriptor.apply_to(param);
        Ok(param)
    }

    fn resolve_key(oid: &str, index: Option<u32>) -> Result<String> {
        let mut path = OidPath::parse(oid)?;
        if let Some(index) = index {
            path = path.with_element_index(index as usize);
        }
        Ok(path.to_string())
    }

    /// Stage a value. `index` selects an element of a top-level struct-array
    /// and is ignored for top-level OIDs.
    pub fn set_value(&mut self, oid: &str, index: Option<u32>, value: Value) -> Result<()> {
        let key = Self::resolve_key(oid, index)?;
        debug!("[PARAMS] Staged value for {}", key);
        self.staged_values.insert(key, value);
        Ok(())
    }

    pub fn get_value(&self, oid: &str, index: Option<u32>) -> Result<Option<Value>> {
        let key = Self::resolve_key(oid, index)?;
        if let Some(value) = self.staged_values.get(&key) {
            return Ok(Some(value.clone()));
        }
        if let Some(param) = self.staged_params.get(&key)
            && !param.value.is_undefined()
        {
            return Ok(Some(param.value.clone()));
        }
        Ok(self.table.get_value(&key).cloned())
    }

    pub fn get_param(&self, oid: &str) -> Result<Option<Param>> {
        let key = OidPath::parse(oid)?.to_string();
        if let Some(param) = self.staged_params.get(&key) {
            return Ok(Some(param.clone()));
        }
        Ok(self.table.get_param(&key).cloned())
    }

    pub fn add_param_alias(&mut self, oid: &str, alias: &str) -> Result<()> {
        self.create_or_get_param(oid)?.add_oid_alias(alias);
        Ok(())
    }

    pub fn add_param_aliases<S: AsRef<str>>(&mut self, oid: &str, aliases: &[S]) -> Result<()> {
        let param = self.create_or_get_param(oid)?;
        for alias in aliases {
            param.add_oid_alias(alias.as_ref());
        }
        Ok(())
    }

    /// Flush every staged entry into the table and the document.
    ///
    /// An entry that fails is dropped; the remaining entries are still
    /// applied and the first failure is returned.
    #[tracing::instrument(skip(self))]
    pub fn commit_changes(&mut self) -> Result<()> {
        let staged = self.staged_paths(|_| true);
        let result = self.apply_all(staged);
        self.table.commit_changes(&mut self.document);
        result
    }

    /// Like [`ParamManager::commit_changes`], limited to `oid` and the entries
    /// below it.
    #[tracing::instrument(skip(self))]
    pub fn commit_changes_for(&mut self, oid: &str) -> Result<()> {
        let path = OidPath::parse(oid)?;
        let key = path.to_string();
        let prefix = format!("{}/", key);
        let staged = self.staged_paths(|k| k == key || k.starts_with(&prefix));
        let result = self.apply_all(staged);
        self.table.commit_root(path.root(), &mut self.document);
        result
    }

    fn staged_paths(&self, select: impl Fn(&str) -> bool) -> BTreeSet<OidPath> {
        self.staged_params
            .keys()
            .chain(self.staged_values.keys())
            .filter(|key| select(key))
            .filter_map(|key| OidPath::parse(key).ok())
            .collect()
    }

    fn apply_all(&mut self, staged: BTreeSet<OidPath>) -> Result<()> {
        let mut first_error: Option<ParamError> = None;
        for path in staged {
            let key = path.to_string();
            if let Err(e) = self.apply_staged(&key) {
                warn!("[PARAMS] Dropped staged change for {}: {}", key, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn apply_staged(&mut self, key: &str) -> Result<()> {
        let staged_param = self.staged_params.remove(key);
        let staged_value = self.staged_values.remove(key);

        if let Some(param) = staged_param {
            let value = param.value.clone();
            self.table.put_param(key, param)?;
            // replacing a definition keeps the node's value, carry the new one
            if staged_value.is_none()
                && !value.is_undefined()
                && self.table.contains(key)
                && self.table.get_value(key) != Some(&value)
            {
                self.table.put_value(key, value)?;
            }
        }
        if let Some(value) = staged_value {
            self.table.put_value(key, value)?;
        }
        Ok(())
    }

    /// Drop all parameters, staged or committed.
    pub fn clear_params(&mut self) {
        self.table.clear();
        self.document.clear();
        self.staged_params.clear();
        self.staged_values.clear();
    }

    /// The committed document.
    pub fn document(&self) -> &BTreeMap<String, Param> {
        &self.document
    }

    pub fn has_pending(&self) -> bool {
        !self.staged_params.is_empty() || !self.staged_values.is_empty()
    }

    /// Committed OIDs, sorted.
    pub fn oids(&self) -> Vec<String> {
        self.table.oids()
    }
}
