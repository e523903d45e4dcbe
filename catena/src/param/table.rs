//! The canonical parameter tree of one device.
//!
//! `ParamTable` owns one [`ParamNode`] per top-level parameter and is the only
//! code that writes committed definitions back into the device document.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{ParamError, Result};
use crate::oid::{self, OidPath};

use super::node::ParamNode;
use super::types::{Param, Value};

#[derive(Debug, Default, Clone)]
pub struct ParamTable {
    roots: BTreeMap<String, ParamNode>,
}

impl ParamTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the definition addressed by `oid`.
    pub fn put_param(&mut self, oid: &str, param: Param) -> Result<()> {
        let path = OidPath::parse(oid)?;
        if path.is_top_level() {
            match self.roots.get_mut(path.root()) {
                Some(root) => root.put_param(&[], param)?,
                None => {
                    let root = ParamNode::root(path.root(), param);
                    self.roots.insert(path.root().to_string(), root);
                }
            }
            return Ok(());
        }
        self.root_mut(&path)?.put_param(path.steps(), param)
    }

    /// Store `value` at `oid`. The root must already exist.
    pub fn put_value(&mut self, oid: &str, value: Value) -> Result<()> {
        let path = OidPath::parse(oid)?;
        self.root_mut(&path)?.put_value(path.steps(), value)
    }

    fn root_mut(&mut self, path: &OidPath) -> Result<&mut ParamNode> {
        self.roots
            .get_mut(path.root())
            .ok_or_else(|| ParamError::UnknownOid(path.root().to_string()))
    }

    pub fn node(&self, oid: &str) -> Option<&ParamNode> {
        let path = OidPath::parse(oid).ok()?;
        self.roots.get(path.root())?.get_param_ref(path.steps())
    }

    pub fn get_param(&self, oid: &str) -> Option<&Param> {
        let path = OidPath::parse(oid).ok()?;
        self.roots.get(path.root())?.get_param(path.steps())
    }

    pub fn get_value(&self, oid: &str) -> Option<&Value> {
        self.node(oid)?.value()
    }

    pub fn contains(&self, oid: &str) -> bool {
        self.node(oid).is_some()
    }

    /// Every addressable node OID, sorted.
    pub fn oids(&self) -> Vec<String> {
        let mut out = Vec::new();
        for root in self.roots.values() {
            root.collect_oids(&mut out);
        }
        out.sort();
        out
    }

    /// Commit every root and write the results into `document`.
    pub fn commit_changes(&mut self, document: &mut BTreeMap<String, Param>) {
        for (name, root) in self.roots.iter_mut() {
            root.commit_value();
            if let Some(def) = root.definition() {
                document.insert(name.clone(), def.clone());
            }
        }
        debug!("[PARAMS] Committed {} roots", self.roots.len());
    }

    /// Commit a single root. Unknown names are ignored.
    pub fn commit_root(&mut self, name: &str, document: &mut BTreeMap<String, Param>) {
        if let Some(root) = self.roots.get_mut(name) {
            root.commit_value();
            if let Some(def) = root.definition() {
                document.insert(name.to_string(), def.clone());
            }
        }
    }

    /// Rebuild every root from a committed document.
    pub fn update_from(&mut self, document: &BTreeMap<String, Param>) -> Result<()> {
        let mut roots = BTreeMap::new();
        for (name, param) in document {
            let name = oid::validate_top_level(name)?;
            roots.insert(name.to_string(), ParamNode::root(name, param.clone()));
        }
        self.roots = roots;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.roots.clear();
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
