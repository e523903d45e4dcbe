//! Commands: parameters that can also be invoked.

use std::collections::BTreeMap;

use super::manager::{ParamDescriptor, ParamManager};
use super::types::{Param, Value};
use crate::error::Result;

/// A [`ParamManager`] over the command document. Every command described
/// here is marked as producing a response unless told otherwise.
#[derive(Debug, Default, Clone)]
pub struct CommandManager {
    inner: ParamManager,
}

impl CommandManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: BTreeMap<String, Param>) -> Result<Self> {
        Ok(Self {
            inner: ParamManager::from_document(document)?,
        })
    }

    pub fn load_document(&mut self, document: BTreeMap<String, Param>) -> Result<()> {
        self.inner.load_document(document)
    }

    pub fn create_or_get_param(&mut self, oid: &str) -> Result<&mut Param> {
        self.inner.create_or_get_param(oid)
    }

    pub fn create_param_descriptor(
        &mut self,
        oid: &str,
        descriptor: ParamDescriptor,
    ) -> Result<&mut Param> {
        let command = self.inner.create_param_descriptor(oid, descriptor)?;
        command.response = true;
        Ok(command)
    }

    pub fn set_responds(&mut self, oid: &str, responds: bool) -> Result<()> {
        self.inner.create_or_get_param(oid)?.response = responds;
        Ok(())
    }

    pub fn set_value(&mut self, oid: &str, index: Option<u32>, value: Value) -> Result<()> {
        self.inner.set_value(oid, index, value)
    }

    pub fn get_value(&self, oid: &str, index: Option<u32>) -> Result<Option<Value>> {
        self.inner.get_value(oid, index)
    }

    pub fn get_param(&self, oid: &str) -> Result<Option<Param>> {
        self.inner.get_param(oid)
    }

    pub fn add_param_alias(&mut self, oid: &str, alias: &str) -> Result<()> {
        self.inner.add_param_alias(oid, alias)
    }

    pub fn add_param_aliases<S: AsRef<str>>(&mut self, oid: &str, aliases: &[S]) -> Result<()> {
        self.inner.add_param_aliases(oid, aliases)
    }

    pub fn commit_changes(&mut self) -> Result<()> {
        self.inner.commit_changes()
    }

    pub fn commit_changes_for(&mut self, oid: &str) -> Result<()> {
        self.inner.commit_changes_for(oid)
    }

    pub fn clear_params(&mut self) {
        self.inner.clear_params()
    }

    pub fn document(&self) -> &BTreeMap<String, Param> {
        self.inner.document()
    }

    pub fn has_pending(&self) -> bool {
        self.inner.has_pending()
    }

    pub fn oids(&self) -> Vec<String> {
        self.inner.oids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::types::ParamType;

    #[test]
    fn test_commands_respond_by_default() {
        let mut commands = CommandManager::new();
        commands
            .create_param_descriptor("foo", ParamDescriptor::new("Foo", ParamType::String))
            .unwrap();
        commands
            .create_param_descriptor("reset", ParamDescriptor::new("Reset", ParamType::Empty))
            .unwrap();
        commands.set_responds("reset", false).unwrap();
        commands.commit_changes().unwrap();

        assert!(commands.document()["foo"].response);
        assert!(!commands.document()["reset"].response);
    }
}
