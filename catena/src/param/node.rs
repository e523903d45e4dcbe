//! Tree nodes of the parameter table.
//!
//! A `ParamNode` is one addressable point of the OID hierarchy. It holds the
//! definition (when one is known), the current value and the named children.
//! Children are keyed by their indexed sub-OID (`"gain"` or `"2/name"`), and
//! are owned by their parent; the table owns the roots.
//!
//! Writes go through `put_param` / `put_value`, which never create missing
//! intermediate nodes. `commit_value` folds the children back into the node's
//! struct (or struct-array) value, post-order, merging into the existing value
//! so untouched fields survive.

use std::collections::BTreeMap;

use crate::error::{ParamError, Result};
use crate::oid::OidStep;

use super::types::{Param, ParamType, StructField, StructValue, Value};

/// Upper bound on struct-array element indices.
pub const MAX_ELEMENTS: usize = 65_536;

#[derive(Debug, Clone)]
pub struct ParamNode {
    oid: String,
    sub_oid: String,
    index: Option<usize>,
    definition: Option<Param>,
    value: Option<Value>,
    children: BTreeMap<String, ParamNode>,
    /// The parent struct field holds a full `Param` for this node.
    embedded: bool,
    /// Commit writes the value back into `definition`.
    owns_value: bool,
}

impl ParamNode {
    pub(crate) fn root(name: &str, param: Param) -> Self {
        Self::with_definition(name.to_string(), name.to_string(), None, param, false)
    }

    fn with_definition(
        oid: String,
        sub_oid: String,
        index: Option<usize>,
        param: Param,
        embedded: bool,
    ) -> Self {
        let value = param.value.clone();
        let mut node = Self {
            oid,
            sub_oid,
            index,
            definition: Some(param),
            value: None,
            children: BTreeMap::new(),
            embedded,
            owns_value: true,
        };
        node.init_value(value);
        node
    }

    /// A node for a struct field that carries only a value. Its definition is
    /// the schema entry in the parent's `params`, resolved on lookup.
    fn bare(oid: String, sub_oid: String, index: Option<usize>, value: Value) -> Self {
        let mut node = Self {
            oid,
            sub_oid,
            index,
            definition: None,
            value: None,
            children: BTreeMap::new(),
            embedded: false,
            owns_value: false,
        };
        node.init_value(value);
        node
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn sub_oid(&self) -> &str {
        &self.sub_oid
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn definition(&self) -> Option<&Param> {
        self.definition.as_ref()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn children(&self) -> impl Iterator<Item = &ParamNode> {
        self.children.values()
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    fn child_oid(&self, step: &OidStep) -> String {
        format!("{}/{}", self.oid, step.key())
    }

    /// Replace the current value, rebuilding children from struct fields.
    pub fn init_value(&mut self, value: Value) {
        self.children.clear();
        match &value {
            Value::Struct(fields) => {
                for (name, field) in &fields.fields {
                    let child = self.materialize(None, name, field);
                    self.children.insert(name.clone(), child);
                }
            }
            Value::StructArray(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    for (name, field) in &element.fields {
                        let child = self.materialize(Some(index), name, field);
                        self.children.insert(format!("{}/{}", index, name), child);
                    }
                }
            }
            _ => {}
        }
        self.value = Some(value);
    }

    fn materialize(&self, index: Option<usize>, name: &str, field: &StructField) -> ParamNode {
        let step = OidStep {
            index,
            name: name.to_string(),
        };
        let oid = self.child_oid(&step);
        match field {
            StructField::Param(param) => {
                Self::with_definition(oid, step.name, index, (**param).clone(), true)
            }
            StructField::Value(value) => Self::bare(oid, step.name, index, value.clone()),
        }
    }

    fn aggregate_kind(&self) -> ParamType {
        match &self.definition {
            Some(def) if def.param_type.is_aggregate() => def.param_type,
            _ => match &self.value {
                Some(Value::StructArray(_)) => ParamType::StructArray,
                _ => ParamType::Struct,
            },
        }
    }

    fn check_step(&self, step: &OidStep) -> Result<()> {
        let Some(index) = step.index else {
            return Ok(());
        };
        if !self.aggregate_kind().is_struct_array() {
            return Err(ParamError::StructuralViolation(format!(
                "'{}' is not a struct array, cannot address element {}",
                self.oid, index
            )));
        }
        // unset elements below `index` are padded on commit
        if index >= MAX_ELEMENTS {
            return Err(ParamError::StructuralViolation(format!(
                "element {} of '{}' is out of range (limit {})",
                index, self.oid, MAX_ELEMENTS
            )));
        }
        Ok(())
    }

    /// Store `param` at the node addressed by `steps`.
    ///
    /// The final node is created if needed; its definition is replaced in
    /// place when it already exists. Missing intermediates are an error.
    pub(crate) fn put_param(&mut self, steps: &[OidStep], param: Param) -> Result<()> {
        let Some((step, rest)) = steps.split_first() else {
            self.replace_definition(param);
            return Ok(());
        };
        self.check_step(step)?;
        let key = step.key();

        if !rest.is_empty() {
            let child_oid = self.child_oid(step);
            return match self.children.get_mut(&key) {
                Some(child) => child.put_param(rest, param),
                None => Err(ParamError::UnknownOid(child_oid)),
            };
        }

        if step.index.is_none() {
            let element_schema = self.aggregate_kind().is_struct_array();
            // an embedded field carries its own definition in the value
            let embedded = self.children.get(&key).is_some_and(|child| child.embedded);
            if let Some(def) = self.definition.as_mut() {
                def.promote_to_struct();
                if !embedded {
                    def.params.insert(step.name.clone(), param.clone());
                }
            }
            if element_schema {
                // elements are only reachable through an index
                return Ok(());
            }
        }

        match self.children.get_mut(&key) {
            Some(child) => child.replace_definition(param),
            None => {
                let child = Self::with_definition(
                    self.child_oid(step),
                    step.name.clone(),
                    step.index,
                    param,
                    false,
                );
                self.children.insert(key, child);
            }
        }
        Ok(())
    }

    /// Store `value` at the node addressed by `steps`, creating the final node
    /// if needed. Missing intermediates are an error.
    pub(crate) fn put_value(&mut self, steps: &[OidStep], value: Value) -> Result<()> {
        let Some((step, rest)) = steps.split_first() else {
            self.init_value(value);
            return Ok(());
        };
        self.check_step(step)?;
        let key = step.key();

        if let Some(child) = self.children.get_mut(&key) {
            return child.put_value(rest, value);
        }
        if !rest.is_empty() {
            return Err(ParamError::UnknownOid(self.child_oid(step)));
        }

        if step.index.is_none() {
            if self.aggregate_kind().is_struct_array() {
                return Err(ParamError::StructuralViolation(format!(
                    "'{}' is a struct array, field '{}' needs an element index",
                    self.oid, step.name
                )));
            }
            if let Some(def) = self.definition.as_mut() {
                def.promote_to_struct();
            }
        }

        let child = Self::bare(self.child_oid(step), step.name.clone(), step.index, value);
        self.children.insert(key, child);
        Ok(())
    }

    fn replace_definition(&mut self, mut param: Param) {
        if let Some(old) = self.definition.take() {
            // child definitions the new one does not mention survive
            for (name, child) in old.params {
                param.params.entry(name).or_insert(child);
            }
        }
        self.definition = Some(param);
        self.owns_value = true;
    }

    /// Flush children into this node's value, bottom-up.
    pub(crate) fn commit_value(&mut self) {
        if !self.children.is_empty() {
            for child in self.children.values_mut() {
                child.commit_value();
            }
            self.value = Some(self.assemble());
            self.refresh_child_definitions();
        }

        if self.owns_value
            && let Some(def) = self.definition.as_mut()
            && let Some(value) = &self.value
        {
            def.value = value.clone();
        }
    }

    fn assemble(&self) -> Value {
        if self.aggregate_kind().is_struct_array() {
            let mut elements = match &self.value {
                Some(Value::StructArray(elements)) => elements.clone(),
                _ => Vec::new(),
            };
            for child in self.children.values() {
                let Some(index) = child.index else {
                    continue;
                };
                if elements.len() <= index {
                    elements.resize_with(index + 1, StructValue::default);
                }
                elements[index]
                    .fields
                    .insert(child.sub_oid.clone(), child.as_struct_field());
            }
            Value::StructArray(elements)
        } else {
            let mut fields = match &self.value {
                Some(Value::Struct(fields)) => fields.clone(),
                _ => StructValue::default(),
            };
            for child in self.children.values() {
                fields
                    .fields
                    .insert(child.sub_oid.clone(), child.as_struct_field());
            }
            Value::Struct(fields)
        }
    }

    fn as_struct_field(&self) -> StructField {
        match &self.definition {
            Some(def) if self.embedded => StructField::Param(Box::new(def.clone())),
            _ => StructField::Value(self.value.clone().unwrap_or_default()),
        }
    }

    /// Keep the child definitions recorded in `params` in step with the
    /// children that own their definition.
    fn refresh_child_definitions(&mut self) {
        let Some(def) = self.definition.as_mut() else {
            return;
        };
        for child in self.children.values() {
            if child.index.is_some() || child.embedded || !child.owns_value {
                continue;
            }
            if let (Some(slot), Some(child_def)) =
                (def.params.get_mut(&child.sub_oid), child.definition.as_ref())
            {
                *slot = child_def.clone();
            }
        }
    }

    /// Pure lookup of the node addressed by `steps`.
    pub fn get_param_ref(&self, steps: &[OidStep]) -> Option<&ParamNode> {
        let Some((step, rest)) = steps.split_first() else {
            return Some(self);
        };
        self.children.get(&step.key())?.get_param_ref(rest)
    }

    /// Definition addressed by `steps`, falling back to the schema entry in
    /// `params` for fields that have no node yet (element fields of a struct
    /// array, or elements about to be appended).
    pub fn get_param(&self, steps: &[OidStep]) -> Option<&Param> {
        self.lookup_param(steps, None)
    }

    fn lookup_param<'a>(
        &'a self,
        steps: &[OidStep],
        schema: Option<&'a Param>,
    ) -> Option<&'a Param> {
        let own = self.definition.as_ref().or(schema);
        let Some((step, rest)) = steps.split_first() else {
            return own;
        };
        let child_schema = own.and_then(|def| def.params.get(&step.name));
        match self.children.get(&step.key()) {
            Some(child) => child.lookup_param(rest, child_schema),
            None if rest.is_empty() => child_schema,
            None => None,
        }
    }

    pub fn get_value(&self, steps: &[OidStep]) -> Option<&Value> {
        self.get_param_ref(steps)?.value.as_ref()
    }

    pub(crate) fn collect_oids(&self, out: &mut Vec<String>) {
        out.push(self.oid.clone());
        for child in self.children.values() {
            child.collect_oids(out);
        }
    }
}
