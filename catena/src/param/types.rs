//! Parameter definitions and values.
//!
//! `Param` is the canonical, serializable form of a parameter: the thing that
//! lands in the device document. Values are a tagged union; struct values map
//! field names to `StructField`s, which are either a full nested `Param` or a
//! bare `Value` typed by the parent's schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::payload::DataPayload;
use crate::text::{PolyglotText, simple_text};

/// The declared type of a parameter.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ParamType {
    #[default]
    Undefined,
    Empty,
    Int32,
    Float32,
    String,
    /// Binary data payload
    Data,
    Int32Array,
    Float32Array,
    StringArray,
    Struct,
    StructArray,
    StructVariant,
    StructVariantArray,
}

impl ParamType {
    /// Types whose parameters may have named children.
    pub fn is_aggregate(self) -> bool {
        matches!(
            self,
            Self::Struct | Self::StructArray | Self::StructVariant | Self::StructVariantArray
        )
    }

    /// Types whose children are addressed by an element index.
    pub fn is_struct_array(self) -> bool {
        matches!(self, Self::StructArray | Self::StructVariantArray)
    }

    /// Whether a value of the given kind may be stored under this type.
    pub fn accepts(self, value: &Value) -> bool {
        let actual = value.param_type();
        match (self, actual) {
            (_, Self::Undefined) | (Self::Undefined, _) => true,
            (Self::Struct | Self::StructVariant, Self::Struct) => true,
            (Self::StructArray | Self::StructVariantArray, Self::StructArray) => true,
            (expected, actual) => expected == actual,
        }
    }
}

/// A parameter value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value set
    #[default]
    #[serde(rename = "undefined_value")]
    Undefined,
    #[serde(rename = "empty_value")]
    Empty,
    #[serde(rename = "int32_value")]
    Int32(i32),
    #[serde(rename = "float32_value")]
    Float32(f32),
    #[serde(rename = "string_value")]
    String(String),
    #[serde(rename = "data_payload")]
    Data(DataPayload),
    #[serde(rename = "int32_array_values")]
    Int32Array(Vec<i32>),
    #[serde(rename = "float32_array_values")]
    Float32Array(Vec<f32>),
    #[serde(rename = "string_array_values")]
    StringArray(Vec<String>),
    #[serde(rename = "struct_value")]
    Struct(StructValue),
    #[serde(rename = "struct_array_values")]
    StructArray(Vec<StructValue>),
}

impl Value {
    /// The parameter type a value of this kind corresponds to.
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Undefined => ParamType::Undefined,
            Self::Empty => ParamType::Empty,
            Self::Int32(_) => ParamType::Int32,
            Self::Float32(_) => ParamType::Float32,
            Self::String(_) => ParamType::String,
            Self::Data(_) => ParamType::Data,
            Self::Int32Array(_) => ParamType::Int32Array,
            Self::Float32Array(_) => ParamType::Float32Array,
            Self::StringArray(_) => ParamType::StringArray,
            Self::Struct(_) => ParamType::Struct,
            Self::StructArray(_) => ParamType::StructArray,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Self::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct_array(&self) -> Option<&[StructValue]> {
        match self {
            Self::StructArray(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<StructValue> for Value {
    fn from(v: StructValue) -> Self {
        Self::Struct(v)
    }
}

impl From<DataPayload> for Value {
    fn from(v: DataPayload) -> Self {
        Self::Data(v)
    }
}

/// Field name → field of a struct value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructValue {
    #[serde(default)]
    pub fields: BTreeMap<String, StructField>,
}

impl StructValue {
    /// Builder-style insert of a bare value field.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .insert(name.into(), StructField::Value(value.into()));
        self
    }

    /// Builder-style insert of a fully described field.
    pub fn with_param(mut self, name: impl Into<String>, param: Param) -> Self {
        self.fields
            .insert(name.into(), StructField::Param(Box::new(param)));
        self
    }

    pub fn get(&self, name: &str) -> Option<&StructField> {
        self.fields.get(name)
    }

    /// The value of a field, whichever form the field takes.
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).map(StructField::value)
    }
}

/// A struct field: a full nested parameter or a bare value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StructField {
    #[serde(rename = "param")]
    Param(Box<Param>),
    #[serde(rename = "value")]
    Value(Value),
}

impl StructField {
    pub fn value(&self) -> &Value {
        match self {
            Self::Param(param) => &param.value,
            Self::Value(value) => value,
        }
    }

    pub fn is_param(&self) -> bool {
        matches!(self, Self::Param(_))
    }
}

/// UI affordance hint, consumed only by client presentation.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum WidgetHint {
    #[default]
    Default,
    Button,
    TextDisplay,
    TextEntry,
    Hidden,
    Label,
    Toggle,
    RadioButtons,
    Checkbox,
    ColorChooser,
    Dot,
    ComboBox,
    List,
    DatePicker,
    EqGraph,
    LineGraph,
    MultiLineText,
    Password,
    Slider,
    Fader,
    Wheel,
    Spinner,
    Tree,
    Joystick,
    Progress,
    Table,
    FileChooser,
}

impl WidgetHint {
    /// Parse any of `TEXT_DISPLAY`, `text_display` or `text-display`.
    pub fn from_name(name: &str) -> Option<Self> {
        name.trim().replace('_', "-").parse().ok()
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

/// A parameter (or command) definition together with its current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Param {
    #[serde(skip_serializing_if = "PolyglotText::is_empty")]
    pub name: PolyglotText,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(skip_serializing_if = "is_false")]
    pub read_only: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub precision: u32,
    /// Authorization scope; empty means the device default
    #[serde(skip_serializing_if = "String::is_empty")]
    pub access_scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub oid_aliases: Vec<String>,
    /// Set on commands that produce a response
    #[serde(skip_serializing_if = "is_false")]
    pub response: bool,
    #[serde(skip_serializing_if = "Value::is_undefined")]
    pub value: Value,
    /// Child definitions, only for aggregate types
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Param>,
}

impl Param {
    pub fn new(name: &str, param_type: ParamType) -> Self {
        Self {
            name: simple_text(name),
            param_type,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Store the canonical name of `hint`; `Default` clears the annotation.
    pub fn set_widget_hint(&mut self, hint: WidgetHint) -> &mut Self {
        self.widget = match hint {
            WidgetHint::Default => None,
            hint => Some(hint.to_string()),
        };
        self
    }

    /// Like [`Param::set_widget_hint`] for a free-form name. Unknown names are
    /// kept lowercased so clients can still act on custom hints.
    pub fn set_widget_hint_name(&mut self, name: &str) -> &mut Self {
        match WidgetHint::from_name(name) {
            Some(hint) => self.set_widget_hint(hint),
            None => {
                self.widget = Some(name.trim().to_lowercase());
                self
            }
        }
    }

    pub fn widget_hint(&self) -> WidgetHint {
        self.widget
            .as_deref()
            .and_then(WidgetHint::from_name)
            .unwrap_or_default()
    }

    pub fn add_oid_alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.oid_aliases.push(alias.into());
        self
    }

    /// Promote a non-aggregate parameter to `STRUCT` so it can hold children.
    pub fn promote_to_struct(&mut self) {
        if !self.param_type.is_aggregate() {
            self.param_type = ParamType::Struct;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(ParamType::StructArray.to_string(), "STRUCT_ARRAY");
        assert_eq!("int32".parse::<ParamType>().unwrap(), ParamType::Int32);
        assert!(ParamType::StructVariantArray.is_struct_array());
        assert!(!ParamType::String.is_aggregate());
    }

    #[test]
    fn test_accepts() {
        assert!(ParamType::Int32.accepts(&Value::Int32(1)));
        assert!(!ParamType::Int32.accepts(&Value::Float32(1.0)));
        assert!(ParamType::StructVariant.accepts(&Value::Struct(StructValue::default())));
        assert!(ParamType::String.accepts(&Value::Undefined));
    }

    #[test]
    fn test_widget_hint_normalized() {
        let mut param = Param::new("Title", ParamType::String);
        param.set_widget_hint_name("TEXT_DISPLAY");
        assert_eq!(param.widget.as_deref(), Some("text-display"));
        assert_eq!(param.widget_hint(), WidgetHint::TextDisplay);

        param.set_widget_hint(WidgetHint::Default);
        assert_eq!(param.widget, None);

        param.set_widget_hint_name("default");
        assert_eq!(param.widget, None);

        param.set_widget_hint_name("Knob");
        assert_eq!(param.widget.as_deref(), Some("knob"));
        assert_eq!(param.widget_hint(), WidgetHint::Default);
    }

    #[test]
    fn test_struct_value_field_duality() {
        let inner = Param::new("Gain", ParamType::Float32).with_value(0.5f32);
        let value = StructValue::default()
            .with_value("name", "mic")
            .with_param("gain", inner);
        assert_eq!(value.value_of("name"), Some(&Value::from("mic")));
        assert_eq!(value.value_of("gain"), Some(&Value::Float32(0.5)));
        assert!(value.get("gain").unwrap().is_param());
    }

    #[test]
    fn test_param_serializes_minimal() {
        let param = Param::new("Level", ParamType::Int32).with_value(3);
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["type"], "INT32");
        assert_eq!(json["value"]["int32_value"], 3);
        assert!(json.get("widget").is_none());
        assert!(json.get("read_only").is_none());

        let back: Param = serde_json::from_value(json).unwrap();
        assert_eq!(back, param);
    }
}
