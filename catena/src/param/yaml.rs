//! YAML value-override files.
//!
//! An override file assigns values to OIDs, per device slot:
//!
//! ```yaml
//! /**:
//!   values:
//!     display_name: "Studio A"
//!     audio/gain: 0.8
//!
//! /slot/2:
//!   values:
//!     display_name: "Studio B"
//!     channels:
//!       - { name: "L", level: 3 }
//!       - { name: "R", level: 4 }
//! ```
//!
//! `/**` applies to every slot, `/slot/<n>` to one. Slot-specific entries win
//! over wildcard ones regardless of their position in the file.

use std::collections::BTreeMap;
use std::path::Path;

use serde_yaml::Value as Yaml;

use super::types::{StructValue, Value};
use crate::error::{ParamError, Result};

const VALUES_KEY: &str = "values";

/// Load the overrides that apply to `slot` from a YAML file.
pub fn load_value_file(path: &Path, slot: u32) -> Result<BTreeMap<String, Value>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ParamError::InvalidConfig(format!("Failed to read override file {:?}: {}", path, e))
    })?;
    load_value_string(&content, slot)
}

/// Parse a YAML string and extract the overrides that apply to `slot`.
pub fn load_value_string(yaml: &str, slot: u32) -> Result<BTreeMap<String, Value>> {
    let doc: Yaml = serde_yaml::from_str(yaml)?;
    let mapping = doc
        .as_mapping()
        .ok_or_else(|| invalid("YAML root must be a mapping"))?;

    let mut wildcard = Vec::new();
    let mut specific = Vec::new();
    for (key, section) in mapping {
        let selector = key
            .as_str()
            .ok_or_else(|| invalid("Selectors must be strings"))?;
        match matches_slot(selector, slot)? {
            Some(true) => specific.push((selector, section)),
            Some(false) => wildcard.push((selector, section)),
            None => {}
        }
    }

    let mut result = BTreeMap::new();
    for (selector, section) in wildcard.into_iter().chain(specific) {
        let section = section
            .as_mapping()
            .ok_or_else(|| invalid(format!("Value for '{}' must be a mapping", selector)))?;
        let Some(values) = section.get(VALUES_KEY) else {
            continue;
        };
        let values = values
            .as_mapping()
            .ok_or_else(|| invalid(format!("'{}.{}' must be a mapping", selector, VALUES_KEY)))?;

        for (oid, value) in values {
            let oid = oid
                .as_str()
                .ok_or_else(|| invalid("OIDs must be strings"))?;
            if let Some(value) = yaml_to_value(oid, value)? {
                result.insert(oid.to_string(), value);
            }
        }
    }
    Ok(result)
}

/// `Some(true)` for a selector naming `slot`, `Some(false)` for the
/// wildcard, `None` when the selector does not apply.
fn matches_slot(selector: &str, slot: u32) -> Result<Option<bool>> {
    let selector = selector.strip_prefix('/').unwrap_or(selector);
    if selector == "**" {
        return Ok(Some(false));
    }
    let Some(number) = selector.strip_prefix("slot/") else {
        return Err(invalid(format!("Unknown selector '/{}'", selector)));
    };
    let selected: u32 = number
        .parse()
        .map_err(|_| invalid(format!("Bad slot number in selector '/{}'", selector)))?;
    Ok((selected == slot).then_some(true))
}

/// Convert a YAML value. `null` entries are skipped.
///
/// - integers → `Int32` (must fit), floats → `Float32`
/// - booleans → `Int32` 0 / 1
/// - strings → `String`
/// - sequences of scalars → the matching array value
/// - mappings → `Struct`, sequences of mappings → `StructArray`
fn yaml_to_value(oid: &str, val: &Yaml) -> Result<Option<Value>> {
    let value = match val {
        Yaml::Null => return Ok(None),
        Yaml::Bool(b) => Value::Int32(i32::from(*b)),
        Yaml::Number(n) if n.is_f64() => Value::Float32(n.as_f64().unwrap_or_default() as f32),
        Yaml::Number(_) => Value::Int32(yaml_to_i32(oid, val)?),
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(seq) => sequence_to_value(oid, seq)?,
        Yaml::Mapping(_) => Value::Struct(mapping_to_struct(oid, val)?),
        Yaml::Tagged(tagged) => return yaml_to_value(oid, &tagged.value),
    };
    Ok(Some(value))
}

fn yaml_to_i32(oid: &str, val: &Yaml) -> Result<i32> {
    match val {
        Yaml::Bool(b) => Ok(i32::from(*b)),
        Yaml::Number(n) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| invalid(format!("'{}': {} does not fit INT32", oid, n))),
        _ => Err(invalid(format!("'{}': expected an integer", oid))),
    }
}

fn mapping_to_struct(oid: &str, val: &Yaml) -> Result<StructValue> {
    let mapping = val
        .as_mapping()
        .ok_or_else(|| invalid(format!("'{}': expected a mapping", oid)))?;
    let mut fields = StructValue::default();
    for (name, field) in mapping {
        let name = name
            .as_str()
            .ok_or_else(|| invalid(format!("'{}': field names must be strings", oid)))?;
        let field_oid = format!("{}/{}", oid, name);
        if let Some(value) = yaml_to_value(&field_oid, field)? {
            fields = fields.with_value(name, value);
        }
    }
    Ok(fields)
}

fn sequence_to_value(oid: &str, seq: &[Yaml]) -> Result<Value> {
    let Some(first) = seq.first() else {
        return Ok(Value::StringArray(Vec::new()));
    };

    match first {
        Yaml::Mapping(_) => seq
            .iter()
            .map(|v| mapping_to_struct(oid, v))
            .collect::<Result<Vec<_>>>()
            .map(Value::StructArray),
        Yaml::String(_) => seq
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(format!("'{}': mixed sequence", oid)))
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::StringArray),
        Yaml::Number(_) | Yaml::Bool(_) => {
            // one float makes the whole sequence FLOAT32
            if seq.iter().any(|v| matches!(v, Yaml::Number(n) if n.is_f64())) {
                seq.iter()
                    .map(|v| {
                        v.as_f64()
                            .map(|f| f as f32)
                            .ok_or_else(|| invalid(format!("'{}': mixed sequence", oid)))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Float32Array)
            } else {
                seq.iter()
                    .map(|v| yaml_to_i32(oid, v))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Int32Array)
            }
        }
        _ => Err(invalid(format!("'{}': unsupported sequence", oid))),
    }
}

fn invalid(reason: impl Into<String>) -> ParamError {
    ParamError::InvalidConfig(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML_SAMPLE: &str = r#"
/**:
  values:
    display_name: "Studio"
    level: 42
    gain: 2.5
    enabled: true

/slot/1:
  values:
    display_name: "Studio A"
    slot_only: 99

/slot/2:
  values:
    not_mine: 1
"#;

    #[test]
    fn test_wildcard_and_slot() {
        let values = load_value_string(YAML_SAMPLE, 1).unwrap();
        assert_eq!(values["level"], Value::Int32(42));
        assert_eq!(values["gain"], Value::Float32(2.5));
        assert_eq!(values["enabled"], Value::Int32(1));
        assert_eq!(values["slot_only"], Value::Int32(99));
        assert!(!values.contains_key("not_mine"));
    }

    #[test]
    fn test_specific_wins_regardless_of_order() {
        let yaml = r#"
/slot/1:
  values:
    display_name: "Studio A"
/**:
  values:
    display_name: "Studio"
"#;
        let values = load_value_string(yaml, 1).unwrap();
        assert_eq!(values["display_name"], Value::from("Studio A"));

        let values = load_value_string(yaml, 3).unwrap();
        assert_eq!(values["display_name"], Value::from("Studio"));
    }

    #[test]
    fn test_arrays_and_structs() {
        let yaml = r#"
/**:
  values:
    ints: [1, 2, 3]
    floats: [1, 2.5]
    names: ["a", "b"]
    info: { model: "X-100", serial: 7 }
    channels:
      - { name: "L", level: 3 }
      - { name: "R", level: 4 }
"#;
        let values = load_value_string(yaml, 0).unwrap();
        assert_eq!(values["ints"], Value::Int32Array(vec![1, 2, 3]));
        assert_eq!(values["floats"], Value::Float32Array(vec![1.0, 2.5]));
        assert_eq!(
            values["names"],
            Value::StringArray(vec!["a".to_string(), "b".to_string()])
        );
        let info = values["info"].as_struct().unwrap();
        assert_eq!(info.value_of("serial"), Some(&Value::Int32(7)));

        let channels = values["channels"].as_struct_array().unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[1].value_of("name"), Some(&Value::from("R")));
    }

    #[test]
    fn test_out_of_range_integer() {
        let yaml = "/**:\n  values:\n    big: 3000000000\n";
        assert!(matches!(
            load_value_string(yaml, 0),
            Err(ParamError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bad_selectors() {
        assert!(load_value_string("/node:\n  values: {}\n", 0).is_err());
        assert!(load_value_string("/slot/x:\n  values: {}\n", 0).is_err());
        assert!(load_value_string("- 1\n", 0).is_err());
    }

    #[test]
    fn test_matches_slot() {
        assert_eq!(matches_slot("/**", 4).unwrap(), Some(false));
        assert_eq!(matches_slot("/slot/4", 4).unwrap(), Some(true));
        assert_eq!(matches_slot("slot/4", 5).unwrap(), None);
    }
}
