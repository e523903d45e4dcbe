use catena::param::{ParamDescriptor, ParamManager, ParamType, StructField, StructValue, Value};
use catena::{Param, ParamError};

fn manager_with_info() -> ParamManager {
    let mut manager = ParamManager::new();
    manager
        .create_param_descriptor(
            "info",
            ParamDescriptor::new("Info", ParamType::Struct).with_value(
                StructValue::default()
                    .with_value("model", "X-100")
                    .with_value("serial", 42)
                    .with_value("firmware", "1.0.3"),
            ),
        )
        .unwrap();
    manager.commit_changes().unwrap();
    manager
}

fn manager_with_list(names: &[&str]) -> ParamManager {
    let elements = names
        .iter()
        .map(|name| StructValue::default().with_value("name", *name))
        .collect();
    let mut manager = ParamManager::new();
    manager
        .create_param_descriptor(
            "list",
            ParamDescriptor::new("List", ParamType::StructArray)
                .with_value(Value::StructArray(elements)),
        )
        .unwrap();
    manager
        .create_param_descriptor("list/name", ParamDescriptor::new("Name", ParamType::String))
        .unwrap();
    manager.commit_changes().unwrap();
    manager
}

#[test]
fn test_round_trip_top_level() {
    let mut manager = ParamManager::new();
    manager
        .create_param_descriptor("gain", ParamDescriptor::new("Gain", ParamType::Float32))
        .unwrap();
    manager.commit_changes().unwrap();

    manager.set_value("gain", None, Value::Float32(0.25)).unwrap();
    manager.commit_changes().unwrap();

    assert_eq!(
        manager.get_value("gain", None).unwrap(),
        Some(Value::Float32(0.25))
    );
    assert_eq!(manager.document()["gain"].value, Value::Float32(0.25));
}

#[test]
fn test_round_trip_nested() {
    let mut manager = manager_with_info();
    manager.set_value("/info/serial", None, Value::Int32(7)).unwrap();
    manager.commit_changes().unwrap();

    assert_eq!(
        manager.get_value("info/serial", None).unwrap(),
        Some(Value::Int32(7))
    );
}

#[test]
fn test_merge_preserves_siblings() {
    let mut manager = manager_with_info();
    manager.set_value("info/serial", None, Value::Int32(7)).unwrap();
    manager.commit_changes().unwrap();

    let info = manager.document()["info"].value.as_struct().unwrap().clone();
    assert_eq!(info.fields.len(), 3);
    assert_eq!(info.value_of("model"), Some(&Value::from("X-100")));
    assert_eq!(info.value_of("firmware"), Some(&Value::from("1.0.3")));
    assert_eq!(info.value_of("serial"), Some(&Value::Int32(7)));
}

#[test]
fn test_new_field_merges_into_existing_struct() {
    let mut manager = manager_with_info();
    manager
        .create_param_descriptor(
            "info/vendor",
            ParamDescriptor::new("Vendor", ParamType::String).with_value("Acme"),
        )
        .unwrap();
    manager.commit_changes().unwrap();

    let info = &manager.document()["info"];
    let value = info.value.as_struct().unwrap();
    assert_eq!(value.fields.len(), 4);
    assert_eq!(value.value_of("vendor"), Some(&Value::from("Acme")));
    assert_eq!(info.params["vendor"].param_type, ParamType::String);
}

#[test]
fn test_type_promotion() {
    let mut manager = ParamManager::new();
    manager
        .create_param_descriptor(
            "level",
            ParamDescriptor::new("Level", ParamType::Int32).with_value(3),
        )
        .unwrap();
    manager.commit_changes().unwrap();

    manager
        .create_param_descriptor("level/min", ParamDescriptor::new("Min", ParamType::Int32))
        .unwrap();
    manager.commit_changes().unwrap();

    let level = &manager.document()["level"];
    assert_eq!(level.param_type, ParamType::Struct);
    assert!(level.params.contains_key("min"));
}

#[test]
fn test_array_addressing() {
    let mut manager = manager_with_list(&["a", "b", "c"]);
    manager
        .set_value("list/name", Some(2), Value::from("z"))
        .unwrap();
    manager.commit_changes().unwrap();

    let list = manager.document()["list"].value.as_struct_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].value_of("name"), Some(&Value::from("a")));
    assert_eq!(list[1].value_of("name"), Some(&Value::from("b")));
    assert_eq!(list[2].value_of("name"), Some(&Value::from("z")));
}

#[test]
fn test_array_write_past_unset_elements() {
    let mut manager = manager_with_list(&[]);
    manager.set_value("list/2/name", None, Value::from("foo")).unwrap();
    manager.commit_changes().unwrap();

    let list = manager.document()["list"].value.as_struct_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[2].value_of("name"), Some(&Value::from("foo")));
    assert_eq!(manager.get_value("list/0/name", None).unwrap(), None);

    // filling a gap leaves the later element alone
    manager.set_value("list/name", Some(0), Value::from("bar")).unwrap();
    manager.commit_changes().unwrap();
    let list = manager.document()["list"].value.as_struct_array().unwrap();
    assert_eq!(list[0].value_of("name"), Some(&Value::from("bar")));
    assert_eq!(list[2].value_of("name"), Some(&Value::from("foo")));
}

#[test]
fn test_subtree_commit_keeps_pending_sibling() {
    let mut manager = manager_with_info();
    manager
        .create_param_descriptor(
            "info/vendor",
            ParamDescriptor::new("Vendor", ParamType::String).with_value("Acme"),
        )
        .unwrap();
    manager.set_value("info/serial", None, Value::Int32(7)).unwrap();
    manager.commit_changes_for("info/serial").unwrap();

    let info = &manager.document()["info"];
    let value = info.value.as_struct().unwrap();
    assert_eq!(value.value_of("serial"), Some(&Value::Int32(7)));
    assert!(value.get("vendor").is_none());
    assert!(!info.params.contains_key("vendor"));
    assert!(!manager.oids().contains(&"info/vendor".to_string()));
    assert!(manager.has_pending());
    assert_eq!(
        manager.get_value("info/vendor", None).unwrap(),
        Some(Value::from("Acme"))
    );

    manager.commit_changes().unwrap();
    let value = manager.document()["info"].value.as_struct().unwrap();
    assert_eq!(value.value_of("vendor"), Some(&Value::from("Acme")));
    assert_eq!(value.value_of("serial"), Some(&Value::Int32(7)));
}

#[test]
fn test_index_under_struct_rejected() {
    let mut manager = manager_with_info();
    manager.set_value("info/0/model", None, Value::from("Y")).unwrap();
    assert!(matches!(
        manager.commit_changes(),
        Err(ParamError::StructuralViolation(_))
    ));
    // nothing leaked into the document
    let info = manager.document()["info"].value.as_struct().unwrap();
    assert_eq!(info.value_of("model"), Some(&Value::from("X-100")));
}

#[test]
fn test_unknown_oid() {
    let mut manager = manager_with_info();
    assert_eq!(manager.get_value("nope/x", None).unwrap(), None);
    assert_eq!(manager.get_param("info/missing/deep").unwrap(), None);

    manager.set_value("nope/x", None, Value::Int32(1)).unwrap();
    assert_eq!(
        manager.commit_changes(),
        Err(ParamError::UnknownOid("nope".to_string()))
    );

    manager
        .set_value("info/missing/deep", None, Value::Int32(1))
        .unwrap();
    assert_eq!(
        manager.commit_changes(),
        Err(ParamError::UnknownOid("info/missing".to_string()))
    );
}

#[test]
fn test_idempotent_commit() {
    let mut manager = manager_with_list(&["a", "b"]);
    manager.set_value("list/0/name", None, Value::from("q")).unwrap();
    manager.commit_changes().unwrap();
    let first = manager.document().clone();

    manager.commit_changes().unwrap();
    assert_eq!(manager.document(), &first);
}

#[test]
fn test_shadow_precedence() {
    let mut manager = manager_with_info();
    manager.set_value("info/serial", None, Value::Int32(99)).unwrap();

    assert!(manager.has_pending());
    assert_eq!(
        manager.get_value("info/serial", None).unwrap(),
        Some(Value::Int32(99))
    );
    let committed = manager.document()["info"].value.as_struct().unwrap();
    assert_eq!(committed.value_of("serial"), Some(&Value::Int32(42)));

    manager.commit_changes().unwrap();
    assert!(!manager.has_pending());
}

#[test]
fn test_embedded_fields_keep_their_definition() {
    let threshold = Param::new("Threshold", ParamType::Float32).with_value(-20.0f32);
    let mut manager = ParamManager::new();
    manager
        .create_param_descriptor(
            "dynamics",
            ParamDescriptor::new("Dynamics", ParamType::Struct).with_value(
                StructValue::default()
                    .with_param("threshold", threshold)
                    .with_value("ratio", 4),
            ),
        )
        .unwrap();
    manager.commit_changes().unwrap();

    manager
        .set_value("dynamics/threshold", None, Value::Float32(-12.0))
        .unwrap();
    manager.commit_changes().unwrap();

    let value = manager.document()["dynamics"].value.as_struct().unwrap();
    match value.get("threshold").unwrap() {
        StructField::Param(param) => {
            assert_eq!(param.value, Value::Float32(-12.0));
            assert_eq!(param.param_type, ParamType::Float32);
        }
        StructField::Value(_) => panic!("threshold lost its definition"),
    }
    assert!(!value.get("ratio").unwrap().is_param());
}

#[test]
fn test_reload_from_document() {
    let mut manager = manager_with_info();
    manager.set_value("info/serial", None, Value::Int32(5)).unwrap();
    manager.commit_changes().unwrap();

    let reloaded = ParamManager::from_document(manager.document().clone()).unwrap();
    assert_eq!(
        reloaded.get_value("info/serial", None).unwrap(),
        Some(Value::Int32(5))
    );
    assert_eq!(reloaded.oids(), manager.oids());
}

#[test]
fn test_clear_params() {
    let mut manager = manager_with_info();
    manager.set_value("info/serial", None, Value::Int32(1)).unwrap();
    manager.clear_params();

    assert!(manager.document().is_empty());
    assert!(!manager.has_pending());
    assert_eq!(manager.get_value("info", None).unwrap(), None);
}
