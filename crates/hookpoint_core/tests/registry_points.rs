use hookpoint_core::{Extension, FanOutPolicy, MethodError, Registry, RegistryConfig};
use serde_json::json;

#[test]
fn registry_creates_points_lazily_and_lists_keys() {
    let mut registry = Registry::<()>::new();
    assert!(registry.keys().is_empty());

    registry.point("menu");
    registry.point_default();
    registry.point("menu");

    let keys = registry.keys();
    assert_eq!(keys.len(), 2);
    assert!(keys.contains("menu"));
    assert!(keys.contains(""));
    assert_eq!(registry.point_default().id(), "");
}

#[test]
fn points_are_independent() {
    let mut registry = Registry::<()>::new();
    registry
        .point("menu")
        .extend(Extension::new("file"))
        .expect("extend should succeed");
    registry
        .point("toolbar")
        .extend(Extension::new("file").before("save"))
        .expect("extend should succeed");

    assert_eq!(registry.point("menu").count(), 1);
    assert_eq!(registry.point("toolbar").count(), 0);
    assert_eq!(
        registry.get("toolbar").map(|point| point.pending_ids().len()),
        Some(1)
    );
}

#[test]
fn disable_filters_view_without_reordering() {
    let mut registry = Registry::<()>::new();
    let point = registry.point("menu");
    for (id, index) in [("file", 1), ("edit", 2), ("view", 3)] {
        point
            .extend(Extension::new(id).with_index(index))
            .expect("extend should succeed");
    }

    point.disable("edit");
    assert!(!point.is_enabled("edit"));
    assert!(point.is_enabled("file"));
    assert_eq!(point.count(), 2);
    assert_eq!(point.pluck("id"), vec![Some(json!("file")), Some(json!("view"))]);
    assert_eq!(point.extensions().len(), 3);
    assert_eq!(point.extensions()[1].id(), "edit");

    point.enable("edit");
    assert_eq!(
        point.pluck("id"),
        vec![Some(json!("file")), Some(json!("edit")), Some(json!("view"))]
    );

    point.disable("*");
    assert_eq!(point.count(), 0);
    assert!(point.list().is_empty());
    assert!(!point.is_enabled("file"));

    point.enable("*");
    assert_eq!(point.count(), 3);
}

#[test]
fn disabling_unknown_id_is_remembered_for_later_registration() {
    let mut registry = Registry::<()>::new();
    let point = registry.point("menu");
    point.disable("help");
    point
        .extend(Extension::new("help"))
        .expect("extend should succeed");

    assert!(point.has("help"));
    assert_eq!(point.count(), 0);
}

#[test]
fn registry_config_controls_fan_out_policy() {
    let config = RegistryConfig::from_json(r#"{"point":{"fan_out":"stop_on_first_error"}}"#)
        .expect("config should parse");
    let mut registry = Registry::<Vec<String>>::with_config(config);
    let point = registry.point("save");
    assert_eq!(point.config().fan_out, FanOutPolicy::StopOnFirstError);

    point
        .extend(
            Extension::new("validate")
                .with_index(1)
                .with_method("run", |_: &mut Vec<String>, _| {
                    Err(MethodError::new("invalid document"))
                }),
        )
        .and_then(|p| {
            p.extend(
                Extension::new("write")
                    .with_index(2)
                    .with_method("run", |log: &mut Vec<String>, _| {
                        log.push("write".to_string());
                        Ok(None)
                    }),
            )
        })
        .expect("extend chain should succeed");

    let mut log = Vec::new();
    assert_eq!(point.invoke("run", &mut log, &[]), None);
    assert!(log.is_empty());
}
