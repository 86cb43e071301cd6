//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `hookpoint_core` linkage by wiring a small registry.
//! - Keep output deterministic for quick local sanity checks.

use hookpoint_core::{Extension, ExtensionIndex, Registry};
use log::error;
use serde_json::{json, Value};

fn main() {
    if let Err(err) = hookpoint_core::init_logging(hookpoint_core::default_log_level(), None) {
        eprintln!("hookpoint_cli logging disabled: {err}");
    }

    println!("hookpoint_core version={}", hookpoint_core::core_version());

    let mut registry = Registry::<Vec<String>>::new();
    let wired = registry
        .point("render")
        .extend(step("body"))
        .and_then(|point| point.extend(step("footer").after("body")))
        .and_then(|point| point.extend(step("header").before("body")))
        .and_then(|point| point.extend(step("doctype").with_index(ExtensionIndex::First)));
    if let Err(err) = wired {
        error!("event=smoke_failed module=cli status=error error={err}");
        eprintln!("hookpoint_cli wiring failed: {err}");
        std::process::exit(1);
    }

    let point = registry.point("render");
    println!("render order={}", point.map(|ext| ext.id().to_string()).join(","));

    let mut trail = Vec::new();
    match point.exec("emit", &mut trail, &[]) {
        Ok(total) => println!("render exec={}", total.unwrap_or(Value::Null)),
        Err(err) => {
            eprintln!("hookpoint_cli exec failed: {err}");
            std::process::exit(1);
        }
    }
}

/// Appends its id to the trail and counts steps through `prev`.
fn step(id: &'static str) -> Extension<Vec<String>> {
    Extension::new(id).with_method("emit", move |trail: &mut Vec<String>, args: &[Value]| {
        trail.push(id.to_string());
        let prev = args.first().and_then(Value::as_i64).unwrap_or(0);
        Ok(Some(json!(prev + 1)))
    })
}
