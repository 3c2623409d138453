use std::cell::Cell;
use super::*;
use crate::material::{Color, UniformValue};

fn program(name: &str) -> ShaderProgram {
    ShaderProgram {
        type_name: name.to_string(),
        uniforms: UniformSet::new().with("color", UniformValue::Color(Color::WHITE)),
        source: String::new(),
        translucent: true,
    }
}

#[test]
fn test_ensure_registered_builds_once() {
    let mut registry = MaterialRegistry::new();
    let builds = Cell::new(0);

    let a = registry.ensure_registered("CircleWave", || { builds.set(builds.get() + 1); program("CircleWave") });
    let b = registry.ensure_registered("CircleWave", || { builds.set(builds.get() + 1); program("other") });

    assert_eq!(builds.get(), 1);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(b.type_name, "CircleWave");
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_distinct_keys_register_separately() {
    let mut registry = MaterialRegistry::new();
    registry.ensure_registered("DynamicWall_vertical_-_1", || program("DynamicWall_vertical_-_1"));
    registry.ensure_registered("DynamicWall_vertical_+_1", || program("DynamicWall_vertical_+_1"));

    assert_eq!(registry.len(), 2);
    assert!(registry.contains("DynamicWall_vertical_+_1"));
    assert!(registry.get("DynamicWall_standard_-_1").is_none());
}

#[test]
fn test_take_pending_drains() {
    let mut registry = MaterialRegistry::new();
    registry.ensure_registered("A", || program("A"));
    registry.ensure_registered("B", || program("B"));
    registry.ensure_registered("A", || program("A"));

    let pending: Vec<String> = registry.take_pending().iter().map(|p| p.type_name.clone()).collect();
    assert_eq!(pending, vec!["A", "B"]);
    assert!(registry.take_pending().is_empty());
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_fresh_registries_are_isolated() {
    let mut first = MaterialRegistry::new();
    first.ensure_registered("A", || program("A"));
    let second = MaterialRegistry::new();
    assert!(second.is_empty());
}
