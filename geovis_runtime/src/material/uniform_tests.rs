use super::*;

#[test]
fn test_set_keeps_declaration_order() {
    let mut set = UniformSet::new();
    set.set("color", UniformValue::Color(Color::RED));
    set.set("time", UniformValue::Float(0.25));
    set.set("color", UniformValue::Color(Color::LIME));

    let names: Vec<&str> = set.names().collect();
    assert_eq!(names, vec!["color", "time"]);
    assert_eq!(set.color("color"), Some(Color::LIME));
    assert_eq!(set.float("time"), Some(0.25));
    assert_eq!(set.len(), 2);
}

#[test]
fn test_typed_getters_reject_other_kinds() {
    let set = UniformSet::new()
        .with("time", UniformValue::Float(1.0))
        .with("image", UniformValue::Image("ramp".to_string()));
    assert_eq!(set.color("time"), None);
    assert_eq!(set.float("image"), None);
    assert_eq!(set.image("image"), Some("ramp"));
    assert!(set.get("missing").is_none());
}

#[test]
fn test_pack_layout() {
    let set = UniformSet::new()
        .with("color", UniformValue::Color(Color::new(0.0, 0.5, 1.0, 0.25)))
        .with("image", UniformValue::Image("ramp".to_string()))
        .with("time", UniformValue::Float(2.0));

    let bytes = set.pack();
    assert_eq!(bytes.len(), 5 * 4);

    let floats: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    assert_eq!(floats, vec![0.0, 0.5, 1.0, 0.25, 2.0]);
}

#[test]
fn test_equality_is_order_sensitive_on_values() {
    let a = UniformSet::new().with("time", UniformValue::Float(0.5));
    let b = UniformSet::new().with("time", UniformValue::Float(0.5));
    let c = UniformSet::new().with("time", UniformValue::Float(0.6));
    assert_eq!(a, b);
    assert_ne!(a, c);
}
