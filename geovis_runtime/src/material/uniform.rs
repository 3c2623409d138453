/// Uniform values produced by materials.
///
/// Values keep declaration order so `pack()` yields a stable layout.
/// Images are bound as textures and never packed.

use rustc_hash::FxHashMap;
use super::color::Color;

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Color(Color),
    /// Image URI or built-in image id
    Image(String),
}

#[derive(Debug, Clone, Default)]
pub struct UniformSet {
    values: Vec<(String, UniformValue)>,
    names: FxHashMap<String, usize>,
}

impl UniformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. New names keep insertion order.
    pub fn set(&mut self, name: &str, value: UniformValue) {
        match self.names.get(name) {
            Some(&index) => self.values[index].1 = value,
            None => {
                self.names.insert(name.to_string(), self.values.len());
                self.values.push((name.to_string(), value));
            }
        }
    }

    /// Builder form of `set`.
    pub fn with(mut self, name: &str, value: UniformValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.names.get(name).map(|&i| &self.values[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        match self.get(name)? {
            UniformValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn image(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            UniformValue::Image(uri) => Some(uri.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Tightly packed little-endian f32 block in declaration order
    /// (colors as 4 floats, images skipped).
    pub fn pack(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (_, value) in &self.values {
            match value {
                UniformValue::Float(v) => bytes.extend_from_slice(&v.to_le_bytes()),
                UniformValue::Color(c) => {
                    for component in bytemuck::cast::<Color, [f32; 4]>(*c) {
                        bytes.extend_from_slice(&component.to_le_bytes());
                    }
                }
                UniformValue::Image(_) => {}
            }
        }
        bytes
    }
}

impl PartialEq for UniformSet {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

#[cfg(test)]
#[path = "uniform_tests.rs"]
mod tests;
