/// MaterialRegistry - append-only cache of shader programs keyed by
/// material type name.
///
/// Registration is idempotent: the first `ensure_registered` for a key
/// builds the program, later calls return the cached one. Hosts drain
/// `take_pending()` to compile each new program exactly once.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use super::uniform::UniformSet;

/// Shader program description handed to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    /// Registry key, also the material type name
    pub type_name: String,
    /// Declared uniforms with their default values
    pub uniforms: UniformSet,
    /// GLSL material function
    pub source: String,
    pub translucent: bool,
}

#[derive(Default)]
pub struct MaterialRegistry {
    programs: FxHashMap<String, Arc<ShaderProgram>>,
    pending: Vec<Arc<ShaderProgram>>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the program registered under `key`, building it on first use.
    pub fn ensure_registered<F>(&mut self, key: &str, build: F) -> Arc<ShaderProgram>
    where
        F: FnOnce() -> ShaderProgram,
    {
        if let Some(program) = self.programs.get(key) {
            return Arc::clone(program);
        }

        let program = Arc::new(build());
        self.programs.insert(key.to_string(), Arc::clone(&program));
        self.pending.push(Arc::clone(&program));

        crate::geovis_debug!("geovis::Material", "Registered shader program '{}'", key);

        program
    }

    pub fn get(&self, key: &str) -> Option<Arc<ShaderProgram>> {
        self.programs.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.programs.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Programs registered since the last call, in registration order.
    pub fn take_pending(&mut self) -> Vec<Arc<ShaderProgram>> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
