//! Shader assets available to techniques

use std::collections::HashMap;
use std::sync::Arc;

/// A ray tracing shader source registered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderAsset {
    pub name: String,
    pub source: String,
}

impl ShaderAsset {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Shader assets keyed by name
#[derive(Debug, Clone, Default)]
pub struct ShaderLibrary {
    shaders: HashMap<String, Arc<ShaderAsset>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shader, replacing any previous one with the same name
    pub fn insert(&mut self, shader: ShaderAsset) -> Arc<ShaderAsset> {
        let shader = Arc::new(shader);
        self.shaders.insert(shader.name.clone(), shader.clone());
        shader
    }

    pub fn with(mut self, shader: ShaderAsset) -> Self {
        self.insert(shader);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<ShaderAsset>> {
        self.shaders.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}
