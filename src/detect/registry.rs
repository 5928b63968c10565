use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::detect::result::Detection;

use super::backend::DetectorBackend;

/// Thread-safe registry of detector backends.
///
/// Backends are wrapped in `Mutex` because `DetectorBackend::detect` takes `&mut self`.
pub struct BackendRegistry {
    backends: HashMap<String, Arc<Mutex<dyn DetectorBackend>>>,
    default_name: Option<String>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            default_name: None,
        }
    }

    /// Register a backend. The first registered backend becomes the default.
    pub fn register<B: DetectorBackend + 'static>(&mut self, backend: B) {
        let name = backend.name().to_string();
        if self.default_name.is_none() {
            self.default_name = Some(name.clone());
        }
        self.backends.insert(name, Arc::new(Mutex::new(backend)));
    }

    /// Set default backend by name.
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.backends.contains_key(name) {
            return Err(anyhow!("backend '{}' not registered", name));
        }
        self.default_name = Some(name.to_string());
        Ok(())
    }

    /// Get backend by name.
    pub fn get(&self, name: &str) -> Option<Arc<Mutex<dyn DetectorBackend>>> {
        self.backends.get(name).cloned()
    }

    /// Get default backend.
    pub fn default_backend(&self) -> Option<Arc<Mutex<dyn DetectorBackend>>> {
        self.default_name.as_ref().and_then(|name| self.get(name))
    }

    /// List registered backends.
    pub fn list(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }

    /// Run detection on the named backend, or the default when `name` is `None`.
    pub fn detect_with(
        &self,
        name: Option<&str>,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>> {
        let backend = match name {
            Some(name) => self
                .get(name)
                .ok_or_else(|| anyhow!("backend '{}' not registered", name))?,
            None => self
                .default_backend()
                .ok_or_else(|| anyhow!("no detector backend registered"))?,
        };
        let mut guard = backend
            .lock()
            .map_err(|_| anyhow!("backend lock poisoned"))?;
        guard.detect(pixels, width, height)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::StubBackend;

    #[test]
    fn first_registered_backend_is_default() {
        let mut registry = BackendRegistry::new();
        registry.register(StubBackend::new());

        assert_eq!(registry.list(), vec!["stub".to_string()]);
        assert!(registry.default_backend().is_some());
        assert!(registry.get("stub").is_some());
        assert!(registry.get("missing").is_none());
        assert!(registry.set_default("missing").is_err());
        assert!(registry.set_default("stub").is_ok());
    }

    #[test]
    fn detect_with_unknown_backend_errors() {
        let mut registry = BackendRegistry::new();
        registry.register(StubBackend::new());

        let err = registry
            .detect_with(Some("tract"), &[0u8; 12], 2, 2)
            .unwrap_err();
        assert!(err.to_string().contains("not registered"));
    }
}
