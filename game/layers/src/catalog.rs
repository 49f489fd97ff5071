use serde::{Deserialize, Serialize};

use crate::layer::LayerInfo;

/// Every layer the server can rotate to.
///
/// Loaded once at process start and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerCatalog {
    layers: Vec<LayerInfo>,
}

impl LayerCatalog {
    pub fn new(layers: Vec<LayerInfo>) -> Self {
        Self { layers }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn all(&self) -> &[LayerInfo] {
        &self.layers
    }

    pub fn find(&self, id: &str) -> Option<&LayerInfo> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
