use std::sync::Arc;

/// A vector and the name of the provider that produced it. Vectors from
/// different providers live in different spaces and are never compared.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Arc<Vec<f32>>,
    pub provider: String,
}

impl Embedding {
    pub fn new(vector: Vec<f32>, provider: impl Into<String>) -> Self {
        Self {
            vector: Arc::new(vector),
            provider: provider.into(),
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.vector
    }

    pub fn len(&self) -> usize {
        self.vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }
}
