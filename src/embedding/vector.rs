use crate::constants::UNIT_NORM_TOLERANCE;
use crate::embedding::error::EmbeddingError;

/// A unit-length embedding vector.
///
/// The only constructor, [`Embedding::from_raw`], L2-normalizes its input, so
/// every value of this type satisfies `‖v‖₂ ≈ 1`. Cosine similarity between
/// two embeddings therefore reduces to their inner product.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    values: Vec<f32>,
}

impl Embedding {
    /// Normalizes `values` to unit length.
    ///
    /// Fails on empty, zero or non-finite input since those have no direction.
    pub fn from_raw(mut values: Vec<f32>) -> Result<Self, EmbeddingError> {
        if values.is_empty() {
            return Err(EmbeddingError::DegenerateVector {
                reason: "empty vector".to_string(),
            });
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(EmbeddingError::DegenerateVector {
                reason: "non-finite component".to_string(),
            });
        }

        let norm = l2_norm(&values);
        if norm == 0.0 {
            return Err(EmbeddingError::DegenerateVector {
                reason: "zero vector".to_string(),
            });
        }

        for v in &mut values {
            *v = (f64::from(*v) / norm) as f32;
        }

        let embedding = Self { values };
        if !embedding.is_unit() {
            return Err(EmbeddingError::DegenerateVector {
                reason: format!("norm {} after normalization", embedding.norm()),
            });
        }
        Ok(embedding)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }

    /// L2 norm (1.0 up to rounding).
    pub fn norm(&self) -> f32 {
        l2_norm(&self.values) as f32
    }

    pub fn is_unit(&self) -> bool {
        (self.norm() - 1.0).abs() <= UNIT_NORM_TOLERANCE
    }

    /// Component-wise equality within `tolerance`.
    pub fn approx_eq(&self, other: &Embedding, tolerance: f32) -> bool {
        self.dim() == other.dim()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.values
    }
}

/// Accumulated in f64 so squares of extreme f32 components neither overflow
/// nor flush to zero.
#[inline]
fn l2_norm(values: &[f32]) -> f64 {
    values
        .iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt()
}
