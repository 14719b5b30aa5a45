use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Fixed-length face embedding produced by the upstream encoder
/// (128 components for the usual dlib model). Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FaceVector(Arc<[f64]>);

impl FaceVector {
    pub fn new(components: Vec<f64>) -> Result<Self, String> {
        if components.is_empty() {
            return Err("Face vector must have at least one component".into());
        }
        if let Some(i) = components.iter().position(|c| !c.is_finite()) {
            return Err(format!("Face vector component {i} is not finite"));
        }
        Ok(FaceVector(components.into()))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Euclidean distance; `None` when the dimensions differ.
    pub fn distance(&self, other: &FaceVector) -> Option<f64> {
        if self.dimension() != other.dimension() {
            return None;
        }
        let sum: f64 = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Some(sum.sqrt())
    }
}

impl TryFrom<Vec<f64>> for FaceVector {
    type Error = String;

    fn try_from(components: Vec<f64>) -> Result<Self, Self::Error> {
        FaceVector::new(components)
    }
}

impl From<FaceVector> for Vec<f64> {
    fn from(v: FaceVector) -> Self {
        v.0.to_vec()
    }
}
