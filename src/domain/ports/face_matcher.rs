use crate::domain::values::face_vector::FaceVector;

/// Match predicate supplied by the face-encoding library: decides whether
/// a candidate vector belongs to the same person as a known one.
pub trait FaceMatcher: Send + Sync {
    /// Distance between two vectors, `None` if they are not comparable.
    fn distance(&self, known: &FaceVector, candidate: &FaceVector) -> Option<f64>;

    fn is_match(&self, known: &FaceVector, candidate: &FaceVector) -> bool;
}
