use crate::domain::ports::face_matcher::FaceMatcher;
use crate::domain::values::face_vector::FaceVector;

/// Tolerance the dlib face encoder is tuned for. Lower is stricter.
pub const DEFAULT_TOLERANCE: f64 = 0.6;

/// Two faces match when the Euclidean distance between their encodings is
/// at most `tolerance`. Vectors of different dimension never match.
pub struct EuclideanMatcher {
    tolerance: f64,
}

impl EuclideanMatcher {
    pub fn new(tolerance: f64) -> Result<Self, String> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(format!("Tolerance must be a positive number, got {tolerance}"));
        }
        Ok(Self { tolerance })
    }
}

impl Default for EuclideanMatcher {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl FaceMatcher for EuclideanMatcher {
    fn distance(&self, known: &FaceVector, candidate: &FaceVector) -> Option<f64> {
        known.distance(candidate)
    }

    fn is_match(&self, known: &FaceVector, candidate: &FaceVector) -> bool {
        self.distance(known, candidate)
            .map(|d| d <= self.tolerance)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(c: &[f64]) -> FaceVector {
        FaceVector::new(c.to_vec()).unwrap()
    }

    #[test]
    fn test_match_within_tolerance() {
        let m = EuclideanMatcher::default();
        assert!(m.is_match(&v(&[0.0, 0.0]), &v(&[0.6, 0.0])));
        assert!(!m.is_match(&v(&[0.0, 0.0]), &v(&[0.61, 0.0])));
    }

    #[test]
    fn test_dimension_mismatch_never_matches() {
        let m = EuclideanMatcher::new(10.0).unwrap();
        assert!(!m.is_match(&v(&[0.0]), &v(&[0.0, 0.0])));
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        assert!(EuclideanMatcher::new(0.0).is_err());
        assert!(EuclideanMatcher::new(f64::NAN).is_err());
    }
}
