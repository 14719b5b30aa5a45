use crate::domain::values::classification::Classification;
use crate::domain::values::face_vector::FaceVector;
use crate::domain::values::region::BoundingBox;
use serde::{Deserialize, Serialize};

/// One face reported by the detection collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Box on the downscaled frame the detector ran on.
    pub region: BoundingBox,
    pub vector: FaceVector,
    /// Opaque reference to a cropped face image (path, URL, data URI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
}

/// Detection results for one video frame, in detector order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub faces: Vec<Detection>,
}

/// A face after resolution, ready for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFace {
    /// Box on the original, full-size frame.
    pub region: BoundingBox,
    pub name: String,
    pub classification: Classification,
    pub code: i8,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LabeledFrame {
    pub index: u64,
    pub faces: Vec<ResolvedFace>,
}
