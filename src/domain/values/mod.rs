pub mod classification;
pub mod face_vector;
pub mod region;
pub mod serialized_key;
pub mod tier;
