pub mod clock;
pub mod face_matcher;
pub mod frame_io;
pub mod name_prompt;
pub mod snapshot_store;
