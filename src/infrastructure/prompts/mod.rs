pub mod decline;
pub mod terminal;
