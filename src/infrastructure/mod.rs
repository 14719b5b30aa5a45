pub mod clock;
pub mod feeds;
pub mod matchers;
pub mod prompts;
pub mod render;
pub mod sqlite;
