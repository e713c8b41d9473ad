pub mod input;
pub mod time;
