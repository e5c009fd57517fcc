pub mod constants;
pub mod path;
