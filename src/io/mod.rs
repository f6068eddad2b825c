pub mod compression;
pub mod glob;
pub mod input;
pub mod lines;
