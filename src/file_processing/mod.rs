pub mod archive;
pub mod reader;
