pub mod traits;

// Store implementations
pub mod json_file;
pub mod memory;
