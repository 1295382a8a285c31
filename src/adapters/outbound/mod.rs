pub mod memory;
pub mod oss;
