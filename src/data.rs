pub mod domain;
pub mod holdings;
pub mod table;
