pub mod config_service;
pub mod memory_record_accessor;
pub mod paths;
pub mod storage;
pub mod toml_record_accessor;

pub use crate::config_service::ConfigService;
pub use crate::memory_record_accessor::InMemoryRecordAccessor;
pub use crate::toml_record_accessor::TomlRecordAccessor;
