//! CLI library for testing purposes

pub mod agent_files;
pub mod logging;
pub mod validation;

pub use agent_files::{read_agent_dir, write_agent_dir};
pub use dialogflow_model::NativeFile;
