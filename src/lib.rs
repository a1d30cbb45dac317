pub mod args;
pub mod config;
pub mod create_sub;
pub mod fetch;
pub mod log;
pub mod naming;
pub mod progress;
pub mod prompt;
pub mod provision;
pub mod request;
pub mod shell;

pub use create_sub::provision;
pub use provision::Report;
pub use request::{CreationMode, ProjectKind, ProvisioningRequest};
