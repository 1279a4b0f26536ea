pub mod commands;
pub mod controller;
pub mod store;

pub use commands::CommandHandlers;
pub use controller::{ControllerError, RegistryController, RegistryEvent, ViewState};
pub use store::{HttpRecordStore, RecordStore, StoreError};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
