pub mod driver;
pub mod menu;
pub mod registry;
pub mod runner;
pub mod session;
pub mod utils;

// Re-export common items
pub use registry::{reconcile, Registry};
pub use runner::{list_devices, run};
