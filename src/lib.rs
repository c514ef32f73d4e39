pub mod firms;
pub mod search;
pub mod service;
pub mod util;

pub use service::FirmFinderService;
