//! Bus driver accounts.

mod models;
mod repository;
mod service;

pub use models::{Driver, RegisterDriverRequest};
pub use repository::DriverRepository;
pub use service::DriverService;
