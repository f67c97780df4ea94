//! School administrator accounts.

mod models;
mod repository;
mod service;

pub use models::{RegisterSchoolRequest, School};
pub use repository::SchoolRepository;
pub use service::SchoolService;
