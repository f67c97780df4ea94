//! Parent accounts.

mod models;
mod repository;
mod service;

pub use models::{Parent, RegisterParentRequest};
pub use repository::ParentRepository;
pub use service::ParentService;
