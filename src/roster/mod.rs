//! School roster: students, buses and driver assignment.

mod models;
mod repository;
mod service;

pub use models::{
    AssignDriverRequest, Bus, BusWithDriver, CreateBusRequest, CreateStudentRequest, Student,
    UpdateStudentRequest,
};
pub use repository::RosterRepository;
pub use service::RosterService;
