//! School-bus tracking backend.
//!
//! Role-based accounts (schools, drivers, parents), roster management,
//! and a WebSocket relay that fans live bus positions and trip status
//! out to every connected client.

pub mod api;
pub mod auth;
pub mod db;
pub mod driver;
pub mod mail;
pub mod otp;
pub mod parent;
pub mod roster;
pub mod school;
pub mod ws;

pub(crate) mod validate;
