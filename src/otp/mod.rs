//! One-time email verification codes.

mod repository;

pub use repository::OtpRepository;
