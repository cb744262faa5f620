pub mod applicant;
pub mod user;
