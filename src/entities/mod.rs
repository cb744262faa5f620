pub mod prelude;

pub mod applicants;
pub mod scores;
pub mod users;
