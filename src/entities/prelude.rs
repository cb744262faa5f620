pub use super::applicants::Entity as Applicants;
pub use super::scores::Entity as Scores;
pub use super::users::Entity as Users;
