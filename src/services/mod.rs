pub mod applicant_service;
pub use applicant_service::{
    ApplicantError, ApplicantRecord, ApplicantService, ApplicantUpdate, ScoreRecord,
};

pub mod applicant_service_impl;
pub use applicant_service_impl::SeaOrmApplicantService;

pub mod auth_service;
pub use auth_service::{AuthError, AuthService, LoginResult};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod token;
pub use token::{Claims, TokenError, TokenIssuer};

pub mod user_service;
pub use user_service::{NewUser, UserError, UserService, UserUpdate};

pub mod user_service_impl;
pub use user_service_impl::SeaOrmUserService;
