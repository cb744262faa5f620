mod config;
mod user;

pub use config::{cmd_check_config, cmd_init};
pub use user::{cmd_user_add, cmd_user_list};
