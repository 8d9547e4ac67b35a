pub mod auth;
pub mod finance;
pub mod habits;
pub mod time;
pub mod users;
