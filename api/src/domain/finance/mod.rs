pub mod account;
pub mod budget;
pub mod transaction;
