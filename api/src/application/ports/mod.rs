pub mod account_repository;
pub mod budget_repository;
pub mod habit_repository;
pub mod session_repository;
pub mod transaction_repository;
pub mod user_repository;
