pub mod accounts;
pub mod auth;
pub mod budgets;
pub mod habits;
pub mod transactions;
