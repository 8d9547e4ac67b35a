use std::sync::Arc;

use crate::application::ports::account_repository::AccountRepository;
use crate::application::ports::budget_repository::BudgetRepository;
use crate::application::ports::habit_repository::HabitRepository;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::transaction_repository::TransactionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::use_cases::auth::SessionPolicy;
use crate::bootstrap::config::Config;
use crate::infrastructure::db::Store;
use crate::infrastructure::db::repositories::account_repository_sqlx::SqlxAccountRepository;
use crate::infrastructure::db::repositories::budget_repository_sqlx::SqlxBudgetRepository;
use crate::infrastructure::db::repositories::habit_repository_sqlx::SqlxHabitRepository;
use crate::infrastructure::db::repositories::session_repository_sqlx::SqlxSessionRepository;
use crate::infrastructure::db::repositories::transaction_repository_sqlx::SqlxTransactionRepository;
use crate::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    store: Store,
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    habit_repo: Arc<dyn HabitRepository>,
    account_repo: Arc<dyn AccountRepository>,
    transaction_repo: Arc<dyn TransactionRepository>,
    budget_repo: Arc<dyn BudgetRepository>,
}

impl AppServices {
    pub fn new(
        store: Store,
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        habit_repo: Arc<dyn HabitRepository>,
        account_repo: Arc<dyn AccountRepository>,
        transaction_repo: Arc<dyn TransactionRepository>,
        budget_repo: Arc<dyn BudgetRepository>,
    ) -> Self {
        Self {
            store,
            user_repo,
            session_repo,
            habit_repo,
            account_repo,
            transaction_repo,
            budget_repo,
        }
    }

    /// Wires every repository to the given store.
    pub fn from_store(store: Store) -> Self {
        let pool = store.pool().clone();
        Self::new(
            store,
            Arc::new(SqlxUserRepository::new(pool.clone())),
            Arc::new(SqlxSessionRepository::new(pool.clone())),
            Arc::new(SqlxHabitRepository::new(pool.clone())),
            Arc::new(SqlxAccountRepository::new(pool.clone())),
            Arc::new(SqlxTransactionRepository::new(pool.clone())),
            Arc::new(SqlxBudgetRepository::new(pool)),
        )
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn store(&self) -> &Store {
        &self.services.store
    }

    pub fn session_policy(&self) -> SessionPolicy {
        self.cfg.session_policy()
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn session_repo(&self) -> Arc<dyn SessionRepository> {
        self.services.session_repo.clone()
    }

    pub fn habit_repo(&self) -> Arc<dyn HabitRepository> {
        self.services.habit_repo.clone()
    }

    pub fn account_repo(&self) -> Arc<dyn AccountRepository> {
        self.services.account_repo.clone()
    }

    pub fn transaction_repo(&self) -> Arc<dyn TransactionRepository> {
        self.services.transaction_repo.clone()
    }

    pub fn budget_repo(&self) -> Arc<dyn BudgetRepository> {
        self.services.budget_repo.clone()
    }
}
