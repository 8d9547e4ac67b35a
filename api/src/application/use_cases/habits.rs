use uuid::Uuid;

use crate::application::dto::habits::{CreateHabitInput, UpdateHabitInput};
use crate::application::error::{AppError, AppResult};
use crate::application::ports::habit_repository::HabitRepository;
use crate::domain::habits::habit::Habit;
use crate::domain::time::{from_millis, now_millis};

pub struct CreateHabit<'a, R: HabitRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: HabitRepository + ?Sized> CreateHabit<'a, R> {
    pub async fn execute(&self, user_id: Uuid, input: &CreateHabitInput) -> AppResult<Habit> {
        let fields = input.validate()?;
        let now = from_millis(now_millis());
        let habit = Habit {
            id: Uuid::new_v4(),
            user_id,
            name: fields.name,
            description: fields.description,
            frequency: fields.frequency,
            target_count: fields.target_count,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&habit).await?;
        Ok(habit)
    }
}

pub struct ListHabits<'a, R: HabitRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: HabitRepository + ?Sized> ListHabits<'a, R> {
    pub async fn execute(&self, user_id: Uuid) -> AppResult<Vec<Habit>> {
        Ok(self.repo.list_for_user(user_id).await?)
    }
}

pub struct GetHabit<'a, R: HabitRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: HabitRepository + ?Sized> GetHabit<'a, R> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> AppResult<Habit> {
        self.repo
            .get_owned(id, user_id)
            .await?
            .ok_or(AppError::NotFound("habit"))
    }
}

pub struct UpdateHabit<'a, R: HabitRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: HabitRepository + ?Sized> UpdateHabit<'a, R> {
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: &UpdateHabitInput,
    ) -> AppResult<Habit> {
        let mut habit = self
            .repo
            .get_owned(id, user_id)
            .await?
            .ok_or(AppError::NotFound("habit"))?;
        patch.apply(&mut habit)?;
        habit.updated_at = from_millis(now_millis());
        if !self.repo.update_owned(&habit).await? {
            return Err(AppError::NotFound("habit"));
        }
        Ok(habit)
    }
}

pub struct DeleteHabit<'a, R: HabitRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: HabitRepository + ?Sized> DeleteHabit<'a, R> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        if !self.repo.delete_owned(id, user_id).await? {
            return Err(AppError::NotFound("habit"));
        }
        Ok(())
    }
}
