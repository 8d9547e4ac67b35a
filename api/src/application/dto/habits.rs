use crate::application::dto::{optional_text, required_text};
use crate::application::error::{AppError, AppResult};
use crate::domain::habits::habit::{Habit, HabitFrequency};

pub const MAX_TARGET_COUNT: i64 = 1000;

#[derive(Debug, Clone, Default)]
pub struct CreateHabitInput {
    pub name: String,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub target_count: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateHabitInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub target_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitFields {
    pub name: String,
    pub description: Option<String>,
    pub frequency: HabitFrequency,
    pub target_count: i64,
}

fn parse_frequency(raw: &str) -> AppResult<HabitFrequency> {
    HabitFrequency::parse(raw)
        .ok_or_else(|| AppError::validation("frequency must be one of daily, weekly, monthly"))
}

fn check_target(count: i64) -> AppResult<i64> {
    if !(1..=MAX_TARGET_COUNT).contains(&count) {
        return Err(AppError::validation(format!(
            "target_count must be between 1 and {MAX_TARGET_COUNT}"
        )));
    }
    Ok(count)
}

impl CreateHabitInput {
    pub fn validate(&self) -> AppResult<HabitFields> {
        Ok(HabitFields {
            name: required_text("name", &self.name, 100)?,
            description: optional_text("description", self.description.as_deref(), 500)?,
            frequency: match self.frequency.as_deref() {
                Some(f) => parse_frequency(f)?,
                None => HabitFrequency::Daily,
            },
            target_count: check_target(self.target_count.unwrap_or(1))?,
        })
    }
}

impl UpdateHabitInput {
    /// Validates the whole patch before touching `habit`.
    pub fn apply(&self, habit: &mut Habit) -> AppResult<()> {
        let name = self
            .name
            .as_deref()
            .map(|n| required_text("name", n, 100))
            .transpose()?;
        let description = self
            .description
            .as_deref()
            .map(|d| optional_text("description", Some(d), 500))
            .transpose()?;
        let frequency = self.frequency.as_deref().map(parse_frequency).transpose()?;
        let target_count = self.target_count.map(check_target).transpose()?;

        if let Some(name) = name {
            habit.name = name;
        }
        if let Some(description) = description {
            habit.description = description;
        }
        if let Some(frequency) = frequency {
            habit.frequency = frequency;
        }
        if let Some(target_count) = target_count {
            habit.target_count = target_count;
        }
        Ok(())
    }
}
