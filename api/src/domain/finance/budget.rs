use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Some(BudgetPeriod::Weekly),
            "monthly" => Some(BudgetPeriod::Monthly),
            "yearly" => Some(BudgetPeriod::Yearly),
            _ => None,
        }
    }

    /// Start (UTC midnight) of the period window containing `now`. Weeks start on Monday.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let start = match self {
            BudgetPeriod::Weekly => {
                today - Duration::days(today.weekday().num_days_from_monday() as i64)
            }
            BudgetPeriod::Monthly => {
                NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today)
            }
            BudgetPeriod::Yearly => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
        };
        Utc.from_utc_datetime(&start.and_time(NaiveTime::default()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub limit_minor: i64,
    pub period: BudgetPeriod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A budget together with what has been spent against it in the current window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetUsage {
    pub budget: Budget,
    pub spent_minor: i64,
}

impl BudgetUsage {
    pub fn remaining_minor(&self) -> i64 {
        self.budget.limit_minor - self.spent_minor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_window_starts_monday() {
        // 2026-10-17 is a Saturday.
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 15, 30, 0).unwrap();
        let start = BudgetPeriod::Weekly.window_start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).unwrap());
    }

    #[test]
    fn monthly_and_yearly_windows() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 15, 30, 0).unwrap();
        assert_eq!(
            BudgetPeriod::Monthly.window_start(now),
            Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            BudgetPeriod::Yearly.window_start(now),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(BudgetPeriod::parse(" Monthly "), Some(BudgetPeriod::Monthly));
        assert_eq!(BudgetPeriod::parse("daily"), None);
    }
}
