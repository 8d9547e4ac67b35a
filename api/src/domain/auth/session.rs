use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// A session is refreshed once it has gone `update_age` without being
    /// extended.
    pub fn needs_refresh(&self, now: DateTime<Utc>, update_age: Duration) -> bool {
        now - self.updated_at >= update_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(updated_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Session {
        Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            expires_at,
            ip_address: None,
            user_agent: None,
            created_at: updated_at,
            updated_at,
        }
    }

    #[test]
    fn expiry_is_inclusive() {
        let now = Utc::now();
        assert!(session_at(now, now).is_expired(now));
        assert!(!session_at(now, now + Duration::seconds(1)).is_expired(now));
    }

    #[test]
    fn refresh_after_update_age() {
        let now = Utc::now();
        let fresh = session_at(now - Duration::hours(2), now + Duration::days(6));
        let stale = session_at(now - Duration::days(2), now + Duration::days(5));
        assert!(!fresh.needs_refresh(now, Duration::days(1)));
        assert!(stale.needs_refresh(now, Duration::days(1)));
    }
}
