//! Entry form draft carried between interactions.
//!
//! The form remembers the last person, coupon and handler for a short time
//! so repeated entries for the same coupon are quick to type. The draft is
//! an explicit value owned by the caller; nothing is kept server-side.

use super::entry::Entry;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default lifetime of a draft.
pub const DEFAULT_DRAFT_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDraft {
    pub date: NaiveDate,
    pub person_id: String,
    pub name: String,
    pub coupon_id: String,
    pub pantry_handler: String,
    pub item: String,
    pub quantity: u32,
    pub expires_at: DateTime<Utc>,
}

impl FormDraft {
    /// Blank draft dated today.
    pub fn fresh(today: NaiveDate, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            date: today,
            person_id: String::new(),
            name: String::new(),
            coupon_id: String::new(),
            pantry_handler: String::new(),
            item: String::new(),
            quantity: 1,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Continue a previous draft if it is still live, otherwise start over.
    pub fn resume(
        previous: Option<FormDraft>,
        now: DateTime<Utc>,
        today: NaiveDate,
        ttl: Duration,
    ) -> Self {
        match previous {
            Some(draft) if !draft.is_expired(now) => draft,
            _ => Self::fresh(today, now, ttl),
        }
    }

    /// Draft for the next entry after `entry` was recorded: keeps who and
    /// which coupon, clears the item, resets quantity, renews expiry.
    pub fn after_submit(entry: &Entry, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            date: entry.date,
            person_id: entry.person_id.clone(),
            name: entry.name.clone(),
            coupon_id: entry.coupon_id.clone(),
            pantry_handler: entry.pantry_handler.clone().unwrap_or_default(),
            item: String::new(),
            quantity: 1,
            expires_at: now + ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;

    fn ttl() -> Duration {
        Duration::minutes(DEFAULT_DRAFT_TTL_MINUTES)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_fresh_draft_defaults() {
        let now = Utc::now();
        let draft = FormDraft::fresh(today(), now, ttl());

        assert_eq!(draft.date, today());
        assert!(draft.person_id.is_empty());
        assert_eq!(draft.quantity, 1);
        assert_eq!(draft.expires_at, now + ttl());
    }

    #[test]
    fn test_resume_keeps_live_draft() {
        let now = Utc::now();
        let mut draft = FormDraft::fresh(today(), now, ttl());
        draft.person_id = "A1".to_string();

        let resumed = FormDraft::resume(
            Some(draft.clone()),
            now + Duration::minutes(5),
            today(),
            ttl(),
        );
        assert_eq!(resumed, draft);
    }

    #[test]
    fn test_resume_resets_expired_draft() {
        let now = Utc::now();
        let mut draft = FormDraft::fresh(today(), now, ttl());
        draft.person_id = "A1".to_string();

        let later = now + Duration::minutes(11);
        let resumed = FormDraft::resume(Some(draft), later, today(), ttl());
        assert!(resumed.person_id.is_empty());
        assert_eq!(resumed.expires_at, later + ttl());
    }

    #[test]
    fn test_resume_without_previous_is_fresh() {
        let now = Utc::now();
        let resumed = FormDraft::resume(None, now, today(), ttl());
        assert_eq!(resumed, FormDraft::fresh(today(), now, ttl()));
    }

    #[test]
    fn test_after_submit_keeps_identity_clears_item() {
        let now = Utc::now();
        let entry = Entry {
            row: 3,
            date: today(),
            person_id: "A1".to_string(),
            name: "Asha".to_string(),
            coupon_id: "0100".to_string(),
            item: "Tea".to_string(),
            quantity: 4,
            action: Action::Issued,
            pantry_handler: Some("Ravi".to_string()),
        };

        let draft = FormDraft::after_submit(&entry, now, ttl());
        assert_eq!(draft.person_id, "A1");
        assert_eq!(draft.name, "Asha");
        assert_eq!(draft.coupon_id, "0100");
        assert_eq!(draft.pantry_handler, "Ravi");
        assert!(draft.item.is_empty());
        assert_eq!(draft.quantity, 1);
        assert!(!draft.is_expired(now + Duration::minutes(9)));
    }
}
