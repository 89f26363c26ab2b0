//! Time windows and entry filters applied before reduction.

use super::entry::{Action, Entry};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reporting window relative to "today".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Today,
    /// Monday of the current week through today.
    ThisWeek,
    /// First of the current month through today.
    ThisMonth,
    #[default]
    All,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Today => "today",
            TimeWindow::ThisWeek => "this_week",
            TimeWindow::ThisMonth => "this_month",
            TimeWindow::All => "all",
        }
    }

    /// Inclusive lower bound of the window, `None` for `All`.
    pub fn start(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimeWindow::Today => Some(today),
            TimeWindow::ThisWeek => {
                let offset = i64::from(today.weekday().num_days_from_monday());
                Some(today - Duration::days(offset))
            }
            TimeWindow::ThisMonth => today.with_day(1),
            TimeWindow::All => None,
        }
    }

    /// Whether `date` falls inside the window. No window looks past today.
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self.start(today) {
            Some(start) => date >= start && date <= today,
            None => true,
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filter parameters for listing or billing entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub window: TimeWindow,
    /// Case-insensitive substring of the person id.
    pub person: Option<String>,
    /// Exact item name.
    pub item: Option<String>,
    pub action: Option<Action>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &Entry, today: NaiveDate) -> bool {
        if !self.window.contains(entry.date, today) {
            return false;
        }
        if let Some(person) = self.person.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            if !entry
                .person_id
                .to_lowercase()
                .contains(&person.to_lowercase())
            {
                return false;
            }
        }
        if let Some(item) = self.item.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
            if entry.item != item {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        true
    }

    /// Keep the entries that match, preserving order.
    pub fn apply(&self, entries: &[Entry], today: NaiveDate) -> Vec<Entry> {
        entries
            .iter()
            .filter(|e| self.matches(e, today))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(date: NaiveDate, person: &str, item: &str, action: Action) -> Entry {
        Entry {
            row: 0,
            date,
            person_id: person.to_string(),
            name: String::new(),
            coupon_id: "1".to_string(),
            item: item.to_string(),
            quantity: 1,
            action,
            pantry_handler: None,
        }
    }

    #[test]
    fn test_today_is_in_every_window() {
        let today = date(2024, 3, 13);
        for window in [
            TimeWindow::Today,
            TimeWindow::ThisWeek,
            TimeWindow::ThisMonth,
            TimeWindow::All,
        ] {
            assert!(window.contains(today, today), "{} should contain today", window);
        }
    }

    #[test]
    fn test_week_starts_on_monday() {
        // 2024-03-11 is a Monday.
        let monday = date(2024, 3, 11);
        let sunday_before = date(2024, 3, 10);

        assert_eq!(TimeWindow::ThisWeek.start(monday), Some(monday));
        assert!(!TimeWindow::ThisWeek.contains(sunday_before, monday));
        assert!(TimeWindow::ThisMonth.contains(sunday_before, monday));
    }

    #[test]
    fn test_week_has_no_look_ahead() {
        let wednesday = date(2024, 3, 13);
        let friday = date(2024, 3, 15);
        assert!(TimeWindow::ThisWeek.contains(date(2024, 3, 11), wednesday));
        assert!(!TimeWindow::ThisWeek.contains(friday, wednesday));
    }

    #[test]
    fn test_month_window_bounds() {
        let today = date(2024, 3, 13);
        assert_eq!(TimeWindow::ThisMonth.start(today), Some(date(2024, 3, 1)));
        assert!(TimeWindow::ThisMonth.contains(date(2024, 3, 1), today));
        assert!(!TimeWindow::ThisMonth.contains(date(2024, 2, 29), today));
        assert!(!TimeWindow::ThisMonth.contains(date(2024, 3, 14), today));
    }

    #[test]
    fn test_all_ignores_dates() {
        let today = date(2024, 3, 13);
        assert!(TimeWindow::All.contains(date(1999, 1, 1), today));
        assert!(TimeWindow::All.contains(date(2030, 1, 1), today));
    }

    #[test]
    fn test_monday_yesterday_crosses_month_boundary() {
        // 2024-07-01 is a Monday; yesterday is in June.
        let today = date(2024, 7, 1);
        let yesterday = date(2024, 6, 30);
        assert!(!TimeWindow::ThisWeek.contains(yesterday, today));
        assert!(!TimeWindow::ThisMonth.contains(yesterday, today));
    }

    #[test]
    fn test_filter_combines_fields() {
        let today = date(2024, 3, 13);
        let entries = vec![
            entry(today, "APM-101", "Tea", Action::Issued),
            entry(today, "apm-102", "Coffee", Action::Issued),
            entry(today, "APM-101", "Tea", Action::Returned),
            entry(date(2024, 2, 1), "APM-101", "Tea", Action::Issued),
        ];

        let filter = EntryFilter {
            window: TimeWindow::ThisMonth,
            person: Some("apm-10".to_string()),
            item: Some("Tea".to_string()),
            action: Some(Action::Issued),
        };

        let kept = filter.apply(&entries, today);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].person_id, "APM-101");
        assert_eq!(kept[0].action, Action::Issued);
    }

    #[test]
    fn test_blank_text_filters_are_ignored() {
        let today = date(2024, 3, 13);
        let filter = EntryFilter {
            person: Some("  ".to_string()),
            item: Some(String::new()),
            ..Default::default()
        };
        assert!(filter.matches(&entry(today, "X", "Tea", Action::Issued), today));
    }
}
