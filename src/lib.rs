pub mod api;
pub mod app;
#[cfg(feature = "csr")]
pub mod boot;
pub mod config;
pub mod editor;
pub mod error;
pub mod model;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = boot::mount() {
        leptos::logging::error!("hunt admin failed to start: {}", e);
    }
}

// JS `\w` is ASCII only, so spell the class out instead of using Unicode `\w`.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_-]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]+")
        .expect("email pattern is valid")
});

/// Returns true if `email` contains something shaped like `user@host.tld`. The match is not
/// anchored; this is a typo filter, the server decides who may actually join.
pub fn valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Hidden field name for an item added to a hunt that has not been created yet.
pub fn item_name_field(index: usize) -> String {
    format!("items-{}-name", index)
}

pub fn item_required_field(index: usize) -> String {
    format!("items-{}-required", index)
}

pub fn participant_email_field(index: usize) -> String {
    format!("participants-{}-email", index)
}

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Reformats a raw server timestamp as `MM-DD-YYYY`. Returns `None` if the value isn't a
/// recognised date, in which case callers leave the original text alone.
pub fn format_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.date_naive()
    } else if let Some(dt) = TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        dt.date()
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?
    };
    Some(date.format("%m-%d-%Y").to_string())
}

/// Whether a table should be revealed or concealed after a row count change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Reveal,
    Conceal,
}

/// Rows of an item or participant table together with their visibility counter. The count is
/// always the number of rows, so the table is visible exactly when it has a row.
///
/// Each row also gets a local key (for rendering) that is never reused, and rows added for batch
/// submission get a field index from a separate counter that only grows, so deleting a row never
/// hands its index to a later one.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTable<T> {
    rows: Vec<(u64, T)>,
    next_key: u64,
    next_field_index: usize,
}

impl<T> Default for RowTable<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_key: 0,
            next_field_index: 0,
        }
    }
}

impl<T> RowTable<T> {
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_visible(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Appends a row, returning its key and `Reveal` if this was the first row.
    pub fn push(&mut self, row: T) -> (u64, Option<Transition>) {
        let key = self.next_key;
        self.next_key += 1;
        self.rows.push((key, row));
        let transition = (self.rows.len() == 1).then_some(Transition::Reveal);
        (key, transition)
    }

    /// Removes the row with `key`, returning it and `Conceal` if it was the last row.
    pub fn remove(&mut self, key: u64) -> Option<(T, Option<Transition>)> {
        let position = self.rows.iter().position(|(k, _)| *k == key)?;
        let (_, row) = self.rows.remove(position);
        let transition = self.rows.is_empty().then_some(Transition::Conceal);
        Some((row, transition))
    }

    pub fn allocate_field_index(&mut self) -> usize {
        let index = self.next_field_index;
        self.next_field_index += 1;
        index
    }

    pub fn get(&self, key: u64) -> Option<&T> {
        self.rows.iter().find(|(k, _)| *k == key).map(|(_, row)| row)
    }

    pub fn get_mut(&mut self, key: u64) -> Option<&mut T> {
        self.rows
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, row)| row)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> {
        self.rows.iter().map(|(k, row)| (*k, row))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.iter_mut().map(|(_, row)| row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        for email in [
            "a@b.com",
            "first-last@mail.example.org",
            "under_score@x-y.io",
            "2024@sub.domain.co.uk",
        ] {
            assert!(valid_email(email), "{} should be accepted", email);
        }

        for email in ["", "plainaddress", "a@b", "@b.com", "a@.com", "a b@c", "é@ü.de"] {
            assert!(!valid_email(email), "{} should be rejected", email);
        }
    }

    #[test]
    fn test_valid_email_is_unanchored() {
        // Surrounding text doesn't prevent a match.
        assert!(valid_email("Name <a@b.com>"));
        assert!(valid_email("  a@b.com  "));
    }

    #[test]
    fn test_batch_field_names() {
        assert_eq!(item_name_field(0), "items-0-name");
        assert_eq!(item_required_field(3), "items-3-required");
        assert_eq!(participant_email_field(12), "participants-12-email");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp("2016-03-04 12:30:00.123456").as_deref(),
            Some("03-04-2016")
        );
        assert_eq!(
            format_timestamp("2016-03-04T12:30:00").as_deref(),
            Some("03-04-2016")
        );
        assert_eq!(
            format_timestamp("2016-11-30T23:59:59+05:00").as_deref(),
            Some("11-30-2016")
        );
        assert_eq!(format_timestamp(" 2016-01-09 ").as_deref(), Some("01-09-2016"));
        assert_eq!(format_timestamp("yesterday"), None);
        assert_eq!(format_timestamp(""), None);
    }

    #[test]
    fn test_row_table_visibility_crosses_zero() {
        let mut table = RowTable::default();
        assert!(!table.is_visible());

        let (first, transition) = table.push("a");
        assert_eq!(transition, Some(Transition::Reveal));
        let (second, transition) = table.push("b");
        assert_eq!(transition, None);
        assert_eq!(table.count(), 2);

        assert_eq!(table.remove(first), Some(("a", None)));
        assert!(table.is_visible());
        assert_eq!(table.remove(second), Some(("b", Some(Transition::Conceal))));
        assert!(!table.is_visible());

        // Unknown keys leave the table alone.
        assert_eq!(table.remove(second), None);
        assert_eq!(table.count(), 0);

        let (_, transition) = table.push("c");
        assert_eq!(transition, Some(Transition::Reveal));
    }

    #[test]
    fn test_row_table_keys_and_indices_are_not_reused() {
        let mut table = RowTable::default();
        let (k0, _) = table.push(());
        let i0 = table.allocate_field_index();
        table.remove(k0);
        let (k1, _) = table.push(());
        let i1 = table.allocate_field_index();
        assert_ne!(k0, k1);
        assert_ne!(i0, i1);
    }
}
