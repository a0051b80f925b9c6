use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::sync::{Collection, SyncEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "Male" => Self::Male,
            "Female" => Self::Female,
            _ => Self::Other,
        }
    }
}

/// An employee record as exchanged with the cloud backend.
///
/// The wire shape (camelCase) matches what the frontend and backend already
/// speak; the password travels as an argon2 hash, never plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub job_title: String,
    pub gender: Gender,
    pub join_date: NaiveDate,
    pub probation_salary: f64,
    pub full_salary: f64,
    pub probation_months: u32,
    pub password_hash: String,
    pub first_login: bool,
}

impl Employee {
    /// Stable employee id: lowercase name initials plus join `MMDD`.
    ///
    /// ASCII names contribute the first letter of each word; other scripts
    /// contribute their first two characters.
    #[must_use]
    pub fn generate_id(name: &str, join_date: NaiveDate) -> String {
        let initials: String = if name.is_ascii() {
            name.split_whitespace()
                .filter_map(|word| word.chars().next())
                .collect()
        } else {
            name.chars().take(2).collect()
        };
        let initials = initials.to_lowercase();
        let initials = if initials.is_empty() {
            "emp".to_string()
        } else {
            initials
        };

        format!(
            "{initials}{:02}{:02}",
            join_date.month(),
            join_date.day()
        )
    }
}

impl SyncEntity for Employee {
    const COLLECTION: Collection = Collection::Employees;

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ascii_names_use_word_initials() {
        let id = Employee::generate_id("Li Ru", date(2024, 6, 15));
        assert_eq!(id, "lr0615");
    }

    #[test]
    fn non_ascii_names_use_first_two_chars() {
        let id = Employee::generate_id("李茹", date(2024, 3, 1));
        assert_eq!(id, "李茹0301");
    }

    #[test]
    fn empty_name_still_produces_an_id() {
        let id = Employee::generate_id("", date(2024, 1, 2));
        assert_eq!(id, "emp0102");
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let emp = Employee {
            id: "lr0615".to_string(),
            name: "Li Ru".to_string(),
            job_title: "Sales Manager".to_string(),
            gender: Gender::Female,
            join_date: date(2024, 6, 15),
            probation_salary: 4000.0,
            full_salary: 6000.0,
            probation_months: 3,
            password_hash: "hash".to_string(),
            first_login: true,
        };
        let json = serde_json::to_value(&emp).unwrap();
        assert_eq!(json["joinDate"], "2024-06-15");
        assert_eq!(json["probationMonths"], 3);
        assert_eq!(json["firstLogin"], true);
        assert_eq!(json["gender"], "Female");
    }
}
