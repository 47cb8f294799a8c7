use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Amount;

/// Model recorded when the customer's phone model was not given.
pub const UNKNOWN_MODEL: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Labor: repairs, flashing, unlocking
    #[serde(rename = "Job/Service")]
    JobService,
    /// A physical part sold over the counter
    #[serde(rename = "Spare/Good")]
    SpareGood,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::JobService => "Job/Service",
            Category::SpareGood => "Spare/Good",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "job/service" | "jobservice" | "job" | "service" => Some(Category::JobService),
            "spare/good" | "sparegood" | "spare" | "good" => Some(Category::SpareGood),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single sale or service event.
/// Transactions are never edited in place; a wrong entry is removed and recorded again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Uppercased phone model, `N/A` when unknown
    pub model: String,
    /// Title-cased item or service name
    pub item: String,
    pub category: Category,
    pub price: Amount,
}

impl Transaction {
    /// Build a transaction from already-normalized fields.
    pub fn new(
        date: NaiveDate,
        model: impl Into<String>,
        item: impl Into<String>,
        category: Category,
        price: Amount,
    ) -> Self {
        let model = model.into();
        Self {
            date,
            model: if model.trim().is_empty() {
                UNKNOWN_MODEL.to_string()
            } else {
                model
            },
            item: item.into(),
            category,
            price,
        }
    }
}

/// Uppercase and trim a phone model; blank input becomes `N/A`.
pub fn normalize_model(raw: &str) -> String {
    let model = raw.trim().to_uppercase();
    if model.is_empty() {
        UNKNOWN_MODEL.to_string()
    } else {
        model
    }
}

/// Trim and title-case an item name.
/// A letter is uppercased when it starts a word (follows anything that is not a letter),
/// all other letters are lowercased: "lcd screen" -> "Lcd Screen", "a10s" -> "A10S".
pub fn normalize_item(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_is_letter = false;
    for ch in raw.trim().chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}
