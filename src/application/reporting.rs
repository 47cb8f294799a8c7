use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, Category, Transaction};

/// Named reporting windows, always ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    ThisMonth,
    ThisYear,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::ThisMonth => "month",
            Period::ThisYear => "year",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "today" => Some(Period::Today),
            "month" | "this-month" => Some(Period::ThisMonth),
            "year" | "this-year" => Some(Period::ThisYear),
            _ => None,
        }
    }

    /// Inclusive `(start, end)` of the period that contains `today`.
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = match self {
            Period::Today => today,
            Period::ThisMonth => today.with_day(1).unwrap_or(today),
            Period::ThisYear => today.with_ordinal(1).unwrap_or(today),
        };
        (start, today)
    }
}

/// Grouping used by the frequency ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankKey {
    ItemModel,
    CategoryItemModel,
}

impl RankKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankKey::ItemModel => "item-model",
            RankKey::CategoryItemModel => "category-item-model",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "item-model" | "item" => Some(RankKey::ItemModel),
            "category-item-model" | "category" => Some(RankKey::CategoryItemModel),
            _ => None,
        }
    }
}

/// One group of the ranking. `category` is only set when grouping by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub item: String,
    pub model: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueReport {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub total: Amount,
    pub count: usize,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub total: Amount,
    pub count: usize,
    pub percentage: f64,
}

/// Records dated within `start..=end`. An inverted range selects nothing.
pub fn filter_by_range(records: &[Transaction], start: NaiveDate, end: NaiveDate) -> Vec<Transaction> {
    records
        .iter()
        .filter(|t| start <= t.date && t.date <= end)
        .cloned()
        .collect()
}

pub fn total_revenue(records: &[Transaction]) -> Amount {
    records.iter().map(|t| t.price).sum()
}

/// Count records per group, most frequent first.
/// Equal counts are ordered by category, then item, then model.
pub fn rank_by_frequency(records: &[Transaction], key: RankKey) -> Vec<RankEntry> {
    let mut counts: HashMap<(Option<Category>, &str, &str), usize> = HashMap::new();

    for record in records {
        let category = match key {
            RankKey::ItemModel => None,
            RankKey::CategoryItemModel => Some(record.category),
        };
        *counts
            .entry((category, record.item.as_str(), record.model.as_str()))
            .or_insert(0) += 1;
    }

    let mut ranking: Vec<RankEntry> = counts
        .into_iter()
        .map(|((category, item, model), count)| RankEntry {
            category,
            item: item.to_string(),
            model: model.to_string(),
            count,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.item.cmp(&b.item))
            .then_with(|| a.model.cmp(&b.model))
    });

    ranking
}

/// Revenue within `start..=end`, split by category.
pub fn revenue_report(records: &[Transaction], start: NaiveDate, end: NaiveDate) -> RevenueReport {
    let in_range = filter_by_range(records, start, end);
    let total = total_revenue(&in_range);

    let mut categories = Vec::new();
    for category in [Category::JobService, Category::SpareGood] {
        let (count, sum) = in_range
            .iter()
            .filter(|t| t.category == category)
            .fold((0usize, 0 as Amount), |(count, sum), t| (count + 1, sum + t.price));
        if count == 0 {
            continue;
        }
        let percentage = if total > 0 {
            (sum as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        categories.push(CategorySummary {
            category,
            total: sum,
            count,
            percentage,
        });
    }

    RevenueReport {
        from_date: start,
        to_date: end,
        total,
        count: in_range.len(),
        categories,
    }
}
