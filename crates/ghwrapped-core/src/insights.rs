use serde::Serialize;

use crate::{MonthlyBucket, StatsRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub name: String,
    pub size: u64,
    pub percent: f64,
}

/// Highlights derived from a [`StatsRecord`] for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    /// `None` when the whole window is empty
    pub busiest_month: Option<MonthlyBucket>,
    pub total_last_five_years: u64,
    pub language_shares: Vec<LanguageShare>,
    pub has_commits: bool,
}

impl Insights {
    pub fn from_record(record: &StatsRecord) -> Self {
        // Ties keep the earlier month.
        let busiest_month = record
            .monthly_contributions
            .iter()
            .fold(None::<&MonthlyBucket>, |best, bucket| match best {
                Some(b) if b.count >= bucket.count => Some(b),
                _ if bucket.count > 0 => Some(bucket),
                _ => best,
            })
            .cloned();

        let total_last_five_years = record.monthly_contributions.iter().map(|b| b.count).sum();

        let total_size: u64 = record.languages.iter().map(|l| l.size).sum();
        let language_shares = record
            .languages
            .iter()
            .map(|language| LanguageShare {
                name: language.name.clone(),
                size: language.size,
                percent: if total_size > 0 {
                    language.size as f64 / total_size as f64 * 100.0
                } else {
                    0.0
                },
            })
            .collect();

        Self {
            busiest_month,
            total_last_five_years,
            language_shares,
            has_commits: record.total_commits > 0,
        }
    }
}
