use crate::schema::BudgetRecord;
use crate::utils::mean;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonalFlag {
    Ramadan,
    December,
    September,
}

impl SeasonalFlag {
    pub fn is_set(&self, record: &BudgetRecord) -> bool {
        match self {
            Self::Ramadan => record.is_ramadan,
            Self::December => record.is_december,
            Self::September => record.is_september,
        }
    }

    /// Column label used in context tables.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ramadan => "Ramadan",
            Self::December => "Décembre",
            Self::September => "Septembre",
        }
    }
}

/// Mean budget with the flag minus mean budget without it. 0 when either side is empty.
pub fn seasonal_impact(records: &[BudgetRecord], flag: SeasonalFlag) -> f64 {
    let (with, without): (Vec<&BudgetRecord>, Vec<&BudgetRecord>) =
        records.iter().partition(|r| flag.is_set(r));

    let with: Vec<f64> = with.iter().map(|r| r.budget).collect();
    let without: Vec<f64> = without.iter().map(|r| r.budget).collect();

    match (mean(&with), mean(&without)) {
        (Some(a), Some(b)) => a - b,
        _ => 0.0,
    }
}
