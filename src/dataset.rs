use crate::schema::BudgetRecord;
use chrono::NaiveDate;

/// The loaded record collection. Historical and forecast views are filters over
/// the same backing vector, never copies.
#[derive(Debug, Clone, Default)]
pub struct BudgetDataset {
    records: Vec<BudgetRecord>,
}

impl BudgetDataset {
    pub fn new(records: Vec<BudgetRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[BudgetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn historical(&self) -> impl Iterator<Item = &BudgetRecord> {
        self.records.iter().filter(|r| !r.is_forecast)
    }

    pub fn forecast(&self) -> impl Iterator<Item = &BudgetRecord> {
        self.records.iter().filter(|r| r.is_forecast)
    }

    /// The last `n` records in load order.
    pub fn tail(&self, n: usize) -> &[BudgetRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).min()
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, forecast: bool) -> BudgetRecord {
        BudgetRecord::new(NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), "NORD", 100.0, forecast)
    }

    #[test]
    fn test_partition_views() {
        let dataset = BudgetDataset::new(vec![record(1, false), record(2, true), record(3, false)]);
        assert_eq!(dataset.historical().count(), 2);
        assert_eq!(dataset.forecast().count(), 1);
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_tail_and_date_bounds() {
        let dataset = BudgetDataset::new(vec![record(5, false), record(2, false), record(9, false)]);
        assert_eq!(dataset.tail(2).len(), 2);
        assert_eq!(dataset.tail(10).len(), 3);
        assert_eq!(dataset.min_date(), NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(dataset.max_date(), NaiveDate::from_ymd_opt(2024, 1, 9));
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = BudgetDataset::empty();
        assert!(dataset.is_empty());
        assert!(dataset.tail(10).is_empty());
        assert_eq!(dataset.max_date(), None);
    }
}
