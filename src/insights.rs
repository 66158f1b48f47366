use crate::schema::{BudgetRecord, YearMonth};
use crate::seasonality::{seasonal_impact, SeasonalFlag};
use crate::utils::{mean, sample_std};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TOP_PROFIT_CENTERS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GroupStats {
    pub sum: f64,
    pub mean: f64,
    pub count: usize,
}

impl GroupStats {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.mean = self.sum / self.count as f64;
    }
}

/// Sum/mean/count of the budget per key, keys in ascending order.
pub fn group_by<K, F>(records: &[BudgetRecord], key: F) -> BTreeMap<K, GroupStats>
where
    K: Ord,
    F: Fn(&BudgetRecord) -> K,
{
    let mut groups: BTreeMap<K, GroupStats> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().push(record.budget);
    }
    groups
}

fn sums<K: Ord + Clone>(groups: &BTreeMap<K, GroupStats>) -> BTreeMap<K, f64> {
    groups.iter().map(|(k, s)| (k.clone(), s.sum)).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProfitCenterTotal {
    pub name: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyTrendPoint {
    pub period: YearMonth,
    pub budget: f64,
    /// Percent change against the previous month. `None` for the first month.
    pub growth: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TrendSummary {
    pub monthly: Vec<MonthlyTrendPoint>,
    pub avg_growth: Option<f64>,
    pub volatility: Option<f64>,
}

impl TrendSummary {
    pub fn growth_series(&self) -> Vec<f64> {
        self.monthly.iter().filter_map(|p| p.growth).collect()
    }
}

/// Aggregates computed once per dataset load. Never updated incrementally.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct InsightSnapshot {
    pub total_budget: f64,
    pub avg_budget: f64,
    pub record_count: usize,
    pub budget_by_entity: BTreeMap<String, f64>,
    pub budget_by_year: BTreeMap<i32, f64>,
    pub budget_by_month: BTreeMap<YearMonth, f64>,
    pub budget_by_category: BTreeMap<String, f64>,
    pub ramadan_impact: f64,
    pub december_impact: f64,
    pub september_impact: f64,
    pub top_profit_centers: Vec<ProfitCenterTotal>,
    pub trends: TrendSummary,
}

impl InsightSnapshot {
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    pub fn seasonal_impact(&self, flag: SeasonalFlag) -> f64 {
        match flag {
            SeasonalFlag::Ramadan => self.ramadan_impact,
            SeasonalFlag::December => self.december_impact,
            SeasonalFlag::September => self.september_impact,
        }
    }
}

pub fn compute_insights(records: &[BudgetRecord]) -> InsightSnapshot {
    if records.is_empty() {
        return InsightSnapshot::default();
    }

    let budgets: Vec<f64> = records.iter().map(|r| r.budget).collect();
    let total_budget: f64 = budgets.iter().sum();
    let by_month = sums(&group_by(records, |r| r.period()));

    let snapshot = InsightSnapshot {
        total_budget,
        avg_budget: mean(&budgets).unwrap_or(0.0),
        record_count: records.len(),
        budget_by_entity: sums(&group_by(records, |r| r.entity.clone())),
        budget_by_year: sums(&group_by(records, |r| r.year)),
        budget_by_category: sums(&group_by(records, |r| r.category.to_string())),
        ramadan_impact: seasonal_impact(records, SeasonalFlag::Ramadan),
        december_impact: seasonal_impact(records, SeasonalFlag::December),
        september_impact: seasonal_impact(records, SeasonalFlag::September),
        top_profit_centers: top_profit_centers(records, TOP_PROFIT_CENTERS),
        trends: compute_trends(&by_month),
        budget_by_month: by_month,
    };

    debug!(
        "Computed insights over {} records ({} months)",
        snapshot.record_count,
        snapshot.budget_by_month.len()
    );

    snapshot
}

/// Largest profit centers by total budget, ties broken by name.
pub fn top_profit_centers(records: &[BudgetRecord], n: usize) -> Vec<ProfitCenterTotal> {
    let mut totals: Vec<ProfitCenterTotal> = group_by(records, |r| r.profit_center.clone())
        .into_iter()
        .map(|(name, stats)| ProfitCenterTotal {
            name,
            total: stats.sum,
        })
        .collect();
    totals.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    totals.truncate(n);
    totals
}

/// Month-over-month growth in percent. A zero previous month yields 0 growth.
pub fn compute_trends(by_month: &BTreeMap<YearMonth, f64>) -> TrendSummary {
    let mut monthly = Vec::with_capacity(by_month.len());
    let mut previous: Option<f64> = None;

    for (period, budget) in by_month {
        let growth = previous.map(|prev| {
            if prev == 0.0 {
                0.0
            } else {
                (budget - prev) / prev * 100.0
            }
        });
        monthly.push(MonthlyTrendPoint {
            period: *period,
            budget: *budget,
            growth,
        });
        previous = Some(*budget);
    }

    let growth: Vec<f64> = monthly.iter().filter_map(|p| p.growth).collect();

    TrendSummary {
        avg_growth: mean(&growth),
        volatility: sample_std(&growth),
        monthly,
    }
}
