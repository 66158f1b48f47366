use crate::config::Thresholds;
use crate::error::Result;
use crate::insights::{group_by, top_profit_centers, ProfitCenterTotal};
use crate::schema::{AccountCategory, ApprovalStatus, BudgetRecord};
use crate::stats::DateRange;
use crate::utils::{format_amount, mean, sample_std, share_percent, strip_entity_prefix};
use crate::AnalyticsContext;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

const REPORT_TOP_PROFIT_CENTERS: usize = 5;

/// Record selection for a report. Empty lists mean no restriction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReportFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub categories: Vec<AccountCategory>,
}

impl ReportFilter {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn with_entities(mut self, entities: Vec<String>) -> Self {
        self.entities = entities;
        self
    }

    pub fn with_categories(mut self, categories: Vec<AccountCategory>) -> Self {
        self.categories = categories;
        self
    }

    pub fn accepts(&self, record: &BudgetRecord) -> bool {
        self.start.map_or(true, |s| record.date >= s)
            && self.end.map_or(true, |e| record.date <= e)
            && (self.entities.is_empty() || self.entities.contains(&record.entity))
            && (self.categories.is_empty() || self.categories.contains(&record.category))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntityRow {
    pub entity: String,
    pub total: f64,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShareRow {
    pub label: String,
    pub total: f64,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatusRow {
    pub status: String,
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    HighRejection { rate: f64 },
    EntityImbalance,
    LowRevenue { share: f64 },
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighRejection { rate } => {
                write!(f, "Taux de rejet élevé ({:.1}%) - Réviser les critères d'approbation", rate)
            }
            Self::EntityImbalance => {
                write!(f, "Déséquilibre budgétaire entre entités - Considérer une redistribution")
            }
            Self::LowRevenue { share } => {
                write!(f, "Faible part des revenus ({:.1}%) - Renforcer les sources de revenus", share)
            }
        }
    }
}

/// Everything a PDF renderer needs, already aggregated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BudgetReport {
    pub period: DateRange,
    pub record_count: usize,
    pub total_budget: f64,
    pub avg_budget: f64,
    pub entities: Vec<EntityRow>,
    pub categories: Vec<ShareRow>,
    /// Average month-over-month growth of the whole dataset, in percent.
    pub avg_monthly_growth: f64,
    pub top_profit_centers: Vec<ProfitCenterTotal>,
    pub statuses: Vec<StatusRow>,
    pub recommendations: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}

impl BudgetReport {
    /// `None` when the filter leaves no records.
    pub fn build(analytics: &AnalyticsContext, filter: &ReportFilter, thresholds: &Thresholds) -> Option<Self> {
        let records: Vec<BudgetRecord> = analytics
            .dataset()
            .records()
            .iter()
            .filter(|r| filter.accepts(r))
            .cloned()
            .collect();
        if records.is_empty() {
            debug!("Report filter matched no records");
            return None;
        }

        let period = DateRange {
            start: records.iter().map(|r| r.date).min()?,
            end: records.iter().map(|r| r.date).max()?,
        };
        let budgets: Vec<f64> = records.iter().map(|r| r.budget).collect();
        let total_budget: f64 = budgets.iter().sum();
        let n = records.len();

        let entities: Vec<EntityRow> = group_by(&records, |r| r.entity.clone())
            .into_iter()
            .map(|(entity, stats)| EntityRow {
                entity: strip_entity_prefix(&entity).to_string(),
                total: stats.sum,
                mean: stats.mean,
                count: stats.count,
            })
            .collect();

        let categories = group_by(&records, |r| r.category.to_string())
            .into_iter()
            .map(|(label, stats)| ShareRow {
                label,
                total: stats.sum,
                share: share_percent(stats.sum, total_budget),
            })
            .collect();

        let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
        for record in &records {
            *status_counts.entry(record.approval_status.to_string()).or_default() += 1;
        }
        let statuses = status_counts
            .into_iter()
            .map(|(status, count)| StatusRow {
                status,
                count,
                share: share_percent(count as f64, n as f64),
            })
            .collect();

        let recommendations = recommend(&records, &entities, total_budget, thresholds);

        let report = Self {
            period,
            record_count: n,
            total_budget,
            avg_budget: mean(&budgets).unwrap_or(0.0),
            entities,
            categories,
            avg_monthly_growth: analytics.insights().trends.avg_growth.unwrap_or(0.0),
            top_profit_centers: top_profit_centers(&records, REPORT_TOP_PROFIT_CENTERS),
            statuses,
            recommendations,
            generated_at: Utc::now(),
        };

        info!(
            "Built report over {} records ({} recommendations)",
            report.record_count,
            report.recommendations.len()
        );
        Some(report)
    }
}

fn recommend(records: &[BudgetRecord], entities: &[EntityRow], total: f64, thresholds: &Thresholds) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let n = records.len() as f64;

    let rejected = records
        .iter()
        .filter(|r| r.approval_status == ApprovalStatus::Rejected)
        .count() as f64;
    let rate = share_percent(rejected, n);
    if rate > thresholds.report_rejection_rate * 100.0 {
        out.push(Recommendation::HighRejection { rate });
    }

    let totals: Vec<f64> = entities.iter().map(|e| e.total).collect();
    if let (Some(std), Some(avg)) = (sample_std(&totals), mean(&totals)) {
        if std > avg * thresholds.report_entity_dispersion {
            out.push(Recommendation::EntityImbalance);
        }
    }

    if total != 0.0 {
        let revenue: f64 = records
            .iter()
            .filter(|r| r.category == AccountCategory::Revenue)
            .map(|r| r.budget)
            .sum();
        let share = revenue / total;
        if share < thresholds.min_revenue_share {
            out.push(Recommendation::LowRevenue { share: share * 100.0 });
        }
    }

    out
}

impl fmt::Display for BudgetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 RAPPORT BUDGÉTAIRE - LA POSTE TUNISIENNE")?;
        writeln!(
            f,
            "Période: {} - {}",
            self.period.start.format("%d/%m/%Y"),
            self.period.end.format("%d/%m/%Y")
        )?;
        writeln!(f, "Nombre d'enregistrements: {}", self.record_count)?;

        writeln!(f, "\n💰 RÉSUMÉ FINANCIER")?;
        writeln!(f, "Budget total: {} TND", format_amount(self.total_budget))?;
        writeln!(f, "Budget moyen: {} TND", format_amount(self.avg_budget))?;

        writeln!(f, "\n🏢 ANALYSE PAR ENTITÉ")?;
        for row in &self.entities {
            writeln!(
                f,
                "{} | {} | {} | {}",
                row.entity,
                format_amount(row.total),
                format_amount(row.mean),
                row.count
            )?;
        }

        writeln!(f, "\n📊 ANALYSE PAR CATÉGORIE")?;
        for row in &self.categories {
            writeln!(f, "{} | {} | {:.1}%", row.label, format_amount(row.total), row.share)?;
        }

        writeln!(f, "\n📈 TENDANCES MENSUELLES")?;
        writeln!(f, "Croissance moyenne mensuelle: {:.2}%", self.avg_monthly_growth)?;

        writeln!(f, "\n🏆 TOP 5 CENTRES DE PROFIT")?;
        for pc in &self.top_profit_centers {
            writeln!(f, "{} | {}", pc.name, format_amount(pc.total))?;
        }

        writeln!(f, "\n✅ ANALYSE DES STATUTS")?;
        for row in &self.statuses {
            writeln!(f, "{} | {} | {:.1}%", row.status, row.count, row.share)?;
        }

        writeln!(f, "\n💡 RECOMMANDATIONS")?;
        for rec in &self.recommendations {
            writeln!(f, "• {}", rec)?;
        }

        write!(f, "\nRapport généré le {}", self.generated_at.format("%d/%m/%Y à %H:%M"))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntitySheetRow {
    pub entity: String,
    pub sum: f64,
    pub mean: f64,
    pub count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategorySheetRow {
    pub category: String,
    pub sum: f64,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonthlySheetRow {
    pub year: i32,
    pub month: u32,
    pub budget: f64,
}

/// Summary sheets of a spreadsheet export. The full-data sheet is the record slice itself.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportSheets {
    pub entities: Vec<EntitySheetRow>,
    pub categories: Vec<CategorySheetRow>,
    pub monthly: Vec<MonthlySheetRow>,
}

impl ExportSheets {
    pub fn build(records: &[BudgetRecord]) -> Self {
        let mut date_bounds: BTreeMap<&str, (NaiveDate, NaiveDate)> = BTreeMap::new();
        for record in records {
            date_bounds
                .entry(record.entity.as_str())
                .and_modify(|(lo, hi)| {
                    *lo = (*lo).min(record.date);
                    *hi = (*hi).max(record.date);
                })
                .or_insert((record.date, record.date));
        }

        let entities = group_by(records, |r| r.entity.clone())
            .into_iter()
            .filter_map(|(entity, stats)| {
                let (first_date, last_date) = *date_bounds.get(entity.as_str())?;
                Some(EntitySheetRow {
                    entity,
                    sum: round2(stats.sum),
                    mean: round2(stats.mean),
                    count: stats.count,
                    first_date,
                    last_date,
                })
            })
            .collect();

        let categories = group_by(records, |r| r.category.to_string())
            .into_iter()
            .map(|(category, stats)| CategorySheetRow {
                category,
                sum: round2(stats.sum),
                mean: round2(stats.mean),
                count: stats.count,
            })
            .collect();

        let monthly = group_by(records, |r| (r.year, r.month))
            .into_iter()
            .map(|((year, month), stats)| MonthlySheetRow {
                year,
                month,
                budget: round2(stats.sum),
            })
            .collect();

        Self {
            entities,
            categories,
            monthly,
        }
    }
}

/// Writes one sheet as CSV with a header row.
pub fn write_sheet<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::BudgetDataset;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn sample() -> AnalyticsContext {
        AnalyticsContext::new(BudgetDataset::new(vec![
            BudgetRecord::new(d(1, 5), "POSTE_TN_REGION_NORD", 900.0, false),
            BudgetRecord::new(d(1, 20), "POSTE_TN_REGION_SUD", 100.0, false)
                .with_category(AccountCategory::Opex)
                .with_status(ApprovalStatus::Rejected),
            BudgetRecord::new(d(2, 5), "POSTE_TN_REGION_NORD", 300.0, false).with_category(AccountCategory::Capex),
            BudgetRecord::new(d(3, 5), "POSTE_TN_REGION_SUD", 100.333, false),
        ]))
    }

    #[test]
    fn test_report_sections_and_recommendations() {
        let report = BudgetReport::build(&sample(), &ReportFilter::default(), &Thresholds::default()).unwrap();
        assert_eq!(report.record_count, 4);
        assert_eq!(report.period.start, d(1, 5));
        assert_eq!(report.entities[0].entity, "NORD");
        assert_eq!(report.entities[0].count, 2);
        assert_eq!(report.statuses.len(), 2);
        assert!(report
            .recommendations
            .contains(&Recommendation::HighRejection { rate: 25.0 }));
        assert!(report.recommendations.contains(&Recommendation::EntityImbalance));
        assert!(report.to_string().contains("💡 RECOMMANDATIONS"));
    }

    #[test]
    fn test_filter_by_entity_and_period() {
        let ctx = sample();
        let filter = ReportFilter::between(d(1, 1), d(1, 31)).with_entities(vec!["POSTE_TN_REGION_NORD".to_string()]);
        let report = BudgetReport::build(&ctx, &filter, &Thresholds::default()).unwrap();
        assert_eq!(report.record_count, 1);
        assert!(report.recommendations.is_empty());

        let nothing = ReportFilter::default().with_categories(vec![AccountCategory::Other("MISC".to_string())]);
        assert!(BudgetReport::build(&ctx, &nothing, &Thresholds::default()).is_none());
    }

    #[test]
    fn test_export_sheets() {
        let ctx = sample();
        let sheets = ExportSheets::build(ctx.dataset().records());
        assert_eq!(sheets.entities.len(), 2);
        let sud = &sheets.entities[1];
        assert_eq!(sud.first_date, d(1, 20));
        assert_eq!(sud.last_date, d(3, 5));
        assert_eq!(sud.sum, 200.33);
        assert_eq!(sheets.monthly.len(), 3);
        assert_eq!(sheets.monthly[0].budget, 1000.0);

        let mut buf = Vec::new();
        write_sheet(&mut buf, &sheets.categories).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("category,sum,mean,count\n"));
    }
}
