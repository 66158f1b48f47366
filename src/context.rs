//! Keyword-routed context selection.
//!
//! A question is lower-cased and checked against an ordered rule table. Every rule
//! whose keyword list has a substring hit contributes one group-by summary, in
//! declaration order. When nothing matches, a fallback block with the latest
//! records and global statistics is returned instead. The output is a pure
//! function of the question and the dataset.

use crate::dataset::BudgetDataset;
use crate::insights::{group_by, GroupStats, InsightSnapshot};
use crate::schema::BudgetRecord;
use crate::seasonality::SeasonalFlag;
use crate::utils::format_amount;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FALLBACK_RECENT_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topic {
    Entity,
    Period,
    Category,
    ProfitCenter,
    CostCenter,
    Department,
    ClientSegment,
    ServiceType,
    ForecastSplit,
    Ramadan,
    December,
    September,
}

#[derive(Debug, Clone, Copy)]
enum Columns {
    Sum,
    SumMean,
    SumMeanCount,
}

pub struct ContextRule {
    pub topic: Topic,
    pub heading: &'static str,
    pub keywords: &'static [&'static str],
    key_label: &'static str,
    columns: Columns,
    grouping: fn(&[BudgetRecord]) -> Vec<(String, GroupStats)>,
}

impl ContextRule {
    pub fn matches(&self, lowered_question: &str) -> bool {
        self.keywords.iter().any(|k| lowered_question.contains(k))
    }

    fn render(&self, records: &[BudgetRecord]) -> String {
        let rows = (self.grouping)(records);
        let mut out = format!("\n{}\n", self.heading);
        let header = match self.columns {
            Columns::Sum => "sum",
            Columns::SumMean => "sum | mean",
            Columns::SumMeanCount => "sum | mean | count",
        };
        out.push_str(&format!("{} | {}\n", self.key_label, header));
        for (key, stats) in rows {
            let line = match self.columns {
                Columns::Sum => format!("{} | {:.2}\n", key, stats.sum),
                Columns::SumMean => format!("{} | {:.2} | {:.2}\n", key, stats.sum, stats.mean),
                Columns::SumMeanCount => format!(
                    "{} | {:.2} | {:.2} | {}\n",
                    key, stats.sum, stats.mean, stats.count
                ),
            };
            out.push_str(&line);
        }
        out
    }
}

fn stringify<K: ToString>(groups: BTreeMap<K, GroupStats>) -> Vec<(String, GroupStats)> {
    groups.into_iter().map(|(k, s)| (k.to_string(), s)).collect()
}

fn by_flag(records: &[BudgetRecord], flag: SeasonalFlag) -> Vec<(String, GroupStats)> {
    stringify(group_by(records, |r| u8::from(flag.is_set(r))))
}

const PERIOD_KEYWORDS: &[&str] = &[
    "2018", "2019", "2020", "2021", "2022", "2023", "2024", "2025", "2026", "2027",
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
    "octobre", "novembre", "décembre",
];

/// The routing table. Order is part of the observable output.
pub static CONTEXT_RULES: &[ContextRule] = &[
    ContextRule {
        topic: Topic::Entity,
        heading: "Résumé par entité régionale:",
        keywords: &["centre", "nord", "sud", "région", "entity", "entité"],
        key_label: "Entité",
        columns: Columns::SumMeanCount,
        grouping: |records| stringify(group_by(records, |r| r.entity.clone())),
    },
    ContextRule {
        topic: Topic::Period,
        heading: "Résumé par année et mois:",
        keywords: PERIOD_KEYWORDS,
        key_label: "Année-Mois",
        columns: Columns::SumMean,
        grouping: |records| stringify(group_by(records, |r| r.period())),
    },
    ContextRule {
        topic: Topic::Category,
        heading: "Résumé par catégorie de compte budgétaire:",
        keywords: &[
            "revenue",
            "capex",
            "opex",
            "catégorie",
            "type de compte",
            "nom de compte",
            "catégorie de compte",
            "compte budgétaire",
        ],
        key_label: "catégorie_compte",
        columns: Columns::Sum,
        grouping: |records| stringify(group_by(records, |r| r.category.to_string())),
    },
    ContextRule {
        topic: Topic::ProfitCenter,
        heading: "Résumé par centre de profit:",
        keywords: &["logistique", "colis", "services", "courrier", "profit", "centre de profit"],
        key_label: "Centre_de_profit",
        columns: Columns::Sum,
        grouping: |records| stringify(group_by(records, |r| r.profit_center.clone())),
    },
    ContextRule {
        topic: Topic::CostCenter,
        heading: "Résumé par centre de coût:",
        keywords: &["commercial", "administration", "tech", "centre de coût", "coût"],
        key_label: "Centre_de_coût",
        columns: Columns::Sum,
        grouping: |records| stringify(group_by(records, |r| r.cost_center.clone())),
    },
    ContextRule {
        topic: Topic::Department,
        heading: "Résumé par département:",
        keywords: &["opérations", "finance", "département"],
        key_label: "Département",
        columns: Columns::Sum,
        grouping: |records| stringify(group_by(records, |r| r.department.clone())),
    },
    ContextRule {
        topic: Topic::ClientSegment,
        heading: "Résumé par segment client:",
        keywords: &["particuliers", "institutions", "entreprises", "client", "segment"],
        key_label: "Segment_client",
        columns: Columns::Sum,
        grouping: |records| stringify(group_by(records, |r| r.client_segment.clone())),
    },
    ContextRule {
        topic: Topic::ServiceType,
        heading: "Résumé par type de service:",
        keywords: &["express", "international", "standard", "service", "type de service"],
        key_label: "Type_service",
        columns: Columns::Sum,
        grouping: |records| stringify(group_by(records, |r| r.service_type.clone())),
    },
    ContextRule {
        topic: Topic::ForecastSplit,
        heading: "Répartition entre données historiques et prévisions:",
        keywords: &["prévision", "forecast", "futur", "prédiction"],
        key_label: "is_forecast",
        columns: Columns::SumMeanCount,
        grouping: |records| stringify(group_by(records, |r| u8::from(r.is_forecast))),
    },
    ContextRule {
        topic: Topic::Ramadan,
        heading: "Impact de Ramadan:",
        keywords: &["ramadan"],
        key_label: SeasonalFlag::Ramadan.label(),
        columns: Columns::SumMean,
        grouping: |records| by_flag(records, SeasonalFlag::Ramadan),
    },
    ContextRule {
        topic: Topic::December,
        heading: "Impact de Décembre:",
        keywords: &["décembre", "decembre"],
        key_label: SeasonalFlag::December.label(),
        columns: Columns::SumMean,
        grouping: |records| by_flag(records, SeasonalFlag::December),
    },
    ContextRule {
        topic: Topic::September,
        heading: "Impact de Septembre:",
        keywords: &["septembre"],
        key_label: SeasonalFlag::September.label(),
        columns: Columns::SumMean,
        grouping: |records| by_flag(records, SeasonalFlag::September),
    },
];

pub fn matched_topics(question: &str) -> Vec<Topic> {
    let lowered = question.to_lowercase();
    CONTEXT_RULES
        .iter()
        .filter(|rule| rule.matches(&lowered))
        .map(|rule| rule.topic)
        .collect()
}

/// Builds the data context attached to a question. Empty for an empty dataset.
pub fn select_context(question: &str, dataset: &BudgetDataset, snapshot: &InsightSnapshot) -> String {
    if dataset.is_empty() {
        return String::new();
    }

    let lowered = question.to_lowercase();
    let mut context = String::new();
    let mut topics = Vec::new();

    for rule in CONTEXT_RULES.iter().filter(|rule| rule.matches(&lowered)) {
        context.push_str(&rule.render(dataset.records()));
        topics.push(rule.topic);
    }

    if topics.is_empty() {
        context.push_str(&fallback_context(dataset, snapshot));
    }

    debug!("Context topics for question: {:?} ({} chars)", topics, context.len());
    context
}

fn fallback_context(dataset: &BudgetDataset, snapshot: &InsightSnapshot) -> String {
    let mut out = String::from("\nAperçu des dernières entrées:\n");
    out.push_str("Date | Entité | Budget | catégorie_compte | Type_service | Segment_client\n");
    for r in dataset.tail(FALLBACK_RECENT_ROWS) {
        out.push_str(&format!(
            "{} | {} | {:.2} | {} | {} | {}\n",
            r.date, r.entity, r.budget, r.category, r.service_type, r.client_segment
        ));
    }

    let breakdown = snapshot
        .budget_by_category
        .iter()
        .map(|(category, total)| format!("{}: {:.2}", category, total))
        .collect::<Vec<_>>()
        .join(", ");

    out.push_str(&format!("\nBudget total: {} TND\n", format_amount(snapshot.total_budget)));
    out.push_str(&format!("Budget moyen: {} TND\n", format_amount(snapshot.avg_budget)));
    out.push_str(&format!("Nombre d'enregistrements: {}\n", dataset.len()));
    if let (Some(start), Some(end)) = (dataset.min_date(), dataset.max_date()) {
        out.push_str(&format!("Période: {} à {}\n", start, end));
    }
    out.push_str(&format!("Répartition par catégorie de compte: {}\n", breakdown));
    out
}
