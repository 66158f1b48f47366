use crate::dataset::BudgetDataset;
use crate::error::{BudgetChatError, Result};
use crate::schema::{AccountCategory, ApprovalStatus, BudgetRecord};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, error, info};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Date,
    Entity,
    Budget,
    IsForecast,
    Category,
    ProfitCenter,
    CostCenter,
    Department,
    ClientSegment,
    ServiceType,
    ApprovalStatus,
    Ramadan,
    December,
    September,
}

const REQUIRED: [Column; 4] = [Column::Date, Column::Entity, Column::Budget, Column::IsForecast];

const COLUMN_ALIASES: &[(Column, &[&str])] = &[
    (Column::Date, &["date"]),
    (Column::Entity, &["entité", "entite", "entity"]),
    (Column::Budget, &["budget"]),
    (Column::IsForecast, &["is_forecast"]),
    (Column::Category, &["catégorie_compte", "categorie_compte", "account_category", "category"]),
    (Column::ProfitCenter, &["centre_de_profit", "profit_center"]),
    (Column::CostCenter, &["centre_de_coût", "centre_de_cout", "cost_center"]),
    (Column::Department, &["département", "departement", "department"]),
    (Column::ClientSegment, &["segment_client", "client_segment"]),
    (Column::ServiceType, &["type_service", "service_type"]),
    (Column::ApprovalStatus, &["statut_budget", "approval_status", "status"]),
    (Column::Ramadan, &["ramadan", "is_ramadan"]),
    (Column::December, &["décembre", "decembre", "is_december"]),
    (Column::September, &["septembre", "is_september"]),
];

fn column_name(column: Column) -> &'static str {
    COLUMN_ALIASES
        .iter()
        .find(|(c, _)| *c == column)
        .and_then(|(_, aliases)| aliases.first().copied())
        .unwrap_or("?")
}

struct ColumnMap {
    slots: Vec<(Column, usize)>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut slots = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            let normalized = header.trim_start_matches('\u{feff}').trim().to_lowercase();
            if let Some((column, _)) = COLUMN_ALIASES
                .iter()
                .find(|(_, aliases)| aliases.contains(&normalized.as_str()))
            {
                if !slots.iter().any(|(c, _)| c == column) {
                    slots.push((*column, idx));
                }
            }
        }

        let missing: Vec<String> = REQUIRED
            .iter()
            .filter(|column| !slots.iter().any(|(c, _)| c == *column))
            .map(|column| column_name(*column).to_string())
            .collect();

        if !missing.is_empty() {
            return Err(BudgetChatError::MissingColumns(missing));
        }

        Ok(Self { slots })
    }

    fn get<'r>(&self, row: &'r StringRecord, column: Column) -> Option<&'r str> {
        self.slots
            .iter()
            .find(|(c, _)| *c == column)
            .and_then(|(_, idx)| row.get(*idx))
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_budget(raw: &str) -> Option<f64> {
    let value = raw.trim().replace([' ', '\u{a0}'], "").parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" | "oui" => Some(true),
        "0" | "0.0" | "false" | "no" | "non" | "" => Some(false),
        _ => None,
    }
}

fn parse_row(map: &ColumnMap, row: &StringRecord) -> Option<BudgetRecord> {
    let date = parse_date(map.get(row, Column::Date)?)?;
    let budget = parse_budget(map.get(row, Column::Budget)?)?;
    let entity = map.get(row, Column::Entity)?.trim().to_string();
    let is_forecast = map
        .get(row, Column::IsForecast)
        .and_then(parse_flag)
        .unwrap_or(false);

    let text = |column: Column| -> Option<String> {
        map.get(row, column)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let flag = |column: Column| map.get(row, column).and_then(parse_flag);

    let mut record = BudgetRecord::new(date, entity, budget, is_forecast);
    if let Some(category) = text(Column::Category) {
        record.category = AccountCategory::parse(&category);
    }
    if let Some(profit_center) = text(Column::ProfitCenter) {
        record.profit_center = profit_center;
    }
    if let Some(status) = text(Column::ApprovalStatus) {
        record.approval_status = ApprovalStatus::parse(&status);
    }
    record.cost_center = text(Column::CostCenter).unwrap_or_default();
    record.department = text(Column::Department).unwrap_or_default();
    record.client_segment = text(Column::ClientSegment).unwrap_or_default();
    record.service_type = text(Column::ServiceType).unwrap_or_default();
    record.is_ramadan = flag(Column::Ramadan).unwrap_or(false);
    record.is_december = flag(Column::December).unwrap_or(date.month() == 12);
    record.is_september = flag(Column::September).unwrap_or(date.month() == 9);

    Some(record)
}

impl BudgetDataset {
    /// Parses CSV rows into records. Rows that are not valid UTF-8 or carry an
    /// unparseable date or budget are dropped; a missing required column fails
    /// the whole load.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let map = ColumnMap::from_headers(&headers)?;

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for row in csv_reader.byte_records() {
            let parsed = StringRecord::from_byte_record(row?)
                .ok()
                .and_then(|row| parse_row(&map, &row));
            match parsed {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!("Dropped {} rows that were not UTF-8 or had an unparseable date or budget", dropped);
        }

        let dataset = BudgetDataset::new(records);
        info!(
            "Loaded {} rows ({} historical, {} forecast)",
            dataset.len(),
            dataset.historical().count(),
            dataset.forecast().count()
        );

        Ok(dataset)
    }
}

pub fn load_csv(path: impl AsRef<Path>) -> Result<BudgetDataset> {
    let file = std::fs::File::open(path.as_ref())?;
    BudgetDataset::from_reader(file)
}

/// Loads the dataset or falls back to the empty "no data" state, logging why.
pub fn load_or_empty(path: impl AsRef<Path>) -> BudgetDataset {
    match load_csv(path.as_ref()) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Failed to load {}: {}", path.as_ref().display(), e);
            BudgetDataset::empty()
        }
    }
}
