use chrono::{DateTime, Datelike, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountCategory {
    #[schemars(description = "Revenue lines (REVENUE)")]
    Revenue,

    #[schemars(description = "Capital expenditure (CAPEX)")]
    Capex,

    #[schemars(description = "Operational expenditure (OPEX)")]
    Opex,

    #[schemars(description = "Any category label outside the three standard ones, kept verbatim")]
    Other(String),
}

impl AccountCategory {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "" | "REVENUE" | "REVENUS" => Self::Revenue,
            "CAPEX" => Self::Capex,
            "OPEX" => Self::Opex,
            _ => Self::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for AccountCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revenue => write!(f, "REVENUE"),
            Self::Capex => write!(f, "CAPEX"),
            Self::Opex => write!(f, "OPEX"),
            Self::Other(label) => write!(f, "{}", label),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ApprovalStatus {
    Approved,
    Rejected,
    Pending,
    Other(String),
}

impl ApprovalStatus {
    /// Accepts the French labels used in the source spreadsheets as well as English ones.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "" | "approuvé" | "approuve" | "approved" => Self::Approved,
            "rejeté" | "rejete" | "rejected" => Self::Rejected,
            "en attente" | "pending" => Self::Pending,
            _ => Self::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved => write!(f, "Approuvé"),
            Self::Rejected => write!(f, "Rejeté"),
            Self::Pending => write!(f, "En attente"),
            Self::Other(label) => write!(f, "{}", label),
        }
    }
}

/// One row of the budget dataset. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct BudgetRecord {
    pub date: NaiveDate,

    #[schemars(description = "Region code, e.g. POSTE_TN_REGION_NORD")]
    pub entity: String,

    #[schemars(description = "Budget amount in TND")]
    pub budget: f64,

    pub category: AccountCategory,
    pub profit_center: String,
    pub cost_center: String,
    pub department: String,
    pub client_segment: String,
    pub service_type: String,
    pub is_forecast: bool,
    pub approval_status: ApprovalStatus,

    pub year: i32,
    pub month: u32,
    pub is_ramadan: bool,
    pub is_december: bool,
    pub is_september: bool,
}

impl BudgetRecord {
    /// Builds a record with the documented defaults for every optional column.
    pub fn new(date: NaiveDate, entity: impl Into<String>, budget: f64, is_forecast: bool) -> Self {
        let entity = entity.into();
        Self {
            date,
            profit_center: entity.clone(),
            entity,
            budget,
            category: AccountCategory::Revenue,
            cost_center: String::new(),
            department: String::new(),
            client_segment: String::new(),
            service_type: String::new(),
            is_forecast,
            approval_status: ApprovalStatus::Approved,
            year: date.year(),
            month: date.month(),
            is_ramadan: false,
            is_december: date.month() == 12,
            is_september: date.month() == 9,
        }
    }

    pub fn with_category(mut self, category: AccountCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_status(mut self, status: ApprovalStatus) -> Self {
        self.approval_status = status;
        self
    }

    pub fn with_ramadan(mut self, is_ramadan: bool) -> Self {
        self.is_ramadan = is_ramadan;
        self
    }

    pub fn period(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }
}

/// Calendar month key. Serialized as `YYYY-MM` so it can key JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid period '{}'. Expected YYYY-MM", s))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| format!("Invalid year in period '{}'", s))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| format!("Invalid month in period '{}'", s))?;
        if !(1..=12).contains(&month) {
            return Err(format!("Month out of range in period '{}'", s));
        }
        Ok(Self { year, month })
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for YearMonth {
    fn schema_name() -> String {
        "YearMonth".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    French,
    English,
    Arabic,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::French => write!(f, "french"),
            Self::English => write!(f, "english"),
            Self::Arabic => write!(f, "arabic"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub answer: String,
    pub language: Language,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!(AccountCategory::parse("revenue"), AccountCategory::Revenue);
        assert_eq!(AccountCategory::parse(" CAPEX "), AccountCategory::Capex);
        assert_eq!(AccountCategory::parse(""), AccountCategory::Revenue);
        assert_eq!(
            AccountCategory::parse("Subventions"),
            AccountCategory::Other("Subventions".to_string())
        );
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(ApprovalStatus::parse("Rejeté"), ApprovalStatus::Rejected);
        assert_eq!(ApprovalStatus::parse("approved"), ApprovalStatus::Approved);
        assert_eq!(ApprovalStatus::parse(""), ApprovalStatus::Approved);
    }

    #[test]
    fn test_record_defaults() {
        let record = BudgetRecord::new(NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(), "NORTH", 10.0, false);
        assert_eq!(record.profit_center, "NORTH");
        assert_eq!(record.category, AccountCategory::Revenue);
        assert!(record.is_december);
        assert!(!record.is_september);
        assert_eq!(record.period(), YearMonth::new(2024, 12));
    }

    #[test]
    fn test_year_month_keys_serialize_as_strings() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(YearMonth::new(2024, 3), 12.5);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2024-03":12.5}"#);

        let back: std::collections::BTreeMap<YearMonth, f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().next(), Some(&YearMonth::new(2024, 3)));
        assert!("2024-13".parse::<YearMonth>().is_err());
    }
}
