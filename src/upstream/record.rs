//! Upstream record schema and normalization
//!
//! Upstream rows are loosely typed key/value objects: numbers may arrive as
//! JSON numbers or strings, and any field may be missing. Each row is read
//! into a [`RawRecord`] and normalized into a [`NewPerformance`] following
//! [`FIELD_RULES`]. Values that are present but cannot be used are reported
//! as [`FieldIssue`]s so the caller can decide whether to coerce or
//! quarantine the row.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::NewPerformance;

/// Numeric fields carried by an upstream row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Month,
    Year,
    TotalHouseholds,
    TotalWorkers,
    PersonDays,
    WomenParticipation,
    ScstParticipation,
    TotalFunds,
    FundsUtilized,
}

impl Field {
    /// Upstream (snake_case) field name
    pub fn name(self) -> &'static str {
        match self {
            Field::Month => "month",
            Field::Year => "year",
            Field::TotalHouseholds => "total_households",
            Field::TotalWorkers => "total_workers",
            Field::PersonDays => "person_days",
            Field::WomenParticipation => "women_participation",
            Field::ScstParticipation => "scst_participation",
            Field::TotalFunds => "total_funds",
            Field::FundsUtilized => "funds_utilized",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-negative integer; fractional input is truncated
    Count,
    /// Calendar month, 1..=12
    Month,
    /// Calendar year, > 0
    Year,
    /// Any finite float
    Float,
}

/// Value used when a field is missing or malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Zero,
    CurrentMonth,
    CurrentYear,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub kind: FieldKind,
    pub fallback: Fallback,
}

const fn rule(field: Field, kind: FieldKind, fallback: Fallback) -> FieldRule {
    FieldRule {
        field,
        kind,
        fallback,
    }
}

/// Per-field parsing and defaulting rules
pub const FIELD_RULES: [FieldRule; 9] = [
    rule(Field::Month, FieldKind::Month, Fallback::CurrentMonth),
    rule(Field::Year, FieldKind::Year, Fallback::CurrentYear),
    rule(Field::TotalHouseholds, FieldKind::Count, Fallback::Zero),
    rule(Field::TotalWorkers, FieldKind::Count, Fallback::Zero),
    rule(Field::PersonDays, FieldKind::Count, Fallback::Zero),
    rule(Field::WomenParticipation, FieldKind::Float, Fallback::Zero),
    rule(Field::ScstParticipation, FieldKind::Float, Fallback::Zero),
    rule(Field::TotalFunds, FieldKind::Float, Fallback::Zero),
    rule(Field::FundsUtilized, FieldKind::Float, Fallback::Zero),
];

/// One upstream row as received
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub district_id: Option<Value>,
    #[serde(default)]
    pub month: Option<Value>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub total_households: Option<Value>,
    #[serde(default)]
    pub total_workers: Option<Value>,
    #[serde(default)]
    pub person_days: Option<Value>,
    #[serde(default)]
    pub women_participation: Option<Value>,
    #[serde(default)]
    pub scst_participation: Option<Value>,
    #[serde(default)]
    pub total_funds: Option<Value>,
    #[serde(default)]
    pub funds_utilized: Option<Value>,
}

impl RawRecord {
    /// Read a row; `None` when the row is not a JSON object
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    fn get(&self, field: Field) -> Option<&Value> {
        match field {
            Field::Month => self.month.as_ref(),
            Field::Year => self.year.as_ref(),
            Field::TotalHouseholds => self.total_households.as_ref(),
            Field::TotalWorkers => self.total_workers.as_ref(),
            Field::PersonDays => self.person_days.as_ref(),
            Field::WomenParticipation => self.women_participation.as_ref(),
            Field::ScstParticipation => self.scst_participation.as_ref(),
            Field::TotalFunds => self.total_funds.as_ref(),
            Field::FundsUtilized => self.funds_utilized.as_ref(),
        }
    }
}

/// Calendar month used for month/year fallbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: i32,
}

impl Period {
    pub fn current() -> Self {
        let today = chrono::Utc::now().date_naive();
        Self {
            year: today.year(),
            month: today.month() as i32,
        }
    }
}

/// A present value that could not be used
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIssue {
    pub field: &'static str,
    pub raw: Value,
}

/// Result of normalizing one row
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Record with every fallback applied
    pub record: NewPerformance,
    /// Malformed values that were replaced by their fallback
    pub issues: Vec<FieldIssue>,
}

enum Parsed {
    Missing,
    Malformed,
    Value(f64),
}

fn parse_number(value: Option<&Value>) -> Parsed {
    match value {
        None | Some(Value::Null) => Parsed::Missing,
        Some(Value::Number(n)) => n.as_f64().map_or(Parsed::Malformed, Parsed::Value),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Parsed::Missing;
            }
            match s.parse::<f64>() {
                Ok(n) if n.is_finite() => Parsed::Value(n),
                _ => Parsed::Malformed,
            }
        }
        Some(_) => Parsed::Malformed,
    }
}

fn accept(kind: FieldKind, n: f64) -> Option<f64> {
    match kind {
        FieldKind::Count => (n >= 0.0).then(|| n.trunc()),
        FieldKind::Month => {
            let m = n.trunc();
            (1.0..=12.0).contains(&m).then_some(m)
        }
        FieldKind::Year => {
            let y = n.trunc();
            (y >= 1.0 && y <= i32::MAX as f64).then_some(y)
        }
        FieldKind::Float => Some(n),
    }
}

fn fallback_value(fallback: Fallback, period: Period) -> f64 {
    match fallback {
        Fallback::Zero => 0.0,
        Fallback::CurrentMonth => period.month as f64,
        Fallback::CurrentYear => period.year as f64,
    }
}

fn normalize_district_id(
    value: Option<&Value>,
    requested: &str,
    issues: &mut Vec<FieldIssue>,
) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        None | Some(Value::Null) | Some(Value::String(_)) => requested.to_string(),
        Some(other) => {
            issues.push(FieldIssue {
                field: "district_id",
                raw: other.clone(),
            });
            requested.to_string()
        }
    }
}

/// Normalize one upstream row
///
/// # Arguments
/// * `raw` - Row as received
/// * `requested_district` - District the sync was requested for; used when
///   the row carries no district id
/// * `period` - Month/year used when the row carries none
pub fn normalize(raw: &RawRecord, requested_district: &str, period: Period) -> Normalized {
    let mut issues = Vec::new();
    let district_id =
        normalize_district_id(raw.district_id.as_ref(), requested_district, &mut issues);

    let mut values = [0.0_f64; FIELD_RULES.len()];
    for (slot, rule) in values.iter_mut().zip(FIELD_RULES.iter()) {
        let value = raw.get(rule.field);
        *slot = match parse_number(value) {
            Parsed::Value(n) => match accept(rule.kind, n) {
                Some(n) => n,
                None => {
                    issues.push(FieldIssue {
                        field: rule.field.name(),
                        raw: value.cloned().unwrap_or(Value::Null),
                    });
                    fallback_value(rule.fallback, period)
                }
            },
            Parsed::Missing => fallback_value(rule.fallback, period),
            Parsed::Malformed => {
                issues.push(FieldIssue {
                    field: rule.field.name(),
                    raw: value.cloned().unwrap_or(Value::Null),
                });
                fallback_value(rule.fallback, period)
            }
        };
    }

    let [
        month,
        year,
        total_households,
        total_workers,
        person_days,
        women_participation,
        scst_participation,
        total_funds,
        funds_utilized,
    ] = values;

    Normalized {
        record: NewPerformance {
            district_id,
            month: month as i32,
            year: year as i32,
            total_households: total_households as i64,
            total_workers: total_workers as i64,
            person_days: person_days as i64,
            women_participation,
            scst_participation,
            total_funds,
            funds_utilized,
        },
        issues,
    }
}
