use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One set of retirement-planning inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    pub id: Uuid,
    pub age: f64,
    pub income: f64,
    pub savings: f64,
    pub contribution: f64,
    pub retirement_age: f64,
    pub expenses: f64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInput {
    pub age: f64,
    pub income: f64,
    pub savings: f64,
    pub contribution: f64,
    pub retirement_age: f64,
    pub expenses: f64,
    pub username: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputPatch {
    pub age: Option<f64>,
    pub income: Option<f64>,
    pub savings: Option<f64>,
    pub contribution: Option<f64>,
    pub retirement_age: Option<f64>,
    pub expenses: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFilter {
    pub username: Option<String>,
}
