use serde::{Deserialize, Serialize};

use super::repo_types::{InputPatch, InputRecord, NewInput};
use crate::error::{require, AppError};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InputsResponse {
    pub inputs: Vec<InputRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInputRequest {
    pub age: Option<f64>,
    pub income: Option<f64>,
    pub savings: Option<f64>,
    pub contribution: Option<f64>,
    pub retirement_age: Option<f64>,
    pub expenses: Option<f64>,
    pub username: Option<String>,
}

impl CreateInputRequest {
    /// Checks the required fields in order and reports the first one missing.
    pub fn validate(self) -> Result<NewInput, AppError> {
        Ok(NewInput {
            age: require(self.age, "age")?,
            income: require(self.income, "income")?,
            savings: require(self.savings, "savings")?,
            contribution: require(self.contribution, "contribution")?,
            retirement_age: require(self.retirement_age, "retirementAge")?,
            expenses: require(self.expenses, "expenses")?,
            username: require(self.username, "username")?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInputRequest {
    pub id: Option<String>,
    pub age: Option<f64>,
    pub income: Option<f64>,
    pub savings: Option<f64>,
    pub contribution: Option<f64>,
    pub retirement_age: Option<f64>,
    pub expenses: Option<f64>,
}

impl UpdateInputRequest {
    /// The body id must be present and match the path id exactly, compared
    /// as raw strings before either is parsed.
    pub fn into_patch(self, path_id: &str) -> Result<InputPatch, AppError> {
        if self.id.as_deref() != Some(path_id) {
            let body_id = self.id.as_deref().unwrap_or("undefined");
            return Err(AppError::BadRequest(format!(
                "Request path id ({path_id}) and request body id ({body_id}) must match"
            )));
        }
        Ok(InputPatch {
            age: self.age,
            income: self.income,
            savings: self.savings,
            contribution: self.contribution,
            retirement_age: self.retirement_age,
            expenses: self.expenses,
        })
    }
}
