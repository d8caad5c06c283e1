use serde::{Deserialize, Serialize};

use super::NarrativeRequest;
use crate::risk::profile::ExpenseCategory;

pub const SYSTEM_PROMPT: &str =
    "You are a financial advisor who provides detailed loan risk analyses based on customer information.";

const NOT_PROVIDED: &str = "Not provided";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Flattens the request into the system + user message pair sent to the model.
pub fn build_messages(request: &NarrativeRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(customer_summary(request)),
    ]
}

fn customer_summary(request: &NarrativeRequest) -> String {
    let profile = &request.profile;
    let expenses = ExpenseCategory::ALL
        .iter()
        .map(|category| {
            format!(
                "  {}: {}",
                category.label(),
                format_amount(profile.monthly_expenses.get(*category))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on the following customer information, provide a detailed analysis of their loan \
         risk score. Explain why their risk score is low or high, using specific examples from \
         their data.\n\n\
         Customer Information:\n\
         Name: {name}\n\
         Age Group: {age}\n\
         Marital Status: {marital}\n\
         Dependents: {dependents}\n\
         Employment Status: {employment}\n\
         Income Bracket: {income}\n\
         Savings Amount: {savings}\n\
         Monthly Expenses:\n\
         {expenses}\n\
         Desired Loan Details:\n  \
         Amount: {amount}\n  \
         APR: {apr}%\n  \
         Period: {period} months",
        name = text_or_placeholder(request.name.as_deref()),
        age = profile.age_group.label().unwrap_or(NOT_PROVIDED),
        marital = text_or_placeholder(request.marital_status.as_deref()),
        dependents = request.dependents,
        employment = profile.employment_status.label().unwrap_or(NOT_PROVIDED),
        income = profile.income_bracket.label().unwrap_or(NOT_PROVIDED),
        savings = format_amount(profile.savings_amount),
        amount = format_amount(profile.desired_loan_amount),
        apr = format_amount(request.desired_loan_apr),
        period = request.desired_loan_period,
    )
}

fn text_or_placeholder(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(NOT_PROVIDED)
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}
