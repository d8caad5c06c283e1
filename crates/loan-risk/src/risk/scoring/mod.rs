mod rules;

use serde::{Deserialize, Serialize};

use super::profile::CustomerProfile;

/// Neutral starting point before any factor adjusts the score.
pub const BASE_SCORE: f64 = 50.0;
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Heuristic loan-risk scorer. Pure and total: any profile yields a result.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, profile: &CustomerProfile) -> RiskResult {
        let total_monthly_expenses = profile.monthly_expenses.total();
        let outcomes = rules::evaluate(profile, total_monthly_expenses);

        let raw = outcomes
            .iter()
            .fold(BASE_SCORE, |score, outcome| score + f64::from(outcome.delta));
        let score = round_to_cents(raw.clamp(MIN_SCORE, MAX_SCORE));

        let mut breakdown = RiskBreakdown::default();
        let mut adjustments = Vec::new();
        for outcome in outcomes {
            breakdown.set(outcome.factor, outcome.weight);
            if outcome.delta != 0 {
                adjustments.push(ScoreAdjustment {
                    factor: outcome.factor,
                    points: outcome.delta,
                    note: outcome.note,
                });
            }
        }

        RiskResult {
            score,
            band: RiskBand::from_score(score),
            breakdown,
            adjustments,
            total_monthly_expenses,
        }
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFactor {
    Age,
    Employment,
    Income,
    Savings,
    Expenses,
    LoanAmount,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 6] = [
        RiskFactor::Age,
        RiskFactor::Employment,
        RiskFactor::Income,
        RiskFactor::Savings,
        RiskFactor::Expenses,
        RiskFactor::LoanAmount,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskFactor::Age => "Age",
            RiskFactor::Employment => "Employment",
            RiskFactor::Income => "Income",
            RiskFactor::Savings => "Savings",
            RiskFactor::Expenses => "Expenses",
            RiskFactor::LoanAmount => "LoanAmount",
        }
    }
}

/// Display band derived from the clamped score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn from_score(score: f64) -> Self {
        if score < 40.0 {
            RiskBand::Low
        } else if score < 70.0 {
            RiskBand::Moderate
        } else {
            RiskBand::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low",
            RiskBand::Moderate => "Moderate",
            RiskBand::High => "High",
        }
    }
}

/// Chart weights per factor. Informational only; they do not sum to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RiskBreakdown {
    pub age: i16,
    pub employment: i16,
    pub income: i16,
    pub savings: i16,
    pub expenses: i16,
    pub loan_amount: i16,
}

impl RiskBreakdown {
    pub fn get(&self, factor: RiskFactor) -> i16 {
        match factor {
            RiskFactor::Age => self.age,
            RiskFactor::Employment => self.employment,
            RiskFactor::Income => self.income,
            RiskFactor::Savings => self.savings,
            RiskFactor::Expenses => self.expenses,
            RiskFactor::LoanAmount => self.loan_amount,
        }
    }

    fn set(&mut self, factor: RiskFactor, weight: i16) {
        let slot = match factor {
            RiskFactor::Age => &mut self.age,
            RiskFactor::Employment => &mut self.employment,
            RiskFactor::Income => &mut self.income,
            RiskFactor::Savings => &mut self.savings,
            RiskFactor::Expenses => &mut self.expenses,
            RiskFactor::LoanAmount => &mut self.loan_amount,
        };
        *slot = weight;
    }

    pub fn iter(&self) -> impl Iterator<Item = (RiskFactor, i16)> + '_ {
        RiskFactor::ALL
            .into_iter()
            .map(move |factor| (factor, self.get(factor)))
    }

    /// Share of each factor in the chart, in `RiskFactor::ALL` order.
    pub fn proportions(&self) -> Vec<(RiskFactor, f64)> {
        let total: i32 = self.iter().map(|(_, weight)| i32::from(weight)).sum();
        self.iter()
            .map(|(factor, weight)| {
                let share = if total == 0 {
                    0.0
                } else {
                    f64::from(weight) / f64::from(total)
                };
                (factor, share)
            })
            .collect()
    }
}

/// A score delta that actually fired, kept for explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAdjustment {
    pub factor: RiskFactor,
    pub points: i16,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResult {
    pub score: f64,
    pub band: RiskBand,
    pub breakdown: RiskBreakdown,
    pub adjustments: Vec<ScoreAdjustment>,
    pub total_monthly_expenses: f64,
}

impl RiskResult {
    pub fn display_score(&self) -> String {
        format!("{:.2}", self.score)
    }
}
