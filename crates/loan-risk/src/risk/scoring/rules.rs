use super::super::profile::{AgeGroup, CustomerProfile, EmploymentStatus, IncomeBracket};
use super::RiskFactor;

pub(crate) const LOW_SAVINGS_THRESHOLD: f64 = 5_000.0;
pub(crate) const HIGH_SAVINGS_THRESHOLD: f64 = 50_000.0;
pub(crate) const HIGH_EXPENSES_THRESHOLD: f64 = 2_000.0;
pub(crate) const LARGE_LOAN_THRESHOLD: f64 = 50_000.0;

const BASELINE_WEIGHT: i16 = 10;

/// Result of one rule: the score delta and the chart weight for the branch that fired.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FactorOutcome {
    pub factor: RiskFactor,
    pub delta: i16,
    pub weight: i16,
    pub note: String,
}

impl FactorOutcome {
    fn new(factor: RiskFactor, delta: i16, weight: i16, note: impl Into<String>) -> Self {
        Self {
            factor,
            delta,
            weight,
            note: note.into(),
        }
    }
}

/// Every rule reads only its own field; order does not matter.
pub(crate) fn evaluate(profile: &CustomerProfile, total_expenses: f64) -> [FactorOutcome; 6] {
    [
        age(profile.age_group),
        employment(profile.employment_status),
        income(profile.income_bracket),
        savings(profile.savings_amount),
        expenses(total_expenses),
        loan_amount(profile.desired_loan_amount),
    ]
}

fn age(group: AgeGroup) -> FactorOutcome {
    match group {
        AgeGroup::Age18To25 => FactorOutcome::new(RiskFactor::Age, 5, 20, "applicant aged 18-25"),
        AgeGroup::Age66Plus => FactorOutcome::new(RiskFactor::Age, 10, 20, "applicant aged 66+"),
        _ => FactorOutcome::new(RiskFactor::Age, 0, BASELINE_WEIGHT, "age group neutral"),
    }
}

fn employment(status: EmploymentStatus) -> FactorOutcome {
    match status {
        EmploymentStatus::Unemployed => {
            FactorOutcome::new(RiskFactor::Employment, 20, 30, "applicant unemployed")
        }
        EmploymentStatus::SelfEmployed => {
            FactorOutcome::new(RiskFactor::Employment, 10, 20, "self-employed income")
        }
        _ => FactorOutcome::new(
            RiskFactor::Employment,
            0,
            BASELINE_WEIGHT,
            "employment status neutral",
        ),
    }
}

// The >$100,000 band lowers the score but keeps the baseline chart weight.
fn income(bracket: IncomeBracket) -> FactorOutcome {
    match bracket {
        IncomeBracket::Under25k => {
            FactorOutcome::new(RiskFactor::Income, 20, 30, "income below $25,000")
        }
        IncomeBracket::Over100k => FactorOutcome::new(
            RiskFactor::Income,
            -10,
            BASELINE_WEIGHT,
            "income above $100,000",
        ),
        _ => FactorOutcome::new(
            RiskFactor::Income,
            0,
            BASELINE_WEIGHT,
            "income bracket neutral",
        ),
    }
}

fn savings(amount: f64) -> FactorOutcome {
    if amount < LOW_SAVINGS_THRESHOLD {
        FactorOutcome::new(
            RiskFactor::Savings,
            10,
            20,
            format!("savings {amount:.2} below {LOW_SAVINGS_THRESHOLD:.0}"),
        )
    } else if amount > HIGH_SAVINGS_THRESHOLD {
        FactorOutcome::new(
            RiskFactor::Savings,
            -10,
            BASELINE_WEIGHT,
            format!("savings {amount:.2} above {HIGH_SAVINGS_THRESHOLD:.0}"),
        )
    } else {
        FactorOutcome::new(
            RiskFactor::Savings,
            0,
            BASELINE_WEIGHT,
            format!("savings {amount:.2} within neutral range"),
        )
    }
}

fn expenses(total: f64) -> FactorOutcome {
    if total > HIGH_EXPENSES_THRESHOLD {
        FactorOutcome::new(
            RiskFactor::Expenses,
            10,
            20,
            format!("monthly expenses {total:.2} exceed {HIGH_EXPENSES_THRESHOLD:.0}"),
        )
    } else {
        FactorOutcome::new(
            RiskFactor::Expenses,
            0,
            BASELINE_WEIGHT,
            format!("monthly expenses {total:.2} within {HIGH_EXPENSES_THRESHOLD:.0}"),
        )
    }
}

fn loan_amount(amount: f64) -> FactorOutcome {
    if amount > LARGE_LOAN_THRESHOLD {
        FactorOutcome::new(
            RiskFactor::LoanAmount,
            15,
            30,
            format!("requested {amount:.2} exceeds {LARGE_LOAN_THRESHOLD:.0}"),
        )
    } else {
        FactorOutcome::new(
            RiskFactor::LoanAmount,
            0,
            BASELINE_WEIGHT,
            format!("requested {amount:.2} within {LARGE_LOAN_THRESHOLD:.0}"),
        )
    }
}
