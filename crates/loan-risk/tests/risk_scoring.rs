//! Scoring scenarios exercised through the public API, starting from the JSON a form posts.

use serde_json::{json, Value};

use loan_risk::risk::{CustomerProfile, RiskBand, RiskFactor, RiskResult, RiskScorer};

fn base_form() -> Value {
    json!({
        "ageGroup": "26-35",
        "employmentStatus": "Employed",
        "incomeBracket": "50,000-75,000",
        "savingsAmount": 10000,
        "monthlyExpenses": {
            "rent": 1000,
            "utilities": 200,
            "insurance": 100,
            "loanPayments": 0,
            "subscriptions": 50,
            "foodCosts": 400,
            "miscCosts": 50
        },
        "desiredLoanAmount": 20000
    })
}

fn score_form(form: Value) -> RiskResult {
    let profile: CustomerProfile = serde_json::from_value(form).expect("form decodes");
    RiskScorer::new().score(&profile)
}

#[test]
fn neutral_applicant_keeps_the_base_score() {
    let result = score_form(base_form());

    assert_eq!(result.total_monthly_expenses, 1800.0);
    assert_eq!(result.display_score(), "50.00");
}

#[test]
fn every_penalty_at_once_clamps_to_the_ceiling() {
    let mut form = base_form();
    form["employmentStatus"] = json!("Unemployed");
    form["incomeBracket"] = json!("<$25,000");
    form["savingsAmount"] = json!(1000);
    form["desiredLoanAmount"] = json!(60000);

    let result = score_form(form);

    assert_eq!(result.display_score(), "100.00");
    assert_eq!(result.band, RiskBand::High);
}

#[test]
fn senior_with_high_income_and_savings_scores_forty() {
    let mut form = base_form();
    form["ageGroup"] = json!("66+");
    form["incomeBracket"] = json!(">$100,000");
    form["savingsAmount"] = json!(60000);

    let result = score_form(form);

    assert_eq!(result.display_score(), "40.00");
    assert_eq!(result.breakdown.get(RiskFactor::Age), 20);
    assert_eq!(result.breakdown.get(RiskFactor::Income), 10);
}

#[test]
fn omitted_expense_categories_equal_zeroed_ones() {
    let mut sparse = base_form();
    sparse["monthlyExpenses"] = json!({ "rent": 1000 });
    let mut zeroed = base_form();
    zeroed["monthlyExpenses"] = json!({
        "rent": 1000,
        "utilities": 0,
        "insurance": 0,
        "loanPayments": 0,
        "subscriptions": 0,
        "foodCosts": 0,
        "miscCosts": 0
    });

    let sparse = score_form(sparse);
    let zeroed = score_form(zeroed);

    assert_eq!(sparse.score, zeroed.score);
    assert_eq!(sparse.breakdown, zeroed.breakdown);
    assert_eq!(sparse.total_monthly_expenses, zeroed.total_monthly_expenses);
}

#[test]
fn savings_boundaries_use_strict_comparisons() {
    let savings_points = |amount: Value| {
        let mut form = base_form();
        form["savingsAmount"] = amount;
        score_form(form).score
    };

    assert_eq!(savings_points(json!(5000)), savings_points(json!(6000)));
    assert_eq!(savings_points(json!(50000)), 50.0);
    assert_eq!(savings_points(json!(50001)), 40.0);
    assert_eq!(savings_points(json!(4999)), 60.0);
}

#[test]
fn result_serializes_for_the_chart() {
    let value = serde_json::to_value(score_form(base_form())).expect("serializes");

    assert_eq!(value["score"], 50.0);
    assert_eq!(value["breakdown"]["LoanAmount"], 10);
    assert!(value["adjustments"].as_array().expect("adjustments").is_empty());
}
