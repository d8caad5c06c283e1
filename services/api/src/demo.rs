use crate::infra::{load_request, InMemoryAssessmentRepository};
use clap::Args;
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::risk::{
    AgeGroup, AnalysisOutcome, AnalysisStatus, AssessmentService, AssessmentSubmission,
    CustomerProfile, EmploymentStatus, ExpenseCategory, IncomeBracket, MonthlyExpenses,
    NarrativeBackend, NarrativeRequest, RiskResult, UnavailableNarrative,
};
use loan_risk::telemetry;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Path to a JSON document shaped like the intake form
    #[arg(long)]
    pub(crate) profile: PathBuf,
    /// Print the result as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
    /// Also request a narrative analysis (requires OPENAI_API_KEY)
    #[arg(long)]
    pub(crate) with_analysis: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Request a narrative analysis for each sample applicant
    #[arg(long)]
    pub(crate) with_analysis: bool,
}

type DemoService<G> = AssessmentService<InMemoryAssessmentRepository, G>;

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        profile,
        json,
        with_analysis,
    } = args;

    let request = load_request(&profile)?;

    if with_analysis {
        let service = narrative_service()?;
        let outcome = service.analyze(&request).await;
        if json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            render_result(request.name.as_deref(), &outcome.result);
            render_analysis(&outcome);
        }
        return Ok(());
    }

    let service = offline_service();
    let result = service.score(&request.profile);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_result(request.name.as_deref(), &result);
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Loan risk demo");

    if args.with_analysis {
        let service = narrative_service()?;
        for request in sample_requests() {
            let outcome = service.analyze(&request).await;
            render_result(request.name.as_deref(), &outcome.result);
            render_analysis(&outcome);
        }
        return Ok(());
    }

    let service = offline_service();
    for request in sample_requests() {
        let record = service.assess(AssessmentSubmission {
            applicant_name: request.name.clone(),
            profile: request.profile,
        })?;
        render_result(record.applicant_name.as_deref(), &record.result);
    }

    println!("\nRecorded assessments (newest first)");
    for record in service.history(10)? {
        let view = record.summary_view();
        println!(
            "- {} | {} | score {:.2} ({})",
            view.id.0,
            view.applicant_name.as_deref().unwrap_or("anonymous"),
            view.score,
            view.band.label()
        );
    }
    Ok(())
}

fn offline_service() -> DemoService<UnavailableNarrative> {
    AssessmentService::new(
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(UnavailableNarrative),
    )
}

fn narrative_service() -> Result<DemoService<NarrativeBackend>, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;

    let backend = NarrativeBackend::from_config(&config.narrative);
    if !backend.is_enabled() {
        eprintln!("Narrative analysis disabled: set OPENAI_API_KEY to enable it.");
    }
    Ok(AssessmentService::new(
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(backend),
    ))
}

fn render_result(name: Option<&str>, result: &RiskResult) {
    println!(
        "\n{}: score {} ({})",
        name.unwrap_or("Applicant"),
        result.display_score(),
        result.band.label()
    );
    println!(
        "  Total monthly expenses: {:.2}",
        result.total_monthly_expenses
    );
    println!("  Breakdown:");
    for (factor, share) in result.breakdown.proportions() {
        println!(
            "    - {}: {} ({:.0}%)",
            factor.label(),
            result.breakdown.get(factor),
            share * 100.0
        );
    }
    if result.adjustments.is_empty() {
        println!("  No adjustments applied");
    } else {
        println!("  Adjustments:");
        for adjustment in &result.adjustments {
            println!(
                "    - {:+} {} ({})",
                adjustment.points,
                adjustment.factor.label(),
                adjustment.note
            );
        }
    }
}

fn render_analysis(outcome: &AnalysisOutcome) {
    match outcome.analysis_status {
        AnalysisStatus::Generated => println!("  Analysis:\n{}", indent(&outcome.analysis)),
        AnalysisStatus::Unavailable => println!("  Analysis: {}", outcome.analysis),
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn sample_requests() -> Vec<NarrativeRequest> {
    vec![
        NarrativeRequest {
            name: Some("Priya Raman".to_string()),
            marital_status: Some("Single".to_string()),
            dependents: 0,
            desired_loan_apr: 5.9,
            desired_loan_period: 24,
            profile: CustomerProfile {
                age_group: AgeGroup::Age36To45,
                employment_status: EmploymentStatus::Employed,
                income_bracket: IncomeBracket::Over100k,
                savings_amount: 80_000.0,
                monthly_expenses: MonthlyExpenses::new()
                    .with(ExpenseCategory::Rent, 1_400.0)
                    .with(ExpenseCategory::Utilities, 150.0)
                    .with(ExpenseCategory::FoodCosts, 300.0),
                desired_loan_amount: 15_000.0,
            },
        },
        NarrativeRequest {
            name: Some("Marcus Hale".to_string()),
            marital_status: Some("Married".to_string()),
            dependents: 2,
            desired_loan_apr: 7.25,
            desired_loan_period: 48,
            profile: CustomerProfile {
                age_group: AgeGroup::Age26To35,
                employment_status: EmploymentStatus::SelfEmployed,
                income_bracket: IncomeBracket::From50kTo75k,
                savings_amount: 12_000.0,
                monthly_expenses: MonthlyExpenses::new()
                    .with(ExpenseCategory::Rent, 1_100.0)
                    .with(ExpenseCategory::LoanPayments, 350.0)
                    .with(ExpenseCategory::FoodCosts, 500.0),
                desired_loan_amount: 30_000.0,
            },
        },
        NarrativeRequest {
            name: Some("Dana Ortiz".to_string()),
            marital_status: Some("Single".to_string()),
            dependents: 1,
            desired_loan_apr: 11.0,
            desired_loan_period: 60,
            profile: CustomerProfile {
                age_group: AgeGroup::Age18To25,
                employment_status: EmploymentStatus::Unemployed,
                income_bracket: IncomeBracket::Under25k,
                savings_amount: 1_500.0,
                monthly_expenses: MonthlyExpenses::new()
                    .with(ExpenseCategory::Rent, 1_900.0)
                    .with(ExpenseCategory::Subscriptions, 120.0)
                    .with(ExpenseCategory::MiscCosts, 200.0),
                desired_loan_amount: 60_000.0,
            },
        },
    ]
}
