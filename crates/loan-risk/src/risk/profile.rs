use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Applicant and loan fields collected from the intake form.
///
/// Decoding never fails on content: unknown labels become `Unspecified` and
/// unparsable amounts become zero so a partially filled form can still be scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerProfile {
    pub age_group: AgeGroup,
    pub employment_status: EmploymentStatus,
    pub income_bracket: IncomeBracket,
    #[serde(deserialize_with = "deserialize_amount")]
    pub savings_amount: f64,
    pub monthly_expenses: MonthlyExpenses,
    #[serde(deserialize_with = "deserialize_amount")]
    pub desired_loan_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AgeGroup {
    Age18To25,
    Age26To35,
    Age36To45,
    Age46To55,
    Age56To65,
    Age66Plus,
    #[default]
    Unspecified,
}

impl AgeGroup {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            AgeGroup::Age18To25 => Some("18-25"),
            AgeGroup::Age26To35 => Some("26-35"),
            AgeGroup::Age36To45 => Some("36-45"),
            AgeGroup::Age46To55 => Some("46-55"),
            AgeGroup::Age56To65 => Some("56-65"),
            AgeGroup::Age66Plus => Some("66+"),
            AgeGroup::Unspecified => None,
        }
    }
}

impl FormLabel for AgeGroup {
    fn parse_label(raw: &str) -> Self {
        let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
        match compact.to_ascii_lowercase().as_str() {
            "18-25" => AgeGroup::Age18To25,
            "26-35" => AgeGroup::Age26To35,
            "36-45" => AgeGroup::Age36To45,
            "46-55" => AgeGroup::Age46To55,
            "56-65" => AgeGroup::Age56To65,
            "66+" | "66plus" | "over65" => AgeGroup::Age66Plus,
            _ => AgeGroup::Unspecified,
        }
    }

    fn form_label(&self) -> Option<&'static str> {
        self.label()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmploymentStatus {
    Employed,
    SelfEmployed,
    Unemployed,
    Student,
    Retired,
    #[default]
    Unspecified,
}

impl EmploymentStatus {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            EmploymentStatus::Employed => Some("Employed"),
            EmploymentStatus::SelfEmployed => Some("Self-Employed"),
            EmploymentStatus::Unemployed => Some("Unemployed"),
            EmploymentStatus::Student => Some("Student"),
            EmploymentStatus::Retired => Some("Retired"),
            EmploymentStatus::Unspecified => None,
        }
    }
}

impl FormLabel for EmploymentStatus {
    fn parse_label(raw: &str) -> Self {
        let compact: String = raw
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "employed" => EmploymentStatus::Employed,
            "selfemployed" => EmploymentStatus::SelfEmployed,
            "unemployed" => EmploymentStatus::Unemployed,
            "student" => EmploymentStatus::Student,
            "retired" => EmploymentStatus::Retired,
            _ => EmploymentStatus::Unspecified,
        }
    }

    fn form_label(&self) -> Option<&'static str> {
        self.label()
    }
}

/// Annual household income bands offered by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IncomeBracket {
    Under25k,
    From25kTo50k,
    From50kTo75k,
    From75kTo100k,
    Over100k,
    #[default]
    Unspecified,
}

impl IncomeBracket {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            IncomeBracket::Under25k => Some("<$25,000"),
            IncomeBracket::From25kTo50k => Some("$25,000-$50,000"),
            IncomeBracket::From50kTo75k => Some("$50,000-$75,000"),
            IncomeBracket::From75kTo100k => Some("$75,000-$100,000"),
            IncomeBracket::Over100k => Some(">$100,000"),
            IncomeBracket::Unspecified => None,
        }
    }
}

impl FormLabel for IncomeBracket {
    // Accepts "<$25,000", "<25k", "50,000-75,000", "$50k-$75k" and similar spellings.
    fn parse_label(raw: &str) -> Self {
        match compact_money(raw).as_str() {
            "<25k" | "under25k" | "lessthan25k" => IncomeBracket::Under25k,
            "25k-50k" | "25-50k" => IncomeBracket::From25kTo50k,
            "50k-75k" | "50-75k" => IncomeBracket::From50kTo75k,
            "75k-100k" | "75-100k" => IncomeBracket::From75kTo100k,
            ">100k" | "over100k" | "morethan100k" | "100k+" => IncomeBracket::Over100k,
            _ => IncomeBracket::Unspecified,
        }
    }

    fn form_label(&self) -> Option<&'static str> {
        self.label()
    }
}

/// Lowercases, drops `$`, separators and whitespace, and writes whole thousands as `k`.
fn compact_money(raw: &str) -> String {
    let mut compact = String::with_capacity(raw.len());
    let mut digits = String::new();

    let flush = |digits: &mut String, compact: &mut String| {
        if digits.is_empty() {
            return;
        }
        match digits.parse::<u64>() {
            Ok(value) if value >= 1000 && value % 1000 == 0 => {
                compact.push_str(&(value / 1000).to_string());
                compact.push('k');
            }
            _ => compact.push_str(digits),
        }
        digits.clear();
    };

    for ch in raw.chars() {
        match ch {
            '0'..='9' => digits.push(ch),
            '$' | ',' => {}
            ch if ch.is_whitespace() => {}
            other => {
                flush(&mut digits, &mut compact);
                compact.push(other.to_ascii_lowercase());
            }
        }
    }
    flush(&mut digits, &mut compact);
    compact
}

/// Named monthly expense lines on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Rent,
    Utilities,
    Insurance,
    LoanPayments,
    Subscriptions,
    FoodCosts,
    MiscCosts,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::Rent,
        ExpenseCategory::Utilities,
        ExpenseCategory::Insurance,
        ExpenseCategory::LoanPayments,
        ExpenseCategory::Subscriptions,
        ExpenseCategory::FoodCosts,
        ExpenseCategory::MiscCosts,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "rent",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Insurance => "insurance",
            ExpenseCategory::LoanPayments => "loanPayments",
            ExpenseCategory::Subscriptions => "subscriptions",
            ExpenseCategory::FoodCosts => "foodCosts",
            ExpenseCategory::MiscCosts => "miscCosts",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "Rent/Mortgage",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Insurance => "Insurance",
            ExpenseCategory::LoanPayments => "Loan Payments",
            ExpenseCategory::Subscriptions => "Subscriptions",
            ExpenseCategory::FoodCosts => "Food Costs",
            ExpenseCategory::MiscCosts => "Miscellaneous Costs",
        }
    }
}

/// Monthly expenses keyed by category name. Absent categories read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyExpenses(BTreeMap<String, f64>);

impl MonthlyExpenses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: ExpenseCategory, amount: f64) -> Self {
        self.set(category, amount);
        self
    }

    pub fn set(&mut self, category: ExpenseCategory, amount: f64) {
        self.0.insert(category.key().to_string(), amount);
    }

    pub fn get(&self, category: ExpenseCategory) -> f64 {
        self.0.get(category.key()).copied().unwrap_or(0.0)
    }

    /// Sum over every recorded line, including categories outside the named set.
    /// Saturates at the `f64` range so the total stays finite.
    pub fn total(&self) -> f64 {
        self.0
            .values()
            .fold(0.0, |total, amount| (total + amount).clamp(f64::MIN, f64::MAX))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for MonthlyExpenses {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let lines = match Value::deserialize(deserializer)? {
            Value::Object(map) => map
                .into_iter()
                .map(|(category, amount)| (category, amount_from_value(&amount)))
                .collect(),
            _ => BTreeMap::new(),
        };
        Ok(Self(lines))
    }
}

/// Form enums that decode from free text and fall back to `Unspecified`.
pub(crate) trait FormLabel: Sized + Default {
    fn parse_label(raw: &str) -> Self;
    fn form_label(&self) -> Option<&'static str>;
}

fn deserialize_label<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FormLabel,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(T::parse_label).unwrap_or_default())
}

fn serialize_label<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: FormLabel,
{
    match value.form_label() {
        Some(label) => serializer.serialize_str(label),
        None => serializer.serialize_none(),
    }
}

impl<'de> Deserialize<'de> for AgeGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_label(deserializer)
    }
}

impl Serialize for AgeGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_label(self, serializer)
    }
}

impl<'de> Deserialize<'de> for EmploymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_label(deserializer)
    }
}

impl Serialize for EmploymentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_label(self, serializer)
    }
}

impl<'de> Deserialize<'de> for IncomeBracket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_label(deserializer)
    }
}

impl Serialize for IncomeBracket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_label(self, serializer)
    }
}

/// Parse-or-zero conversion for form amounts.
///
/// Numbers pass through; strings are trimmed and may carry a leading `$` and
/// thousands separators. Anything else, including non-finite results, is zero.
pub fn amount_from_value(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => parse_amount(raw),
        _ => None,
    };
    parsed.filter(|amount| amount.is_finite()).unwrap_or(0.0)
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|ch| *ch != ',')
        .collect();
    cleaned.parse::<f64>().ok()
}

pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(amount_from_value(&value))
}

/// Optional free text; non-string values read as absent.
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}

/// Whole-number variant of [`deserialize_amount`]; negatives and fractions truncate toward zero.
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = deserialize_amount(deserializer)?;
    Ok(amount.max(0.0).min(f64::from(u32::MAX)) as u32)
}
