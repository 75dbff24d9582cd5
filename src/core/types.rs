use serde::Serialize;

/// Highest after-tax salary to net worth ratio that still counts as coasting.
pub const TARGET_SALARY_RATIO: f64 = 0.10;
/// Months of annual spend the cash buffer must cover.
pub const BUFFER_MONTHS: f64 = 6.0;
/// Signed fractional distance from a threshold that still reads as "close".
pub const CLOSE_BAND: f64 = 0.05;
/// Alternative return assumptions for the sensitivity scan, ascending.
pub const SENSITIVITY_RATES: [f64; 5] = [0.08, 0.09, 0.10, 0.11, 0.12];

pub const ALL_RULES_PASS_LABEL: &str = "All rules pass";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl FilingStatus {
    pub fn label(self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedJoint => "married filing jointly",
            FilingStatus::MarriedSeparate => "married filing separately",
            FilingStatus::HeadOfHousehold => "head of household",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Inputs {
    pub net_worth: f64,
    pub salary: f64,
    pub salary_tax_rate: f64,
    pub invest_return: f64,
    pub invest_tax_rate: f64,
    pub spend: f64,
    pub side_income: f64,
    pub cash_on_hand: f64,
    // Display only; the engine never reads these.
    pub state: String,
    pub filing: FilingStatus,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Verdict {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "CLOSE")]
    Close,
    #[serde(rename = "NOT YET")]
    NotYet,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Yes => "YES",
            Verdict::Close => "CLOSE",
            Verdict::NotYet => "NOT YET",
        }
    }

    pub fn subline(self) -> &'static str {
        match self {
            Verdict::Yes => "Every rule passes. Your assets can carry your spending from here.",
            Verdict::Close => "Within 5% of every threshold. One small move gets you there.",
            Verdict::NotYet => "At least one rule is more than 5% short of its threshold.",
        }
    }
}

/// The three coast rules, in the order they are evaluated and tie-broken.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    SalaryRatio,
    Coverage,
    CashBuffer,
}

impl Rule {
    pub const ORDER: [Rule; 3] = [Rule::SalaryRatio, Rule::Coverage, Rule::CashBuffer];

    pub fn driver_label(self) -> &'static str {
        match self {
            Rule::SalaryRatio => "Salary too large relative to net worth",
            Rule::Coverage => "Returns plus side income fall short of spending",
            Rule::CashBuffer => "Insufficient cash buffer",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct RuleOutcome {
    pub pass: bool,
    /// Positive is passing margin, negative is shortfall as a fraction of the threshold.
    pub gap: f64,
}

impl RuleOutcome {
    /// Gap used for ranking; a passing rule can never be the binding constraint.
    pub fn ranking_gap(self) -> f64 {
        if self.pass { f64::INFINITY } else { self.gap }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcomes {
    pub salary_ratio: RuleOutcome,
    pub coverage: RuleOutcome,
    pub cash_buffer: RuleOutcome,
}

impl RuleOutcomes {
    pub fn get(&self, rule: Rule) -> RuleOutcome {
        match rule {
            Rule::SalaryRatio => self.salary_ratio,
            Rule::Coverage => self.coverage,
            Rule::CashBuffer => self.cash_buffer,
        }
    }

    pub fn all(&self) -> [RuleOutcome; 3] {
        [self.salary_ratio, self.coverage, self.cash_buffer]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Derived {
    pub after_tax_salary: f64,
    pub salary_vs_net_worth: f64,
    pub after_tax_return_rate: f64,
    pub after_tax_portfolio_return: f64,
    pub coverage: f64,
    pub buffer_target: f64,
    pub net_worth_target: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Lever {
    GrowNetWorthForSalaryRatio,
    AddSideIncome,
    CutSpending,
    GrowNetWorthForCoverage,
    AddCash,
}

impl Lever {
    #[cfg(test)]
    pub fn rule(self) -> Rule {
        match self {
            Lever::GrowNetWorthForSalaryRatio => Rule::SalaryRatio,
            Lever::AddSideIncome | Lever::CutSpending | Lever::GrowNetWorthForCoverage => {
                Rule::Coverage
            }
            Lever::AddCash => Rule::CashBuffer,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStep {
    pub lever: Lever,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub verdict: Verdict,
    pub subline: &'static str,
    pub driver: Option<Rule>,
    pub driver_label: &'static str,
    pub worst_gap: f64,
    pub rules: RuleOutcomes,
    pub derived: Derived,
    pub next_step: Option<NextStep>,
    pub next_step_message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub rate: f64,
    pub after_tax_return: f64,
    pub coverage: f64,
    pub rule_c: RuleOutcome,
    pub verdict: Verdict,
}
