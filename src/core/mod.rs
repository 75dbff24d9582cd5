mod engine;
mod format;
mod sensitivity;
mod types;

pub use engine::{candidate_levers, cheapest_lever, classify, derive, evaluate, top_driver};
pub use format::{COASTING_MESSAGE, format_currency, next_step_message};
pub use sensitivity::{scan_default_returns, scan_returns};
pub use types::{
    ALL_RULES_PASS_LABEL, BUFFER_MONTHS, CLOSE_BAND, Derived, Evaluation, FilingStatus, Inputs,
    Lever, NextStep, Rule, RuleOutcome, RuleOutcomes, SENSITIVITY_RATES, ScenarioResult,
    TARGET_SALARY_RATIO, Verdict,
};
