use super::engine::{classify, coverage_outcome};
use super::types::{Evaluation, Inputs, SENSITIVITY_RATES, ScenarioResult};

/// Re-runs the coverage rule and verdict at each alternative return rate.
///
/// Salary ratio and cash buffer don't depend on the return assumption, so
/// their outcomes are taken from `evaluation` as-is. Rows follow `rates` order.
pub fn scan_returns(
    inputs: &Inputs,
    evaluation: &Evaluation,
    rates: &[f64],
) -> Vec<ScenarioResult> {
    rates
        .iter()
        .map(|&rate| {
            let after_tax_return = inputs.net_worth * rate * (1.0 - inputs.invest_tax_rate);
            let rule_c = coverage_outcome(after_tax_return, inputs.side_income, inputs.spend);
            let (verdict, _) = classify(&[
                evaluation.rules.salary_ratio,
                rule_c,
                evaluation.rules.cash_buffer,
            ]);

            ScenarioResult {
                rate,
                after_tax_return,
                coverage: (after_tax_return + inputs.side_income) / inputs.spend,
                rule_c,
                verdict,
            }
        })
        .collect()
}

pub fn scan_default_returns(inputs: &Inputs, evaluation: &Evaluation) -> Vec<ScenarioResult> {
    scan_returns(inputs, evaluation, &SENSITIVITY_RATES)
}
