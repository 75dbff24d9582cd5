use super::format::{COASTING_MESSAGE, next_step_message};
use super::types::{
    ALL_RULES_PASS_LABEL, BUFFER_MONTHS, CLOSE_BAND, Derived, Evaluation, Inputs, Lever, NextStep,
    Rule, RuleOutcome, RuleOutcomes, TARGET_SALARY_RATIO, Verdict,
};

pub fn evaluate(inputs: &Inputs) -> Evaluation {
    let derived = derive(inputs);
    let rules = evaluate_rules(inputs, &derived);
    let (verdict, worst_gap) = classify(&rules.all());
    let driver = top_driver(&rules);
    let next_step = cheapest_lever(&candidate_levers(inputs, &derived, &rules));
    let message = match next_step {
        Some(step) => next_step_message(step.lever, step.amount),
        None => COASTING_MESSAGE.to_string(),
    };

    Evaluation {
        verdict,
        subline: verdict.subline(),
        driver,
        driver_label: driver.map_or(ALL_RULES_PASS_LABEL, Rule::driver_label),
        worst_gap,
        rules,
        derived,
        next_step,
        next_step_message: message,
    }
}

pub fn derive(inputs: &Inputs) -> Derived {
    let after_tax_salary = inputs.salary * (1.0 - inputs.salary_tax_rate);
    let salary_vs_net_worth = if inputs.net_worth == 0.0 {
        f64::INFINITY
    } else {
        after_tax_salary / inputs.net_worth
    };
    let after_tax_return_rate = inputs.invest_return * (1.0 - inputs.invest_tax_rate);
    let after_tax_portfolio_return =
        inputs.net_worth * inputs.invest_return * (1.0 - inputs.invest_tax_rate);

    Derived {
        after_tax_salary,
        salary_vs_net_worth,
        after_tax_return_rate,
        after_tax_portfolio_return,
        coverage: (after_tax_portfolio_return + inputs.side_income) / inputs.spend,
        buffer_target: buffer_target(inputs.spend),
        net_worth_target: after_tax_salary / TARGET_SALARY_RATIO,
    }
}

pub fn evaluate_rules(inputs: &Inputs, derived: &Derived) -> RuleOutcomes {
    let ratio = derived.salary_vs_net_worth;
    let target = derived.buffer_target;

    RuleOutcomes {
        salary_ratio: RuleOutcome {
            pass: ratio <= TARGET_SALARY_RATIO,
            gap: TARGET_SALARY_RATIO - ratio,
        },
        coverage: coverage_outcome(
            derived.after_tax_portfolio_return,
            inputs.side_income,
            inputs.spend,
        ),
        cash_buffer: RuleOutcome {
            pass: inputs.cash_on_hand >= target,
            gap: (inputs.cash_on_hand - target) / target,
        },
    }
}

pub(crate) fn buffer_target(spend: f64) -> f64 {
    spend * BUFFER_MONTHS / 12.0
}

pub(crate) fn coverage_outcome(portfolio_return: f64, side_income: f64, spend: f64) -> RuleOutcome {
    let covered = portfolio_return + side_income;
    RuleOutcome {
        pass: covered >= spend,
        gap: (covered - spend) / spend,
    }
}

/// Overall verdict plus the worst failing gap (`+inf` when nothing fails).
///
/// A NaN gap on a failing rule poisons the minimum, which keeps that
/// input out of the close band.
pub fn classify(outcomes: &[RuleOutcome]) -> (Verdict, f64) {
    let mut worst_gap = f64::INFINITY;
    for outcome in outcomes.iter().filter(|o| !o.pass) {
        if outcome.gap.is_nan() {
            worst_gap = f64::NAN;
            break;
        }
        if outcome.gap < worst_gap {
            worst_gap = outcome.gap;
        }
    }

    let verdict = if outcomes.iter().all(|o| o.pass) {
        Verdict::Yes
    } else if worst_gap >= -CLOSE_BAND {
        Verdict::Close
    } else {
        Verdict::NotYet
    };
    (verdict, worst_gap)
}

/// First failing rule, in `Rule::ORDER`, whose gap is no larger than any other
/// rule's ranking gap.
pub fn top_driver(rules: &RuleOutcomes) -> Option<Rule> {
    let is_failing = |rule: &Rule| !rules.get(*rule).pass;

    Rule::ORDER
        .into_iter()
        .filter(is_failing)
        .find(|&rule| {
            let gap = rules.get(rule).gap;
            Rule::ORDER
                .into_iter()
                .filter(|other| *other != rule)
                .all(|other| gap <= rules.get(other).ranking_gap())
        })
        .or_else(|| Rule::ORDER.into_iter().find(is_failing))
}

/// Every lever that would flip a failing rule, holding all other inputs fixed.
/// Listed in rule order; passing rules contribute nothing.
pub fn candidate_levers(inputs: &Inputs, derived: &Derived, rules: &RuleOutcomes) -> Vec<NextStep> {
    let mut levers = Vec::with_capacity(5);

    if !rules.salary_ratio.pass {
        levers.push(NextStep {
            lever: Lever::GrowNetWorthForSalaryRatio,
            amount: (derived.net_worth_target - inputs.net_worth).max(0.0),
        });
    }

    if !rules.coverage.pass {
        let shortfall =
            (inputs.spend - (derived.after_tax_portfolio_return + inputs.side_income)).max(0.0);
        let net_worth_needed = if derived.after_tax_return_rate > 0.0 {
            shortfall / derived.after_tax_return_rate
        } else {
            f64::INFINITY
        };
        levers.push(NextStep {
            lever: Lever::AddSideIncome,
            amount: shortfall,
        });
        levers.push(NextStep {
            lever: Lever::CutSpending,
            amount: shortfall,
        });
        levers.push(NextStep {
            lever: Lever::GrowNetWorthForCoverage,
            amount: net_worth_needed,
        });
    }

    if !rules.cash_buffer.pass {
        levers.push(NextStep {
            lever: Lever::AddCash,
            amount: (derived.buffer_target - inputs.cash_on_hand).max(0.0),
        });
    }

    levers
}

/// Smallest required amount; an earlier candidate keeps its place on ties.
pub fn cheapest_lever(levers: &[NextStep]) -> Option<NextStep> {
    let (first, rest) = levers.split_first()?;
    let mut best = *first;
    for candidate in rest {
        if candidate.amount < best.amount {
            best = *candidate;
        }
    }
    Some(best)
}
