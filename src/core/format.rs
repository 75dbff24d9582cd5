use super::types::{Lever, TARGET_SALARY_RATIO};

pub const COASTING_MESSAGE: &str =
    "You're coasting. Keep the buffer topped up and re-check once a year.";

/// Whole-dollar amount, rounded up and floored at zero, with thousands separators.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "n/a".to_string();
    }

    let whole = amount.max(0.0).ceil() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}")
}

pub fn next_step_message(lever: Lever, amount: f64) -> String {
    let amount = format_currency(amount);
    match lever {
        Lever::GrowNetWorthForSalaryRatio => format!(
            "Grow net worth by {amount} to bring after-tax salary under {:.0}% of net worth.",
            TARGET_SALARY_RATIO * 100.0
        ),
        Lever::AddSideIncome => {
            format!("Add {amount}/yr of after-tax side income so returns cover spending.")
        }
        Lever::CutSpending => {
            format!("Cut annual spending by {amount} to match after-tax returns plus side income.")
        }
        Lever::GrowNetWorthForCoverage => {
            format!("Grow net worth by {amount} so after-tax returns cover spending.")
        }
        Lever::AddCash => format!("Hold {amount} more in cash to reach a 6-month buffer."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(1_000.0), "$1,000");
        assert_eq!(format_currency(30_000.0), "$30,000");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567");
    }

    #[test]
    fn currency_rounds_up_and_floors_at_zero() {
        assert_eq!(format_currency(29_999.01), "$30,000");
        assert_eq!(format_currency(-0.0000001), "$0");
        assert_eq!(format_currency(-5_000.0), "$0");
    }

    #[test]
    fn currency_marks_non_finite() {
        assert_eq!(format_currency(f64::INFINITY), "n/a");
        assert_eq!(format_currency(f64::NAN), "n/a");
    }

    #[test]
    fn message_names_lever_and_amount() {
        let msg = next_step_message(Lever::AddCash, 30_000.0);
        assert_eq!(msg, "Hold $30,000 more in cash to reach a 6-month buffer.");

        let msg = next_step_message(Lever::GrowNetWorthForSalaryRatio, 600_000.0);
        assert!(msg.contains("$600,000"));
        assert!(msg.contains("10%"));
    }
}
