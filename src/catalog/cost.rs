//! Estimated cost of a program

use crate::models::Fees;

pub const NO_DATA: &str = "No Data";

/// Sum of whichever of registration, resource and tuition fees are present.
/// `None` when none of them are, so a missing breakdown never reads as free.
pub fn estimated_cost(fees: Option<&Fees>) -> Option<f64> {
    let fees = fees?;
    [fees.registration_fee, fees.resource_fee, fees.tuition_fee]
        .into_iter()
        .flatten()
        .fold(None, |acc, fee| Some(acc.unwrap_or(0.0) + fee))
}

/// `MYR 10,000` or `No Data`
pub fn format_cost(cost: Option<f64>) -> String {
    match cost {
        Some(amount) => format!("MYR {}", group_thousands(amount.round() as i64)),
        None => NO_DATA.to_string(),
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sums_present_fees() {
        let fees = Fees {
            registration_fee: Some(1000.0),
            tuition_fee: Some(9000.0),
            ..Default::default()
        };
        assert_eq!(estimated_cost(Some(&fees)), Some(10000.0));
        assert_eq!(format_cost(estimated_cost(Some(&fees))), "MYR 10,000");
    }

    #[test]
    fn test_no_fees_is_no_data() {
        assert_eq!(estimated_cost(Some(&Fees::default())), None);
        assert_eq!(estimated_cost(None), None);
        assert_eq!(format_cost(None), "No Data");
    }

    #[test]
    fn test_zero_fee_is_data() {
        let fees = Fees {
            resource_fee: Some(0.0),
            ..Default::default()
        };
        assert_eq!(format_cost(estimated_cost(Some(&fees))), "MYR 0");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(-4500), "-4,500");
    }
}
