//! Line and order totals.

use crate::domain::Amount;

/// `round(unit_price × quantity, 2)`, half-up.
pub fn line_total(unit_price: Amount, quantity: Amount) -> Amount {
    unit_price.saturating_mul(quantity).round_cents()
}

/// Line total straight from form input; missing or non-numeric values count as zero.
pub fn line_total_input(unit_price: &str, quantity: &str) -> Amount {
    let unit_price = Amount::parse_lenient(unit_price).unwrap_or(Amount::ZERO);
    let quantity = Amount::parse_lenient(quantity).unwrap_or(Amount::ZERO);
    line_total(unit_price, quantity)
}

/// Sum of the line totals as stored on the items, rounded to cents.
///
/// The stored totals are summed as they are, so a manually adjusted line total
/// is respected.
pub fn order_total<I>(line_totals: I) -> Amount
where
    I: IntoIterator<Item = Amount>,
{
    line_totals
        .into_iter()
        .fold(Amount::ZERO, Amount::saturating_add)
        .round_cents()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn whole_quantities() {
        assert_eq!(line_total(amount("10.00"), amount("3")).to_string(), "30.00");
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(line_total(amount("9.995"), amount("2")).to_string(), "19.99");
        assert_eq!(line_total(amount("0.125"), amount("1")).to_string(), "0.13");
        assert_eq!(line_total(amount("1.005"), amount("1")).to_string(), "1.01");
        assert_eq!(line_total(amount("2.675"), amount("1")).to_string(), "2.68");
    }

    #[test]
    fn non_numeric_input_is_zero() {
        assert_eq!(line_total_input("abc", "3").to_string(), "0.00");
        assert_eq!(line_total_input("4.50", "").to_string(), "0.00");
        assert_eq!(line_total_input("4.50", "2").to_string(), "9.00");
    }

    #[test]
    fn order_total_sums_line_totals() {
        let totals = [amount("12.50"), amount("7.25"), amount("0.00")];
        assert_eq!(order_total(totals).to_string(), "19.75");
    }

    #[test]
    fn order_total_is_idempotent() {
        let totals = vec![amount("0.10"), amount("0.20"), amount("33.333")];
        let first = order_total(totals.iter().copied());
        let second = order_total(totals.iter().copied());
        assert_eq!(first, second);
        assert_eq!(first.to_string(), "33.63");
    }

    #[test]
    fn empty_order_is_zero() {
        assert_eq!(order_total(Vec::<Amount>::new()).to_string(), "0.00");
    }
}
