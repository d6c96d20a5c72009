//! Display helpers for the ledger browser

use ledgerview_core::{Employee, Transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    format!("{}{}", sign, result.chars().rev().collect::<String>())
}

/// Format an amount as dollars with two decimals, e.g. `$1,234.50`
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let abs = rounded.abs();
    let whole = abs.trunc();
    let cents = ((abs - whole) * Decimal::ONE_HUNDRED).trunc().to_u32().unwrap_or(0);
    format!("{}${}.{:02}", sign, format_number(whole), cents)
}

/// Label shown in the employee picker
pub fn employee_label(employee: &Employee) -> String {
    employee.full_name()
}

/// One-line rendering of a transaction row
pub fn transaction_row(transaction: &Transaction) -> String {
    format!(
        "{:<8} {} {:<28} {:>12}  {:<20} [{}]",
        transaction.id,
        transaction.date.format("%Y-%m-%d"),
        transaction.merchant,
        format_amount(transaction.amount),
        employee_label(&transaction.employee),
        if transaction.approved { "x" } else { " " }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(-45000), "-45,000");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(123450, 2)), "$1,234.50");
        assert_eq!(format_amount(Decimal::new(5, 0)), "$5.00");
        assert_eq!(format_amount(Decimal::new(-1999, 3)), "-$2.00");
        assert_eq!(format_amount(Decimal::new(-1, 3)), "$0.00");
    }

    #[test]
    fn test_employee_label() {
        assert_eq!(employee_label(&Employee::empty()), "All Employees");
    }
}
