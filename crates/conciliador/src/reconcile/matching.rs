use crate::normalize::{names_overlap, parse_date};
use crate::{Decimal, Transaction};
use chrono::TimeDelta;

/// Same reference code and exactly the same amount.
///
/// The internal id may also appear anywhere in the raw bank line, since some
/// statements only carry the reference inside a free-text description.
pub fn exact_match(internal: &Transaction, bank: &Transaction) -> bool {
    let id = internal.id.as_str();
    if id.is_empty() {
        return false;
    }
    // an id that is a substring of an unrelated number in the line also matches
    bank.amount == internal.amount && (bank.id == id || bank.original_line.contains(id))
}

pub fn name_match(internal: &Transaction, bank: &Transaction, tolerance: Decimal) -> bool {
    amounts_close(internal.amount, bank.amount, tolerance) && names_overlap(&internal.name, &bank.name)
}

pub fn date_match(
    internal: &Transaction,
    bank: &Transaction,
    tolerance: Decimal,
    window: TimeDelta,
) -> bool {
    if !amounts_close(internal.amount, bank.amount, tolerance) {
        return false;
    }
    let (Some(a), Some(b)) = (parse_date(&internal.date), parse_date(&bank.date)) else {
        return false;
    };
    let distance = if a >= b {
        a.signed_duration_since(b)
    } else {
        b.signed_duration_since(a)
    };
    distance <= window
}

fn amounts_close(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    a.checked_sub(b)
        .is_some_and(|difference| difference.abs() < tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Source;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn internal(id: &str, name: &str, amount: &str, date: &str) -> Transaction {
        Transaction::new(Source::Internal, date, name, id, dec(amount))
    }

    fn bank(id: &str, name: &str, amount: &str, date: &str) -> Transaction {
        Transaction::new(Source::Bank, date, name, id, dec(amount))
    }

    const TOLERANCE: &str = "0.01";

    fn window() -> TimeDelta {
        TimeDelta::hours(48)
    }

    #[test]
    fn exact_by_id() {
        let i = internal("A1", "Juan Garcia", "500", "01/12/2025");
        let b = bank("A1", "J. GARCIA", "500.00", "01/12/2025");
        assert!(exact_match(&i, &b));
    }

    #[test]
    fn exact_by_id_in_original_line() {
        let i = internal("20931", "Juan Garcia", "500", "01/12/2025");
        let b = bank("S/R", "SPEI", "500", "01/12/2025")
            .with_original_line("01/12/2025,SPEI REF 20931 COLEGIATURA,S/R,$500.00");
        assert!(exact_match(&i, &b));
    }

    #[test]
    fn exact_id_substring_of_unrelated_number() {
        let i = internal("123", "Juan Garcia", "500", "01/12/2025");
        let b = bank("S/R", "SPEI", "500", "01/12/2025")
            .with_original_line("01/12/2025,CUENTA 9912345,S/R,500");
        assert!(exact_match(&i, &b));
    }

    #[test]
    fn dont_match_exact_without_id() {
        let i = internal("", "Juan Garcia", "500", "01/12/2025");
        let b = bank("", "Juan Garcia", "500", "01/12/2025").with_original_line("anything");
        assert!(!exact_match(&i, &b));
    }

    #[test]
    fn exact_whitespace_id_found_in_original_line() {
        let i = internal(" ", "Juan Garcia", "500", "01/12/2025");
        let b = bank("S/R", "SPEI", "500", "01/12/2025").with_original_line("a b");
        assert!(exact_match(&i, &b));
    }

    #[test]
    fn dont_match_exact_with_amount_difference() {
        let i = internal("A1", "Juan Garcia", "100.000", "01/12/2025");
        let b = bank("A1", "Juan Garcia", "100.001", "01/12/2025");
        assert!(!exact_match(&i, &b));
        assert!(name_match(&i, &b, dec(TOLERANCE)));
        assert!(date_match(&i, &b, dec(TOLERANCE), window()));
    }

    #[test]
    fn name_match_requires_tolerance() {
        let i = internal("", "Maria Lopez", "300.00", "01/12/2025");
        let b = bank("B9", "MARIA LOPEZ PEREZ", "300.009", "01/12/2025");
        assert!(name_match(&i, &b, dec(TOLERANCE)));

        let b = bank("B9", "MARIA LOPEZ PEREZ", "300.01", "01/12/2025");
        assert!(!name_match(&i, &b, dec(TOLERANCE)));
    }

    #[test]
    fn date_match_window_is_inclusive() {
        let i = internal("C3", "X", "120", "01/12/2025");
        assert!(date_match(&i, &bank("Z9", "Y", "120", "01/12/2025"), dec(TOLERANCE), window()));
        assert!(date_match(&i, &bank("Z9", "Y", "120", "02/12/2025"), dec(TOLERANCE), window()));
        assert!(date_match(&i, &bank("Z9", "Y", "120", "29/11/2025"), dec(TOLERANCE), window()));
        assert!(!date_match(&i, &bank("Z9", "Y", "120", "04/12/2025"), dec(TOLERANCE), window()));
    }

    #[test]
    fn dont_match_unparseable_dates() {
        let i = internal("C3", "X", "120", "sin fecha");
        let b = bank("Z9", "Y", "120", "01/12/2025");
        assert!(!date_match(&i, &b, dec(TOLERANCE), window()));
        assert!(!date_match(&b, &i, dec(TOLERANCE), window()));
    }

    #[test]
    fn dont_match_overflowing_amounts() {
        let i = Transaction::new(Source::Internal, "01/12/2025", "X", "A", Decimal::MAX);
        let b = Transaction::new(Source::Bank, "01/12/2025", "X", "B", Decimal::MIN);
        assert!(!name_match(&i, &b, dec(TOLERANCE)));
        assert!(!date_match(&i, &b, dec(TOLERANCE), window()));
    }
}
