//! built-in starter dataset, used on first run and as the recovery fallback
//! when the persisted blob cannot be decoded

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::decimal::Money;
use crate::instrument::{Instrument, PaymentRecord};
use crate::types::{InstrumentKind, PaymentStatus};

/// two sample cards and one sample loan, dated relative to `today`
pub fn default_instruments(today: NaiveDate) -> Vec<Instrument> {
    vec![
        Instrument {
            id: Uuid::new_v4(),
            kind: InstrumentKind::CreditCard,
            issuer: "Garanti Bonus".to_string(),
            display_name: "Garanti Bonus Card".to_string(),
            credit_limit: Money::from_str_exact("12480.00").unwrap_or(Money::ZERO),
            current_balance: Money::from_str_exact("1250.00").unwrap_or(Money::ZERO),
            minimum_due: Money::from_str_exact("925.00").unwrap_or(Money::ZERO),
            due_day: 25,
            next_due_date: Some(today + Duration::days(5)),
            statement_date: Some(today - Duration::days(10)),
            paid_amount_total: Money::ZERO,
            status: PaymentStatus::Pending,
            is_marked_paid: false,
            prior_balance: None,
            monthly_installment: Money::ZERO,
            installment_count_at_creation: 0,
            loan_end_date: None,
            payment_history: vec![
                PaymentRecord::new(
                    "last month's statement",
                    today - Duration::days(30),
                    Money::from_str_exact("1745.50").unwrap_or(Money::ZERO),
                    "paid",
                ),
                PaymentRecord::new(
                    "statement from two months ago",
                    today - Duration::days(60),
                    Money::from_str_exact("2120.00").unwrap_or(Money::ZERO),
                    "paid",
                ),
            ],
        },
        Instrument {
            id: Uuid::new_v4(),
            kind: InstrumentKind::Loan,
            issuer: "Akbank".to_string(),
            display_name: "Mortgage".to_string(),
            credit_limit: Money::ZERO,
            current_balance: Money::from_str_exact("2200.00").unwrap_or(Money::ZERO),
            minimum_due: Money::from_str_exact("2200.00").unwrap_or(Money::ZERO),
            due_day: 30,
            next_due_date: Some(today + Duration::days(3)),
            statement_date: Some(today - Duration::days(20)),
            paid_amount_total: Money::ZERO,
            status: PaymentStatus::Pending,
            is_marked_paid: false,
            prior_balance: None,
            monthly_installment: Money::from_str_exact("2200.00").unwrap_or(Money::ZERO),
            installment_count_at_creation: 1,
            loan_end_date: Some(crate::schedule::add_months(today, 1)),
            payment_history: Vec::new(),
        },
        Instrument {
            id: Uuid::new_v4(),
            kind: InstrumentKind::CreditCard,
            issuer: "Yapı Kredi".to_string(),
            display_name: "World Card".to_string(),
            credit_limit: Money::from_str_exact("8000.00").unwrap_or(Money::ZERO),
            current_balance: Money::from_str_exact("875.50").unwrap_or(Money::ZERO),
            minimum_due: Money::ZERO,
            due_day: 1,
            next_due_date: None,
            statement_date: None,
            paid_amount_total: Money::ZERO,
            status: PaymentStatus::Pending,
            is_marked_paid: false,
            prior_balance: None,
            monthly_installment: Money::ZERO,
            installment_count_at_creation: 0,
            loan_end_date: None,
            payment_history: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dataset_shape() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let seeded = default_instruments(today);

        assert_eq!(seeded.len(), 3);
        assert_eq!(seeded[0].kind, InstrumentKind::CreditCard);
        assert_eq!(seeded[1].kind, InstrumentKind::Loan);
        assert_eq!(seeded[0].payment_history.len(), 2);
        assert_eq!(seeded[0].next_due_date, Some(today + Duration::days(5)));
        assert!(seeded.iter().all(|i| !i.current_balance.is_negative()));
    }
}
