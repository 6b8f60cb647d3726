// Folio arithmetic
//
// balance = Σ charges − Σ COMPLETED payments, in `Decimal` throughout.

use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::folio::{FolioBalance, PaymentStatus};

/// Running totals for one reservation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolioLedger {
    total_charges: Decimal,
    total_payments: Decimal,
}

impl FolioLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_charge(&mut self, amount: Decimal) {
        self.total_charges += amount;
    }

    /// Payments that are not COMPLETED leave the balance untouched
    pub fn apply_payment(&mut self, amount: Decimal, status: PaymentStatus) {
        if status == PaymentStatus::Completed {
            self.total_payments += amount;
        }
    }

    pub fn total_charges(&self) -> Decimal {
        self.total_charges
    }

    pub fn total_payments(&self) -> Decimal {
        self.total_payments
    }

    pub fn balance(&self) -> Decimal {
        self.total_charges - self.total_payments
    }

    pub fn summary(&self, reservation_id: Uuid) -> FolioBalance {
        FolioBalance {
            reservation_id,
            total_charges: self.total_charges.round_dp(2),
            total_payments: self.total_payments.round_dp(2),
            balance: self.balance().round_dp(2),
        }
    }
}

/// Build the ledger for a reservation from stored totals
pub async fn load(conn: &mut PgConnection, reservation_id: Uuid) -> Result<FolioLedger, sqlx::Error> {
    let (total_charges, total_payments): (Decimal, Decimal) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COALESCE(SUM(amount), 0) FROM charges WHERE reservation_id = $1),
            (SELECT COALESCE(SUM(amount), 0) FROM payments
              WHERE reservation_id = $1 AND status = 'COMPLETED')
        "#,
    )
    .bind(reservation_id)
    .fetch_one(conn)
    .await?;

    Ok(FolioLedger {
        total_charges,
        total_payments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pending_payment_excluded() {
        let mut ledger = FolioLedger::new();
        ledger.post_charge(dec!(200.00));
        ledger.post_charge(dec!(50.00));
        ledger.apply_payment(dec!(250.00), PaymentStatus::Completed);
        ledger.apply_payment(dec!(100.00), PaymentStatus::Pending);

        assert_eq!(ledger.total_charges(), dec!(250.00));
        assert_eq!(ledger.total_payments(), dec!(250.00));
        assert_eq!(ledger.balance(), dec!(0.00));
    }

    #[test]
    fn test_refunded_and_failed_excluded() {
        let mut ledger = FolioLedger::new();
        ledger.post_charge(dec!(80.00));
        ledger.apply_payment(dec!(80.00), PaymentStatus::Refunded);
        ledger.apply_payment(dec!(80.00), PaymentStatus::Failed);
        assert_eq!(ledger.balance(), dec!(80.00));
    }

    #[test]
    fn test_no_float_drift() {
        let mut ledger = FolioLedger::new();
        for _ in 0..10 {
            ledger.post_charge(dec!(0.10));
        }
        assert_eq!(ledger.total_charges(), dec!(1.00));
    }

    #[test]
    fn test_overpayment_gives_negative_balance() {
        let mut ledger = FolioLedger::new();
        ledger.post_charge(dec!(10.00));
        ledger.apply_payment(dec!(15.00), PaymentStatus::Completed);

        let summary = ledger.summary(Uuid::nil());
        assert_eq!(summary.balance, dec!(-5.00));
    }

    fn cents() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000).prop_map(|c| Decimal::new(c, 2))
    }

    fn status() -> impl Strategy<Value = PaymentStatus> {
        prop::sample::select(PaymentStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_balance_is_charges_minus_completed(
            charges in prop::collection::vec(cents(), 0..20),
            payments in prop::collection::vec((cents(), status()), 0..20),
        ) {
            let mut ledger = FolioLedger::new();
            for amount in &charges {
                ledger.post_charge(*amount);
            }
            for (amount, status) in &payments {
                ledger.apply_payment(*amount, *status);
            }

            let expected_charges: Decimal = charges.iter().copied().sum();
            let expected_payments: Decimal = payments
                .iter()
                .filter(|(_, s)| *s == PaymentStatus::Completed)
                .map(|(a, _)| *a)
                .sum();

            prop_assert_eq!(ledger.balance(), expected_charges - expected_payments);
        }
    }
}
