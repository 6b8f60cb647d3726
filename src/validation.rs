// Validation utilities module
// Custom validator functions shared by request DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use validator::ValidationError;

/// Monetary amounts are never negative
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        let mut error = ValidationError::new("amount_must_be_non_negative");
        error.message = Some("Amount must not be negative".into());
        Err(error)
    } else {
        Ok(())
    }
}

/// Monetary amounts carry at most two decimal places
pub fn validate_money_scale(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.normalize().scale() > 2 {
        let mut error = ValidationError::new("amount_scale");
        error.message = Some("Amount must have at most two decimal places".into());
        Err(error)
    } else {
        Ok(())
    }
}

/// Combined money check used by DTOs
pub fn validate_money(amount: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative_amount(amount)?;
    validate_money_scale(amount)
}

/// Check-out must fall strictly after check-in
pub fn validate_date_range(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if check_out <= check_in {
        let mut error = ValidationError::new("date_range");
        error.message = Some("check_out_date must be after check_in_date".into());
        Err(error)
    } else {
        Ok(())
    }
}

/// Required free-text fields must contain something other than whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_validation() {
        assert!(validate_money(&dec!(0)).is_ok());
        assert!(validate_money(&dec!(250.00)).is_ok());
        assert!(validate_money(&dec!(19.5)).is_ok());
        assert!(validate_money(&dec!(-0.01)).is_err());
        assert!(validate_money(&dec!(1.005)).is_err());
    }

    #[test]
    fn test_date_range_validation() {
        let jan10 = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let jan15 = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();

        assert!(validate_date_range(jan10, jan15).is_ok());
        assert!(validate_date_range(jan15, jan10).is_err());
        assert!(validate_date_range(jan10, jan10).is_err());
    }

    #[test]
    fn test_blank_rejected() {
        assert!(validate_not_blank("Late checkout").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }
}
