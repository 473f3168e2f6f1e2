//! Discount arithmetic shared by coupons and promotions.

use rust_decimal::{Decimal, RoundingStrategy};
use validator::ValidationError;

use crate::entities::DiscountType;
use crate::errors::ServiceError;

/// Rounds a monetary amount to cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Discount granted on `order_value`.
///
/// Percentages are capped by `max_discount` when given. The result never
/// exceeds the order value and is never negative.
pub fn compute_discount(
    discount_type: DiscountType,
    value: Decimal,
    order_value: Decimal,
    max_discount: Option<Decimal>,
) -> Decimal {
    let raw = match discount_type {
        DiscountType::Percentage => {
            let pct = order_value * value / Decimal::ONE_HUNDRED;
            match max_discount {
                Some(cap) if pct > cap => cap,
                _ => pct,
            }
        }
        DiscountType::FixedAmount => value,
    };

    round_money(raw.min(order_value).max(Decimal::ZERO))
}

/// Field validator for prices and amounts.
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("Value must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Percentages live in `0..=100`; fixed amounts only need to be non-negative.
pub fn check_discount_value(discount_type: DiscountType, value: Decimal) -> Result<(), ServiceError> {
    if value < Decimal::ZERO {
        return Err(ServiceError::bad_request("Discount value must not be negative"));
    }
    if discount_type == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
        return Err(ServiceError::bad_request(
            "Percentage discount cannot exceed 100",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(DiscountType::Percentage, dec!(10), dec!(200), None, dec!(20))]
    #[case(DiscountType::Percentage, dec!(50), dec!(200), Some(dec!(30)), dec!(30))]
    #[case(DiscountType::Percentage, dec!(15), dec!(33.33), None, dec!(5.00))]
    #[case(DiscountType::Percentage, dec!(100), dec!(80), None, dec!(80))]
    #[case(DiscountType::FixedAmount, dec!(25), dec!(200), None, dec!(25))]
    #[case(DiscountType::FixedAmount, dec!(25), dec!(10), None, dec!(10))]
    #[case(DiscountType::FixedAmount, dec!(25), dec!(0), None, dec!(0))]
    fn discount_cases(
        #[case] kind: DiscountType,
        #[case] value: Decimal,
        #[case] order_value: Decimal,
        #[case] cap: Option<Decimal>,
        #[case] expected: Decimal,
    ) {
        assert_eq!(compute_discount(kind, value, order_value, cap), expected);
    }

    #[test]
    fn cap_does_not_apply_to_fixed_amounts() {
        assert_eq!(
            compute_discount(DiscountType::FixedAmount, dec!(40), dec!(100), Some(dec!(5))),
            dec!(40)
        );
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(1.004)), dec!(1.00));
    }

    #[test]
    fn percentage_above_hundred_is_rejected() {
        assert!(check_discount_value(DiscountType::Percentage, dec!(100)).is_ok());
        assert!(check_discount_value(DiscountType::Percentage, dec!(100.01)).is_err());
        assert!(check_discount_value(DiscountType::FixedAmount, dec!(250)).is_ok());
        assert!(check_discount_value(DiscountType::FixedAmount, dec!(-1)).is_err());
    }

    #[test]
    fn negative_amounts_fail_field_validation() {
        assert!(validate_non_negative(&dec!(0)).is_ok());
        assert!(validate_non_negative(&dec!(19.99)).is_ok());
        assert!(validate_non_negative(&dec!(-0.01)).is_err());
    }
}
