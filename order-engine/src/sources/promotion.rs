//! Promotion amount computation
//!
//! Discounts compute as negative amounts. Flat discounts are capped at the
//! adjustable's amount so a promotion never pushes a line negative on its
//! own; the quantity-grouped calculator floors at group boundaries.

use rust_decimal::Decimal;
use shared::models::{Promotion, PromotionAction, PromotionCalculator};

use crate::core::error::{RecalcError, RecalcResult};
use crate::money::round_money;
use crate::sources::{Adjustable, AdjustmentSource};

impl AdjustmentSource for PromotionAction {
    fn compute_amount(&self, target: &Adjustable<'_>) -> RecalcResult<Decimal> {
        let amount = match &self.calculator {
            PromotionCalculator::FlatRate { amount } => {
                // Discount cannot exceed what the adjustable is worth
                -(*amount).min(target.amount()).max(Decimal::ZERO)
            }
            PromotionCalculator::Percent { percent } => {
                -(target.amount() * *percent / Decimal::ONE_HUNDRED)
            }
            PromotionCalculator::QuantityGrouped {
                group_size,
                per_group,
            } => {
                if *group_size == 0 {
                    return Err(RecalcError::InvalidCalculator(
                        "quantity group size must be positive".to_string(),
                    ));
                }
                let groups = target.quantity().max(0) as u32 / group_size;
                -(*per_group * Decimal::from(groups))
            }
            PromotionCalculator::FreeShipping => match target {
                Adjustable::Shipment(shipment) => -shipment.cost,
                // Free shipping attached elsewhere has no effect
                _ => Decimal::ZERO,
            },
        };

        Ok(round_money(amount))
    }
}

/// Eligibility of a promotion adjustment after its amount was recomputed.
///
/// A promotion outside its validity window is ineligible; so is one whose
/// computed effect is zero (retained but inert, never destroyed).
pub fn promotion_eligible(promotion: &Promotion, amount: Decimal, now: i64) -> bool {
    promotion.is_live(now) && !amount.is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::LineItem;
    use shared::util::now_millis;

    fn action(calculator: PromotionCalculator) -> PromotionAction {
        PromotionAction {
            id: 1,
            promotion_id: 1,
            calculator,
        }
    }

    fn line_item(price: Decimal, quantity: i32) -> LineItem {
        LineItem::new(1, "Widget", price, quantity)
    }

    #[test]
    fn flat_rate_discounts_are_negative() {
        let action = action(PromotionCalculator::FlatRate {
            amount: Decimal::from(5),
        });
        let item = line_item(Decimal::from(10), 2);
        let amount = action.compute_amount(&Adjustable::LineItem(&item)).unwrap();
        assert_eq!(amount, Decimal::from(-5));
    }

    #[test]
    fn flat_rate_is_capped_at_the_line_amount() {
        // $15 off a $10 line discounts exactly $10
        let action = action(PromotionCalculator::FlatRate {
            amount: Decimal::from(15),
        });
        let item = line_item(Decimal::from(10), 1);
        let amount = action.compute_amount(&Adjustable::LineItem(&item)).unwrap();
        assert_eq!(amount, Decimal::from(-10));
    }

    #[test]
    fn percent_computes_on_the_line_amount() {
        // 10% of 10.99 * 3 = 3.297 -> 3.30
        let action = action(PromotionCalculator::Percent {
            percent: Decimal::from(10),
        });
        let item = line_item(Decimal::new(1099, 2), 3);
        let amount = action.compute_amount(&Adjustable::LineItem(&item)).unwrap();
        assert_eq!(amount, Decimal::new(-330, 2));
    }

    #[test]
    fn quantity_grouped_floors_at_group_boundaries() {
        // Group of 2, $5 per group: qty 2 -> -5, qty 3 -> -5, qty 4 -> -10
        let action = action(PromotionCalculator::QuantityGrouped {
            group_size: 2,
            per_group: Decimal::from(5),
        });
        for (quantity, expected) in [(2, -5), (3, -5), (4, -10), (1, 0)] {
            let item = line_item(Decimal::from(20), quantity);
            let amount = action.compute_amount(&Adjustable::LineItem(&item)).unwrap();
            assert_eq!(amount, Decimal::from(expected), "quantity {quantity}");
        }
    }

    #[test]
    fn quantity_grouped_rejects_zero_group_size() {
        let action = action(PromotionCalculator::QuantityGrouped {
            group_size: 0,
            per_group: Decimal::from(5),
        });
        let item = line_item(Decimal::from(20), 2);
        assert!(matches!(
            action.compute_amount(&Adjustable::LineItem(&item)),
            Err(RecalcError::InvalidCalculator(_))
        ));
    }

    #[test]
    fn free_shipping_waives_the_shipment_cost() {
        use shared::order::Shipment;
        let action = action(PromotionCalculator::FreeShipping);
        let shipment = Shipment::new(Decimal::new(799, 2));
        let amount = action
            .compute_amount(&Adjustable::Shipment(&shipment))
            .unwrap();
        assert_eq!(amount, Decimal::new(-799, 2));

        // No effect on a line item target
        let item = line_item(Decimal::from(10), 1);
        let amount = action.compute_amount(&Adjustable::LineItem(&item)).unwrap();
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn zero_effect_promotions_are_ineligible() {
        let promotion = Promotion {
            id: 1,
            name: "p".to_string(),
            label: "P".to_string(),
            codes: vec![],
            starts_at: None,
            expires_at: None,
            is_active: true,
            created_at: 0,
        };
        let now = now_millis();
        assert!(promotion_eligible(&promotion, Decimal::from(-5), now));
        assert!(!promotion_eligible(&promotion, Decimal::ZERO, now));
    }
}
