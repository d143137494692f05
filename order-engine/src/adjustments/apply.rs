//! Creating adjustments from promotions and cancellations
//!
//! These are the entry points external events call when a promotion is
//! applied (coupon redeemed, automatic promotion matched) or units are
//! cancelled. Prior adjustments for the same source are cleared before the
//! fresh one is created, so re-applying converges instead of stacking.

use shared::order::{Adjustment, AdjustableRef, AdjustmentId, Order, SourceRef};
use shared::util::now_millis;

use crate::core::error::{RecalcError, RecalcResult};
use crate::sources::{promotion_eligible, Adjustable, AdjustmentSource, SourceRegistry};

use super::ledger::AdjustmentLedger;

/// Apply a promotion action at order level.
pub fn apply_promotion_to_order(
    order: &Order,
    action_id: i64,
    code_id: Option<i64>,
    registry: &SourceRegistry,
    ledger: &mut AdjustmentLedger,
) -> RecalcResult<AdjustmentId> {
    apply_promotion(order, Adjustable::Order(order), action_id, code_id, registry, ledger)
}

/// Apply a promotion action to one line item.
pub fn apply_promotion_to_line_item(
    order: &Order,
    line_item_id: i64,
    action_id: i64,
    code_id: Option<i64>,
    registry: &SourceRegistry,
    ledger: &mut AdjustmentLedger,
) -> RecalcResult<AdjustmentId> {
    let item = order
        .line_item(line_item_id)
        .ok_or(RecalcError::LineItemNotFound(line_item_id))?;
    apply_promotion(order, Adjustable::LineItem(item), action_id, code_id, registry, ledger)
}

/// Apply a promotion action to one shipment.
pub fn apply_promotion_to_shipment(
    order: &Order,
    shipment_id: i64,
    action_id: i64,
    code_id: Option<i64>,
    registry: &SourceRegistry,
    ledger: &mut AdjustmentLedger,
) -> RecalcResult<AdjustmentId> {
    let shipment = order
        .shipment(shipment_id)
        .ok_or(RecalcError::ShipmentNotFound(shipment_id))?;
    apply_promotion(order, Adjustable::Shipment(shipment), action_id, code_id, registry, ledger)
}

fn apply_promotion(
    order: &Order,
    target: Adjustable<'_>,
    action_id: i64,
    code_id: Option<i64>,
    registry: &SourceRegistry,
    ledger: &mut AdjustmentLedger,
) -> RecalcResult<AdjustmentId> {
    let action = registry
        .action(action_id)
        .ok_or(RecalcError::PromotionActionNotFound(action_id))?;
    let promotion = registry
        .promotion_of(action)
        .ok_or(RecalcError::PromotionActionNotFound(action_id))?;

    let source = SourceRef::PromotionAction(action_id);
    let adjustable = target.reference();

    // Re-applying replaces, never stacks
    let cleared = ledger.destroy_for_source(adjustable, source);
    if cleared > 0 {
        tracing::debug!(action_id, ?adjustable, cleared, "cleared prior promotion adjustments");
    }

    let amount = action.compute_amount(&target)?;
    let mut adjustment = Adjustment::new(
        order.id,
        adjustable,
        Some(source),
        amount,
        promotion.label.clone(),
    );
    adjustment.eligible = promotion_eligible(promotion, amount, now_millis());
    adjustment.promotion_code_id = code_id;

    ledger.create(registry, adjustment)
}

/// Record a unit cancellation as an adjustment on its line item.
pub fn apply_cancellation(
    order: &Order,
    cancellation_id: i64,
    registry: &SourceRegistry,
    ledger: &mut AdjustmentLedger,
) -> RecalcResult<AdjustmentId> {
    let cancellation = registry
        .cancellation(cancellation_id)
        .ok_or(RecalcError::CancellationNotFound(cancellation_id))?;
    let item = order
        .line_item(cancellation.line_item_id)
        .ok_or(RecalcError::LineItemNotFound(cancellation.line_item_id))?;

    let target = Adjustable::LineItem(item);
    let source = SourceRef::Cancellation(cancellation_id);
    ledger.destroy_for_source(target.reference(), source);

    let amount = cancellation.compute_amount(&target)?;
    let adjustment = Adjustment::new(
        order.id,
        target.reference(),
        Some(source),
        amount,
        "Cancellation".to_string(),
    );

    ledger.create(registry, adjustment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{
        Promotion, PromotionAction, PromotionCalculator, PromotionCode, UnitCancellation,
    };
    use shared::order::LineItem;
    use shared::Currency;

    fn setup() -> (Order, SourceRegistry, AdjustmentLedger) {
        let mut order = Order::new(Currency::Usd);
        order.line_items.push(LineItem::new(1, "Widget", Decimal::from(20), 2));

        let mut registry = SourceRegistry::new();
        registry.register_promotion(Promotion {
            id: 1,
            name: "five_off".to_string(),
            label: "Five Off".to_string(),
            codes: vec![],
            starts_at: None,
            expires_at: None,
            is_active: true,
            created_at: 0,
        });
        registry.register_action(PromotionAction {
            id: 10,
            promotion_id: 1,
            calculator: PromotionCalculator::FlatRate {
                amount: Decimal::from(5),
            },
        });

        (order, registry, AdjustmentLedger::new())
    }

    #[test]
    fn applying_a_promotion_creates_one_adjustment() {
        let (order, registry, mut ledger) = setup();
        let item_id = order.line_items[0].id;

        let id =
            apply_promotion_to_line_item(&order, item_id, 10, None, &registry, &mut ledger)
                .unwrap();

        let adjustment = ledger.get(id).unwrap();
        assert_eq!(adjustment.amount, Decimal::from(-5));
        assert_eq!(adjustment.label, "Five Off");
        assert!(adjustment.eligible);
    }

    #[test]
    fn reapplying_replaces_the_prior_adjustment() {
        let (order, registry, mut ledger) = setup();
        let item_id = order.line_items[0].id;

        let first =
            apply_promotion_to_line_item(&order, item_id, 10, None, &registry, &mut ledger)
                .unwrap();
        let second =
            apply_promotion_to_line_item(&order, item_id, 10, None, &registry, &mut ledger)
                .unwrap();

        assert_ne!(first, second);
        assert!(ledger.get(first).is_none());
        assert_eq!(
            ledger.for_adjustable(AdjustableRef::LineItem(item_id)).len(),
            1
        );
    }

    #[test]
    fn coded_promotions_require_the_code_at_application() {
        let (order, mut registry, mut ledger) = setup();
        let item_id = order.line_items[0].id;
        registry.register_promotion(Promotion {
            id: 2,
            name: "coupon".to_string(),
            label: "Coupon".to_string(),
            codes: vec![PromotionCode {
                id: 77,
                value: "SAVE5".to_string(),
            }],
            starts_at: None,
            expires_at: None,
            is_active: true,
            created_at: 0,
        });
        registry.register_action(PromotionAction {
            id: 11,
            promotion_id: 2,
            calculator: PromotionCalculator::FlatRate {
                amount: Decimal::from(5),
            },
        });

        let missing =
            apply_promotion_to_line_item(&order, item_id, 11, None, &registry, &mut ledger);
        assert_eq!(
            missing,
            Err(RecalcError::PromotionCodeRequired { promotion_id: 2 })
        );

        let coded =
            apply_promotion_to_line_item(&order, item_id, 11, Some(77), &registry, &mut ledger);
        assert!(coded.is_ok());
    }

    #[test]
    fn cancellation_credits_the_cancelled_units() {
        let (order, mut registry, mut ledger) = setup();
        let item_id = order.line_items[0].id;
        registry.register_cancellation(UnitCancellation {
            id: 5,
            line_item_id: item_id,
            quantity: 1,
            reason: Some("short shipped".to_string()),
        });

        let id = apply_cancellation(&order, 5, &registry, &mut ledger).unwrap();
        let adjustment = ledger.get(id).unwrap();
        assert_eq!(adjustment.amount, Decimal::from(-20));
        assert!(adjustment.cancellation_sourced());
    }

    #[test]
    fn unknown_action_is_an_error() {
        let (order, registry, mut ledger) = setup();
        assert_eq!(
            apply_promotion_to_order(&order, 404, None, &registry, &mut ledger),
            Err(RecalcError::PromotionActionNotFound(404))
        );
    }
}
