use super::*;
use rust_decimal::Decimal;
use shared::models::{Promotion, PromotionAction, PromotionCalculator, TaxRate};
use shared::order::{LineItem, Payment, PaymentStatus, Shipment};
use shared::util::now_millis;
use shared::Currency;

use crate::adjustments::{apply_cancellation, apply_promotion_to_line_item, apply_promotion_to_order};
use crate::core::error::RecalcError;

fn money(units: i64) -> Decimal {
    Decimal::from(units)
}

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

/// Order in USD with one line item per (price, quantity) pair.
fn order_with_items(items: &[(i64, i32)]) -> Order {
    let mut order = Order::new(Currency::Usd);
    for (idx, (price, quantity)) in items.iter().enumerate() {
        order
            .line_items
            .push(LineItem::new(idx as i64 + 1, "Item", money(*price), *quantity));
    }
    order
}

fn promotion(id: i64, label: &str) -> Promotion {
    Promotion {
        id,
        name: label.to_lowercase().replace(' ', "_"),
        label: label.to_string(),
        codes: vec![],
        starts_at: None,
        expires_at: None,
        is_active: true,
        created_at: now_millis(),
    }
}

fn flat_action(id: i64, promotion_id: i64, amount: i64) -> PromotionAction {
    PromotionAction {
        id,
        promotion_id,
        calculator: PromotionCalculator::FlatRate {
            amount: money(amount),
        },
    }
}

fn grouped_action(id: i64, promotion_id: i64, group_size: u32, per_group: i64) -> PromotionAction {
    PromotionAction {
        id,
        promotion_id,
        calculator: PromotionCalculator::QuantityGrouped {
            group_size,
            per_group: money(per_group),
        },
    }
}

fn tax_rate(id: i64, percent: i64, included: bool) -> TaxRate {
    TaxRate {
        id,
        name: format!("VAT {percent}%"),
        percent: money(percent),
        included,
        zone_id: 1,
        category_id: None,
    }
}

/// Registry with one codeless flat-rate promotion (promotion 1, action 10).
fn registry_with_flat_promotion(amount: i64) -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    registry.register_promotion(promotion(1, "Flat Off"));
    registry.register_action(flat_action(10, 1, amount));
    registry
}

fn run(order: &mut Order, ledger: &mut AdjustmentLedger, registry: &SourceRegistry) {
    OrderUpdater::new(registry)
        .update(order, ledger)
        .expect("recalculation failed");
}

fn completed_payment(amount: i64) -> Payment {
    Payment::new(money(amount), PaymentStatus::Completed)
}

fn shipment_with_cost(cost: i64) -> Shipment {
    Shipment::new(money(cost))
}

mod test_states;
