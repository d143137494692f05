//! Tax adjuster
//!
//! Keeps each line item's and shipment's tax adjustments in step with the
//! rates that currently apply: stale adjustments (rate gone or no longer
//! matching) are destroyed, missing ones created, existing ones refreshed.
//! Runs after the promotions phase because tax computes on the discounted
//! amount.

use shared::models::TaxRate;
use shared::order::{Adjustment, AdjustmentId, Order, SourceRef};

use crate::adjustments::AdjustmentLedger;
use crate::core::error::RecalcResult;
use crate::sources::{Adjustable, AdjustmentSource, SourceRegistry};
use crate::taxation::matcher::rate_applies;

pub struct TaxAdjuster<'a> {
    registry: &'a SourceRegistry,
}

impl<'a> TaxAdjuster<'a> {
    pub fn new(registry: &'a SourceRegistry) -> Self {
        Self { registry }
    }

    /// Reconcile tax adjustments for every line item and shipment.
    pub fn adjust(&self, order: &Order, ledger: &mut AdjustmentLedger) -> RecalcResult<()> {
        for item in &order.line_items {
            self.adjust_entity(
                order,
                Adjustable::LineItem(item),
                item.tax_category_id,
                ledger,
            )?;
        }
        for shipment in &order.shipments {
            self.adjust_entity(
                order,
                Adjustable::Shipment(shipment),
                shipment.tax_category_id,
                ledger,
            )?;
        }
        Ok(())
    }

    fn adjust_entity(
        &self,
        order: &Order,
        target: Adjustable<'_>,
        category: Option<i64>,
        ledger: &mut AdjustmentLedger,
    ) -> RecalcResult<()> {
        let adjustable = target.reference();
        let applicable: Vec<&TaxRate> = self
            .registry
            .tax_rates()
            .filter(|rate| rate_applies(rate, order.tax_zone_id, category))
            .collect();

        // Destroy adjustments whose rate is gone or no longer matches.
        // Finalized adjustments are frozen and left alone.
        let stale: Vec<AdjustmentId> = ledger
            .for_adjustable(adjustable)
            .into_iter()
            .filter(|a| a.tax_sourced() && !a.finalized)
            .filter(|a| {
                !applicable
                    .iter()
                    .any(|rate| a.source == Some(SourceRef::TaxRate(rate.id)))
            })
            .map(|a| a.id)
            .collect();
        for id in stale {
            tracing::debug!(adjustment_id = id, ?adjustable, "removing stale tax adjustment");
            ledger.destroy(id);
        }

        for rate in applicable {
            let source = SourceRef::TaxRate(rate.id);
            let existing = ledger.find_by_source(adjustable, source).map(|a| a.id);
            match existing {
                Some(id) => {
                    ledger.refresh(id, self.registry, &target)?;
                }
                None => {
                    let amount = rate.compute_amount(&target)?;
                    let mut adjustment = Adjustment::new(
                        order.id,
                        adjustable,
                        Some(source),
                        amount,
                        rate.name.clone(),
                    );
                    adjustment.included = rate.included;
                    ledger.create(self.registry, adjustment)?;
                    tracing::debug!(
                        rate_id = rate.id,
                        ?adjustable,
                        amount = %amount,
                        included = rate.included,
                        "created tax adjustment"
                    );
                }
            }
        }

        Ok(())
    }
}
