//! Adjustment ledger - authoritative store with per-adjustable caches
//!
//! Every adjustment lives here, keyed by a ledger-assigned ascending id
//! (creation order). Each adjustable may additionally have a materialized
//! id cache - the "loaded collection" a display layer or caller holds on
//! to. Mutations through the collection path keep that cache consistent
//! silently; mutations through the source path (a promotion or tax rate
//! creating/destroying its own adjustments) trigger *association repair*:
//! the cache is fixed in place, a warning is logged, and a repair counter
//! is bumped. Repair is an observability signal for using the wrong
//! mutation path, not an error.

use std::collections::{BTreeMap, HashMap, HashSet};

use shared::order::{Adjustment, AdjustableRef, AdjustmentId, SourceRef};

use crate::core::error::{RecalcError, RecalcResult};
use crate::sources::{Adjustable, SourceRegistry};

use super::refresh_adjustment;

/// Authoritative adjustment store for one order (or a batch of orders).
#[derive(Debug, Default)]
pub struct AdjustmentLedger {
    next_id: AdjustmentId,
    adjustments: BTreeMap<AdjustmentId, Adjustment>,
    /// Materialized collection caches, present only once loaded
    caches: HashMap<AdjustableRef, Vec<AdjustmentId>>,
    /// Adjustables whose adjustments were written since the last commit
    touched: HashSet<AdjustableRef>,
    repair_count: u64,
}

impl AdjustmentLedger {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.adjustments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjustments.is_empty()
    }

    pub fn get(&self, id: AdjustmentId) -> Option<&Adjustment> {
        self.adjustments.get(&id)
    }

    /// All adjustments of one adjustable, in creation order.
    pub fn for_adjustable(&self, adjustable: AdjustableRef) -> Vec<&Adjustment> {
        self.adjustments
            .values()
            .filter(|a| a.adjustable == adjustable)
            .collect()
    }

    /// Ids of one adjustable's adjustments, in creation order.
    pub fn ids_for(&self, adjustable: AdjustableRef) -> Vec<AdjustmentId> {
        self.adjustments
            .values()
            .filter(|a| a.adjustable == adjustable)
            .map(|a| a.id)
            .collect()
    }

    /// Ids of one adjustable's promotion-sourced adjustments.
    pub fn promotion_ids_for(&self, adjustable: AdjustableRef) -> Vec<AdjustmentId> {
        self.adjustments
            .values()
            .filter(|a| a.adjustable == adjustable && a.promotion_sourced())
            .map(|a| a.id)
            .collect()
    }

    /// Mutable borrows of one adjustable's promotion adjustments, for the
    /// chooser to assign eligibility in place.
    pub fn promotion_adjustments_mut(&mut self, adjustable: AdjustableRef) -> Vec<&mut Adjustment> {
        let candidates: Vec<&mut Adjustment> = self
            .adjustments
            .values_mut()
            .filter(|a| a.adjustable == adjustable && a.promotion_sourced())
            .collect();
        if !candidates.is_empty() {
            self.touched.insert(adjustable);
        }
        candidates
    }

    /// The adjustment of `adjustable` carrying `source`, if any.
    pub fn find_by_source(
        &self,
        adjustable: AdjustableRef,
        source: SourceRef,
    ) -> Option<&Adjustment> {
        self.adjustments
            .values()
            .find(|a| a.adjustable == adjustable && a.source == Some(source))
    }

    // ========================================================================
    // Creation / destruction - collection path
    // ========================================================================

    /// Create through the adjustable's collection. The materialized cache
    /// (if any) is extended silently; no repair fires.
    pub fn create(
        &mut self,
        registry: &SourceRegistry,
        adjustment: Adjustment,
    ) -> RecalcResult<AdjustmentId> {
        self.validate(registry, &adjustment)?;
        let id = self.insert(adjustment);
        let adjustable = self.adjustments[&id].adjustable;
        if let Some(cache) = self.caches.get_mut(&adjustable) {
            cache.push(id);
        }
        Ok(id)
    }

    /// Destroy through the adjustable's collection; cache updated silently.
    pub fn destroy(&mut self, id: AdjustmentId) -> Option<Adjustment> {
        let removed = self.remove(id)?;
        if let Some(cache) = self.caches.get_mut(&removed.adjustable) {
            cache.retain(|cached| *cached != id);
        }
        Some(removed)
    }

    // ========================================================================
    // Creation / destruction - source path (association repair)
    // ========================================================================

    /// Create through a source, bypassing the adjustable's collection. If
    /// the collection cache is materialized, it is repaired in place and a
    /// diagnostic is emitted.
    pub fn create_from_source(
        &mut self,
        registry: &SourceRegistry,
        adjustment: Adjustment,
    ) -> RecalcResult<AdjustmentId> {
        self.validate(registry, &adjustment)?;
        let id = self.insert(adjustment);
        let adjustable = self.adjustments[&id].adjustable;
        if let Some(cache) = self.caches.get_mut(&adjustable) {
            if !cache.contains(&id) {
                cache.push(id);
                self.repair_count += 1;
                tracing::warn!(
                    adjustment_id = id,
                    adjustable = ?adjustable,
                    "adjustment created outside its adjustable's collection; cache repaired"
                );
            }
        }
        Ok(id)
    }

    /// Destroy through a source; symmetric repair of a materialized cache.
    pub fn destroy_from_source(&mut self, id: AdjustmentId) -> Option<Adjustment> {
        let removed = self.remove(id)?;
        if let Some(cache) = self.caches.get_mut(&removed.adjustable) {
            if cache.contains(&id) {
                cache.retain(|cached| *cached != id);
                self.repair_count += 1;
                tracing::warn!(
                    adjustment_id = id,
                    adjustable = ?removed.adjustable,
                    "adjustment destroyed outside its adjustable's collection; cache repaired"
                );
            }
        }
        Some(removed)
    }

    /// Destroy every adjustment of `adjustable` carrying `source`. Used
    /// when a promotion or rate is re-applied and its prior adjustments
    /// must be cleared first.
    pub fn destroy_for_source(&mut self, adjustable: AdjustableRef, source: SourceRef) -> usize {
        let ids: Vec<AdjustmentId> = self
            .adjustments
            .values()
            .filter(|a| a.adjustable == adjustable && a.source == Some(source))
            .map(|a| a.id)
            .collect();
        for id in &ids {
            self.destroy(*id);
        }
        ids.len()
    }

    // ========================================================================
    // Refresh / finalize
    // ========================================================================

    /// Refresh one adjustment against its source (see
    /// [`refresh_adjustment`]). Finalized adjustments are skipped without
    /// marking the adjustable touched.
    pub fn refresh(
        &mut self,
        id: AdjustmentId,
        registry: &SourceRegistry,
        target: &Adjustable<'_>,
    ) -> RecalcResult<()> {
        let adjustment = self
            .adjustments
            .get_mut(&id)
            .ok_or(RecalcError::AdjustmentNotFound(id))?;
        if adjustment.finalized {
            return Ok(());
        }
        refresh_adjustment(adjustment, registry, target)?;
        self.touched.insert(adjustment.adjustable);
        Ok(())
    }

    /// Freeze all of an order's adjustments against recomputation (order
    /// completed, or a shipment finalized its context).
    pub fn finalize_for_order(&mut self, order_id: i64) {
        for adjustment in self.adjustments.values_mut() {
            if adjustment.order_id == order_id {
                adjustment.finalized = true;
            }
        }
    }

    /// Freeze the adjustments of a single adjustable.
    pub fn finalize_for(&mut self, adjustable: AdjustableRef) {
        for adjustment in self.adjustments.values_mut() {
            if adjustment.adjustable == adjustable {
                adjustment.finalized = true;
            }
        }
    }

    // ========================================================================
    // Collection caches
    // ========================================================================

    /// Materialize the collection cache for an adjustable from the store.
    pub fn materialize(&mut self, adjustable: AdjustableRef) -> Vec<AdjustmentId> {
        let ids = self.ids_for(adjustable);
        self.caches.insert(adjustable, ids.clone());
        ids
    }

    /// The materialized cache, if one was loaded. Never reloads implicitly.
    pub fn cached(&self, adjustable: AdjustableRef) -> Option<&[AdjustmentId]> {
        self.caches.get(&adjustable).map(|c| c.as_slice())
    }

    /// Drop a materialized cache.
    pub fn invalidate(&mut self, adjustable: AdjustableRef) {
        self.caches.remove(&adjustable);
    }

    /// Number of cache repairs performed (the association-repair
    /// diagnostic counter).
    pub fn repair_count(&self) -> u64 {
        self.repair_count
    }

    /// Adjustables written since the last drain; the updater bumps their
    /// timestamps at commit.
    pub fn take_touched(&mut self) -> HashSet<AdjustableRef> {
        std::mem::take(&mut self.touched)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn insert(&mut self, mut adjustment: Adjustment) -> AdjustmentId {
        let id = self.next_id;
        self.next_id += 1;
        adjustment.id = id;
        self.touched.insert(adjustment.adjustable);
        self.adjustments.insert(id, adjustment);
        id
    }

    fn remove(&mut self, id: AdjustmentId) -> Option<Adjustment> {
        let removed = self.adjustments.remove(&id)?;
        self.touched.insert(removed.adjustable);
        Some(removed)
    }

    /// Coupon-code validation: an adjustment whose source promotion
    /// carries codes must reference one of them.
    fn validate(&self, registry: &SourceRegistry, adjustment: &Adjustment) -> RecalcResult<()> {
        let Some(SourceRef::PromotionAction(action_id)) = adjustment.source else {
            return Ok(());
        };
        // A dangling action cannot be validated; tolerated like any other
        // dangling reference.
        let Some(promotion) = registry
            .action(action_id)
            .and_then(|action| registry.promotion_of(action))
        else {
            return Ok(());
        };

        if !promotion.code_required() {
            return Ok(());
        }

        match adjustment.promotion_code_id {
            None => Err(RecalcError::PromotionCodeRequired {
                promotion_id: promotion.id,
            }),
            Some(code_id) if promotion.code(code_id).is_none() => {
                Err(RecalcError::UnknownPromotionCode {
                    promotion_id: promotion.id,
                    code_id,
                })
            }
            Some(_) => Ok(()),
        }
    }
}
