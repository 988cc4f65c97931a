pub mod schedule;

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::store::{HouseUpdate, PropertyCatalog};

/// Aggregate result of one billing cycle. `success` is false only when the
/// houses could not be enumerated at all; per-house failures are counted in
/// `error_count` without failing the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleOutcome {
    pub success: bool,
    pub processed_count: usize,
    pub error_count: usize,
    pub total_houses: usize,
}

impl CycleOutcome {
    fn fetch_failed() -> Self {
        Self {
            success: false,
            processed_count: 0,
            error_count: 0,
            total_houses: 0,
        }
    }
}

/// Resets payment obligations across the catalog. Both the scheduled path and
/// the manual admin trigger go through `run_cycle`; there is no second code
/// path.
#[derive(Clone)]
pub struct BillingEngine {
    catalog: Arc<dyn PropertyCatalog>,
}

impl BillingEngine {
    pub fn new(catalog: Arc<dyn PropertyCatalog>) -> Self {
        Self { catalog }
    }

    /// One pass over every occupied house: clear payment state and recompute
    /// the obligation from the meter tier. Each house is its own atomic unit;
    /// a failed update is counted and the pass continues. Re-running rewrites
    /// the same values, so retries are safe.
    pub async fn run_cycle(&self) -> CycleOutcome {
        info!("starting monthly billing cycle");

        let houses = match self.catalog.list_occupied_houses().await {
            Ok(houses) => houses,
            Err(err) => {
                error!(error = %err, "billing cycle could not enumerate houses");
                return CycleOutcome::fetch_failed();
            }
        };

        let total_houses = houses.len();
        let mut processed_count = 0;
        let mut error_count = 0;

        for house in houses {
            let amount = house.payment_type.required_amount();
            match self
                .catalog
                .update_house(house.id, HouseUpdate::billing_reset(amount))
                .await
            {
                Ok(()) => {
                    processed_count += 1;
                    info!(
                        house_id = %house.id,
                        house_number = %house.house_number,
                        required_amount = amount,
                        "reset payment state"
                    );
                }
                Err(err) => {
                    error_count += 1;
                    error!(house_id = %house.id, error = %err, "failed to reset house");
                }
            }
        }

        info!(
            processed = processed_count,
            errors = error_count,
            total = total_houses,
            "monthly billing cycle completed"
        );

        CycleOutcome {
            success: true,
            processed_count,
            error_count,
            total_houses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::property::PaymentType;
    use crate::store::memory::MemoryCatalog;
    use uuid::Uuid;

    fn engine_with(catalog: Arc<MemoryCatalog>) -> BillingEngine {
        BillingEngine::new(catalog)
    }

    #[tokio::test]
    async fn resets_occupied_houses_by_tier() {
        let catalog = Arc::new(MemoryCatalog::new());
        let square = Uuid::new_v4();
        let house = MemoryCatalog::sample_house(square, "12", true, PaymentType::MediumMeter);
        let house_id = house.id;
        catalog.insert_house(house);

        let outcome = engine_with(catalog.clone()).run_cycle().await;
        assert_eq!(
            outcome,
            CycleOutcome {
                success: true,
                processed_count: 1,
                error_count: 0,
                total_houses: 1,
            }
        );

        let house = catalog.house(house_id).expect("house should still exist");
        assert!(!house.has_paid);
        assert_eq!(house.last_payment_date, None);
        assert_eq!(house.required_amount, 10_000);
    }

    #[tokio::test]
    async fn unoccupied_houses_are_exempt() {
        let catalog = Arc::new(MemoryCatalog::new());
        let square = Uuid::new_v4();
        let occupied = MemoryCatalog::sample_house(square, "1", true, PaymentType::SmallMeter);
        let vacant = MemoryCatalog::sample_house(square, "2", false, PaymentType::LargeMeter);
        let vacant_id = vacant.id;
        let vacant_before = vacant.clone();
        catalog.insert_house(occupied);
        catalog.insert_house(vacant);

        let outcome = engine_with(catalog.clone()).run_cycle().await;
        assert_eq!(outcome.total_houses, 1);
        assert_eq!(outcome.processed_count, 1);

        let vacant_after = catalog.house(vacant_id).expect("house should still exist");
        assert_eq!(vacant_after.has_paid, vacant_before.has_paid);
        assert_eq!(vacant_after.required_amount, vacant_before.required_amount);
        assert_eq!(
            vacant_after.last_payment_date,
            vacant_before.last_payment_date
        );
    }

    #[tokio::test]
    async fn one_failed_house_does_not_abort_the_rest() {
        let catalog = Arc::new(MemoryCatalog::new());
        let square = Uuid::new_v4();
        let doomed = MemoryCatalog::sample_house(square, "3", true, PaymentType::SmallMeter);
        let fine = MemoryCatalog::sample_house(square, "4", true, PaymentType::LargeMeter);
        let doomed_id = doomed.id;
        let fine_id = fine.id;
        catalog.insert_house(doomed);
        catalog.insert_house(fine);
        catalog.fail_updates_for(doomed_id);

        let outcome = engine_with(catalog.clone()).run_cycle().await;
        assert!(outcome.success);
        assert_eq!(outcome.processed_count, 1);
        assert_eq!(outcome.error_count, 1);
        assert_eq!(outcome.total_houses, 2);

        let fine = catalog.house(fine_id).expect("house should still exist");
        assert_eq!(fine.required_amount, 15_000);
        assert!(!fine.has_paid);
    }

    #[tokio::test]
    async fn fetch_failure_fails_the_cycle() {
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.fail_listing();

        let outcome = engine_with(catalog).run_cycle().await;
        assert!(!outcome.success);
        assert_eq!(outcome.processed_count, 0);
        assert_eq!(outcome.error_count, 0);
    }

    #[tokio::test]
    async fn running_twice_is_idempotent() {
        let catalog = Arc::new(MemoryCatalog::new());
        let square = Uuid::new_v4();
        let house = MemoryCatalog::sample_house(square, "7", true, PaymentType::MediumMeter);
        let house_id = house.id;
        catalog.insert_house(house);

        let engine = engine_with(catalog.clone());
        let first = engine.run_cycle().await;
        let state_after_first = catalog.house(house_id).expect("house should still exist");
        let second = engine.run_cycle().await;
        let state_after_second = catalog.house(house_id).expect("house should still exist");

        assert_eq!(first, second);
        assert_eq!(state_after_first.has_paid, state_after_second.has_paid);
        assert_eq!(
            state_after_first.required_amount,
            state_after_second.required_amount
        );
        assert_eq!(
            state_after_first.last_payment_date,
            state_after_second.last_payment_date
        );
    }
}
