//! Pricing guidance service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{Garment, GarmentId, Money};

use crate::error::EngineError;

/// Suggested pricing for a garment, computed by an external service from
/// market data, condition, brand, and comparable listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingGuidance {
    /// The floor below which offers are rejected.
    pub suggested_minimum_price: Money,

    /// The service's fair-value estimate.
    pub suggested_price: Money,
}

/// Trait for pricing guidance lookups.
#[async_trait]
pub trait PricingGuidanceService: Send + Sync {
    /// Returns pricing guidance for a garment.
    async fn guidance_for(&self, garment: &Garment) -> Result<PricingGuidance, EngineError>;
}

#[derive(Debug, Default)]
struct InMemoryPricingState {
    minimums: HashMap<GarmentId, Money>,
    fail_on_guidance: bool,
}

/// In-memory pricing service for testing.
///
/// Uses a configured per-garment floor when one is set, otherwise 80% of
/// the list price.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPricingService {
    state: Arc<RwLock<InMemoryPricingState>>,
}

impl InMemoryPricingService {
    /// Creates a new in-memory pricing service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the price floor for a garment.
    pub fn set_minimum(&self, garment_id: GarmentId, minimum: Money) {
        self.state
            .write()
            .unwrap()
            .minimums
            .insert(garment_id, minimum);
    }

    /// Configures the service to fail on the next guidance call.
    pub fn set_fail_on_guidance(&self, fail: bool) {
        self.state.write().unwrap().fail_on_guidance = fail;
    }
}

#[async_trait]
impl PricingGuidanceService for InMemoryPricingService {
    async fn guidance_for(&self, garment: &Garment) -> Result<PricingGuidance, EngineError> {
        let state = self.state.read().unwrap();

        if state.fail_on_guidance {
            return Err(EngineError::PricingService(
                "Pricing guidance unavailable".to_string(),
            ));
        }

        let list_price = garment.price.unwrap_or_else(Money::zero);
        let minimum = state
            .minimums
            .get(&garment.id)
            .copied()
            .unwrap_or_else(|| Money::from_cents(list_price.cents() * 8 / 10));

        Ok(PricingGuidance {
            suggested_minimum_price: minimum,
            suggested_price: list_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{ListingType, UserId};

    fn coat() -> Garment {
        Garment::new(
            UserId::new(),
            "Vintage wool coat",
            ListingType::Sale,
            Some(Money::from_cents(10_000)),
        )
    }

    #[tokio::test]
    async fn test_default_floor_is_eighty_percent_of_list() {
        let service = InMemoryPricingService::new();
        let guidance = service.guidance_for(&coat()).await.unwrap();
        assert_eq!(guidance.suggested_minimum_price, Money::from_cents(8000));
        assert_eq!(guidance.suggested_price, Money::from_cents(10_000));
    }

    #[tokio::test]
    async fn test_configured_floor_wins() {
        let service = InMemoryPricingService::new();
        let garment = coat();
        service.set_minimum(garment.id, Money::from_cents(9000));

        let guidance = service.guidance_for(&garment).await.unwrap();
        assert_eq!(guidance.suggested_minimum_price, Money::from_cents(9000));
    }

    #[tokio::test]
    async fn test_fail_on_guidance() {
        let service = InMemoryPricingService::new();
        service.set_fail_on_guidance(true);

        let result = service.guidance_for(&coat()).await;
        assert!(matches!(result, Err(EngineError::PricingService(_))));
    }
}
