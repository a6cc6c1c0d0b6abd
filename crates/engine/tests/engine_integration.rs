//! Integration tests driving the full exchange lifecycle against the
//! in-memory collaborators.

use domain::{
    Address, DisputeReason, ExchangeStage, ExchangeStatus, Garment, GarmentId, GarmentStatus,
    ListingType, Money, NextActionType, TrackingInfo, UserId,
};
use engine::{EngineError, ExchangeAction, ExchangeInput, InMemoryPricingService, Orchestrator};
use repository::{InMemoryExchangeRepository, InMemoryGarmentRepository};

type TestOrchestrator =
    Orchestrator<InMemoryGarmentRepository, InMemoryExchangeRepository, InMemoryPricingService>;

struct TestHarness {
    orchestrator: TestOrchestrator,
    garments: InMemoryGarmentRepository,
    pricing: InMemoryPricingService,
}

impl TestHarness {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let garments = InMemoryGarmentRepository::new();
        let exchanges = InMemoryExchangeRepository::new();
        let pricing = InMemoryPricingService::new();
        let orchestrator =
            Orchestrator::new(garments.clone(), exchanges.clone(), pricing.clone());

        Self {
            orchestrator,
            garments,
            pricing,
        }
    }

    async fn list_garment(
        &self,
        owner: UserId,
        title: &str,
        listing: ListingType,
        price_cents: Option<i64>,
    ) -> GarmentId {
        self.garments
            .insert(Garment::new(
                owner,
                title,
                listing,
                price_cents.map(Money::from_cents),
            ))
            .await
    }

    fn address() -> Address {
        Address::new("Robin Hale", "12 Gertrude St", "Fitzroy", "3065", "AU")
    }
}

#[tokio::test]
async fn test_full_purchase_lifecycle() {
    let h = TestHarness::new();
    let seller = UserId::new();
    let buyer = UserId::new();
    let garment_id = h
        .list_garment(seller, "Vintage wool coat", ListingType::Sale, Some(10_000))
        .await;
    h.pricing.set_minimum(garment_id, Money::from_cents(9000));

    // $80 is below the $90 floor.
    let result = h
        .orchestrator
        .execute(
            ExchangeAction::InitiatePurchase {
                garment_id,
                offered_price: Some(Money::from_cents(8000)),
                message: None,
            },
            buyer,
        )
        .await;
    match result {
        Err(EngineError::OfferTooLow { minimum }) => {
            assert_eq!(minimum, Money::from_cents(9000));
        }
        other => panic!("expected OfferTooLow, got {other:?}"),
    }

    // $95 clears the floor.
    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::InitiatePurchase {
                garment_id,
                offered_price: Some(Money::from_cents(9500)),
                message: Some("Deal?".to_string()),
            },
            buyer,
        )
        .await
        .unwrap();
    let exchange_id = outcome.exchange.id();
    assert_eq!(outcome.exchange.stage(), ExchangeStage::Inquiry);
    assert_eq!(outcome.status, ExchangeStatus::Pending);
    let next = outcome.next_action.unwrap();
    assert_eq!(next.actor, seller);
    assert_eq!(next.action, NextActionType::Respond);

    // Seller accepts; payment falls to the buyer.
    let outcome = h
        .orchestrator
        .execute(ExchangeAction::AcceptExchange { exchange_id }, seller)
        .await
        .unwrap();
    assert_eq!(outcome.status, ExchangeStatus::Accepted);
    assert_eq!(outcome.exchange.stage(), ExchangeStage::PaymentPending);
    let next = outcome.next_action.unwrap();
    assert_eq!(next.actor, buyer);
    assert_eq!(next.action, NextActionType::MakePayment);

    // Buyer sets the shipping address and pays.
    h.orchestrator
        .execute(
            ExchangeAction::UpdateShippingAddress {
                exchange_id,
                address: TestHarness::address(),
            },
            buyer,
        )
        .await
        .unwrap();
    let outcome = h
        .orchestrator
        .execute(ExchangeAction::MarkPaid { exchange_id }, buyer)
        .await
        .unwrap();
    assert_eq!(outcome.exchange.stage(), ExchangeStage::PaymentReceived);
    let next = outcome.next_action.unwrap();
    assert_eq!(next.actor, seller);
    assert_eq!(next.action, NextActionType::ShipItem);

    // Seller ships with tracking.
    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::MarkShipped {
                exchange_id,
                tracking: Some(TrackingInfo::new("AusPost", "AP123456789")),
            },
            seller,
        )
        .await
        .unwrap();
    assert_eq!(outcome.exchange.stage(), ExchangeStage::Shipped);
    assert_eq!(
        outcome.exchange.tracking().unwrap().tracking_number,
        "AP123456789"
    );
    let next = outcome.next_action.unwrap();
    assert_eq!(next.actor, buyer);
    assert_eq!(next.action, NextActionType::ConfirmReceipt);

    // Buyer confirms receipt and reviews first.
    let outcome = h
        .orchestrator
        .execute(ExchangeAction::MarkReceived { exchange_id }, buyer)
        .await
        .unwrap();
    assert_eq!(outcome.exchange.stage(), ExchangeStage::Delivered);
    let next = outcome.next_action.unwrap();
    assert_eq!(next.actor, buyer);
    assert_eq!(next.action, NextActionType::LeaveReview);

    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::AddReview {
                exchange_id,
                rating: 5,
                comment: "Coat as described, fast shipping".to_string(),
                tags: vec!["as-described".to_string()],
            },
            buyer,
        )
        .await
        .unwrap();
    assert_eq!(outcome.exchange.stage(), ExchangeStage::ReviewPending);
    let next = outcome.next_action.unwrap();
    assert_eq!(next.actor, seller);
    assert_eq!(next.action, NextActionType::LeaveReview);

    // Seller's review completes the exchange and sells the garment.
    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::AddReview {
                exchange_id,
                rating: 4,
                comment: "Smooth buyer".to_string(),
                tags: vec![],
            },
            seller,
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, ExchangeStatus::Completed);
    assert_eq!(outcome.exchange.stage(), ExchangeStage::Completed);
    assert!(outcome.next_action.is_none());
    assert_eq!(outcome.garment.unwrap().status, GarmentStatus::Sold);
}

#[tokio::test]
async fn test_trade_negotiation_with_counter_offer() {
    let h = TestHarness::new();
    let seller = UserId::new();
    let buyer = UserId::new();
    let jacket = h
        .list_garment(seller, "Denim jacket", ListingType::Trade, None)
        .await;
    let scarf = h
        .list_garment(buyer, "Silk scarf", ListingType::Trade, None)
        .await;

    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::InitiateTrade {
                garment_id: jacket,
                offered_garment_ids: vec![scarf],
                offered_price: None,
                message: Some("Scarf for the jacket?".to_string()),
            },
            buyer,
        )
        .await
        .unwrap();
    let exchange_id = outcome.exchange.id();
    assert_eq!(outcome.exchange.offered_garment_ids(), &[scarf]);

    // Buyer formalizes the terms as an offer.
    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::MakeOffer {
                exchange_id,
                amount: None,
                garment_ids: vec![scarf],
                message: None,
            },
            buyer,
        )
        .await
        .unwrap();
    assert_eq!(outcome.exchange.stage(), ExchangeStage::Negotiating);
    let original_offer_id = outcome.exchange.open_offer().unwrap().id();

    // Seller counters: scarf plus $20.
    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::CounterOffer {
                exchange_id,
                offer_id: original_offer_id,
                amount: Some(Money::from_cents(2000)),
                garment_ids: vec![],
                message: Some("Throw in $20 and it's yours".to_string()),
            },
            seller,
        )
        .await
        .unwrap();

    // The original offer is preserved, closed as declined with the
    // counter reason; the counter is the new open offer.
    assert_eq!(outcome.exchange.offers().len(), 2);
    let original = outcome.exchange.offer(original_offer_id).unwrap();
    assert_eq!(original.status(), domain::OfferStatus::Declined);
    assert_eq!(original.decline_reason(), Some(domain::COUNTER_OFFER_REASON));
    assert_eq!(original.garment_ids(), &[scarf]);
    assert_eq!(original.amount(), None);

    let counter = outcome.exchange.open_offer().unwrap();
    assert_eq!(counter.proposer(), seller);
    assert_eq!(counter.amount(), Some(Money::from_cents(2000)));
    let counter_id = counter.id();

    // Buyer accepts the counter; its terms are promoted.
    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::AcceptOffer {
                exchange_id,
                offer_id: counter_id,
            },
            buyer,
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, ExchangeStatus::Accepted);
    assert_eq!(outcome.exchange.stage(), ExchangeStage::PaymentPending);
    assert_eq!(outcome.exchange.agreed_price(), Some(Money::from_cents(2000)));
    assert_eq!(outcome.exchange.offered_garment_ids(), &[scarf]);
}

#[tokio::test]
async fn test_declined_offer_reopens_negotiation() {
    let h = TestHarness::new();
    let seller = UserId::new();
    let buyer = UserId::new();
    let garment_id = h
        .list_garment(seller, "Linen shirt", ListingType::Sale, Some(4500))
        .await;

    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::InitiatePurchase {
                garment_id,
                offered_price: None,
                message: None,
            },
            buyer,
        )
        .await
        .unwrap();
    let exchange_id = outcome.exchange.id();

    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::MakeOffer {
                exchange_id,
                amount: Some(Money::from_cents(4000)),
                garment_ids: vec![],
                message: None,
            },
            buyer,
        )
        .await
        .unwrap();
    let offer_id = outcome.exchange.open_offer().unwrap().id();

    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::DeclineOffer {
                exchange_id,
                offer_id,
                reason: Some("Too low".to_string()),
            },
            seller,
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, ExchangeStatus::Pending);
    assert!(outcome.exchange.open_offer().is_none());

    // Negotiation continues with a fresh offer.
    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::MakeOffer {
                exchange_id,
                amount: Some(Money::from_cents(4200)),
                garment_ids: vec![],
                message: None,
            },
            buyer,
        )
        .await
        .unwrap();
    assert!(outcome.exchange.open_offer().is_some());
    assert_eq!(outcome.exchange.offers().len(), 2);
}

#[tokio::test]
async fn test_cancellation_locked_after_payment_but_dispute_open() {
    let h = TestHarness::new();
    let seller = UserId::new();
    let buyer = UserId::new();
    let garment_id = h
        .list_garment(seller, "Wool sweater", ListingType::Sale, Some(8500))
        .await;

    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::InitiatePurchase {
                garment_id,
                offered_price: None,
                message: None,
            },
            buyer,
        )
        .await
        .unwrap();
    let exchange_id = outcome.exchange.id();

    h.orchestrator
        .execute(ExchangeAction::AcceptExchange { exchange_id }, seller)
        .await
        .unwrap();
    h.orchestrator
        .execute(ExchangeAction::MarkPaid { exchange_id }, buyer)
        .await
        .unwrap();

    // Payment is in; the engine no longer offers cancellation.
    let result = h
        .orchestrator
        .execute(
            ExchangeAction::CancelExchange {
                exchange_id,
                reason: Some("second thoughts".to_string()),
            },
            buyer,
        )
        .await;
    assert!(matches!(result, Err(EngineError::InvalidExchangeState(_))));

    // Dispute remains the only way out.
    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::OpenDispute {
                exchange_id,
                reason: DisputeReason::PaymentIssue,
                description: "Charged twice".to_string(),
            },
            buyer,
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, ExchangeStatus::Disputed);
    assert_eq!(outcome.exchange.stage(), ExchangeStage::PaymentReceived);
    assert!(outcome.next_action.is_none());
    assert!(outcome.message.is_some());

    // A disputed exchange accepts no further lifecycle actions.
    let result = h
        .orchestrator
        .execute(
            ExchangeAction::MarkShipped {
                exchange_id,
                tracking: None,
            },
            seller,
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_mark_shipped_requires_address_on_file() {
    let h = TestHarness::new();
    let seller = UserId::new();
    let buyer = UserId::new();
    let garment_id = h
        .list_garment(seller, "Corduroy pants", ListingType::Sale, Some(6000))
        .await;

    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::InitiatePurchase {
                garment_id,
                offered_price: None,
                message: None,
            },
            buyer,
        )
        .await
        .unwrap();
    let exchange_id = outcome.exchange.id();

    h.orchestrator
        .execute(ExchangeAction::AcceptExchange { exchange_id }, seller)
        .await
        .unwrap();
    h.orchestrator
        .execute(ExchangeAction::MarkPaid { exchange_id }, buyer)
        .await
        .unwrap();

    let result = h
        .orchestrator
        .execute(
            ExchangeAction::MarkShipped {
                exchange_id,
                tracking: None,
            },
            seller,
        )
        .await;
    assert!(matches!(result, Err(EngineError::ShippingRequired(_))));

    h.orchestrator
        .execute(
            ExchangeAction::UpdateShippingAddress {
                exchange_id,
                address: TestHarness::address(),
            },
            buyer,
        )
        .await
        .unwrap();
    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::MarkShipped {
                exchange_id,
                tracking: None,
            },
            seller,
        )
        .await
        .unwrap();
    assert_eq!(outcome.exchange.stage(), ExchangeStage::Shipped);
}

#[tokio::test]
async fn test_receipt_cannot_be_confirmed_before_shipment() {
    let h = TestHarness::new();
    let seller = UserId::new();
    let buyer = UserId::new();
    let garment_id = h
        .list_garment(seller, "Tweed blazer", ListingType::Sale, Some(12_000))
        .await;

    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::InitiatePurchase {
                garment_id,
                offered_price: None,
                message: None,
            },
            buyer,
        )
        .await
        .unwrap();
    let exchange_id = outcome.exchange.id();

    h.orchestrator
        .execute(ExchangeAction::AcceptExchange { exchange_id }, seller)
        .await
        .unwrap();

    let result = h
        .orchestrator
        .execute(ExchangeAction::MarkReceived { exchange_id }, buyer)
        .await;
    assert!(matches!(result, Err(EngineError::ShippingRequired(_))));
}

#[tokio::test]
async fn test_review_permissions() {
    let h = TestHarness::new();
    let seller = UserId::new();
    let buyer = UserId::new();
    let garment_id = h
        .list_garment(seller, "Pleated skirt", ListingType::Sale, Some(5500))
        .await;

    let outcome = h
        .orchestrator
        .execute(
            ExchangeAction::InitiatePurchase {
                garment_id,
                offered_price: None,
                message: None,
            },
            buyer,
        )
        .await
        .unwrap();
    let exchange_id = outcome.exchange.id();

    // Too early to review.
    let result = h
        .orchestrator
        .execute(
            ExchangeAction::AddReview {
                exchange_id,
                rating: 5,
                comment: "Great".to_string(),
                tags: vec![],
            },
            buyer,
        )
        .await;
    assert!(matches!(result, Err(EngineError::ReviewNotAllowed(_))));

    // Drive the exchange to delivered.
    h.orchestrator
        .execute(ExchangeAction::AcceptExchange { exchange_id }, seller)
        .await
        .unwrap();
    h.orchestrator
        .execute(
            ExchangeAction::UpdateShippingAddress {
                exchange_id,
                address: TestHarness::address(),
            },
            buyer,
        )
        .await
        .unwrap();
    h.orchestrator
        .execute(ExchangeAction::MarkPaid { exchange_id }, buyer)
        .await
        .unwrap();
    h.orchestrator
        .execute(
            ExchangeAction::MarkShipped {
                exchange_id,
                tracking: None,
            },
            seller,
        )
        .await
        .unwrap();
    h.orchestrator
        .execute(ExchangeAction::MarkReceived { exchange_id }, buyer)
        .await
        .unwrap();

    // Strangers cannot review.
    let result = h
        .orchestrator
        .execute(
            ExchangeAction::AddReview {
                exchange_id,
                rating: 1,
                comment: "Drive-by".to_string(),
                tags: vec![],
            },
            UserId::new(),
        )
        .await;
    assert!(matches!(result, Err(EngineError::Unauthorized(_))));

    // A party reviews once only.
    h.orchestrator
        .execute(
            ExchangeAction::AddReview {
                exchange_id,
                rating: 5,
                comment: "Great".to_string(),
                tags: vec![],
            },
            buyer,
        )
        .await
        .unwrap();
    let result = h
        .orchestrator
        .execute(
            ExchangeAction::AddReview {
                exchange_id,
                rating: 2,
                comment: "Actually...".to_string(),
                tags: vec![],
            },
            buyer,
        )
        .await;
    assert!(matches!(result, Err(EngineError::ReviewNotAllowed(_))));

    // Out-of-range ratings are rejected, not clamped.
    let result = h
        .orchestrator
        .execute(
            ExchangeAction::AddReview {
                exchange_id,
                rating: 6,
                comment: "Six stars".to_string(),
                tags: vec![],
            },
            seller,
        )
        .await;
    assert!(matches!(result, Err(EngineError::ReviewNotAllowed(_))));
}

#[tokio::test]
async fn test_input_envelope_round_trips_through_handle() {
    let h = TestHarness::new();
    let seller = UserId::new();
    let buyer = UserId::new();
    let garment_id = h
        .list_garment(seller, "Canvas tote", ListingType::Sale, Some(2500))
        .await;

    let input = ExchangeInput::new(
        ExchangeAction::InitiatePurchase {
            garment_id,
            offered_price: None,
            message: None,
        },
        buyer,
    );
    let outcome = h.orchestrator.handle(input).await.unwrap();
    assert_eq!(outcome.status, ExchangeStatus::Pending);
    assert_eq!(outcome.other_party, Some(seller));
}
