//! Lifecycle orchestrator for garment exchanges.

use common::ExchangeId;
use domain::{
    Address, COUNTER_OFFER_REASON, Currency, Dispute, DisputeReason, Exchange, ExchangeError,
    ExchangeKind, ExchangeMessage, ExchangeStage, ExchangeStatus, Garment, GarmentId,
    GarmentStatus, Money, Offer, OfferId, Review, TrackingInfo, UserId,
};
use repository::{ExchangeRepository, GarmentRepository};

use crate::action::ExchangeAction;
use crate::error::{EngineError, Result};
use crate::outcome::ExchangeOutcome;
use crate::pricing::PricingGuidanceService;

/// Orchestrates every transition of the exchange lifecycle.
///
/// Single entry point: [`Orchestrator::execute`] receives one action,
/// validates its preconditions against the collaborators, applies exactly
/// one transition through the exchange repository, and returns the new
/// state with the next required actor action. No transition touches more
/// than one exchange.
///
/// The orchestrator holds no state of its own and no locks; exclusivity
/// guarantees are the repositories' atomic check-and-writes, so instances
/// can run concurrently across requests.
pub struct Orchestrator<G, E, P>
where
    G: GarmentRepository,
    E: ExchangeRepository,
    P: PricingGuidanceService,
{
    garments: G,
    exchanges: E,
    pricing: P,
}

impl<G, E, P> Orchestrator<G, E, P>
where
    G: GarmentRepository,
    E: ExchangeRepository,
    P: PricingGuidanceService,
{
    /// Creates a new orchestrator over the given collaborators.
    pub fn new(garments: G, exchanges: E, pricing: P) -> Self {
        Self {
            garments,
            exchanges,
            pricing,
        }
    }

    /// Applies the request envelope sent by the presentation layer.
    pub async fn handle(&self, input: crate::action::ExchangeInput) -> Result<ExchangeOutcome> {
        self.execute(input.action, input.user_id).await
    }

    /// Executes one action on behalf of the acting user.
    #[tracing::instrument(skip(self, action), fields(action = action.kind()))]
    pub async fn execute(&self, action: ExchangeAction, actor: UserId) -> Result<ExchangeOutcome> {
        metrics::counter!("exchange_actions_total").increment(1);
        let start = std::time::Instant::now();

        let kind = action.kind();
        let result = self.dispatch(action, actor).await;

        metrics::histogram!("exchange_action_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        match &result {
            Ok(outcome) => {
                tracing::info!(action = kind, status = %outcome.status, "exchange action applied");
            }
            Err(e) => {
                metrics::counter!("exchange_actions_failed").increment(1);
                tracing::warn!(action = kind, error = %e, "exchange action rejected");
            }
        }
        result
    }

    async fn dispatch(&self, action: ExchangeAction, actor: UserId) -> Result<ExchangeOutcome> {
        match action {
            ExchangeAction::InitiatePurchase {
                garment_id,
                offered_price,
                message,
            } => {
                self.initiate_purchase(actor, garment_id, offered_price, message)
                    .await
            }
            ExchangeAction::InitiateTrade {
                garment_id,
                offered_garment_ids,
                offered_price,
                message,
            } => {
                self.initiate_trade(actor, garment_id, offered_garment_ids, offered_price, message)
                    .await
            }
            ExchangeAction::MakeOffer {
                exchange_id,
                amount,
                garment_ids,
                message,
            } => {
                self.make_offer(actor, exchange_id, amount, garment_ids, message)
                    .await
            }
            ExchangeAction::AcceptOffer {
                exchange_id,
                offer_id,
            } => self.accept_offer(actor, exchange_id, offer_id).await,
            ExchangeAction::DeclineOffer {
                exchange_id,
                offer_id,
                reason,
            } => self.decline_offer(actor, exchange_id, offer_id, reason).await,
            ExchangeAction::CounterOffer {
                exchange_id,
                offer_id,
                amount,
                garment_ids,
                message,
            } => {
                self.counter_offer(actor, exchange_id, offer_id, amount, garment_ids, message)
                    .await
            }
            ExchangeAction::SendMessage {
                exchange_id,
                content,
            } => self.send_message(actor, exchange_id, content).await,
            ExchangeAction::AcceptExchange { exchange_id } => {
                self.accept_exchange(actor, exchange_id).await
            }
            ExchangeAction::DeclineExchange {
                exchange_id,
                reason,
            } => self.decline_exchange(actor, exchange_id, reason).await,
            ExchangeAction::CancelExchange {
                exchange_id,
                reason,
            } => self.cancel_exchange(actor, exchange_id, reason).await,
            ExchangeAction::MarkPaid { exchange_id } => self.mark_paid(actor, exchange_id).await,
            ExchangeAction::MarkShipped {
                exchange_id,
                tracking,
            } => self.mark_shipped(actor, exchange_id, tracking).await,
            ExchangeAction::MarkReceived { exchange_id } => {
                self.mark_received(actor, exchange_id).await
            }
            ExchangeAction::AddReview {
                exchange_id,
                rating,
                comment,
                tags,
            } => self.add_review(actor, exchange_id, rating, comment, tags).await,
            ExchangeAction::OpenDispute {
                exchange_id,
                reason,
                description,
            } => self.open_dispute(actor, exchange_id, reason, description).await,
            ExchangeAction::UpdateShippingAddress {
                exchange_id,
                address,
            } => {
                self.update_shipping_address(actor, exchange_id, address)
                    .await
            }
        }
    }

    // Initiation

    async fn initiate_purchase(
        &self,
        actor: UserId,
        garment_id: GarmentId,
        offered_price: Option<Money>,
        message: Option<String>,
    ) -> Result<ExchangeOutcome> {
        let garment = self
            .check_garment(actor, garment_id, ExchangeKind::Sell)
            .await?;

        // Price floor applies only when the proposal departs from the
        // list price.
        if let Some(offered) = offered_price
            && garment.price != Some(offered)
        {
            let guidance = self.pricing.guidance_for(&garment).await?;
            if offered < guidance.suggested_minimum_price {
                return Err(EngineError::OfferTooLow {
                    minimum: guidance.suggested_minimum_price,
                });
            }
        }

        let agreed_price = offered_price.or(garment.price);
        let exchange = Exchange::new(
            ExchangeKind::Sell,
            garment_id,
            actor,
            garment.owner_id,
            agreed_price,
            Currency::default(),
        );
        self.create_exchange(actor, exchange, message).await
    }

    async fn initiate_trade(
        &self,
        actor: UserId,
        garment_id: GarmentId,
        offered_garment_ids: Vec<GarmentId>,
        offered_price: Option<Money>,
        message: Option<String>,
    ) -> Result<ExchangeOutcome> {
        let garment = self
            .check_garment(actor, garment_id, ExchangeKind::Trade)
            .await?;
        self.ensure_owns_all(actor, &offered_garment_ids).await?;

        let exchange = Exchange::new(
            ExchangeKind::Trade,
            garment_id,
            actor,
            garment.owner_id,
            offered_price,
            Currency::default(),
        )
        .with_offered_garments(offered_garment_ids);
        self.create_exchange(actor, exchange, message).await
    }

    /// Runs the shared initiation preconditions, in order, first failure
    /// wins: garment exists and is listed, the listing permits the
    /// requested kind, the actor is not the owner, and no other exchange
    /// holds the garment.
    async fn check_garment(
        &self,
        actor: UserId,
        garment_id: GarmentId,
        kind: ExchangeKind,
    ) -> Result<Garment> {
        // Independent lookups; inspected in precondition order below.
        let (garment, active) = tokio::join!(
            self.garments.get(garment_id),
            self.exchanges.has_active_exchange(garment_id)
        );
        let garment = garment?.ok_or(EngineError::GarmentNotFound(garment_id))?;
        let active = active?;

        if !garment.is_listed() {
            return Err(EngineError::GarmentNotAvailable {
                reason: format!("garment status is {}", garment.status),
            });
        }
        let permitted = match kind {
            ExchangeKind::Sell => garment.listing.permits_sale(),
            ExchangeKind::Trade => garment.listing.permits_trade(),
        };
        if !permitted {
            return Err(EngineError::GarmentNotAvailable {
                reason: format!("listing type {} does not permit {}", garment.listing, kind),
            });
        }
        if garment.owner_id == actor {
            return Err(EngineError::CannotExchangeWithSelf);
        }
        if active {
            return Err(EngineError::GarmentAlreadyInExchange);
        }
        Ok(garment)
    }

    async fn create_exchange(
        &self,
        actor: UserId,
        mut exchange: Exchange,
        message: Option<String>,
    ) -> Result<ExchangeOutcome> {
        if let Some(content) = message {
            exchange.add_message(ExchangeMessage::new(actor, content))?;
        }

        // The repository re-checks the active-exchange invariant under
        // its own lock.
        let exchange = self.exchanges.create(exchange).await?;
        let garment = self
            .garments
            .set_status(exchange.garment_id(), GarmentStatus::Reserved)
            .await?;

        Ok(ExchangeOutcome::from_exchange(exchange, actor).with_garment(garment))
    }

    // Negotiation

    async fn make_offer(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
        amount: Option<Money>,
        garment_ids: Vec<GarmentId>,
        message: Option<String>,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        Self::ensure_participant(&exchange, actor)?;
        self.ensure_owns_all(actor, &garment_ids).await?;

        let offer = Offer::new(actor, amount, garment_ids, message);
        let updated = self.exchanges.add_offer(exchange_id, offer).await?;
        Ok(ExchangeOutcome::from_exchange(updated, actor))
    }

    async fn accept_offer(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
        offer_id: OfferId,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        Self::ensure_participant(&exchange, actor)?;
        Self::ensure_counterparty_of_offer(&exchange, offer_id, actor, "accept")?;

        let updated = self.exchanges.accept_offer(exchange_id, offer_id).await?;
        Ok(ExchangeOutcome::from_exchange(updated, actor))
    }

    async fn decline_offer(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
        offer_id: OfferId,
        reason: Option<String>,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        Self::ensure_participant(&exchange, actor)?;
        Self::ensure_counterparty_of_offer(&exchange, offer_id, actor, "decline")?;

        let updated = self
            .exchanges
            .decline_offer(exchange_id, offer_id, reason)
            .await?;
        Ok(ExchangeOutcome::from_exchange(updated, actor))
    }

    /// Counter-offer: decline the referenced offer with the counter
    /// reason, then append a new offer from the countering party. The
    /// declined offer stays in the log untouched.
    async fn counter_offer(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
        offer_id: OfferId,
        amount: Option<Money>,
        garment_ids: Vec<GarmentId>,
        message: Option<String>,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        Self::ensure_participant(&exchange, actor)?;
        Self::ensure_counterparty_of_offer(&exchange, offer_id, actor, "counter")?;
        self.ensure_owns_all(actor, &garment_ids).await?;

        self.exchanges
            .decline_offer(exchange_id, offer_id, Some(COUNTER_OFFER_REASON.to_string()))
            .await?;
        let counter = Offer::new(actor, amount, garment_ids, message);
        let updated = self.exchanges.add_offer(exchange_id, counter).await?;

        Ok(ExchangeOutcome::from_exchange(updated, actor).with_message(COUNTER_OFFER_REASON))
    }

    // Messaging

    async fn send_message(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
        content: String,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        Self::ensure_participant(&exchange, actor)?;

        let updated = self
            .exchanges
            .add_message(exchange_id, ExchangeMessage::new(actor, content))
            .await?;
        Ok(ExchangeOutcome::from_exchange(updated, actor))
    }

    // Exchange-level responses

    async fn accept_exchange(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        Self::ensure_recipient(&exchange, actor, "accept the exchange")?;

        let updated = self.exchanges.accept(exchange_id).await?;
        Ok(ExchangeOutcome::from_exchange(updated, actor))
    }

    async fn decline_exchange(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
        reason: Option<String>,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        Self::ensure_recipient(&exchange, actor, "decline the exchange")?;

        let updated = self.exchanges.decline(exchange_id, reason).await?;
        let garment = self.release_garment(updated.garment_id()).await?;
        Ok(ExchangeOutcome::from_exchange(updated, actor).with_garment(garment))
    }

    async fn cancel_exchange(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
        reason: Option<String>,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        Self::ensure_participant(&exchange, actor)?;

        let updated = self.exchanges.cancel(exchange_id, reason).await?;
        let garment = self.release_garment(updated.garment_id()).await?;
        Ok(ExchangeOutcome::from_exchange(updated, actor).with_garment(garment))
    }

    // Fulfillment

    async fn mark_paid(&self, actor: UserId, exchange_id: ExchangeId) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        if actor != exchange.initiator() {
            return Err(EngineError::Unauthorized(
                "only the initiator pays for the exchange".to_string(),
            ));
        }
        if exchange.status() != ExchangeStatus::Accepted || !exchange.stage().can_mark_paid() {
            return Err(EngineError::PaymentFailed(format!(
                "exchange is not awaiting payment (status {}, stage {})",
                exchange.status(),
                exchange.stage()
            )));
        }

        let updated = self
            .exchanges
            .update_stage(exchange_id, ExchangeStage::PaymentReceived)
            .await?;
        Ok(ExchangeOutcome::from_exchange(updated, actor))
    }

    async fn mark_shipped(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
        tracking: Option<TrackingInfo>,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        Self::ensure_recipient(&exchange, actor, "ship the garment")?;
        if !exchange.stage().can_mark_shipped() {
            return Err(EngineError::InvalidExchangeState(
                ExchangeError::InvalidStageTransition {
                    current: exchange.stage(),
                    action: "mark shipped",
                },
            ));
        }
        if exchange.shipping_address().is_none() {
            return Err(EngineError::ShippingRequired(
                "no shipping address on file".to_string(),
            ));
        }

        let mut updated = self
            .exchanges
            .update_stage(exchange_id, ExchangeStage::Shipped)
            .await?;
        if let Some(tracking) = tracking {
            updated = self.exchanges.add_tracking(exchange_id, tracking).await?;
        }
        Ok(ExchangeOutcome::from_exchange(updated, actor))
    }

    async fn mark_received(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        if actor != exchange.initiator() {
            return Err(EngineError::Unauthorized(
                "only the initiator confirms receipt".to_string(),
            ));
        }
        if !exchange.stage().can_mark_received() {
            return Err(EngineError::ShippingRequired(format!(
                "cannot confirm receipt before shipment (stage {})",
                exchange.stage()
            )));
        }

        let updated = self
            .exchanges
            .update_stage(exchange_id, ExchangeStage::Delivered)
            .await?;
        Ok(ExchangeOutcome::from_exchange(updated, actor))
    }

    // Side-attachments

    async fn add_review(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
        rating: u8,
        comment: String,
        tags: Vec<String>,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        Self::ensure_participant(&exchange, actor)?;
        if exchange.status() != ExchangeStatus::Accepted || !exchange.stage().can_review() {
            return Err(EngineError::ReviewNotAllowed(format!(
                "exchange is not reviewable (status {}, stage {})",
                exchange.status(),
                exchange.stage()
            )));
        }
        if exchange.has_reviewed(actor) {
            return Err(EngineError::ReviewNotAllowed(
                "party has already reviewed this exchange".to_string(),
            ));
        }
        let review = Review::new(actor, rating, comment, tags)
            .map_err(|e| EngineError::ReviewNotAllowed(e.to_string()))?;

        let updated = self.exchanges.add_review(exchange_id, review).await?;

        // The second review completes the exchange and marks the garment
        // sold.
        if updated.status() == ExchangeStatus::Completed {
            let garment = self
                .garments
                .set_status(updated.garment_id(), GarmentStatus::Sold)
                .await?;
            return Ok(ExchangeOutcome::from_exchange(updated, actor).with_garment(garment));
        }
        Ok(ExchangeOutcome::from_exchange(updated, actor))
    }

    async fn open_dispute(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
        reason: DisputeReason,
        description: String,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        Self::ensure_participant(&exchange, actor)?;
        if !exchange.status().is_active() {
            return Err(EngineError::DisputeNotAllowed(format!(
                "exchange is already {}",
                exchange.status()
            )));
        }

        let dispute = Dispute::new(actor, reason, description);
        let updated = self.exchanges.open_dispute(exchange_id, dispute).await?;
        Ok(ExchangeOutcome::from_exchange(updated, actor)
            .with_message("handed off to dispute resolution"))
    }

    async fn update_shipping_address(
        &self,
        actor: UserId,
        exchange_id: ExchangeId,
        address: Address,
    ) -> Result<ExchangeOutcome> {
        let exchange = self.load(exchange_id).await?;
        if actor != exchange.initiator() {
            return Err(EngineError::Unauthorized(
                "only the initiator sets the shipping address".to_string(),
            ));
        }

        let updated = self
            .exchanges
            .update_shipping_address(exchange_id, address)
            .await?;
        Ok(ExchangeOutcome::from_exchange(updated, actor))
    }

    // Helpers

    async fn load(&self, exchange_id: ExchangeId) -> Result<Exchange> {
        self.exchanges
            .get(exchange_id)
            .await?
            .ok_or(EngineError::ExchangeNotFound(exchange_id))
    }

    fn ensure_participant(exchange: &Exchange, actor: UserId) -> Result<()> {
        if exchange.is_participant(actor) {
            Ok(())
        } else {
            Err(EngineError::Unauthorized(
                "actor is not a party to this exchange".to_string(),
            ))
        }
    }

    fn ensure_recipient(exchange: &Exchange, actor: UserId, action: &str) -> Result<()> {
        if actor == exchange.recipient() {
            Ok(())
        } else {
            Err(EngineError::Unauthorized(format!(
                "only the garment owner may {action}"
            )))
        }
    }

    /// An offer is answered by the party that did not propose it.
    fn ensure_counterparty_of_offer(
        exchange: &Exchange,
        offer_id: OfferId,
        actor: UserId,
        verb: &str,
    ) -> Result<()> {
        let offer = exchange
            .offer(offer_id)
            .ok_or(EngineError::InvalidExchangeState(
                ExchangeError::OfferNotFound { offer_id },
            ))?;
        if offer.proposer() == actor {
            return Err(EngineError::Unauthorized(format!(
                "cannot {verb} your own offer"
            )));
        }
        Ok(())
    }

    /// Verifies the actor owns every garment they claim to offer.
    async fn ensure_owns_all(&self, actor: UserId, garment_ids: &[GarmentId]) -> Result<()> {
        for id in garment_ids {
            let garment = self
                .garments
                .get(*id)
                .await?
                .ok_or(EngineError::GarmentNotFound(*id))?;
            if garment.owner_id != actor {
                return Err(EngineError::Unauthorized(format!(
                    "garment {id} is not owned by the acting user"
                )));
            }
        }
        Ok(())
    }

    /// Re-lists the garment after a decline or cancel, leaving any other
    /// status (e.g. hidden by the owner in the meantime) alone.
    async fn release_garment(&self, garment_id: GarmentId) -> Result<Garment> {
        let garment = self
            .garments
            .get(garment_id)
            .await?
            .ok_or(EngineError::GarmentNotFound(garment_id))?;
        if garment.status == GarmentStatus::Reserved {
            return Ok(self
                .garments
                .set_status(garment_id, GarmentStatus::Listed)
                .await?);
        }
        Ok(garment)
    }
}
