//! Exchange aggregate implementation.

use chrono::{DateTime, Utc};
use common::ExchangeId;
use serde::{Deserialize, Serialize};

use super::{
    Address, Currency, Dispute, ExchangeError, ExchangeKind, ExchangeMessage, ExchangeStage,
    ExchangeStatus, GarmentId, Money, NextAction, Offer, OfferId, Review, TrackingInfo, UserId,
};

/// Exchange aggregate root.
///
/// Represents one purchase or trade negotiation between two parties and
/// its full lifecycle from inquiry to completion, cancellation, decline,
/// or dispute. All mutation goes through the validating transition
/// methods; a terminal exchange only accepts appended reviews and
/// disputes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    /// Unique exchange identifier.
    id: ExchangeId,

    /// Sell or trade.
    kind: ExchangeKind,

    /// The garment under exchange.
    garment_id: GarmentId,

    /// The party who opened the exchange.
    initiator: UserId,

    /// The garment owner.
    recipient: UserId,

    /// Garments the initiator offers in trade.
    offered_garment_ids: Vec<GarmentId>,

    /// Agreed price; trades may carry none.
    agreed_price: Option<Money>,

    /// Currency the exchange is denominated in.
    currency: Currency,

    /// Coarse state.
    status: ExchangeStatus,

    /// Fine-grained lifecycle position.
    stage: ExchangeStage,

    /// Negotiation log, append-only.
    offers: Vec<Offer>,

    /// Communication log, append-only.
    messages: Vec<ExchangeMessage>,

    /// Where the garment ships to; mutable until shipped.
    shipping_address: Option<Address>,

    /// Carrier metadata, attached at shipment.
    tracking: Option<TrackingInfo>,

    /// Reviews, at most one per party.
    reviews: Vec<Review>,

    /// Open dispute, if any.
    dispute: Option<Dispute>,

    /// Free-text reason recorded on decline or cancel.
    closure_reason: Option<String>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Exchange {
    /// Creates a new exchange in stage `Inquiry` with status `Pending`.
    pub fn new(
        kind: ExchangeKind,
        garment_id: GarmentId,
        initiator: UserId,
        recipient: UserId,
        agreed_price: Option<Money>,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExchangeId::new(),
            kind,
            garment_id,
            initiator,
            recipient,
            offered_garment_ids: Vec::new(),
            agreed_price,
            currency,
            status: ExchangeStatus::Pending,
            stage: ExchangeStage::Inquiry,
            offers: Vec::new(),
            messages: Vec::new(),
            shipping_address: None,
            tracking: None,
            reviews: Vec::new(),
            dispute: None,
            closure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the garments offered in trade.
    pub fn with_offered_garments(mut self, garment_ids: Vec<GarmentId>) -> Self {
        self.offered_garment_ids = garment_ids;
        self
    }
}

// Query methods
impl Exchange {
    /// Returns the exchange ID.
    pub fn id(&self) -> ExchangeId {
        self.id
    }

    /// Returns the exchange kind.
    pub fn kind(&self) -> ExchangeKind {
        self.kind
    }

    /// Returns the garment under exchange.
    pub fn garment_id(&self) -> GarmentId {
        self.garment_id
    }

    /// Returns the party who opened the exchange.
    pub fn initiator(&self) -> UserId {
        self.initiator
    }

    /// Returns the garment owner.
    pub fn recipient(&self) -> UserId {
        self.recipient
    }

    /// Returns the garments offered in trade.
    pub fn offered_garment_ids(&self) -> &[GarmentId] {
        &self.offered_garment_ids
    }

    /// Returns the agreed price, if any.
    pub fn agreed_price(&self) -> Option<Money> {
        self.agreed_price
    }

    /// Returns the exchange currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the coarse status.
    pub fn status(&self) -> ExchangeStatus {
        self.status
    }

    /// Returns the lifecycle stage.
    pub fn stage(&self) -> ExchangeStage {
        self.stage
    }

    /// Returns the full negotiation log, oldest first.
    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Returns an offer by ID.
    pub fn offer(&self, offer_id: OfferId) -> Option<&Offer> {
        self.offers.iter().find(|o| o.id() == offer_id)
    }

    /// Returns the open offer, if one exists.
    pub fn open_offer(&self) -> Option<&Offer> {
        self.offers.iter().find(|o| o.is_open())
    }

    /// Returns the communication log, oldest first.
    pub fn messages(&self) -> &[ExchangeMessage] {
        &self.messages
    }

    /// Returns the shipping address, if one is on file.
    pub fn shipping_address(&self) -> Option<&Address> {
        self.shipping_address.as_ref()
    }

    /// Returns the tracking info, if attached.
    pub fn tracking(&self) -> Option<&TrackingInfo> {
        self.tracking.as_ref()
    }

    /// Returns the reviews left so far.
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Returns true if the given party has already reviewed.
    pub fn has_reviewed(&self, author: UserId) -> bool {
        self.reviews.iter().any(|r| r.author == author)
    }

    /// Returns the open dispute, if any.
    pub fn dispute(&self) -> Option<&Dispute> {
        self.dispute.as_ref()
    }

    /// Returns the reason recorded on decline or cancel.
    pub fn closure_reason(&self) -> Option<&str> {
        self.closure_reason.as_deref()
    }

    /// Returns when the exchange was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the exchange was last mutated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the user is one of the two parties.
    pub fn is_participant(&self, user: UserId) -> bool {
        user == self.initiator || user == self.recipient
    }

    /// Returns the counterparty of the given participant.
    pub fn other_party(&self, user: UserId) -> Option<UserId> {
        if user == self.initiator {
            Some(self.recipient)
        } else if user == self.recipient {
            Some(self.initiator)
        } else {
            None
        }
    }

    /// Returns true if the exchange is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the next required action, re-derived from the current stage.
    pub fn next_action(&self) -> Option<NextAction> {
        if !self.status.is_active() {
            return None;
        }
        NextAction::resolve(self.stage, self.initiator, self.recipient)
    }
}

// Transition methods
impl Exchange {
    /// Appends a message to the communication log.
    pub fn add_message(&mut self, message: ExchangeMessage) -> Result<(), ExchangeError> {
        if !self.status.is_active() {
            return Err(ExchangeError::InvalidStatusTransition {
                current: self.status,
                action: "add a message to",
            });
        }
        self.messages.push(message);
        self.touch();
        Ok(())
    }

    /// Appends an offer to the negotiation log and moves to `Negotiating`.
    ///
    /// At most one offer may be open at a time.
    pub fn add_offer(&mut self, offer: Offer) -> Result<(), ExchangeError> {
        if !self.status.can_respond() {
            return Err(ExchangeError::InvalidStatusTransition {
                current: self.status,
                action: "make an offer on",
            });
        }
        if !self.stage.can_negotiate() {
            return Err(ExchangeError::InvalidStageTransition {
                current: self.stage,
                action: "make an offer",
            });
        }
        if self.open_offer().is_some() {
            return Err(ExchangeError::OpenOfferExists);
        }
        self.offers.push(offer);
        self.stage = ExchangeStage::Negotiating;
        self.touch();
        Ok(())
    }

    /// Accepts an open offer, promoting its terms onto the exchange.
    ///
    /// Status becomes `Accepted` and the stage lands on `PaymentPending`.
    pub fn accept_offer(&mut self, offer_id: OfferId) -> Result<(), ExchangeError> {
        if !self.status.can_respond() {
            return Err(ExchangeError::InvalidStatusTransition {
                current: self.status,
                action: "accept an offer on",
            });
        }
        let offer = self
            .offers
            .iter_mut()
            .find(|o| o.id() == offer_id)
            .ok_or(ExchangeError::OfferNotFound { offer_id })?;
        offer.accept()?;

        let amount = offer.amount();
        let garment_ids = offer.garment_ids().to_vec();
        if amount.is_some() {
            self.agreed_price = amount;
        }
        if !garment_ids.is_empty() {
            self.offered_garment_ids = garment_ids;
        }

        self.status = ExchangeStatus::Accepted;
        self.stage = ExchangeStage::PaymentPending;
        self.touch();
        Ok(())
    }

    /// Declines an open offer, recording the reason for audit.
    ///
    /// The exchange stays in negotiation; the declined offer is preserved
    /// in the log unchanged apart from its closed status.
    pub fn decline_offer(
        &mut self,
        offer_id: OfferId,
        reason: Option<String>,
    ) -> Result<(), ExchangeError> {
        if !self.status.can_respond() {
            return Err(ExchangeError::InvalidStatusTransition {
                current: self.status,
                action: "decline an offer on",
            });
        }
        let offer = self
            .offers
            .iter_mut()
            .find(|o| o.id() == offer_id)
            .ok_or(ExchangeError::OfferNotFound { offer_id })?;
        offer.decline(reason)?;
        self.touch();
        Ok(())
    }

    /// Accepts the exchange at its current terms.
    ///
    /// Requires that no offer is open: a live negotiation must resolve its
    /// open offer explicitly first.
    pub fn accept(&mut self) -> Result<(), ExchangeError> {
        if !self.status.can_respond() {
            return Err(ExchangeError::InvalidStatusTransition {
                current: self.status,
                action: "accept",
            });
        }
        if !self.stage.can_accept() {
            return Err(ExchangeError::InvalidStageTransition {
                current: self.stage,
                action: "accept",
            });
        }
        if self.open_offer().is_some() {
            return Err(ExchangeError::OpenOfferExists);
        }
        self.status = ExchangeStatus::Accepted;
        self.stage = ExchangeStage::PaymentPending;
        self.touch();
        Ok(())
    }

    /// Declines the exchange, recording the optional reason.
    pub fn decline(&mut self, reason: Option<String>) -> Result<(), ExchangeError> {
        if !self.status.can_respond() {
            return Err(ExchangeError::InvalidStatusTransition {
                current: self.status,
                action: "decline",
            });
        }
        self.status = ExchangeStatus::Declined;
        self.closure_reason = reason;
        self.touch();
        Ok(())
    }

    /// Cancels the exchange, recording the optional reason.
    ///
    /// Not offered once payment is received; reversal past that point
    /// goes through dispute.
    pub fn cancel(&mut self, reason: Option<String>) -> Result<(), ExchangeError> {
        if !self.status.can_cancel() {
            return Err(ExchangeError::InvalidStatusTransition {
                current: self.status,
                action: "cancel",
            });
        }
        if !self.stage.can_cancel() {
            return Err(ExchangeError::InvalidStageTransition {
                current: self.stage,
                action: "cancel",
            });
        }
        self.status = ExchangeStatus::Cancelled;
        self.closure_reason = reason;
        self.touch();
        Ok(())
    }

    /// Advances the stage monotonically.
    ///
    /// Only valid on an accepted exchange, and never into the review
    /// stages: `ReviewPending` and `Completed` are driven by
    /// [`Exchange::add_review`].
    pub fn advance_stage(&mut self, target: ExchangeStage) -> Result<(), ExchangeError> {
        if self.status != ExchangeStatus::Accepted {
            return Err(ExchangeError::InvalidStatusTransition {
                current: self.status,
                action: "advance the stage of",
            });
        }
        if matches!(
            target,
            ExchangeStage::ReviewPending | ExchangeStage::Completed
        ) {
            return Err(ExchangeError::InvalidStageTransition {
                current: self.stage,
                action: "advance into a review stage of",
            });
        }
        if target <= self.stage {
            return Err(ExchangeError::StageOutOfOrder {
                current: self.stage,
                requested: target,
            });
        }
        self.stage = target;
        self.touch();
        Ok(())
    }

    /// Attaches carrier tracking info; only once, and only after shipment.
    pub fn attach_tracking(&mut self, tracking: TrackingInfo) -> Result<(), ExchangeError> {
        if self.tracking.is_some() {
            return Err(ExchangeError::TrackingAlreadyAttached);
        }
        if self.stage < ExchangeStage::Shipped {
            return Err(ExchangeError::InvalidStageTransition {
                current: self.stage,
                action: "attach tracking to",
            });
        }
        self.tracking = Some(tracking);
        self.touch();
        Ok(())
    }

    /// Adds a party's review.
    ///
    /// The first review moves the stage to `ReviewPending`; the second
    /// completes the exchange.
    pub fn add_review(&mut self, review: Review) -> Result<(), ExchangeError> {
        if self.status != ExchangeStatus::Accepted {
            return Err(ExchangeError::InvalidStatusTransition {
                current: self.status,
                action: "review",
            });
        }
        if !self.stage.can_review() {
            return Err(ExchangeError::InvalidStageTransition {
                current: self.stage,
                action: "review",
            });
        }
        if self.has_reviewed(review.author) {
            return Err(ExchangeError::DuplicateReview {
                author: review.author,
            });
        }
        self.reviews.push(review);
        if self.reviews.len() >= 2 {
            self.stage = ExchangeStage::Completed;
            self.status = ExchangeStatus::Completed;
        } else {
            self.stage = ExchangeStage::ReviewPending;
        }
        self.touch();
        Ok(())
    }

    /// Opens a dispute, forcing the status to `Disputed`.
    ///
    /// Reachable from any non-terminal position; the stage is left where
    /// it was for the external adjudicator.
    pub fn open_dispute(&mut self, dispute: Dispute) -> Result<(), ExchangeError> {
        if !self.status.is_active() {
            return Err(ExchangeError::InvalidStatusTransition {
                current: self.status,
                action: "open a dispute on",
            });
        }
        if self.dispute.is_some() {
            return Err(ExchangeError::DisputeAlreadyOpen);
        }
        self.dispute = Some(dispute);
        self.status = ExchangeStatus::Disputed;
        self.touch();
        Ok(())
    }

    /// Replaces the shipping address; locked once the garment ships.
    pub fn update_shipping_address(&mut self, address: Address) -> Result<(), ExchangeError> {
        if !self.status.is_active() {
            return Err(ExchangeError::InvalidStatusTransition {
                current: self.status,
                action: "update the shipping address of",
            });
        }
        if !self.stage.can_update_address() {
            return Err(ExchangeError::InvalidStageTransition {
                current: self.stage,
                action: "update the shipping address of",
            });
        }
        self.shipping_address = Some(address);
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
