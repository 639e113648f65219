use std::collections::BTreeMap;

use assetflow_core::{AppError, AppResult, ItemId, NonEmptyString, RequestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogIndex, ItemTracking};

/// Request-level lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Submitted, awaiting the logistics review.
    Pending,
    /// Passed the logistics stage, awaiting purchase details.
    LogisticsApproved,
    /// Purchase details submitted, awaiting final approval.
    AwaitingFinalApproval,
    /// Fully approved, procurement not yet started.
    Approved,
    /// Procurement in progress.
    Purchasing,
    /// Goods dispatched by the vendor.
    InDelivery,
    /// Goods arrived, assets being staged.
    Arrived,
    /// Staging complete, awaiting handover to the requester.
    AwaitingHandover,
    /// All items handed over. Terminal.
    Completed,
    /// Rejected during review. Terminal.
    Rejected,
    /// Cancelled by the requester. Terminal.
    Cancelled,
}

impl RequestStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::LogisticsApproved => "logistics_approved",
            Self::AwaitingFinalApproval => "awaiting_final_approval",
            Self::Approved => "approved",
            Self::Purchasing => "purchasing",
            Self::InDelivery => "in_delivery",
            Self::Arrived => "arrived",
            Self::AwaitingHandover => "awaiting_handover",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether the status admits no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }
}

/// Per-item outcome of one review stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    /// Carried forward at the full stage ceiling.
    Approved,
    /// Reduced below the stage ceiling.
    Partial,
    /// Reduced to zero; permanently excluded from later stages.
    Rejected,
    /// Fulfilled from existing stock instead of purchase.
    StockAllocated,
}

impl DecisionStatus {
    /// Returns a stable storage value for this decision status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Partial => "partial",
            Self::Rejected => "rejected",
            Self::StockAllocated => "stock_allocated",
        }
    }
}

/// One item's recorded decision at the most recent review stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDecision {
    status: DecisionStatus,
    approved_quantity: u32,
    reason: Option<NonEmptyString>,
}

impl ItemDecision {
    /// Creates a full approval at the given quantity.
    pub fn approved(quantity: u32) -> AppResult<Self> {
        if quantity == 0 {
            return Err(AppError::Validation(
                "approved decision requires a quantity greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            status: DecisionStatus::Approved,
            approved_quantity: quantity,
            reason: None,
        })
    }

    /// Creates a partial approval below the stage ceiling.
    pub fn partial(quantity: u32, reason: impl Into<String>) -> AppResult<Self> {
        if quantity == 0 {
            return Err(AppError::Validation(
                "partial decision requires a quantity greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            status: DecisionStatus::Partial,
            approved_quantity: quantity,
            reason: Some(NonEmptyString::new(reason)?),
        })
    }

    /// Creates a rejection. The quantity is always zero.
    pub fn rejected(reason: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            status: DecisionStatus::Rejected,
            approved_quantity: 0,
            reason: Some(NonEmptyString::new(reason)?),
        })
    }

    /// Creates a stock allocation satisfying the quantity from existing stock.
    pub fn stock_allocated(quantity: u32, reason: Option<String>) -> AppResult<Self> {
        if quantity == 0 {
            return Err(AppError::Validation(
                "stock allocation requires a quantity greater than zero".to_owned(),
            ));
        }

        let reason = reason.map(NonEmptyString::new).transpose()?;
        Ok(Self {
            status: DecisionStatus::StockAllocated,
            approved_quantity: quantity,
            reason,
        })
    }

    /// Returns the decision status.
    #[must_use]
    pub fn status(&self) -> DecisionStatus {
        self.status
    }

    /// Returns the approved quantity for this stage.
    #[must_use]
    pub fn approved_quantity(&self) -> u32 {
        self.approved_quantity
    }

    /// Returns the recorded reason, if one was required.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_ref().map(NonEmptyString::as_str)
    }
}

/// One requested line item. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestItem {
    id: ItemId,
    name: NonEmptyString,
    brand: NonEmptyString,
    quantity: u32,
    unit: NonEmptyString,
}

impl RequestItem {
    /// Creates a validated request line.
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        brand: impl Into<String>,
        quantity: u32,
        unit: impl Into<String>,
    ) -> AppResult<Self> {
        if quantity == 0 {
            return Err(AppError::Validation(
                "request item quantity must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            brand: NonEmptyString::new(brand)?,
            quantity,
            unit: NonEmptyString::new(unit)?,
        })
    }

    /// Returns the line identifier.
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the item name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the item brand.
    #[must_use]
    pub fn brand(&self) -> &str {
        self.brand.as_str()
    }

    /// Returns the originally requested quantity.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the quantity unit label.
    #[must_use]
    pub fn unit(&self) -> &str {
        self.unit.as_str()
    }
}

/// Input payload used to construct validated purchase details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseDetailsInput {
    /// Unit price in minor currency units.
    pub price_minor: u64,
    /// Vendor name.
    pub vendor: String,
    /// Purchase order number.
    pub po_number: String,
    /// Invoice number.
    pub invoice_number: String,
    /// Purchase date. Required; optional only in the unsaved form.
    pub purchased_at: Option<DateTime<Utc>>,
}

/// Completed purchase record for one item.
///
/// Completeness is enforced at construction, so a stored record always
/// satisfies the purchase-form requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseDetails {
    price_minor: u64,
    vendor: NonEmptyString,
    po_number: NonEmptyString,
    invoice_number: NonEmptyString,
    purchased_at: DateTime<Utc>,
}

impl PurchaseDetails {
    /// Creates validated purchase details.
    pub fn new(input: PurchaseDetailsInput) -> AppResult<Self> {
        let PurchaseDetailsInput {
            price_minor,
            vendor,
            po_number,
            invoice_number,
            purchased_at,
        } = input;

        if price_minor == 0 {
            return Err(AppError::Validation(
                "purchase price must be greater than zero".to_owned(),
            ));
        }

        let Some(purchased_at) = purchased_at else {
            return Err(AppError::Validation(
                "purchase date is required".to_owned(),
            ));
        };

        Ok(Self {
            price_minor,
            vendor: NonEmptyString::new(vendor)?,
            po_number: NonEmptyString::new(po_number)?,
            invoice_number: NonEmptyString::new(invoice_number)?,
            purchased_at,
        })
    }

    /// Returns the unit price in minor currency units.
    #[must_use]
    pub fn price_minor(&self) -> u64 {
        self.price_minor
    }

    /// Returns the vendor name.
    #[must_use]
    pub fn vendor(&self) -> &str {
        self.vendor.as_str()
    }

    /// Returns the purchase order number.
    #[must_use]
    pub fn po_number(&self) -> &str {
        self.po_number.as_str()
    }

    /// Returns the invoice number.
    #[must_use]
    pub fn invoice_number(&self) -> &str {
        self.invoice_number.as_str()
    }

    /// Returns the purchase date.
    #[must_use]
    pub fn purchased_at(&self) -> DateTime<Utc> {
        self.purchased_at
    }
}

/// Category of one activity-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Request submitted by the requester.
    Submitted,
    /// Item decisions revised without a stage change.
    ItemsReviewed,
    /// Logistics stage approved.
    LogisticsApproved,
    /// Purchase details recorded or updated.
    PurchaseDetailsUpdated,
    /// Submitted for final approval.
    FinalApprovalRequested,
    /// Flagged as prioritized by the final approver.
    Prioritized,
    /// Final stage approved.
    FinalApproved,
    /// Procurement started.
    ProcurementStarted,
    /// Marked as dispatched by the vendor.
    MarkedInDelivery,
    /// Marked as arrived at the warehouse.
    MarkedArrived,
    /// Assets registered against arrived items.
    AssetsRegistered,
    /// Staging declared complete.
    StagingCompleted,
    /// Handover recorded for one or more items.
    HandoverRecorded,
    /// All items handed over.
    Completed,
    /// Request rejected.
    Rejected,
    /// Request cancelled by the requester.
    Cancelled,
    /// Free-form comment.
    Comment,
}

impl ActivityKind {
    /// Returns a stable storage value for this activity kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::ItemsReviewed => "items_reviewed",
            Self::LogisticsApproved => "logistics_approved",
            Self::PurchaseDetailsUpdated => "purchase_details_updated",
            Self::FinalApprovalRequested => "final_approval_requested",
            Self::Prioritized => "prioritized",
            Self::FinalApproved => "final_approved",
            Self::ProcurementStarted => "procurement_started",
            Self::MarkedInDelivery => "marked_in_delivery",
            Self::MarkedArrived => "marked_arrived",
            Self::AssetsRegistered => "assets_registered",
            Self::StagingCompleted => "staging_completed",
            Self::HandoverRecorded => "handover_recorded",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Comment => "comment",
        }
    }
}

/// One append-only activity-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    author: NonEmptyString,
    at: DateTime<Utc>,
    kind: ActivityKind,
    detail: String,
}

impl Activity {
    /// Creates an activity entry.
    pub fn new(
        author: impl Into<String>,
        at: DateTime<Utc>,
        kind: ActivityKind,
        detail: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            author: NonEmptyString::new(author)?,
            at,
            kind,
            detail: detail.into(),
        })
    }

    /// Returns the entry author subject.
    #[must_use]
    pub fn author(&self) -> &str {
        self.author.as_str()
    }

    /// Returns the entry timestamp.
    #[must_use]
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// Returns the entry kind.
    #[must_use]
    pub fn kind(&self) -> ActivityKind {
        self.kind
    }

    /// Returns the free-form entry detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        self.detail.as_str()
    }
}

/// Input payload used to construct a submitted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInput {
    /// Aggregate identifier.
    pub id: RequestId,
    /// Subject of the requesting account.
    pub requester: String,
    /// Requested line items.
    pub items: Vec<RequestItem>,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
}

/// The asset procurement request aggregate.
///
/// Mutated only through [`crate::RequestAction`] transitions; terminal
/// statuses freeze the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    id: RequestId,
    requester: NonEmptyString,
    status: RequestStatus,
    items: Vec<RequestItem>,
    decisions: BTreeMap<ItemId, ItemDecision>,
    purchase_details: BTreeMap<ItemId, PurchaseDetails>,
    registered: BTreeMap<ItemId, u32>,
    handed_over: BTreeMap<ItemId, u32>,
    is_prioritized: bool,
    activity: Vec<Activity>,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Request {
    /// Creates a newly submitted request in the pending status.
    pub fn submit(input: RequestInput) -> AppResult<Self> {
        let RequestInput {
            id,
            requester,
            items,
            submitted_at,
        } = input;

        if items.is_empty() {
            return Err(AppError::Validation(
                "a request must contain at least one item".to_owned(),
            ));
        }

        let mut seen = Vec::with_capacity(items.len());
        for item in &items {
            if seen.contains(&item.id()) {
                return Err(AppError::Validation(format!(
                    "duplicate item id '{}' in request",
                    item.id()
                )));
            }
            seen.push(item.id());
        }

        let requester = NonEmptyString::new(requester)?;
        let activity = Activity::new(
            requester.as_str(),
            submitted_at,
            ActivityKind::Submitted,
            format!("submitted request with {} item(s)", items.len()),
        )?;

        Ok(Self {
            id,
            requester,
            status: RequestStatus::Pending,
            items,
            decisions: BTreeMap::new(),
            purchase_details: BTreeMap::new(),
            registered: BTreeMap::new(),
            handed_over: BTreeMap::new(),
            is_prioritized: false,
            activity: vec![activity],
            submitted_at,
            updated_at: submitted_at,
        })
    }

    /// Returns the aggregate identifier.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the requester subject.
    #[must_use]
    pub fn requester(&self) -> &str {
        self.requester.as_str()
    }

    /// Returns the current lifecycle status.
    #[must_use]
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Returns the requested line items.
    #[must_use]
    pub fn items(&self) -> &[RequestItem] {
        &self.items
    }

    /// Returns the line with the given identifier.
    #[must_use]
    pub fn item(&self, item_id: ItemId) -> Option<&RequestItem> {
        self.items.iter().find(|item| item.id() == item_id)
    }

    /// Returns the recorded decision for a line, if any stage reviewed it.
    #[must_use]
    pub fn decision(&self, item_id: ItemId) -> Option<&ItemDecision> {
        self.decisions.get(&item_id)
    }

    /// Returns the purchase details recorded for a line.
    #[must_use]
    pub fn purchase_details(&self, item_id: ItemId) -> Option<&PurchaseDetails> {
        self.purchase_details.get(&item_id)
    }

    /// Returns the count of assets registered against a line during staging.
    #[must_use]
    pub fn registered_count(&self, item_id: ItemId) -> u32 {
        self.registered.get(&item_id).copied().unwrap_or(0)
    }

    /// Returns the count of units handed over for a line.
    #[must_use]
    pub fn handed_over_count(&self, item_id: ItemId) -> u32 {
        self.handed_over.get(&item_id).copied().unwrap_or(0)
    }

    /// Returns whether the final approver flagged the request as prioritized.
    #[must_use]
    pub fn is_prioritized(&self) -> bool {
        self.is_prioritized
    }

    /// Returns the append-only activity log, oldest first.
    #[must_use]
    pub fn activity(&self) -> &[Activity] {
        &self.activity
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Returns the timestamp of the last applied transition.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the aggregate is in a terminal status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the quantity currently in effect for a line.
    ///
    /// The latest stage decision wins; lines no stage has reviewed keep
    /// their originally requested quantity. Unknown identifiers yield zero.
    #[must_use]
    pub fn effective_quantity(&self, item_id: ItemId) -> u32 {
        if let Some(decision) = self.decisions.get(&item_id) {
            return decision.approved_quantity();
        }

        self.item(item_id).map_or(0, RequestItem::quantity)
    }

    /// Returns whether a line still requires a purchase.
    ///
    /// Lines reduced to zero and lines fulfilled from stock do not.
    #[must_use]
    pub fn requires_purchase(&self, item_id: ItemId) -> bool {
        if self.effective_quantity(item_id) == 0 {
            return false;
        }

        !matches!(
            self.decisions.get(&item_id).map(ItemDecision::status),
            Some(DecisionStatus::StockAllocated)
        )
    }

    /// Returns whether every line requiring a purchase has complete details.
    #[must_use]
    pub fn purchase_form_valid(&self) -> bool {
        self.items.iter().all(|item| {
            !self.requires_purchase(item.id()) || self.purchase_details.contains_key(&item.id())
        })
    }

    /// Returns whether a line takes part in staging.
    ///
    /// Rejected lines and stock-allocated lines are exempt.
    #[must_use]
    pub fn requires_staging(&self, item_id: ItemId) -> bool {
        if self.effective_quantity(item_id) == 0 {
            return false;
        }

        !matches!(
            self.decisions.get(&item_id).map(ItemDecision::status),
            Some(DecisionStatus::Rejected | DecisionStatus::StockAllocated)
        )
    }

    /// Returns whether every staged line reached its approved quantity.
    ///
    /// Vacuously true when no line requires staging.
    #[must_use]
    pub fn staging_complete(&self) -> bool {
        self.items.iter().all(|item| {
            !self.requires_staging(item.id())
                || self.registered_count(item.id()) >= self.effective_quantity(item.id())
        })
    }

    /// Returns whether every line with an effective quantity was handed over.
    ///
    /// Stock-allocated lines are included: the requester receives them from
    /// existing stock through the same handover document.
    #[must_use]
    pub fn handover_complete(&self) -> bool {
        self.items.iter().all(|item| {
            let due = self.effective_quantity(item.id());
            due == 0 || self.handed_over_count(item.id()) >= due
        })
    }

    /// Appends a free-form comment to the activity log.
    ///
    /// Editing and deleting comments is a collaborator concern outside the
    /// lifecycle rules; the aggregate only ever appends.
    pub fn add_comment(
        &mut self,
        author: impl Into<String>,
        text: impl Into<String>,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "a comment must not be empty".to_owned(),
            ));
        }

        self.activity
            .push(Activity::new(author, at, ActivityKind::Comment, text)?);
        Ok(())
    }

    pub(crate) fn tracking_for(&self, catalog: &CatalogIndex, item_id: ItemId) -> ItemTracking {
        self.item(item_id)
            .map_or(ItemTracking::Bulk, |item| catalog.tracking_for(item))
    }

    pub(crate) fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
    }

    pub(crate) fn set_decision(&mut self, item_id: ItemId, decision: ItemDecision) {
        self.decisions.insert(item_id, decision);
    }

    pub(crate) fn set_purchase_details(&mut self, item_id: ItemId, details: PurchaseDetails) {
        self.purchase_details.insert(item_id, details);
    }

    pub(crate) fn add_registered(&mut self, item_id: ItemId, count: u32) {
        *self.registered.entry(item_id).or_insert(0) += count;
    }

    pub(crate) fn add_handed_over(&mut self, item_id: ItemId, count: u32) {
        *self.handed_over.entry(item_id).or_insert(0) += count;
    }

    pub(crate) fn mark_prioritized(&mut self) {
        self.is_prioritized = true;
    }

    pub(crate) fn record_activity(&mut self, activity: Activity) {
        self.updated_at = activity.at();
        self.activity.push(activity);
    }
}

#[cfg(test)]
mod tests {
    use assetflow_core::{ItemId, RequestId};
    use chrono::{TimeZone, Utc};

    use super::{
        ItemDecision, PurchaseDetails, PurchaseDetailsInput, Request, RequestInput, RequestItem,
        RequestStatus,
    };

    fn item(name: &str, quantity: u32) -> RequestItem {
        match RequestItem::new(ItemId::new(), name, "Generic", quantity, "pcs") {
            Ok(item) => item,
            Err(error) => panic!("item must construct: {error}"),
        }
    }

    fn request(items: Vec<RequestItem>) -> Request {
        let input = RequestInput {
            id: RequestId::new(),
            requester: "requester-1".to_owned(),
            items,
            submitted_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).single().map_or_else(
                || panic!("timestamp must construct"),
                |at| at,
            ),
        };
        match Request::submit(input) {
            Ok(request) => request,
            Err(error) => panic!("request must construct: {error}"),
        }
    }

    #[test]
    fn submitted_request_starts_pending_with_one_log_entry() {
        let request = request(vec![item("Laptop", 3)]);
        assert_eq!(request.status(), RequestStatus::Pending);
        assert_eq!(request.activity().len(), 1);
    }

    #[test]
    fn request_rejects_duplicate_item_ids() {
        let line = item("Laptop", 3);
        let input = RequestInput {
            id: RequestId::new(),
            requester: "requester-1".to_owned(),
            items: vec![line.clone(), line],
            submitted_at: Utc::now(),
        };
        assert!(Request::submit(input).is_err());
    }

    #[test]
    fn effective_quantity_prefers_latest_decision() {
        let line = item("Laptop", 10);
        let line_id = line.id();
        let mut request = request(vec![line]);
        assert_eq!(request.effective_quantity(line_id), 10);

        let decision = match ItemDecision::partial(6, "budget") {
            Ok(decision) => decision,
            Err(error) => panic!("decision must construct: {error}"),
        };
        request.set_decision(line_id, decision);
        assert_eq!(request.effective_quantity(line_id), 6);
    }

    #[test]
    fn purchase_form_requires_details_for_purchasable_items() {
        let line = item("Laptop", 2);
        let line_id = line.id();
        let mut request = request(vec![line]);
        assert!(!request.purchase_form_valid());

        let details = PurchaseDetails::new(PurchaseDetailsInput {
            price_minor: 1_500_000,
            vendor: "PT Vendor".to_owned(),
            po_number: "PO-77".to_owned(),
            invoice_number: "INV-12".to_owned(),
            purchased_at: Some(Utc::now()),
        });
        match details {
            Ok(details) => request.set_purchase_details(line_id, details),
            Err(error) => panic!("details must construct: {error}"),
        }
        assert!(request.purchase_form_valid());
    }

    #[test]
    fn stock_allocated_items_are_exempt_from_purchase_and_staging() {
        let line = item("Mouse", 4);
        let line_id = line.id();
        let mut request = request(vec![line]);

        let decision = match ItemDecision::stock_allocated(4, None) {
            Ok(decision) => decision,
            Err(error) => panic!("decision must construct: {error}"),
        };
        request.set_decision(line_id, decision);

        assert!(!request.requires_purchase(line_id));
        assert!(!request.requires_staging(line_id));
        assert!(request.purchase_form_valid());
        assert!(request.staging_complete());
        assert!(!request.handover_complete());
    }

    #[test]
    fn staging_completes_only_when_every_line_is_covered() {
        let first = item("Laptop", 2);
        let second = item("Monitor", 3);
        let first_id = first.id();
        let second_id = second.id();
        let mut request = request(vec![first, second]);

        request.add_registered(first_id, 2);
        request.add_registered(second_id, 1);
        assert!(!request.staging_complete());

        request.add_registered(second_id, 2);
        assert!(request.staging_complete());
    }

    #[test]
    fn purchase_details_require_a_date_and_positive_price() {
        let missing_date = PurchaseDetails::new(PurchaseDetailsInput {
            price_minor: 100,
            vendor: "PT Vendor".to_owned(),
            po_number: "PO-1".to_owned(),
            invoice_number: "INV-1".to_owned(),
            purchased_at: None,
        });
        assert!(missing_date.is_err());

        let zero_price = PurchaseDetails::new(PurchaseDetailsInput {
            price_minor: 0,
            vendor: "PT Vendor".to_owned(),
            po_number: "PO-1".to_owned(),
            invoice_number: "INV-1".to_owned(),
            purchased_at: Some(Utc::now()),
        });
        assert!(zero_price.is_err());
    }

    #[test]
    fn comments_append_to_the_activity_log() {
        let mut request = request(vec![item("Laptop", 1)]);
        let appended = request.add_comment("leader-1", "please expedite", Utc::now());
        assert!(appended.is_ok());
        assert_eq!(request.activity().len(), 2);

        let empty = request.add_comment("leader-1", "   ", Utc::now());
        assert!(empty.is_err());
    }
}
