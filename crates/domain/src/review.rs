use std::collections::BTreeMap;

use assetflow_core::{AppError, AppResult, ItemId};

use crate::request::{DecisionStatus, ItemDecision, Request};

/// Review stage a set of item decisions belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStage {
    /// First review, performed while the request is pending.
    Logistics,
    /// Last review, performed before the final approval.
    Final,
}

/// One reviewed line in a review submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewLine {
    /// Reviewed line identifier.
    pub item_id: ItemId,
    /// Quantity approved at this stage. Zero rejects the line.
    pub quantity: u32,
    /// Reason, mandatory whenever the quantity deviates from the ceiling.
    pub reason: Option<String>,
    /// Fulfill from existing stock instead of purchasing. Logistics stage only.
    pub allocate_from_stock: bool,
}

/// Returns the maximum quantity a review may approve for a line.
///
/// The ceiling is the approved quantity of the immediately preceding stage,
/// or the originally requested quantity when no stage reviewed the line yet.
#[must_use]
pub fn review_ceiling(request: &Request, item_id: ItemId) -> u32 {
    request.effective_quantity(item_id)
}

/// Computes the decision set resulting from one review submission.
///
/// Validation is fail-fast in line declaration order. With `finalize` set,
/// lines left untouched by the submission are carried forward as fully
/// approved at their ceiling, which is what a stage approval does.
pub(crate) fn apply_review(
    request: &Request,
    stage: ReviewStage,
    lines: &[ReviewLine],
    finalize: bool,
) -> AppResult<BTreeMap<ItemId, ItemDecision>> {
    let mut decisions: BTreeMap<ItemId, ItemDecision> = request
        .items()
        .iter()
        .filter_map(|item| {
            request
                .decision(item.id())
                .cloned()
                .map(|decision| (item.id(), decision))
        })
        .collect();

    let mut reviewed = Vec::with_capacity(lines.len());
    for line in lines {
        let Some(item) = request.item(line.item_id) else {
            return Err(AppError::Validation(format!(
                "review references unknown item '{}'",
                line.item_id
            )));
        };

        if reviewed.contains(&line.item_id) {
            return Err(AppError::Validation(format!(
                "item '{}' is reviewed more than once",
                item.name()
            )));
        }
        reviewed.push(line.item_id);

        if line.allocate_from_stock && stage != ReviewStage::Logistics {
            return Err(AppError::Validation(format!(
                "item '{}' can only be allocated from stock during the logistics review",
                item.name()
            )));
        }

        let ceiling = review_ceiling(request, line.item_id);
        if ceiling == 0 {
            if line.quantity > 0 {
                return Err(AppError::Validation(format!(
                    "item '{}' was rejected at an earlier stage and cannot be re-raised",
                    item.name()
                )));
            }
            continue;
        }

        if line.quantity > ceiling {
            return Err(AppError::Validation(format!(
                "item '{}' allows at most {} unit(s) at this stage, got {}",
                item.name(),
                ceiling,
                line.quantity
            )));
        }

        let decision = decide(request, line, ceiling, item.name())?;
        decisions.insert(line.item_id, decision);
    }

    if finalize {
        for item in request.items() {
            if decisions.contains_key(&item.id()) {
                continue;
            }

            decisions.insert(item.id(), ItemDecision::approved(item.quantity())?);
        }
    }

    Ok(decisions)
}

fn decide(
    request: &Request,
    line: &ReviewLine,
    ceiling: u32,
    item_name: &str,
) -> AppResult<ItemDecision> {
    let reduced = line.quantity < ceiling;
    if reduced && line.reason.as_deref().is_none_or(|reason| reason.trim().is_empty()) {
        return Err(AppError::Validation(format!(
            "a reason is required when reducing item '{item_name}'"
        )));
    }

    if line.quantity == 0 {
        return ItemDecision::rejected(line.reason.clone().unwrap_or_default());
    }

    let keeps_allocation = matches!(
        request.decision(line.item_id).map(ItemDecision::status),
        Some(DecisionStatus::StockAllocated)
    );
    if line.allocate_from_stock || keeps_allocation {
        return ItemDecision::stock_allocated(line.quantity, line.reason.clone());
    }

    if reduced {
        return ItemDecision::partial(line.quantity, line.reason.clone().unwrap_or_default());
    }

    ItemDecision::approved(line.quantity)
}

#[cfg(test)]
mod tests {
    use assetflow_core::{ItemId, RequestId};
    use chrono::Utc;
    use proptest::prelude::*;

    use super::{ReviewLine, ReviewStage, apply_review, review_ceiling};
    use crate::request::{DecisionStatus, Request, RequestInput, RequestItem};

    fn request_with_quantity(quantity: u32) -> (Request, ItemId) {
        let item = match RequestItem::new(ItemId::new(), "Laptop", "Lenovo", quantity, "pcs") {
            Ok(item) => item,
            Err(error) => panic!("item must construct: {error}"),
        };
        let item_id = item.id();
        let input = RequestInput {
            id: RequestId::new(),
            requester: "requester-1".to_owned(),
            items: vec![item],
            submitted_at: Utc::now(),
        };
        match Request::submit(input) {
            Ok(request) => (request, item_id),
            Err(error) => panic!("request must construct: {error}"),
        }
    }

    fn line(item_id: ItemId, quantity: u32, reason: Option<&str>) -> ReviewLine {
        ReviewLine {
            item_id,
            quantity,
            reason: reason.map(str::to_owned),
            allocate_from_stock: false,
        }
    }

    #[test]
    fn untouched_lines_finalize_at_the_full_quantity() {
        let (request, item_id) = request_with_quantity(5);
        let decisions = apply_review(&request, ReviewStage::Logistics, &[], true);
        assert!(decisions.is_ok_and(|decisions| {
            decisions
                .get(&item_id)
                .is_some_and(|decision| decision.approved_quantity() == 5)
        }));
    }

    #[test]
    fn reduction_without_reason_is_rejected() {
        let (request, item_id) = request_with_quantity(10);
        let result = apply_review(
            &request,
            ReviewStage::Logistics,
            &[line(item_id, 6, None)],
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn reduction_with_reason_becomes_partial() {
        let (request, item_id) = request_with_quantity(10);
        let decisions = apply_review(
            &request,
            ReviewStage::Logistics,
            &[line(item_id, 6, Some("budget"))],
            false,
        );
        assert!(decisions.is_ok_and(|decisions| {
            decisions.get(&item_id).is_some_and(|decision| {
                decision.status() == DecisionStatus::Partial && decision.approved_quantity() == 6
            })
        }));
    }

    #[test]
    fn later_stage_cannot_exceed_the_earlier_ceiling() {
        let (mut request, item_id) = request_with_quantity(10);
        let first = apply_review(
            &request,
            ReviewStage::Logistics,
            &[line(item_id, 6, Some("budget"))],
            true,
        );
        match first {
            Ok(decisions) => {
                for (id, decision) in decisions {
                    request.set_decision(id, decision);
                }
            }
            Err(error) => panic!("first review must pass: {error}"),
        }
        assert_eq!(review_ceiling(&request, item_id), 6);

        let second = apply_review(
            &request,
            ReviewStage::Final,
            &[line(item_id, 8, Some("raise"))],
            false,
        );
        assert!(second.is_err());
    }

    #[test]
    fn zero_ceiling_freezes_the_line() {
        let (mut request, item_id) = request_with_quantity(4);
        let first = apply_review(
            &request,
            ReviewStage::Logistics,
            &[line(item_id, 0, Some("not needed"))],
            true,
        );
        match first {
            Ok(decisions) => {
                for (id, decision) in decisions {
                    request.set_decision(id, decision);
                }
            }
            Err(error) => panic!("first review must pass: {error}"),
        }

        let raise = apply_review(
            &request,
            ReviewStage::Final,
            &[line(item_id, 1, Some("revive"))],
            false,
        );
        assert!(raise.is_err());

        let keep_zero = apply_review(
            &request,
            ReviewStage::Final,
            &[line(item_id, 0, None)],
            false,
        );
        assert!(keep_zero.is_ok());
    }

    #[test]
    fn stock_allocation_is_logistics_only() {
        let (request, item_id) = request_with_quantity(3);
        let allocate = ReviewLine {
            item_id,
            quantity: 3,
            reason: None,
            allocate_from_stock: true,
        };

        let at_logistics =
            apply_review(&request, ReviewStage::Logistics, &[allocate.clone()], false);
        assert!(at_logistics.is_ok_and(|decisions| {
            decisions
                .get(&item_id)
                .is_some_and(|decision| decision.status() == DecisionStatus::StockAllocated)
        }));

        let at_final = apply_review(&request, ReviewStage::Final, &[allocate], false);
        assert!(at_final.is_err());
    }

    #[test]
    fn stock_allocation_survives_a_later_reduction() {
        let (mut request, item_id) = request_with_quantity(5);
        let first = apply_review(
            &request,
            ReviewStage::Logistics,
            &[ReviewLine {
                item_id,
                quantity: 5,
                reason: None,
                allocate_from_stock: true,
            }],
            true,
        );
        match first {
            Ok(decisions) => {
                for (id, decision) in decisions {
                    request.set_decision(id, decision);
                }
            }
            Err(error) => panic!("first review must pass: {error}"),
        }

        let second = apply_review(
            &request,
            ReviewStage::Final,
            &[line(item_id, 3, Some("partial stock"))],
            false,
        );
        assert!(second.is_ok_and(|decisions| {
            decisions.get(&item_id).is_some_and(|decision| {
                decision.status() == DecisionStatus::StockAllocated
                    && decision.approved_quantity() == 3
            })
        }));
    }

    proptest! {
        #[test]
        fn chained_reviews_never_raise_the_effective_quantity(
            original in 1u32..50,
            requested in proptest::collection::vec(0u32..60, 1..6),
        ) {
            let (mut request, item_id) = request_with_quantity(original);
            let mut previous = original;

            for quantity in requested {
                let submission = apply_review(
                    &request,
                    ReviewStage::Logistics,
                    &[line(item_id, quantity, Some("adjustment"))],
                    false,
                );

                match submission {
                    Ok(decisions) => {
                        for (id, decision) in decisions {
                            request.set_decision(id, decision);
                        }
                        let effective = request.effective_quantity(item_id);
                        prop_assert!(effective <= previous);
                        previous = effective;
                    }
                    Err(_) => prop_assert!(quantity > previous),
                }
            }
        }
    }
}
