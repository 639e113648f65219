use std::collections::{BTreeMap, BTreeSet};

use assetflow_core::{AppError, AppResult, AssetTag, ItemId};

use crate::catalog::{CatalogIndex, ItemTracking};
use crate::request::Request;

/// One line of a staging batch registering assets against an arrived item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLine {
    /// Target line identifier.
    pub item_id: ItemId,
    /// Units registered by this batch.
    pub quantity: u32,
    /// Reason, mandatory when the batch covers less than the outstanding quantity.
    pub reason: Option<String>,
    /// Asset tags bound by this batch. Serialized items only, one per unit.
    pub asset_tags: Vec<AssetTag>,
}

/// One line of a handover submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoverLine {
    /// Target line identifier.
    pub item_id: ItemId,
    /// Units handed over to the requester.
    pub quantity: u32,
}

/// Validates a staging batch and returns per-item registration increments.
///
/// The whole batch is validated before anything is applied; the first
/// failing line aborts the submission. The used-tag set is rebuilt from
/// scratch on every call, so repeated validation passes never leak state.
pub(crate) fn apply_staging(
    request: &Request,
    catalog: &CatalogIndex,
    available_stock: &BTreeMap<ItemId, u32>,
    lines: &[StagingLine],
) -> AppResult<BTreeMap<ItemId, u32>> {
    if lines.is_empty() {
        return Err(AppError::Validation(
            "a staging batch must register at least one line".to_owned(),
        ));
    }

    let mut used_tags: BTreeSet<&AssetTag> = BTreeSet::new();
    let mut increments = BTreeMap::new();

    for line in lines {
        let Some(item) = request.item(line.item_id) else {
            return Err(AppError::Validation(format!(
                "staging references unknown item '{}'",
                line.item_id
            )));
        };

        if increments.contains_key(&line.item_id) {
            return Err(AppError::Validation(format!(
                "item '{}' is staged more than once in the batch",
                item.name()
            )));
        }

        if !request.requires_staging(line.item_id) {
            return Err(AppError::Validation(format!(
                "item '{}' does not take part in staging",
                item.name()
            )));
        }

        let outstanding = request
            .effective_quantity(line.item_id)
            .saturating_sub(request.registered_count(line.item_id));
        if outstanding == 0 {
            return Err(AppError::Validation(format!(
                "item '{}' is already fully registered",
                item.name()
            )));
        }

        if line.quantity == 0 || line.quantity > outstanding {
            return Err(AppError::Validation(format!(
                "item '{}' allows registering between 1 and {} unit(s), got {}",
                item.name(),
                outstanding,
                line.quantity
            )));
        }

        if line.quantity < outstanding
            && line
                .reason
                .as_deref()
                .is_none_or(|reason| reason.trim().is_empty())
        {
            return Err(AppError::Validation(format!(
                "a reason is required when staging item '{}' below its outstanding quantity",
                item.name()
            )));
        }

        match catalog.tracking_for(item) {
            ItemTracking::Bulk => {
                if !line.asset_tags.is_empty() {
                    return Err(AppError::Validation(format!(
                        "bulk item '{}' is count-matched and does not take asset tags",
                        item.name()
                    )));
                }

                let available = available_stock.get(&line.item_id).copied().unwrap_or(0);
                if available < line.quantity {
                    return Err(AppError::Validation(format!(
                        "insufficient stock for item '{}': need {}, have {}",
                        item.name(),
                        line.quantity,
                        available
                    )));
                }
            }
            ItemTracking::Serialized => {
                if line.asset_tags.len() != line.quantity as usize {
                    return Err(AppError::Validation(format!(
                        "serialized item '{}' needs {} asset tag(s), got {}",
                        item.name(),
                        line.quantity,
                        line.asset_tags.len()
                    )));
                }

                let mut within_line: BTreeSet<&AssetTag> = BTreeSet::new();
                for tag in &line.asset_tags {
                    if !within_line.insert(tag) {
                        return Err(AppError::Validation(format!(
                            "asset tag '{tag}' is listed twice for item '{}'",
                            item.name()
                        )));
                    }
                }

                for tag in &line.asset_tags {
                    if !used_tags.insert(tag) {
                        return Err(AppError::Validation(format!(
                            "asset tag '{tag}' is already assigned to another item in the batch"
                        )));
                    }
                }
            }
        }

        increments.insert(line.item_id, line.quantity);
    }

    Ok(increments)
}

/// Validates a handover submission and returns per-item handed-over increments.
pub(crate) fn apply_handover(
    request: &Request,
    lines: &[HandoverLine],
) -> AppResult<BTreeMap<ItemId, u32>> {
    if lines.is_empty() {
        return Err(AppError::Validation(
            "a handover must cover at least one line".to_owned(),
        ));
    }

    let mut increments = BTreeMap::new();
    for line in lines {
        let Some(item) = request.item(line.item_id) else {
            return Err(AppError::Validation(format!(
                "handover references unknown item '{}'",
                line.item_id
            )));
        };

        if increments.contains_key(&line.item_id) {
            return Err(AppError::Validation(format!(
                "item '{}' is handed over more than once in the submission",
                item.name()
            )));
        }

        let due = request
            .effective_quantity(line.item_id)
            .saturating_sub(request.handed_over_count(line.item_id));
        if due == 0 {
            return Err(AppError::Validation(format!(
                "item '{}' has nothing left to hand over",
                item.name()
            )));
        }

        if line.quantity == 0 || line.quantity > due {
            return Err(AppError::Validation(format!(
                "item '{}' allows handing over between 1 and {} unit(s), got {}",
                item.name(),
                due,
                line.quantity
            )));
        }

        increments.insert(line.item_id, line.quantity);
    }

    Ok(increments)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use assetflow_core::{AssetTag, ItemId, RequestId};
    use chrono::Utc;

    use super::{HandoverLine, StagingLine, apply_handover, apply_staging};
    use crate::catalog::{CatalogEntry, CatalogIndex, ItemTracking};
    use crate::request::{Request, RequestInput, RequestItem};

    fn tag(value: &str) -> AssetTag {
        match AssetTag::new(value) {
            Ok(tag) => tag,
            Err(error) => panic!("tag must construct: {error}"),
        }
    }

    fn catalog() -> CatalogIndex {
        let entries = ["Laptop", "Monitor"].map(|name| {
            match (
                assetflow_core::NonEmptyString::new(name),
                assetflow_core::NonEmptyString::new("Lenovo"),
                assetflow_core::NonEmptyString::new("Devices"),
            ) {
                (Ok(name), Ok(brand), Ok(category)) => CatalogEntry {
                    name,
                    brand,
                    category,
                    tracking: ItemTracking::Serialized,
                },
                _ => panic!("catalog labels must construct"),
            }
        });
        match CatalogIndex::new(entries) {
            Ok(catalog) => catalog,
            Err(error) => panic!("catalog must construct: {error}"),
        }
    }

    fn arrived_request(lines: &[(&str, u32)]) -> (Request, Vec<ItemId>) {
        let mut items = Vec::new();
        let mut ids = Vec::new();
        for (name, quantity) in lines {
            match RequestItem::new(ItemId::new(), *name, "Lenovo", *quantity, "pcs") {
                Ok(item) => {
                    ids.push(item.id());
                    items.push(item);
                }
                Err(error) => panic!("item must construct: {error}"),
            }
        }

        let input = RequestInput {
            id: RequestId::new(),
            requester: "requester-1".to_owned(),
            items,
            submitted_at: Utc::now(),
        };
        match Request::submit(input) {
            Ok(request) => (request, ids),
            Err(error) => panic!("request must construct: {error}"),
        }
    }

    #[test]
    fn cross_item_tag_collision_fails_the_whole_batch() {
        let (request, ids) = arrived_request(&[("Laptop", 1), ("Monitor", 1)]);
        let lines = vec![
            StagingLine {
                item_id: ids[0],
                quantity: 1,
                reason: None,
                asset_tags: vec![tag("SN-1")],
            },
            StagingLine {
                item_id: ids[1],
                quantity: 1,
                reason: None,
                asset_tags: vec![tag("SN-1")],
            },
        ];

        let result = apply_staging(&request, &catalog(), &BTreeMap::new(), &lines);
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_tag_within_one_line_is_rejected() {
        let (request, ids) = arrived_request(&[("Laptop", 2)]);
        let lines = vec![StagingLine {
            item_id: ids[0],
            quantity: 2,
            reason: None,
            asset_tags: vec![tag("SN-1"), tag("SN-1")],
        }];

        let result = apply_staging(&request, &catalog(), &BTreeMap::new(), &lines);
        assert!(result.is_err());
    }

    #[test]
    fn serialized_line_requires_one_tag_per_unit() {
        let (request, ids) = arrived_request(&[("Laptop", 2)]);
        let lines = vec![StagingLine {
            item_id: ids[0],
            quantity: 2,
            reason: None,
            asset_tags: vec![tag("SN-1")],
        }];

        let result = apply_staging(&request, &catalog(), &BTreeMap::new(), &lines);
        assert!(result.is_err());
    }

    #[test]
    fn bulk_shortfall_fails_without_partial_allocation() {
        let (request, ids) = arrived_request(&[("HDMI Cable", 10)]);
        let stock = BTreeMap::from([(ids[0], 7)]);
        let lines = vec![StagingLine {
            item_id: ids[0],
            quantity: 10,
            reason: None,
            asset_tags: Vec::new(),
        }];

        let result = apply_staging(&request, &catalog(), &stock, &lines);
        assert!(result.is_err());
    }

    #[test]
    fn bulk_line_within_stock_registers_the_count() {
        let (request, ids) = arrived_request(&[("HDMI Cable", 10)]);
        let stock = BTreeMap::from([(ids[0], 12)]);
        let lines = vec![StagingLine {
            item_id: ids[0],
            quantity: 10,
            reason: None,
            asset_tags: Vec::new(),
        }];

        let result = apply_staging(&request, &catalog(), &stock, &lines);
        assert!(result.is_ok_and(|increments| increments.get(&ids[0]) == Some(&10)));
    }

    #[test]
    fn partial_staging_requires_a_reason() {
        let (request, ids) = arrived_request(&[("Laptop", 3)]);
        let without_reason = vec![StagingLine {
            item_id: ids[0],
            quantity: 1,
            reason: None,
            asset_tags: vec![tag("SN-1")],
        }];
        let result = apply_staging(&request, &catalog(), &BTreeMap::new(), &without_reason);
        assert!(result.is_err());

        let with_reason = vec![StagingLine {
            item_id: ids[0],
            quantity: 1,
            reason: Some("remaining units arrive next week".to_owned()),
            asset_tags: vec![tag("SN-1")],
        }];
        let result = apply_staging(&request, &catalog(), &BTreeMap::new(), &with_reason);
        assert!(result.is_ok());
    }

    #[test]
    fn handover_accumulates_up_to_the_effective_quantity() {
        let (request, ids) = arrived_request(&[("Laptop", 3)]);
        let first = apply_handover(
            &request,
            &[HandoverLine {
                item_id: ids[0],
                quantity: 2,
            }],
        );
        assert!(first.is_ok());

        let too_many = apply_handover(
            &request,
            &[HandoverLine {
                item_id: ids[0],
                quantity: 4,
            }],
        );
        assert!(too_many.is_err());
    }
}
