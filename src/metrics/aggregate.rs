//! Grouping of raw connector rows by ad identity.
//!
//! The connector can report the same ad several times (once per hierarchy
//! level or breakdown). Rows sharing an [`AdKey`] are merged into one
//! [`AdGroup`] whose summable fields hold the totals.

use std::collections::HashMap;

use crate::domain::{AdKey, RawAdRow, StatusFilter};
use crate::metrics::ratios::{AdMetrics, ad_status};

/// Numeric fields that are summed when rows merge.
///
/// Both naming variants the connector uses for spend/purchases/revenue are
/// listed so totals stay correct whichever one a source returns.
pub const SUMMABLE_FIELDS: [&str; 14] = [
    "totalcost",
    "spend",
    "actions_omni_purchase",
    "actions_offsite_conversion_fb_pixel_purchase",
    "action_values_omni_purchase",
    "action_values_offsite_conversion_fb_pixel_purchase",
    "revenue",
    "impressions",
    "clicks",
    "cpm",
    "cpc",
    "ctr",
    "roas",
    "cpa",
];

/// One logical ad after merging.
#[derive(Debug, Clone, PartialEq)]
pub struct AdGroup {
    pub key: AdKey,
    /// The first row seen for `key`, with summable fields replaced by totals.
    pub row: RawAdRow,
    /// How many raw rows were merged into this group.
    pub merged: usize,
    /// Base metrics resolved per member row, then summed.
    totals: AdMetrics,
}

impl AdGroup {
    pub fn metrics(&self) -> AdMetrics {
        self.totals
    }
}

/// Merge rows sharing an ad identity, summing [`SUMMABLE_FIELDS`].
///
/// Groups come back in first-seen order. Input rows are never modified.
pub fn aggregate(rows: &[RawAdRow]) -> Vec<AdGroup> {
    let mut groups: Vec<AdGroup> = Vec::new();
    let mut index: HashMap<AdKey, usize> = HashMap::new();

    for row in rows {
        let key = AdKey::of(row);
        match index.get(&key) {
            Some(&i) => merge_into(&mut groups[i], row),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(AdGroup {
                    key,
                    row: row.clone(),
                    merged: 1,
                    totals: AdMetrics::from_row(row),
                });
            }
        }
    }

    groups
}

fn merge_into(group: &mut AdGroup, row: &RawAdRow) {
    for field in SUMMABLE_FIELDS {
        let Some(add) = row.number(field) else {
            continue;
        };
        let current = group.row.number(field).unwrap_or(0.0);
        group.row.set_number(field, current + add);
    }
    group.totals += AdMetrics::from_row(row);
    group.merged += 1;
}

/// Order groups by purchase count, highest first. Ties keep their order.
pub fn sort_by_purchases(groups: &mut [AdGroup]) {
    groups.sort_by(|a, b| {
        b.metrics()
            .purchases
            .partial_cmp(&a.metrics().purchases)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Keep only groups whose status passes `filter`.
pub fn filter_by_status(groups: Vec<AdGroup>, filter: StatusFilter) -> Vec<AdGroup> {
    groups
        .into_iter()
        .filter(|g| filter.matches(ad_status(&g.row)))
        .collect()
}
