//! Base metrics and the ratios derived from them.
//!
//! A ratio whose divisor is zero is `None` ("unavailable"), never NaN.

use std::ops::{Add, AddAssign};

use crate::domain::{AdStatus, RawAdRow};
use crate::metrics::aggregate::AdGroup;

/// Field names tried, in order, for each base metric.
pub const SPEND_FIELDS: [&str; 2] = ["totalcost", "spend"];
pub const PURCHASE_FIELDS: [&str; 2] = [
    "actions_omni_purchase",
    "actions_offsite_conversion_fb_pixel_purchase",
];
pub const REVENUE_FIELDS: [&str; 3] = [
    "action_values_omni_purchase",
    "action_values_offsite_conversion_fb_pixel_purchase",
    "revenue",
];

/// The (spend, purchases, revenue) triple every ratio is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdMetrics {
    pub spend: f64,
    pub purchases: f64,
    pub revenue: f64,
}

impl AdMetrics {
    pub fn new(spend: f64, purchases: f64, revenue: f64) -> Self {
        Self {
            spend,
            purchases,
            revenue,
        }
    }

    /// Read the base metrics from a row; missing or non-numeric fields count as 0.
    pub fn from_row(row: &RawAdRow) -> Self {
        Self {
            spend: first_number(row, &SPEND_FIELDS),
            purchases: first_number(row, &PURCHASE_FIELDS),
            revenue: first_number(row, &REVENUE_FIELDS),
        }
    }

    /// Cost per acquisition.
    pub fn cpa(&self) -> Option<f64> {
        (self.purchases > 0.0).then(|| self.spend / self.purchases)
    }

    /// Return on ad spend.
    pub fn roas(&self) -> Option<f64> {
        (self.spend > 0.0).then(|| self.revenue / self.spend)
    }

    pub fn average_order_value(&self) -> Option<f64> {
        (self.purchases > 0.0).then(|| self.revenue / self.purchases)
    }
}

impl Add for AdMetrics {
    type Output = AdMetrics;

    fn add(self, rhs: AdMetrics) -> AdMetrics {
        AdMetrics {
            spend: self.spend + rhs.spend,
            purchases: self.purchases + rhs.purchases,
            revenue: self.revenue + rhs.revenue,
        }
    }
}

impl AddAssign for AdMetrics {
    fn add_assign(&mut self, rhs: AdMetrics) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for AdMetrics {
    fn sum<I: Iterator<Item = AdMetrics>>(iter: I) -> AdMetrics {
        iter.fold(AdMetrics::default(), |acc, m| acc + m)
    }
}

fn first_number(row: &RawAdRow, names: &[&str]) -> f64 {
    names
        .iter()
        .find_map(|name| row.number(name))
        .unwrap_or(0.0)
}

/// An ad is ON iff its ad-level `status` uppercases to exactly `ACTIVE`.
///
/// Campaign and adset statuses are not consulted.
pub fn ad_status(row: &RawAdRow) -> AdStatus {
    match row.status() {
        Some(s) if s.to_uppercase() == "ACTIVE" => AdStatus::On,
        _ => AdStatus::Off,
    }
}

/// Totals shown on the summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub metrics: AdMetrics,
    pub rows: usize,
    pub ads: usize,
    pub ads_on: usize,
}

impl Summary {
    /// Summarize a raw row list: base metrics are summed over every row,
    /// ad counts come from the grouped view.
    pub fn from_rows(rows: &[RawAdRow], groups: &[AdGroup]) -> Self {
        let metrics = rows.iter().map(AdMetrics::from_row).sum();
        let ads_on = groups
            .iter()
            .filter(|g| ad_status(&g.row) == AdStatus::On)
            .count();
        Self {
            metrics,
            rows: rows.len(),
            ads: groups.len(),
            ads_on,
        }
    }

    pub fn ads_off(&self) -> usize {
        self.ads - self.ads_on
    }
}
