//! # Finance Module
//!
//! Derived financial calculations for maintenance jobs.
//!
//! ## The One Place Money Is Computed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Derived Financials                                   │
//! │                                                                         │
//! │  total part cost ──┐                                                   │
//! │                    │                                                    │
//! │  amount charged ───┼──► derive_financials() ──► profit                 │
//! │                    │                            tech commission        │
//! │  tech percent ─────┘                            shop profit            │
//! │                                                                         │
//! │  profit          = amount charged − part cost   (may be NEGATIVE)     │
//! │  tech commission = max(0, profit × percent)     (never negative)       │
//! │  shop profit     = profit − tech commission                            │
//! │                                                                         │
//! │  These three values are NEVER edited directly. Whenever any input      │
//! │  changes, the job repository recomputes all of them.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Asymmetry (Intentional!)
//!
//! [`derive_financials`] applies **no rounding and no floor on profit** -
//! rounding is the caller's responsibility, and a losing repair legitimately
//! produces a negative profit and a negative shop profit.
//!
//! The legacy helpers ([`calc_profit`], [`calc_tech_commission`],
//! [`calc_shop_profit`]) round to 2 decimals and `calc_profit` floors at
//! zero. Older call sites depend on both behaviors, so the two families
//! coexist and must NOT be unified.

use serde::{Deserialize, Serialize};

use crate::types::Part;

// =============================================================================
// Derived Financials
// =============================================================================

/// The three derived values recomputed on every relevant job write.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Derived {
    /// Gross profit: amount charged minus total part cost. May be negative.
    pub profit: f64,
    /// Technician commission: `max(0, profit × percent)`. Never negative,
    /// even when the job loses money.
    pub tech_commission: f64,
    /// What the shop keeps: profit minus technician commission.
    pub shop_profit: f64,
}

/// Computes profit, technician commission, and shop profit.
///
/// Pure function, no rounding. Non-finite inputs are treated as 0
/// (a job without an explicit commission rate pays no commission).
///
/// ## Examples
/// ```rust
/// use dukkan_core::finance::derive_financials;
///
/// // Profitable repair, 30% commission
/// let d = derive_financials(50.0, 200.0, 0.3);
/// assert_eq!(d.profit, 150.0);
/// assert_eq!(d.tech_commission, 45.0);
/// assert_eq!(d.shop_profit, 105.0);
///
/// // Losing repair: profit goes negative, commission is floored at 0
/// let d = derive_financials(100.0, 80.0, 0.5);
/// assert_eq!(d.profit, -20.0);
/// assert_eq!(d.tech_commission, 0.0);
/// assert_eq!(d.shop_profit, -20.0);
/// ```
pub fn derive_financials(part_cost: f64, amount_charged: f64, tech_percent: f64) -> Derived {
    let pc = coerce(part_cost);
    let ac = coerce(amount_charged);
    let tp = coerce(tech_percent);

    let profit = ac - pc;
    let tech_commission = (profit * tp).max(0.0);
    let shop_profit = profit - tech_commission;

    Derived {
        profit,
        tech_commission,
        shop_profit,
    }
}

/// Resolves the effective total part cost for a job write.
///
/// ## Precedence
/// ```text
/// 1. parts[]        - non-empty part list: sum of part costs
/// 2. explicit total - caller-provided totalPartCost
/// 3. legacy cost    - single partCost from the old schema
/// 4. zero
/// ```
///
/// Used identically by create and by update (update applies it twice:
/// patch fields first, then the stored job's fields).
pub fn total_part_cost(
    parts: Option<&[Part]>,
    explicit_total: Option<f64>,
    legacy_part_cost: Option<f64>,
) -> Option<f64> {
    if let Some(parts) = parts {
        if !parts.is_empty() {
            return Some(parts.iter().map(Part::cost).sum());
        }
    }
    if let Some(total) = explicit_total {
        return Some(coerce(total));
    }
    legacy_part_cost.map(coerce)
}

// =============================================================================
// Legacy Helpers (2-decimal rounding, kept for older call sites)
// =============================================================================

/// Legacy profit: floored at zero and rounded to 2 decimals.
///
/// Unlike [`derive_financials`], this can never report a loss. Kept for
/// backward compatibility; do not fold into the primary calculator.
pub fn calc_profit(part_cost: f64, amount_charged: f64) -> f64 {
    round2(amount_charged - part_cost).max(0.0)
}

/// Legacy technician commission: rounded to 2 decimals, no floor.
pub fn calc_tech_commission(profit: f64, percent: f64) -> f64 {
    round2(profit * percent)
}

/// Legacy shop profit: rounded to 2 decimals.
pub fn calc_shop_profit(profit: f64, tech_commission: f64) -> f64 {
    round2(profit - tech_commission)
}

/// Rounds to 2 decimal places (currency display precision).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// NaN/infinity guard: broken numeric input counts as zero.
fn coerce(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profitable_job() {
        let d = derive_financials(50.0, 200.0, 0.3);
        assert_eq!(d.profit, 150.0);
        assert_eq!(d.tech_commission, 45.0);
        assert_eq!(d.shop_profit, 105.0);
    }

    #[test]
    fn test_losing_job_floors_commission_not_profit() {
        let d = derive_financials(100.0, 80.0, 0.5);
        assert_eq!(d.profit, -20.0);
        assert_eq!(d.tech_commission, 0.0);
        assert_eq!(d.shop_profit, -20.0);
    }

    #[test]
    fn test_zero_percent_means_no_commission() {
        let d = derive_financials(10.0, 100.0, 0.0);
        assert_eq!(d.profit, 90.0);
        assert_eq!(d.tech_commission, 0.0);
        assert_eq!(d.shop_profit, 90.0);
    }

    #[test]
    fn test_non_finite_inputs_coerce_to_zero() {
        let d = derive_financials(f64::NAN, 100.0, f64::INFINITY);
        assert_eq!(d.profit, 100.0);
        assert_eq!(d.tech_commission, 0.0);
        assert_eq!(d.shop_profit, 100.0);
    }

    /// Invariant: shop_profit == profit − tech_commission exactly, and the
    /// commission is never negative, for any non-negative inputs.
    #[test]
    fn test_identity_holds_without_rounding() {
        let cases = [
            (0.0, 0.0, 0.0),
            (33.33, 99.99, 0.25),
            (120.0, 100.0, 1.0),
            (10.5, 10.5, 0.5),
            (0.01, 1000.0, 0.33),
        ];
        for (pc, ac, tp) in cases {
            let d = derive_financials(pc, ac, tp);
            assert!(d.tech_commission >= 0.0, "commission negative for {pc}/{ac}/{tp}");
            assert_eq!(d.shop_profit, d.profit - d.tech_commission);
        }
    }

    #[test]
    fn test_legacy_profit_floors_and_rounds() {
        // Legacy helper floors at 0 where the primary calculator goes negative
        assert_eq!(calc_profit(100.0, 80.0), 0.0);
        assert_eq!(calc_profit(100.0, 100.55), 0.55);
        // Primary calculator keeps the raw difference
        assert_eq!(derive_financials(100.0, 80.0, 0.0).profit, -20.0);
    }

    #[test]
    fn test_legacy_helpers_round_to_two_decimals() {
        assert_eq!(calc_tech_commission(99.99, 0.333), 33.3);
        assert_eq!(calc_shop_profit(99.99, 33.3), 66.69);
    }

    #[test]
    fn test_total_part_cost_precedence() {
        let parts = vec![
            Part {
                part_name: Some("screen".into()),
                part_cost: Some(30.0),
                rep_id: Some("R1".into()),
                rep_name: None,
            },
            Part {
                part_name: Some("battery".into()),
                part_cost: None, // broken cost counts as 0
                rep_id: None,
                rep_name: None,
            },
        ];

        // Non-empty parts win over everything
        assert_eq!(
            total_part_cost(Some(&parts), Some(999.0), Some(888.0)),
            Some(30.0)
        );
        // Empty parts fall through to the explicit total
        assert_eq!(total_part_cost(Some(&[]), Some(40.0), Some(888.0)), Some(40.0));
        // Then the legacy single cost
        assert_eq!(total_part_cost(None, None, Some(25.0)), Some(25.0));
        // Nothing at all
        assert_eq!(total_part_cost(None, None, None), None);
    }
}
