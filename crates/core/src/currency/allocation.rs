//! Even splitting of shared spending using the Largest Remainder Method.
//!
//! Splitting 100 three ways at 4 decimal places gives
//! `[33.3334, 33.3333, 33.3333]`: every part is rounded toward zero and the
//! leftover units go to the first recipients, so the parts always sum to the
//! original total and no cents are lost or gained.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Allocation utility for distributing amounts.
pub struct AllocationUtil;

impl AllocationUtil {
    /// Allocate amount equally across N recipients using Largest Remainder Method.
    ///
    /// Ensures sum of allocations EXACTLY equals the total rounded to
    /// `decimal_places`. Negative totals (refunds) are split symmetrically.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use apunta_core::currency::AllocationUtil;
    ///
    /// // 100 / 3 = [33.34, 33.33, 33.33], sum = 100.00
    /// let result = AllocationUtil::allocate_equal(dec!(100), 3, 2);
    /// assert_eq!(result.iter().sum::<rust_decimal::Decimal>(), dec!(100));
    /// ```
    #[must_use]
    pub fn allocate_equal(total: Decimal, count: usize, decimal_places: u32) -> Vec<Decimal> {
        if count == 0 {
            return vec![];
        }
        if total.is_sign_negative() {
            return Self::allocate_equal(-total, count, decimal_places)
                .into_iter()
                .map(|part| -part)
                .collect();
        }

        let total_rounded =
            total.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven);
        if count == 1 {
            return vec![total_rounded];
        }

        let count_dec = Decimal::from(count as u64);
        let unit = Decimal::new(1, decimal_places);

        let base = (total_rounded / count_dec)
            .round_dp_with_strategy(decimal_places, RoundingStrategy::ToZero);
        let remainder = total_rounded - base * count_dec;

        // How many recipients get an extra unit
        let extra_count = (remainder / unit)
            .round_dp_with_strategy(0, RoundingStrategy::ToZero)
            .to_u64()
            .unwrap_or(0);
        let extra_count = usize::try_from(extra_count).unwrap_or(0);

        (0..count)
            .map(|i| if i < extra_count { base + unit } else { base })
            .collect()
    }
}
