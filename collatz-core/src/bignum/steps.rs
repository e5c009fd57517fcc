use common::constants::{LIMB_BITS, ODD_STEP_HEADROOM_LIMIT};

use super::BigUnsigned;

impl BigUnsigned {
    /// Replaces an odd `n > 1` with `(3n + 1) / 2` and returns the two steps
    /// this accounts for.
    ///
    /// `3n + 1` is always even for odd `n`, so the multiply-add and the halving
    /// share one sweep over the limbs: once limb `i` holds its share of
    /// `3n + 1`, its low bit is shifted into the top of limb `i - 1`.
    #[inline]
    pub fn apply_odd_step(&mut self) -> u64 {
        debug_assert!(
            self.is_odd() && !self.is_one(),
            "odd step applied to {self:?}"
        );

        // 3 * top + carry must not leave the top limb.
        if self.limbs[self.limbs.len() - 1] > ODD_STEP_HEADROOM_LIMIT {
            self.limbs.push(0);
        }

        let limbs = &mut self.limbs;
        let mut acc = 3 * u128::from(limbs[0]) + 1;
        limbs[0] = acc as u64;
        acc >>= LIMB_BITS;
        for i in 1..limbs.len() {
            acc += 3 * u128::from(limbs[i]);
            limbs[i] = acc as u64;
            acc >>= LIMB_BITS;
            limbs[i - 1] = (limbs[i - 1] >> 1) | (limbs[i] << (LIMB_BITS - 1));
        }
        debug_assert_eq!(acc, 0);

        let top = limbs.len() - 1;
        limbs[top] >>= 1;
        self.normalize();
        2
    }

    /// Divides an even, non-zero `n` by the largest power of two dividing it
    /// and returns that exponent `v`.
    ///
    /// Also raises `max_zero_run` to `v + 1` if that is larger.
    #[inline]
    pub fn apply_even_step(&mut self, max_zero_run: &mut u64) -> u64 {
        debug_assert!(
            !self.is_zero() && !self.is_odd(),
            "even step applied to {self:?}"
        );

        let mut valuation = 0u64;

        // Whole zero limbs are rare; drop them in one go.
        if self.limbs[0] == 0 {
            let zero_limbs = self.limbs.iter().take_while(|&&limb| limb == 0).count();
            self.limbs.drain(..zero_limbs);
            valuation += u64::from(LIMB_BITS) * zero_limbs as u64;
        }

        let shift = self.limbs[0].trailing_zeros();
        if shift > 0 {
            let limbs = &mut self.limbs;
            let carry_shift = LIMB_BITS - shift;
            for i in 0..limbs.len() - 1 {
                limbs[i] = (limbs[i] >> shift) | (limbs[i + 1] << carry_shift);
            }
            let top = limbs.len() - 1;
            limbs[top] >>= shift;
            self.normalize();
            valuation += u64::from(shift);
        }

        *max_zero_run = (*max_zero_run).max(valuation + 1);
        valuation
    }
}
