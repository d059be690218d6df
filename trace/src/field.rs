//! The prime field every trace cell lives in.

use ark_ff::{One, Zero};

/// Scalar field of BN254.
pub type FF = ark_bn254::Fr;

/// Lifts a `u32` into the field.
#[inline]
pub fn ff_u32(value: u32) -> FF {
    FF::from(value)
}

/// Lifts a boolean flag into the field as `0` or `1`.
#[inline]
pub fn ff_bool(flag: bool) -> FF {
    if flag {
        FF::one()
    } else {
        FF::zero()
    }
}

#[cfg(test)]
mod tests {
    use ark_ff::Field;

    use super::*;

    #[test]
    fn test_bool_lift() {
        assert_eq!(ff_bool(true), FF::one());
        assert_eq!(ff_bool(false), FF::zero());
    }

    #[test]
    fn test_inverse_round_trip() {
        let b = ff_u32(136);
        let inv = b.inverse().unwrap();
        assert_eq!(b * inv, FF::one());
        assert_eq!(ff_u32(23) * inv * b, ff_u32(23));
    }
}
