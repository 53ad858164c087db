//! Big-integer primitives for RSA: modular exponentiation and the
//! octet-string conversions from PKCS#1 (OS2IP / I2OSP).

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// `base^exponent mod modulus` by right-to-left square-and-multiply.
///
/// `modulus` must be non-zero. The result is always `< modulus`.
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    if modulus.is_one() {
        return BigUint::zero();
    }

    let mut result = BigUint::one();
    let mut square = base % modulus;
    let mut exp = exponent.clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &square) % modulus;
        }
        exp >>= 1u32;
        if !exp.is_zero() {
            square = (&square * &square) % modulus;
        }
    }

    result
}

/// Interpret big-endian bytes as an unsigned integer.
pub fn os2ip(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Encode `value` as exactly `len` big-endian bytes, left-padded with zeros.
///
/// Returns `None` if `value` needs more than `len` bytes.
pub fn i2osp(value: &BigUint, len: usize) -> Option<Vec<u8>> {
    if value.is_zero() {
        return Some(vec![0u8; len]);
    }
    let digits = value.to_bytes_be();
    if digits.len() > len {
        return None;
    }
    let mut out = vec![0u8; len];
    out[len - digits.len()..].copy_from_slice(&digits);
    Some(out)
}
