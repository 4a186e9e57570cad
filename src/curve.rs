//! Field and curve aliases for the secp256k1 group used throughout this crate.
//!
//! The spec treats the finite-field/elliptic-curve arithmetic library as an
//! external collaborator; this module is the one place that names the
//! concrete library (`ark_secp256k1`) so the rest of the crate can speak in
//! terms of `Fn`/`Point` only.

use ark_ec::short_weierstrass::SWCurveConfig;
use ark_ff::PrimeField;

/// An element of the secp256k1 scalar field.
pub type Fn = ark_secp256k1::Fr;

/// A secp256k1 group element in affine form.
pub type Point = ark_ec::short_weierstrass::Affine<ark_secp256k1::Config>;

/// The canonical base point `G`.
pub fn generator() -> Point {
    ark_secp256k1::Config::GENERATOR
}

/// Validates a caller-supplied Pedersen parameter `h`.
///
/// Rejects the two cheap-to-detect degenerate cases: the identity element
/// and the base point itself. A full check that `h` carries no known
/// discrete-log relation to `G` requires the derivation transcript and is
/// the caller's responsibility (`spec.md` §1 Non-goals, §9).
pub fn validate_pedersen_h(h: &Point) -> bool {
    use ark_ec::AffineRepr;
    !h.is_zero() && *h != generator()
}

/// Decodes a SHA-256 digest as a big-endian scalar, reduced modulo the
/// group order. Used by the Fiat-Shamir challenge in [`crate::zkp`].
pub fn scalar_from_digest(digest: &[u8; 32]) -> Fn {
    Fn::from_be_bytes_mod_order(digest)
}
