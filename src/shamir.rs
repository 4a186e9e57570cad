//! Shamir shares, Pedersen-verifiable shares, and polynomial commitments.
//!
//! The spec treats these as primitives belonging to an external Shamir
//! share/commitment library; this module gives this crate its own small,
//! self-contained copy of exactly the surface `MulOpen`/`Inverter` need
//! (evaluation, verification, interpolation, and the componentwise
//! arithmetic used to combine a product share with an RZG mask share).

use std::ops::Add;

use ark_ec::CurveGroup;
use ark_ff::Field;
use ark_std::ops::Mul;

use crate::curve::{generator, Fn, Point};
use crate::wire::{Marshal, Unmarshal, WireError};

/// A single Shamir share `(index, value)` of a degree-`k-1` polynomial.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Share {
    pub index: Fn,
    pub value: Fn,
}

/// A Pedersen-verifiable share: a Shamir share plus the decommitment that
/// lets it be checked against a [`Commitment`] without revealing `value`
/// in isolation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VerifiableShare {
    pub share: Share,
    pub decommitment: Fn,
}

impl VerifiableShare {
    /// Checks `value*G + decommitment*H == commitment.evaluate(index)`.
    pub fn verify(&self, commitment: &Commitment, h: &Point) -> bool {
        let expected = commitment.evaluate(&self.share.index);
        let actual = (generator().mul(self.share.value) + h.mul(self.decommitment)).into_affine();
        expected == actual
    }
}

impl Add for VerifiableShare {
    type Output = VerifiableShare;

    /// Componentwise addition: values add, decommitments add, indices must
    /// already agree (both shares belong to the same evaluation point).
    fn add(self, rhs: VerifiableShare) -> VerifiableShare {
        assert_eq!(
            self.share.index, rhs.share.index,
            "cannot add verifiable shares at different indices"
        );
        VerifiableShare {
            share: Share {
                index: self.share.index,
                value: self.share.value + rhs.share.value,
            },
            decommitment: self.decommitment + rhs.decommitment,
        }
    }
}

impl Marshal for Share {
    fn size_hint(&self) -> usize {
        self.index.size_hint() + self.value.size_hint()
    }

    fn marshal(&self, buf: &mut Vec<u8>, remaining: usize) -> Result<usize, WireError> {
        let mut used = self.index.marshal(buf, remaining)?;
        used += self.value.marshal(buf, remaining - used)?;
        Ok(used)
    }
}

impl Unmarshal for Share {
    fn unmarshal(buf: &[u8], remaining: usize) -> Result<(Self, usize), WireError> {
        let (index, n) = Fn::unmarshal(buf, remaining)?;
        let (value, n2) = Fn::unmarshal(&buf[n..], remaining - n)?;
        Ok((Share { index, value }, n + n2))
    }
}

impl Marshal for VerifiableShare {
    fn size_hint(&self) -> usize {
        self.share.size_hint() + self.decommitment.size_hint()
    }

    fn marshal(&self, buf: &mut Vec<u8>, remaining: usize) -> Result<usize, WireError> {
        let mut used = self.share.marshal(buf, remaining)?;
        used += self.decommitment.marshal(buf, remaining - used)?;
        Ok(used)
    }
}

impl Unmarshal for VerifiableShare {
    fn unmarshal(buf: &[u8], remaining: usize) -> Result<(Self, usize), WireError> {
        let (share, n) = Share::unmarshal(buf, remaining)?;
        let (decommitment, n2) = Fn::unmarshal(&buf[n..], remaining - n)?;
        Ok((
            VerifiableShare {
                share,
                decommitment,
            },
            n + n2,
        ))
    }
}

/// An ordered sequence of Pedersen commitments to a polynomial's
/// coefficients, lowest degree first: `commitment[j]` commits to the
/// coefficient of `x^j`.
pub type Commitment = Vec<Point>;

/// Evaluation and scaling helpers for [`Commitment`].
pub trait CommitmentEval {
    /// Evaluates the committed polynomial at `x` via Horner's method.
    fn evaluate(&self, x: &Fn) -> Point;

    /// Scales every coefficient commitment by `scalar`, yielding the
    /// commitment to the scaled polynomial.
    fn scale(&self, scalar: &Fn) -> Commitment;
}

impl CommitmentEval for Commitment {
    fn evaluate(&self, x: &Fn) -> Point {
        let mut acc = ark_ec::short_weierstrass::Projective::<ark_secp256k1::Config>::default();
        for coeff in self.iter().rev() {
            acc = acc.mul(*x) + *coeff;
        }
        acc.into_affine()
    }

    fn scale(&self, scalar: &Fn) -> Commitment {
        self.iter().map(|p| (*p).mul(*scalar).into_affine()).collect()
    }
}

/// Lagrange-interpolates the batch of shares at `x = 0`, returning the
/// reconstructed secret. Callers are responsible for having collected a
/// sufficient, index-distinct set of shares; this function performs a
/// plain (non-verifiable) Shamir open, as the spec's `MulOpen` mandates
/// (correctness rests on the earlier Pedersen check of every share).
pub fn interpolate_at_zero(shares: &[Share]) -> Fn {
    let mut secret = Fn::from(0u64);
    for (i, share_i) in shares.iter().enumerate() {
        let mut numerator = Fn::from(1u64);
        let mut denominator = Fn::from(1u64);
        for (j, share_j) in shares.iter().enumerate() {
            if i == j {
                continue;
            }
            numerator *= -share_j.index;
            denominator *= share_i.index - share_j.index;
        }
        secret += share_i.value * numerator * denominator.inverse().expect(
            "duplicate indices in interpolation set: Shamir share indices must be distinct",
        );
    }
    secret
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::UniformRand;

    fn random_polynomial_commitment(
        coeffs: &[Fn],
        h_coeffs: &[Fn],
        h: &Point,
    ) -> Commitment {
        coeffs
            .iter()
            .zip(h_coeffs.iter())
            .map(|(c, r)| (generator().mul(*c) + h.mul(*r)).into_affine())
            .collect()
    }

    fn eval_scalar_poly(coeffs: &[Fn], x: &Fn) -> Fn {
        let mut acc = Fn::from(0u64);
        for c in coeffs.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    #[test]
    fn commitment_evaluates_like_the_scalar_polynomial() {
        let mut rng = ark_std::test_rng();
        let h: Point = generator().mul(Fn::rand(&mut rng)).into_affine();
        let coeffs: Vec<Fn> = (0..4).map(|_| Fn::rand(&mut rng)).collect();
        let h_coeffs: Vec<Fn> = (0..4).map(|_| Fn::rand(&mut rng)).collect();
        let commitment = random_polynomial_commitment(&coeffs, &h_coeffs, &h);

        let x = Fn::rand(&mut rng);
        let expected_value = eval_scalar_poly(&coeffs, &x);
        let expected_decom = eval_scalar_poly(&h_coeffs, &x);
        let expected_point = (generator().mul(expected_value) + h.mul(expected_decom)).into_affine();

        assert_eq!(commitment.evaluate(&x), expected_point);
    }

    #[test]
    fn interpolation_recovers_constant_term() {
        let mut rng = ark_std::test_rng();
        let k = 4;
        let coeffs: Vec<Fn> = (0..k).map(|_| Fn::rand(&mut rng)).collect();
        let secret = coeffs[0];

        let shares: Vec<Share> = (1..=k as u64)
            .map(|i| {
                let index = Fn::from(i);
                Share {
                    index,
                    value: eval_scalar_poly(&coeffs, &index),
                }
            })
            .collect();

        assert_eq!(interpolate_at_zero(&shares), secret);
    }

    #[test]
    fn verifiable_share_addition_is_componentwise() {
        let mut rng = ark_std::test_rng();
        let index = Fn::rand(&mut rng);
        let a = VerifiableShare {
            share: Share {
                index,
                value: Fn::rand(&mut rng),
            },
            decommitment: Fn::rand(&mut rng),
        };
        let b = VerifiableShare {
            share: Share {
                index,
                value: Fn::rand(&mut rng),
            },
            decommitment: Fn::rand(&mut rng),
        };
        let c = a + b;
        assert_eq!(c.share.value, a.share.value + b.share.value);
        assert_eq!(c.decommitment, a.decommitment + b.decommitment);
    }
}
