//! Wire-codec behavior exercised against the public API, as opposed to
//! the scalar/point/sequence unit tests that live next to the codec
//! itself in `src/wire.rs`.

use ark_ec::CurveGroup;
use ark_std::{ops::Mul, UniformRand};
use mulopen_invert::curve::{generator, Fn, Point};
use mulopen_invert::mulopen::{Message, MulOpen};
use mulopen_invert::shamir::{Commitment, Share, VerifiableShare};
use mulopen_invert::{Marshal, Unmarshal};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn eval_poly(coeffs: &[Fn], x: &Fn) -> Fn {
    let mut acc = Fn::from(0u64);
    for c in coeffs.iter().rev() {
        acc = acc * x + c;
    }
    acc
}

fn share_secret(
    rng: &mut StdRng,
    secret: Fn,
    degree: usize,
    indices: &[Fn],
    h: Point,
) -> (Vec<VerifiableShare>, Commitment) {
    let mut coeffs = vec![secret];
    let mut h_coeffs = vec![Fn::rand(rng)];
    for _ in 1..degree {
        coeffs.push(Fn::rand(rng));
        h_coeffs.push(Fn::rand(rng));
    }
    let commitment: Commitment = coeffs
        .iter()
        .zip(h_coeffs.iter())
        .map(|(c, r)| (generator().mul(*c) + h.mul(*r)).into_affine())
        .collect();

    let shares = indices
        .iter()
        .map(|&index| VerifiableShare {
            share: Share {
                index,
                value: eval_poly(&coeffs, &index),
            },
            decommitment: eval_poly(&h_coeffs, &index),
        })
        .collect();
    (shares, commitment)
}

fn build_first_message(rng: &mut StdRng, n: usize, k: usize) -> Message {
    let h: Point = generator().mul(Fn::rand(rng)).into_affine();
    let indices: Vec<Fn> = (1..=n as u64).map(Fn::from).collect();
    let k_open = 2 * k - 1;

    let a_secret = Fn::rand(rng);
    let b_secret = Fn::rand(rng);
    let (a_shares, a_commitment) = share_secret(rng, a_secret, k, &indices, h);
    let (b_shares, b_commitment) = share_secret(rng, b_secret, k, &indices, h);
    let (z_shares, z_commitment) =
        share_secret(rng, Fn::from(0u64), k_open, &indices, h);

    let (_mulopen, messages) = MulOpen::new(
        rng,
        vec![a_shares[0]],
        vec![b_shares[0]],
        vec![z_shares[0]],
        vec![a_commitment],
        vec![b_commitment],
        vec![z_commitment],
        indices,
        h,
    );
    messages.into_iter().next().unwrap()
}

#[test]
fn message_round_trips_through_the_wire_codec() {
    let mut rng = StdRng::seed_from_u64(7001);
    let message = build_first_message(&mut rng, 9, 3);

    let mut buf = Vec::new();
    let written = message.marshal(&mut buf, message.size_hint()).unwrap();
    assert_eq!(written, message.size_hint());

    let (decoded, read) = Message::unmarshal(&buf, buf.len()).unwrap();
    assert_eq!(read, written);
    assert_eq!(decoded, message);
}

#[test]
fn message_marshal_fails_under_its_own_size_hint() {
    let mut rng = StdRng::seed_from_u64(7002);
    let message = build_first_message(&mut rng, 9, 3);

    let mut buf = Vec::new();
    let err = message.marshal(&mut buf, message.size_hint() - 1);
    assert!(err.is_err());
    assert!(buf.is_empty() || buf.len() < message.size_hint());
}

#[test]
fn mulopen_state_round_trips_through_the_wire_codec() {
    let mut rng = StdRng::seed_from_u64(7003);
    let n = 7;
    let k = 2;
    let h: Point = generator().mul(Fn::rand(&mut rng)).into_affine();
    let indices: Vec<Fn> = (1..=n as u64).map(Fn::from).collect();
    let k_open = 2 * k - 1;

    let a_secret = Fn::rand(&mut rng);
    let b_secret = Fn::rand(&mut rng);
    let (a_shares, a_commitment) = share_secret(&mut rng, a_secret, k, &indices, h);
    let (b_shares, b_commitment) = share_secret(&mut rng, b_secret, k, &indices, h);
    let (z_shares, z_commitment) =
        share_secret(&mut rng, Fn::from(0u64), k_open, &indices, h);

    let (mulopen, _messages) = MulOpen::new(
        &mut rng,
        vec![a_shares[0]],
        vec![b_shares[0]],
        vec![z_shares[0]],
        vec![a_commitment],
        vec![b_commitment],
        vec![z_commitment],
        indices,
        h,
    );

    let mut buf = Vec::new();
    let written = mulopen.marshal(&mut buf, mulopen.size_hint()).unwrap();
    let (decoded, read) = MulOpen::unmarshal(&buf, buf.len()).unwrap();
    assert_eq!(read, written);
    assert_eq!(decoded.state(), mulopen.state());
}
