//! Batched multiply-and-open: given verifiable shares of `a`, `b`, and a
//! zero-sharing mask `z`, lets `n` parties reconstruct `a*b` while each
//! party proves in zero-knowledge that it contributed the correct product
//! share.
//!
//! Directly ported from the control flow of
//! `renproject/mpc`'s `mulopen` module (its `initial_message_batch` /
//! `handle_message_batch` free functions over an externally owned
//! `&mut Vec<Vec<Share>>`), restated as an owned state machine per the
//! project convention that a single-use batched protocol is a struct with
//! a `handle` method, not a coroutine.

use ark_ec::{AffineRepr, CurveGroup};
use ark_std::{ops::Mul, UniformRand};
use rand::{CryptoRng, RngCore};

use crate::curve::{generator, validate_pedersen_h, Fn, Point};
use crate::error::MulOpenError;
use crate::shamir::{interpolate_at_zero, CommitmentEval, Commitment, Share, VerifiableShare};
use crate::wire::{marshal_u32, unmarshal_u32, Marshal, Unmarshal, WireError};
use crate::zkp::{Proof, Witness};

/// The message exchanged between parties: a verifiable share of (a
/// masked) `a*b`, the Pedersen commitment to the unmasked product, and
/// the NIZK tying that commitment to the claimed `a`/`b` commitments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub vshare: VerifiableShare,
    pub commitment: Point,
    pub proof: Proof,
}

/// `MulOpen`'s externally observable lifecycle state (`spec.md` §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Collecting(usize),
    Terminal,
}

/// The batched multiply-and-open state machine, single-use per session.
pub struct MulOpen {
    share_bufs: Vec<Vec<Share>>,
    batch_size: usize,
    k_open: usize,
    a_commitment_batch: Vec<Commitment>,
    b_commitment_batch: Vec<Commitment>,
    rzg_commitment_batch: Vec<Commitment>,
    indices: Vec<Fn>,
    h: Point,
    terminal: bool,
}

fn check_commitment_lengths(batch: &[Commitment], expected: usize, what: &str) {
    assert!(
        batch.iter().all(|c| c.len() == expected),
        "{what} commitment batch must have every commitment of length {expected}"
    );
}

impl MulOpen {
    /// Constructs a `MulOpen` over this party's input batches and
    /// immediately produces (and self-processes) the initial outbound
    /// message batch.
    ///
    /// All of these preconditions are programmer errors, not peer
    /// misbehavior (`spec.md` §4.2/§7): they fail fatally rather than
    /// returning a `Result`, since a caller that violates them has a bug
    /// that no retry can fix.
    ///
    /// Self-handling happens exactly once, here, before any
    /// caller-supplied batch can reach [`MulOpen::handle_share_batch`], so
    /// the "own-message delivered twice" case the spec leaves unguarded
    /// (§9) cannot occur through this API.
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: RngCore + CryptoRng>(
        rng: &mut R,
        a_vshares: Vec<VerifiableShare>,
        b_vshares: Vec<VerifiableShare>,
        z_vshares: Vec<VerifiableShare>,
        a_commitment_batch: Vec<Commitment>,
        b_commitment_batch: Vec<Commitment>,
        rzg_commitment_batch: Vec<Commitment>,
        indices: Vec<Fn>,
        h: Point,
    ) -> (MulOpen, Vec<Message>) {
        assert!(validate_pedersen_h(&h), "invalid Pedersen parameter h");

        let batch_size = a_vshares.len();
        assert!(batch_size >= 1, "batch size must be at least 1");
        assert_eq!(b_vshares.len(), batch_size);
        assert_eq!(z_vshares.len(), batch_size);
        assert_eq!(a_commitment_batch.len(), batch_size);
        assert_eq!(b_commitment_batch.len(), batch_size);
        assert_eq!(rzg_commitment_batch.len(), batch_size);

        let k = a_commitment_batch
            .first()
            .expect("batch must be non-empty")
            .len();
        assert!(k >= 2, "k must be at least 2");
        check_commitment_lengths(&a_commitment_batch, k, "a");
        check_commitment_lengths(&b_commitment_batch, k, "b");
        check_commitment_lengths(&rzg_commitment_batch, 2 * k - 1, "rzg");

        let k_open = 2 * k - 1;
        assert!(
            k_open <= indices.len(),
            "2k-1 must not exceed the number of parties"
        );

        let index = a_vshares[0].share.index;
        assert!(a_vshares.iter().all(|v| v.share.index == index));
        assert!(b_vshares.iter().all(|v| v.share.index == index));
        assert!(z_vshares.iter().all(|v| v.share.index == index));

        tracing::debug!(batch_size, k, k_open, n = indices.len(), "constructing MulOpen");

        let mut message_batch = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let alpha = a_vshares[i].share.value;
            let rho = a_vshares[i].decommitment;
            let beta = b_vshares[i].share.value;
            let sigma = b_vshares[i].decommitment;
            let tau = Fn::rand(rng);

            let product = alpha * beta;
            let product_commitment = (generator().mul(product) + h.mul(tau)).into_affine();

            let a_share_commitment = a_commitment_batch[i].evaluate(&index);
            let b_share_commitment = b_commitment_batch[i].evaluate(&index);

            let witness = Witness {
                alpha,
                beta,
                rho,
                sigma,
                tau,
            };
            let proof = Proof::create(
                rng,
                &witness,
                &a_share_commitment,
                &b_share_commitment,
                &product_commitment,
                &h,
            );

            let out_share = VerifiableShare {
                share: Share {
                    index,
                    value: product,
                },
                decommitment: tau,
            } + z_vshares[i];

            message_batch.push(Message {
                vshare: out_share,
                commitment: product_commitment,
                proof,
            });
        }

        let mut mulopen = MulOpen {
            share_bufs: vec![Vec::with_capacity(k_open); batch_size],
            batch_size,
            k_open,
            a_commitment_batch,
            b_commitment_batch,
            rzg_commitment_batch,
            indices,
            h,
            terminal: false,
        };

        mulopen
            .handle_share_batch(message_batch.clone())
            .expect("handling our own message batch must always succeed");

        (mulopen, message_batch)
    }

    pub fn state(&self) -> State {
        if self.terminal {
            State::Terminal
        } else {
            State::Collecting(self.share_bufs[0].len())
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Validates and absorbs one inbound message batch. Returns
    /// `Ok(Some(products))` once `2k-1` distinct, valid batches have been
    /// collected (including the self-message absorbed at construction);
    /// `Ok(None)` while still collecting.
    ///
    /// Once terminal, further calls are a no-op returning `Ok(None)`
    /// without re-validating — resolving the "behavior after terminal
    /// state" Open Question of `spec.md` §9 in favor of an explicit,
    /// cheap no-op rather than leaving it unspecified.
    pub fn handle_share_batch(
        &mut self,
        message_batch: Vec<Message>,
    ) -> Result<Option<Vec<Fn>>, MulOpenError> {
        if self.terminal {
            return Ok(None);
        }

        if message_batch.len() != self.batch_size {
            return Err(MulOpenError::IncorrectBatchSize {
                expected: self.batch_size,
                got: message_batch.len(),
            });
        }

        let index = message_batch[0].vshare.share.index;
        if !self.indices.contains(&index) {
            tracing::warn!("rejected message batch: index not in agreed index set");
            return Err(MulOpenError::InvalidIndex);
        }

        if message_batch
            .iter()
            .any(|m| m.vshare.share.index != index)
        {
            tracing::warn!("rejected message batch: inconsistent share indices");
            return Err(MulOpenError::InconsistentShares);
        }

        if self.share_bufs[0]
            .iter()
            .any(|share| share.index == index)
        {
            tracing::warn!("rejected message batch: duplicate index");
            return Err(MulOpenError::DuplicateIndex);
        }

        for (i, message) in message_batch.iter().enumerate() {
            let a_share_commitment = self.a_commitment_batch[i].evaluate(&index);
            let b_share_commitment = self.b_commitment_batch[i].evaluate(&index);

            if !message
                .proof
                .verify(&a_share_commitment, &b_share_commitment, &message.commitment, &self.h)
            {
                tracing::warn!(slot = i, "rejected message batch: invalid ZKP");
                return Err(MulOpenError::InvalidZKP);
            }

            let rzg_at_index = self.rzg_commitment_batch[i].evaluate(&index);
            let expected = (message.commitment.into_group() + rzg_at_index).into_affine();
            let actual = (generator().mul(message.vshare.share.value)
                + self.h.mul(message.vshare.decommitment))
            .into_affine();
            if expected != actual {
                tracing::warn!(slot = i, "rejected message batch: invalid shares");
                return Err(MulOpenError::InvalidShares);
            }
        }

        for (buf, message) in self.share_bufs.iter_mut().zip(message_batch.into_iter()) {
            buf.push(message.vshare.share);
        }

        if self.share_bufs[0].len() == self.k_open {
            let secrets: Vec<Fn> = self
                .share_bufs
                .iter()
                .map(|buf| interpolate_at_zero(buf))
                .collect();
            self.terminal = true;
            tracing::debug!("MulOpen reconstruction complete");
            return Ok(Some(secrets));
        }

        Ok(None)
    }
}

impl Marshal for Message {
    fn size_hint(&self) -> usize {
        self.vshare.size_hint() + self.commitment.size_hint() + self.proof.size_hint()
    }

    fn marshal(&self, buf: &mut Vec<u8>, remaining: usize) -> Result<usize, WireError> {
        let mut used = self.vshare.marshal(buf, remaining)?;
        used += self.commitment.marshal(buf, remaining - used)?;
        used += self.proof.marshal(buf, remaining - used)?;
        Ok(used)
    }
}

impl Unmarshal for Message {
    fn unmarshal(buf: &[u8], remaining: usize) -> Result<(Self, usize), WireError> {
        let (vshare, n1) = VerifiableShare::unmarshal(buf, remaining)?;
        let (commitment, n2) = Point::unmarshal(&buf[n1..], remaining - n1)?;
        let (proof, n3) = Proof::unmarshal(&buf[n1 + n2..], remaining - n1 - n2)?;
        Ok((
            Message {
                vshare,
                commitment,
                proof,
            },
            n1 + n2 + n3,
        ))
    }
}

/// Serializes the checkpointable state of a `MulOpen`: `shareBufs`,
/// `batchSize`, `kOpen`, the three commitment batches, `indices`, `h`, in
/// that order (`spec.md` §6).
impl Marshal for MulOpen {
    fn size_hint(&self) -> usize {
        self.share_bufs.size_hint()
            + 4
            + 4
            + self.a_commitment_batch.size_hint()
            + self.b_commitment_batch.size_hint()
            + self.rzg_commitment_batch.size_hint()
            + self.indices.size_hint()
            + self.h.size_hint()
    }

    fn marshal(&self, buf: &mut Vec<u8>, remaining: usize) -> Result<usize, WireError> {
        let mut used = self.share_bufs.marshal(buf, remaining)?;
        used += marshal_u32(self.batch_size as u32, buf, remaining - used)?;
        used += marshal_u32(self.k_open as u32, buf, remaining - used)?;
        used += self.a_commitment_batch.marshal(buf, remaining - used)?;
        used += self.b_commitment_batch.marshal(buf, remaining - used)?;
        used += self.rzg_commitment_batch.marshal(buf, remaining - used)?;
        used += self.indices.marshal(buf, remaining - used)?;
        used += self.h.marshal(buf, remaining - used)?;
        Ok(used)
    }
}

impl Unmarshal for MulOpen {
    fn unmarshal(buf: &[u8], remaining: usize) -> Result<(Self, usize), WireError> {
        let (share_bufs, mut used) = Vec::<Vec<Share>>::unmarshal(buf, remaining)?;
        let (batch_size, n) = unmarshal_u32(&buf[used..], remaining - used)?;
        used += n;
        let (k_open, n) = unmarshal_u32(&buf[used..], remaining - used)?;
        used += n;
        let (a_commitment_batch, n) = Vec::<Commitment>::unmarshal(&buf[used..], remaining - used)?;
        used += n;
        let (b_commitment_batch, n) = Vec::<Commitment>::unmarshal(&buf[used..], remaining - used)?;
        used += n;
        let (rzg_commitment_batch, n) =
            Vec::<Commitment>::unmarshal(&buf[used..], remaining - used)?;
        used += n;
        let (indices, n) = Vec::<Fn>::unmarshal(&buf[used..], remaining - used)?;
        used += n;
        let (h, n) = Point::unmarshal(&buf[used..], remaining - used)?;
        used += n;

        let terminal = share_bufs
            .first()
            .map(|buf| buf.len() == k_open as usize)
            .unwrap_or(false);

        Ok((
            MulOpen {
                share_bufs,
                batch_size: batch_size as usize,
                k_open: k_open as usize,
                a_commitment_batch,
                b_commitment_batch,
                rzg_commitment_batch,
                indices,
                h,
                terminal,
            },
            used,
        ))
    }
}
