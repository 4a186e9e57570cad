//! Batched field inversion: wraps [`MulOpen`] on the pair `(a, r)` for a
//! random `r` drawn from an external RNG batch, using the reconstructed
//! product `a*r` to scale `r`'s own share and commitment into a share and
//! commitment of `a^-1`.
//!
//! Grounded the same way `mulopen.rs` is: this is the batched
//! multiply-and-open primitive reused for a second purpose, matching how
//! the teacher's `pedersen` crate layers higher-level protocols
//! (`product_protocol.rs`) directly on top of its sigma-protocol
//! primitives rather than re-deriving curve arithmetic from scratch.

use ark_ff::Field;
use rand::{CryptoRng, RngCore};

use crate::curve::{Fn, Point};
use crate::error::InverterError;
use crate::mulopen::{Message, MulOpen, State};
use crate::shamir::{Commitment, CommitmentEval, VerifiableShare};
use crate::wire::{Marshal, Unmarshal, WireError};

/// The batched inversion state machine: `a^-1` for each slot of a batch,
/// computed via one [`MulOpen`] session against a random masking batch
/// `r` supplied by an external RNG collaborator.
pub struct Inverter {
    mulopen: MulOpen,
    r_vshares: Vec<VerifiableShare>,
    r_commitment_batch: Vec<Commitment>,
    inv_shares: Option<Vec<VerifiableShare>>,
    inv_commitments: Option<Vec<Commitment>>,
}

impl Inverter {
    /// Constructs an `Inverter` over this party's `a` batch and an
    /// externally supplied random batch `r` (with its verifiable shares
    /// and commitments), plus the zero-sharing mask batch `z` that
    /// `MulOpen` needs to blind the opened product. Returns the inverter
    /// together with the initial `MulOpen` message batch to broadcast.
    ///
    /// `r_vshares`/`r_commitment_batch` are defensively cloned into the
    /// inverter's own state, since they are needed again once the
    /// product `a*r` is reconstructed (`spec.md` §5.2) — they must
    /// outlive the `MulOpen` session that consumes a copy of them.
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: RngCore + CryptoRng>(
        rng: &mut R,
        a_vshares: Vec<VerifiableShare>,
        r_vshares: Vec<VerifiableShare>,
        z_vshares: Vec<VerifiableShare>,
        a_commitment_batch: Vec<Commitment>,
        r_commitment_batch: Vec<Commitment>,
        rzg_commitment_batch: Vec<Commitment>,
        indices: Vec<Fn>,
        h: Point,
    ) -> (Inverter, Vec<Message>) {
        let (mulopen, message_batch) = MulOpen::new(
            rng,
            a_vshares,
            r_vshares.clone(),
            z_vshares,
            a_commitment_batch,
            r_commitment_batch.clone(),
            rzg_commitment_batch,
            indices,
            h,
        );

        let inverter = Inverter {
            mulopen,
            r_vshares,
            r_commitment_batch,
            inv_shares: None,
            inv_commitments: None,
        };

        (inverter, message_batch)
    }

    pub fn state(&self) -> State {
        self.mulopen.state()
    }

    pub fn is_terminal(&self) -> bool {
        self.mulopen.is_terminal()
    }

    /// Once terminal, the per-slot verifiable shares of `a^-1`.
    pub fn inv_shares(&self) -> Option<&[VerifiableShare]> {
        self.inv_shares.as_deref()
    }

    /// Once terminal, the per-slot public commitments to `a^-1`.
    pub fn inv_commitments(&self) -> Option<&[Commitment]> {
        self.inv_commitments.as_deref()
    }

    /// Forwards a message batch to the embedded [`MulOpen`]; on
    /// reconstruction of `a*r`, scales `r`'s share and commitment by
    /// `(a*r)^-1` to produce this party's share and commitment of `a^-1`
    /// (`spec.md` §5.2: `a^-1 = (a*r)^-1 * r`).
    pub fn handle_share_batch(
        &mut self,
        message_batch: Vec<Message>,
    ) -> Result<Option<Vec<VerifiableShare>>, InverterError> {
        let products = match self.mulopen.handle_share_batch(message_batch)? {
            Some(products) => products,
            None => return Ok(None),
        };

        let mut inv_shares = Vec::with_capacity(products.len());
        let mut inv_commitments = Vec::with_capacity(products.len());

        for (slot, product) in products.iter().enumerate() {
            let product_inverse = product
                .inverse()
                .ok_or(InverterError::ZeroProduct { slot })?;

            let r_vshare = self.r_vshares[slot];
            let inv_share = VerifiableShare {
                share: crate::shamir::Share {
                    index: r_vshare.share.index,
                    value: r_vshare.share.value * product_inverse,
                },
                decommitment: r_vshare.decommitment * product_inverse,
            };
            let inv_commitment = self.r_commitment_batch[slot].scale(&product_inverse);

            inv_shares.push(inv_share);
            inv_commitments.push(inv_commitment);
        }

        tracing::debug!(batch_size = inv_shares.len(), "Inverter reconstruction complete");
        self.inv_shares = Some(inv_shares.clone());
        self.inv_commitments = Some(inv_commitments);

        Ok(Some(inv_shares))
    }
}

impl Marshal for Inverter {
    fn size_hint(&self) -> usize {
        self.mulopen.size_hint() + self.r_vshares.size_hint() + self.r_commitment_batch.size_hint()
    }

    fn marshal(&self, buf: &mut Vec<u8>, remaining: usize) -> Result<usize, WireError> {
        let mut used = self.mulopen.marshal(buf, remaining)?;
        used += self.r_vshares.marshal(buf, remaining - used)?;
        used += self.r_commitment_batch.marshal(buf, remaining - used)?;
        Ok(used)
    }
}

impl Unmarshal for Inverter {
    fn unmarshal(buf: &[u8], remaining: usize) -> Result<(Self, usize), WireError> {
        let (mulopen, mut used) = MulOpen::unmarshal(buf, remaining)?;
        let (r_vshares, n) = Vec::<VerifiableShare>::unmarshal(&buf[used..], remaining - used)?;
        used += n;
        let (r_commitment_batch, n) =
            Vec::<Commitment>::unmarshal(&buf[used..], remaining - used)?;
        used += n;

        // The reconstructed product itself is not part of the serialized
        // state, so a deserialized `Inverter` cannot recover
        // `inv_shares`/`inv_commitments` even if the embedded `MulOpen`
        // is terminal; callers restoring from a checkpoint past
        // reconstruction are expected to have cached those separately.
        Ok((
            Inverter {
                mulopen,
                r_vshares,
                r_commitment_batch,
                inv_shares: None,
                inv_commitments: None,
            },
            used,
        ))
    }
}
