#![forbid(unsafe_code)]
#![allow(clippy::doc_markdown)]
//! Batched multiply-and-open (`MulOpen`) over Pedersen-verifiable Shamir
//! shares on secp256k1, with a field-inversion protocol (`Inverter`)
//! built on top of it.
//!
//! This crate implements the parties' side of the protocol only: RNG
//! (random scalar sharing) and RZG (random zero sharing) batches, the
//! network transport, and agreement on the party index set are all
//! treated as externally supplied, per the module boundaries the
//! protocol is specified against.

pub mod curve;
pub mod error;
pub mod inverter;
pub mod mulopen;
pub mod shamir;
pub mod wire;
pub mod zkp;

pub use error::{InverterError, MulOpenError};
pub use inverter::Inverter;
pub use mulopen::{Message, MulOpen, State};
pub use shamir::{Commitment, CommitmentEval, Share, VerifiableShare};
pub use wire::{Marshal, Unmarshal, WireError};
