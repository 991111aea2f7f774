// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Non-interactive zero-knowledge proofs used by threshold ECDSA.
//!
//! This crate implements three proofs from CGGMP'21[^cite], made
//! non-interactive with the Fiat-Shamir transform over a
//! [`merlin::Transcript`]:
//!
//! - [`PiDecProof`]: a Paillier ciphertext decrypts to a value congruent to a
//!   public scalar modulo the curve order.
//! - [`PiMulgProof`]: a Paillier ciphertext is another ciphertext multiplied
//!   by the discrete log of a public curve point.
//! - [`PiPrmProof`]: ring-Pedersen parameters are well formed.
//!
//! along with the Paillier, ring-Pedersen and elliptic-curve building blocks
//! they need. Every proof implements [`Proof`], takes its
//! [`SecurityParameters`] explicitly, and has a canonical byte encoding.
//!
//! Call [`enable_zeroize`] once at startup so that GMP wipes the memory it
//! releases.
//!
//! [^cite]: Ran Canetti, Rosario Gennaro, Steven Goldfeder, Nikolaos
//! Makriyannis, and Udi Peled. UC Non-Interactive, Proactive, Threshold ECDSA
//! with Identifiable Aborts. [EPrint archive,
//! 2021](https://eprint.iacr.org/2021/060.pdf).

pub mod curve;
pub mod errors;
mod gmp_zeroize;
pub mod k256;
pub mod p256;
pub mod paillier;
pub mod parameters;
pub mod ring_pedersen;
mod utils;
pub mod zkp;

pub use curve::{CurveTrait, ScalarTrait};
pub use errors::{CallerError, InternalError, Result};
pub use gmp_zeroize::enable_zeroize;
pub use parameters::{SecurityParameters, PRIME_BITS};
pub use zkp::{
    pidec::{PiDecInput, PiDecProof, PiDecSecret},
    pimulg::{PiMulgInput, PiMulgProof, PiMulgSecret},
    piprm::{PiPrmInput, PiPrmProof, PiPrmSecret},
    Proof,
};
