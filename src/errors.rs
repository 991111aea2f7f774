// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Error types returned by this crate.
//!
//! Two families exist: [`CallerError`] for problems the calling application
//! can fix (malformed bytes, bad parameters), and [`InternalError`] for
//! everything else, including failed proof verification.

use thiserror::Error;

/// The default result type used throughout the crate.
pub type Result<T> = std::result::Result<T, InternalError>;

/// Errors that are caused by the calling application.
#[derive(Clone, Copy, Eq, PartialEq, Error, Debug)]
pub enum CallerError {
    #[error("Could not deserialize the provided bytes")]
    DeserializationFailed,
    #[error("The provided input was invalid")]
    BadInput,
    #[error("Random sampling exceeded the maximum number of retries")]
    RetryFailed,
}

/// Errors produced while constructing or checking a proof.
#[derive(Clone, Copy, Eq, PartialEq, Error, Debug)]
pub enum InternalError {
    /// A proof did not verify.
    ///
    /// This is deliberately a single variant: the caller learns only that the
    /// proof is invalid, never which check rejected it.
    #[error("Proof verification failed")]
    ProtocolError,
    #[error("An internal invariant was violated")]
    InternalInvariantFailed,
    #[error("The calling application made a mistake: {0}")]
    CallingApplicationMistake(#[from] CallerError),
}
