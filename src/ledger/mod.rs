// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The bookkeeping core. Everything that can move a wallet balance lives
//! here; the command layer above is glue that validates input, calls in, and
//! renders whatever comes back.

pub mod balance;
pub mod budget;
pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod recurring;
pub mod store;
pub mod wallet;

pub use error::LedgerError;
