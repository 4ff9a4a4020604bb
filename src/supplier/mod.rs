// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod registry;
pub mod types;

pub use registry::{resolve_payout, SupplierRegistry};
pub use types::{
    PayoutDestination, PayoutMethod, PayoutMethodOverride, RegistrationOutcome, Supplier,
    SupplierBalance,
};
