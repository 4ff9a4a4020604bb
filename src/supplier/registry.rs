// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::types::{
    PayoutDestination, PayoutMethod, PayoutMethodOverride, RegistrationOutcome, Supplier,
    SupplierBalance,
};
use crate::bonus::{Bonus, BonusLedger};
use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventDispatcher, LedgerEvent};
use crate::settings::RewardSettingProvider;
use crate::store::{Store, Tables};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Picks the payout destination for a withdrawal request.
///
/// A complete override is used as given; a partial one is completed from
/// the supplier's default method.
pub fn resolve_payout(
    tables: &Tables,
    supplier_id: Uuid,
    payout_override: Option<&PayoutMethodOverride>,
) -> LedgerResult<PayoutDestination> {
    let clean = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let method_type = payout_override.and_then(|o| clean(&o.method_type));
    let account_number = payout_override.and_then(|o| clean(&o.account_number));

    if let (Some(method_type), Some(account_number)) = (&method_type, &account_number) {
        return Ok(PayoutDestination {
            method_type: method_type.clone(),
            account_number: account_number.clone(),
        });
    }

    let default = tables
        .default_payout_method(supplier_id)
        .ok_or(LedgerError::NoPayoutMethod { supplier_id })?;

    Ok(PayoutDestination {
        method_type: method_type.unwrap_or_else(|| default.method_type.clone()),
        account_number: account_number.unwrap_or_else(|| default.account_number.clone()),
    })
}

/// Boundary to supplier identity: registration, payout methods, balances.
#[derive(Clone)]
pub struct SupplierRegistry {
    store: Store,
    settings: Arc<dyn RewardSettingProvider>,
    dispatcher: EventDispatcher,
}

impl SupplierRegistry {
    pub fn new(
        store: Store,
        settings: Arc<dyn RewardSettingProvider>,
        dispatcher: EventDispatcher,
    ) -> Self {
        Self {
            store,
            settings,
            dispatcher,
        }
    }

    /// Creates a supplier and grants whatever signup and referral bonuses
    /// are configured. An unknown refer code does not block registration.
    pub async fn register_supplier(
        &self,
        username: &str,
        refer_code: Option<&str>,
    ) -> LedgerResult<RegistrationOutcome> {
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Err(LedgerError::invalid_input("username", "must not be empty"));
        }
        let refer_code = refer_code
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());

        let signup_amount = self.settings.signup_bonus().await;
        let referral_amount = self.settings.referral_bonus().await;

        let (outcome, mut events) = self
            .store
            .transact(|t| {
                if t.supplier_by_username(&username).is_some() {
                    return Err(LedgerError::DuplicateSupplier(username.clone()));
                }

                let referrer = refer_code
                    .as_deref()
                    .and_then(|code| t.supplier_by_username(code))
                    .map(|s| s.id);

                let mut supplier = Supplier::new(username.clone());
                supplier.refer_code = refer_code.clone();
                supplier.referred_by = referrer;
                t.suppliers.insert(supplier.id, supplier.clone());

                let mut events = Vec::new();

                let signup_bonus = signup_amount.map(|amount| Bonus::signup(supplier.id, amount));
                if let Some(bonus) = &signup_bonus {
                    events.push(BonusLedger::grant(t, bonus.clone()));
                }

                let referral_bonus = match (referrer, referral_amount) {
                    (Some(referrer_id), Some(amount)) => {
                        Some(Bonus::referral(referrer_id, supplier.id, amount))
                    }
                    _ => None,
                };
                if let Some(bonus) = &referral_bonus {
                    events.push(BonusLedger::grant(t, bonus.clone()));
                }

                let outcome = RegistrationOutcome {
                    refer_code_invalid: refer_code.is_some() && referrer.is_none(),
                    supplier,
                    signup_bonus,
                    referral_bonus,
                };
                Ok((outcome, events))
            })
            .await?;

        if outcome.refer_code_invalid {
            warn!(
                username = %outcome.supplier.username,
                "Registered supplier with unknown refer code"
            );
        }
        info!(
            supplier_id = %outcome.supplier.id,
            "Registered supplier {}", outcome.supplier.username
        );

        events.insert(
            0,
            LedgerEvent::SupplierRegistered {
                supplier_id: outcome.supplier.id,
                username: outcome.supplier.username.clone(),
                referral_awarded: outcome.referral_bonus.is_some(),
            },
        );
        self.dispatcher.publish(events).await;

        Ok(outcome)
    }

    /// Adds a payout method. The supplier's first method, or any method
    /// flagged as default, becomes the single default.
    pub async fn add_payout_method(
        &self,
        supplier_id: Uuid,
        method_type: &str,
        account_number: &str,
        make_default: bool,
    ) -> LedgerResult<PayoutMethod> {
        let method_type = method_type.trim();
        let account_number = account_number.trim();
        if method_type.is_empty() {
            return Err(LedgerError::invalid_input("method_type", "must not be empty"));
        }
        if account_number.is_empty() {
            return Err(LedgerError::invalid_input("account_number", "must not be empty"));
        }

        let method = self
            .store
            .transact(|t| {
                if !t.suppliers.contains_key(&supplier_id) {
                    return Err(LedgerError::not_found("Supplier", supplier_id));
                }

                let is_default = make_default || t.default_payout_method(supplier_id).is_none();
                if is_default {
                    t.payout_methods
                        .values_mut()
                        .filter(|m| m.supplier_id == supplier_id)
                        .for_each(|m| m.is_default = false);
                }

                let method = PayoutMethod {
                    id: Uuid::new_v4(),
                    supplier_id,
                    method_type: method_type.to_string(),
                    account_number: account_number.to_string(),
                    is_default,
                    created_at: Utc::now(),
                };
                t.payout_methods.insert(method.id, method.clone());
                Ok(method)
            })
            .await?;

        info!(
            supplier_id = %supplier_id,
            default = method.is_default,
            "Payout method added ({})", method.method_type
        );
        Ok(method)
    }

    pub async fn default_payout_method(&self, supplier_id: Uuid) -> Option<PayoutMethod> {
        self.store
            .read(|t| t.default_payout_method(supplier_id).cloned())
            .await
    }

    pub async fn find_supplier(&self, supplier_id: Uuid) -> LedgerResult<Supplier> {
        self.store
            .read(|t| t.suppliers.get(&supplier_id).cloned())
            .await
            .ok_or_else(|| LedgerError::not_found("Supplier", supplier_id))
    }

    pub async fn list(&self) -> Vec<Supplier> {
        let mut suppliers: Vec<Supplier> =
            self.store.read(|t| t.suppliers.values().cloned().collect()).await;
        suppliers.sort_by(|a, b| a.username.cmp(&b.username));
        suppliers
    }

    /// Unclaimed approved rewards plus outstanding clawbacks.
    pub async fn supplier_balance(&self, supplier_id: Uuid) -> LedgerResult<SupplierBalance> {
        self.store
            .read(|t| {
                if !t.suppliers.contains_key(&supplier_id) {
                    return Err(LedgerError::not_found("Supplier", supplier_id));
                }

                let mut available = 0;
                let mut clawbacks = 0;
                for submission in t.submissions_of(supplier_id) {
                    if submission.state.is_claimable() {
                        available += submission.amount;
                    } else if submission.is_withdrawn() && submission.amount < 0 {
                        clawbacks += submission.amount;
                    }
                }

                Ok(SupplierBalance {
                    supplier_id,
                    available,
                    clawbacks,
                    balance: available + clawbacks,
                })
            })
            .await
    }
}
