use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stronghold_types::{common::ResourceGroup, errors::GameError};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Hourly production and storage capacity of a village, derived from its buildings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VillageEconomy {
    pub production: ResourceGroup,
    pub capacity: ResourceGroup,
}

/// Resource balances of a village and the instant they were last reconciled.
///
/// Production is accrued lazily: every operation first brings the balances
/// up to `now`, so no background timer is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    stored: ResourceGroup,
    updated_at: DateTime<Utc>,
}

impl ResourceLedger {
    pub fn new(stored: ResourceGroup, updated_at: DateTime<Utc>) -> Self {
        Self { stored, updated_at }
    }

    /// Balances as of the last reconciliation.
    pub fn stored(&self) -> ResourceGroup {
        self.stored
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Resources produced between the last reconciliation and `now`, before capping.
    pub fn accrued(&self, economy: &VillageEconomy, now: DateTime<Utc>) -> ResourceGroup {
        let elapsed_ms = (now - self.updated_at).num_milliseconds().max(0);
        let elapsed_hours = elapsed_ms as f64 / MILLIS_PER_HOUR;
        economy.production * elapsed_hours
    }

    /// Applies production accrued until `now` and returns the new balances.
    /// Whatever exceeds the capacity is lost.
    pub fn reconcile(&mut self, economy: &VillageEconomy, now: DateTime<Utc>) -> ResourceGroup {
        let accrued = self.accrued(economy, now);
        self.stored = self
            .stored
            .saturating_add(&accrued)
            .capped(&economy.capacity);
        // a clock going backwards must not make the next call count the same interval twice
        self.updated_at = self.updated_at.max(now);
        self.stored
    }

    /// Reconciles, then removes `cost` only if every resource covers it.
    pub fn debit(
        &mut self,
        cost: &ResourceGroup,
        economy: &VillageEconomy,
        now: DateTime<Utc>,
    ) -> Result<ResourceGroup, GameError> {
        let balances = self.reconcile(economy, now);
        let remaining = balances
            .checked_sub(cost)
            .ok_or(GameError::InsufficientResources)?;
        self.stored = remaining;
        Ok(remaining)
    }

    /// Reconciles, then adds `amounts` up to the capacity.
    pub fn credit(
        &mut self,
        amounts: &ResourceGroup,
        economy: &VillageEconomy,
        now: DateTime<Utc>,
    ) -> ResourceGroup {
        let balances = self.reconcile(economy, now);
        self.stored = balances.saturating_add(amounts).capped(&economy.capacity);
        self.stored
    }
}
