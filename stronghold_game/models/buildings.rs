use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use stronghold_types::{buildings::BuildingName, common::ResourceGroup, errors::GameError};

/// An upgrade in flight. Its presence on a [`Building`] is what makes the building "upgrading".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeInProgress {
    pub target_level: u8,
    pub started_at: DateTime<Utc>,
    pub completes_at: DateTime<Utc>,
    /// What was charged when the upgrade started, used for refunds.
    pub cost: ResourceGroup,
}

impl UpgradeInProgress {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.completes_at
    }
}

/// Observable state of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildingState {
    Idle {
        level: u8,
    },
    Upgrading {
        level: u8,
        target_level: u8,
        completes_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub name: BuildingName,
    level: u8,
    upgrade: Option<UpgradeInProgress>,
}

/// Outcome of a cancelled upgrade.
#[derive(Debug, Clone, PartialEq)]
pub struct Refund {
    pub amount: ResourceGroup,
    /// Share of the original cost given back, 0..=100.
    pub percentage: f64,
    pub original_cost: ResourceGroup,
    /// Share of the construction time that was still to go, 0..=1.
    pub remaining_fraction: f64,
    pub time_remaining_secs: u64,
}

/// Read-only view of an upgrade countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRemaining {
    pub is_upgrading: bool,
    pub seconds: u64,
    pub completion_time: Option<DateTime<Utc>>,
    /// `MM:SS`, minutes are not wrapped into hours.
    pub formatted: String,
    pub can_complete: bool,
}

impl Building {
    pub fn new(name: BuildingName, level: u8) -> Self {
        Self {
            name,
            level,
            upgrade: None,
        }
    }

    /// Constructor for re-hydrating a Building from persistence.
    pub fn from_persistence(
        name: BuildingName,
        level: u8,
        upgrade: Option<UpgradeInProgress>,
    ) -> Self {
        Self {
            name,
            level,
            upgrade,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn upgrade(&self) -> Option<&UpgradeInProgress> {
        self.upgrade.as_ref()
    }

    pub fn is_upgrading(&self) -> bool {
        self.upgrade.is_some()
    }

    /// True when an upgrade exists and its completion time has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.upgrade.as_ref().is_some_and(|u| u.is_due(now))
    }

    pub fn state(&self) -> BuildingState {
        match &self.upgrade {
            None => BuildingState::Idle { level: self.level },
            Some(u) => BuildingState::Upgrading {
                level: self.level,
                target_level: u.target_level,
                completes_at: u.completes_at,
            },
        }
    }

    /// Idle -> Upgrading. The caller is responsible for charging `cost`.
    pub fn start_upgrade(
        &mut self,
        cost: ResourceGroup,
        duration_secs: u32,
        now: DateTime<Utc>,
    ) -> Result<&UpgradeInProgress, GameError> {
        if self.upgrade.is_some() {
            return Err(GameError::BuildingUpgrading(self.name));
        }

        let target_level = self
            .level
            .checked_add(1)
            .ok_or(GameError::BuildingMaxLevel {
                building: self.name,
                max_level: self.level,
            })?;

        let upgrade = UpgradeInProgress {
            target_level,
            started_at: now,
            completes_at: now + Duration::seconds(duration_secs as i64),
            cost,
        };
        Ok(self.upgrade.insert(upgrade))
    }

    /// Upgrading -> Idle(target). Only legal once the completion time is reached.
    /// Returns the new level.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<u8, GameError> {
        let upgrade = self
            .upgrade
            .as_ref()
            .ok_or(GameError::NotUpgrading(self.name))?;

        if !upgrade.is_due(now) {
            return Err(GameError::UpgradeNotFinished {
                building: self.name,
                completes_at: upgrade.completes_at,
            });
        }

        self.level = upgrade.target_level;
        self.upgrade = None;
        Ok(self.level)
    }

    /// Upgrading -> Idle(level), computing the refund owed to the village.
    ///
    /// The refund is `base_refund_rate` of the cost when cancelling right away and
    /// decays linearly to nothing as completion approaches.
    pub fn cancel(&mut self, now: DateTime<Utc>, base_refund_rate: f64) -> Result<Refund, GameError> {
        let upgrade = self
            .upgrade
            .as_ref()
            .ok_or(GameError::NotUpgrading(self.name))?;

        if upgrade.is_due(now) {
            return Err(GameError::UpgradeAlreadyFinished(self.name));
        }

        let total_ms = (upgrade.completes_at - upgrade.started_at).num_milliseconds();
        let elapsed_ms = (now - upgrade.started_at).num_milliseconds().max(0);
        let remaining_fraction = if total_ms > 0 {
            ((total_ms - elapsed_ms) as f64 / total_ms as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let refund_rate = base_refund_rate.clamp(0.0, 1.0) * remaining_fraction;
        let refund = Refund {
            amount: upgrade.cost * refund_rate,
            percentage: refund_rate * 100.0,
            original_cost: upgrade.cost,
            remaining_fraction,
            time_remaining_secs: seconds_until(now, upgrade.completes_at),
        };

        self.upgrade = None;
        Ok(refund)
    }

    /// Pure countdown for the current upgrade, never negative.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> TimeRemaining {
        match &self.upgrade {
            None => TimeRemaining {
                is_upgrading: false,
                seconds: 0,
                completion_time: None,
                formatted: format_mm_ss(0),
                can_complete: false,
            },
            Some(upgrade) => {
                let seconds = seconds_until(now, upgrade.completes_at);
                TimeRemaining {
                    is_upgrading: true,
                    seconds,
                    completion_time: Some(upgrade.completes_at),
                    formatted: format_mm_ss(seconds),
                    can_complete: upgrade.is_due(now),
                }
            }
        }
    }
}

/// Whole seconds left until `deadline`, rounded up so a pending upgrade never shows 00:00.
fn seconds_until(now: DateTime<Utc>, deadline: DateTime<Utc>) -> u64 {
    let ms = (deadline - now).num_milliseconds().max(0) as u64;
    ms.div_ceil(1000)
}

pub fn format_mm_ss(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
