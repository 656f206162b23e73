use serde::{Deserialize, Serialize};

/// The four resources a village stores and produces.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wood,
    Stone,
    Food,
    Gold,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Food,
        ResourceKind::Gold,
    ];
}

/// Amounts of (wood, stone, food, gold). Unsigned, so a balance can never go below zero.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup(pub u32, pub u32, pub u32, pub u32);

impl ResourceGroup {
    pub const fn new(wood: u32, stone: u32, food: u32, gold: u32) -> Self {
        Self(wood, stone, food, gold)
    }

    pub const fn splat(amount: u32) -> Self {
        Self(amount, amount, amount, amount)
    }

    pub fn total(&self) -> u64 {
        self.0 as u64 + self.1 as u64 + self.2 as u64 + self.3 as u64
    }

    pub fn wood(&self) -> u32 {
        self.0
    }
    pub fn stone(&self) -> u32 {
        self.1
    }
    pub fn food(&self) -> u32 {
        self.2
    }
    pub fn gold(&self) -> u32 {
        self.3
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.0,
            ResourceKind::Stone => self.1,
            ResourceKind::Food => self.2,
            ResourceKind::Gold => self.3,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Wood => &mut self.0,
            ResourceKind::Stone => &mut self.1,
            ResourceKind::Food => &mut self.2,
            ResourceKind::Gold => &mut self.3,
        }
    }

    /// True when every resource is at least the amount in `other`.
    pub fn covers(&self, other: &ResourceGroup) -> bool {
        ResourceKind::ALL
            .iter()
            .all(|kind| self.get(*kind) >= other.get(*kind))
    }

    /// Subtracts `other` only if every resource is covered.
    pub fn checked_sub(&self, other: &ResourceGroup) -> Option<ResourceGroup> {
        Some(ResourceGroup(
            self.0.checked_sub(other.0)?,
            self.1.checked_sub(other.1)?,
            self.2.checked_sub(other.2)?,
            self.3.checked_sub(other.3)?,
        ))
    }

    pub fn saturating_add(&self, other: &ResourceGroup) -> ResourceGroup {
        ResourceGroup(
            self.0.saturating_add(other.0),
            self.1.saturating_add(other.1),
            self.2.saturating_add(other.2),
            self.3.saturating_add(other.3),
        )
    }

    /// Caps each resource at the matching amount in `limits`.
    pub fn capped(&self, limits: &ResourceGroup) -> ResourceGroup {
        ResourceGroup(
            self.0.min(limits.0),
            self.1.min(limits.1),
            self.2.min(limits.2),
            self.3.min(limits.3),
        )
    }
}

impl core::ops::Mul<f64> for ResourceGroup {
    type Output = ResourceGroup;

    fn mul(self, rhs: f64) -> Self::Output {
        let rhs = rhs.max(0.0);
        let wood = (self.0 as f64 * rhs).floor() as u32;
        let stone = (self.1 as f64 * rhs).floor() as u32;
        let food = (self.2 as f64 * rhs).floor() as u32;
        let gold = (self.3 as f64 * rhs).floor() as u32;
        ResourceGroup(wood, stone, food, gold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}
