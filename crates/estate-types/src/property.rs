//! Properties owned by the player.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::bounds::clamp_percent;
use crate::ids::{PropertyId, TenantId};

/// Kind of building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Single-room unit.
    Studio,
    /// Multi-room flat.
    Apartment,
    /// Detached house.
    House,
    /// Two units under one roof.
    Duplex,
    /// Shop or office space.
    Commercial,
}

/// A property and its current occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Property {
    /// Property identifier.
    pub id: PropertyId,
    /// Display name.
    pub name: String,
    /// Kind of building.
    pub kind: PropertyKind,
    /// Floor area in square meters.
    pub area_sqm: f64,
    /// Physical condition, 0 (ruin) to 100 (pristine).
    pub condition: f64,
    /// Rent charged per month for the whole property.
    #[ts(as = "String")]
    pub monthly_rent: Decimal,
    /// Price paid when the property was acquired.
    #[ts(as = "String")]
    pub purchase_price: Decimal,
    /// Current market value.
    #[ts(as = "String")]
    pub current_value: Decimal,
    /// Occupancy cap.
    pub max_tenants: u32,
    /// Tenants currently living here.
    pub tenant_ids: Vec<TenantId>,
    /// Simulated day the property was acquired.
    pub acquired_day: u64,
    /// Simulated day of the last maintenance, if any.
    pub last_maintenance_day: Option<u64>,
}

impl Property {
    /// Number of tenants currently living here.
    pub fn occupancy(&self) -> u32 {
        u32::try_from(self.tenant_ids.len()).unwrap_or(u32::MAX)
    }

    /// Whether the occupancy cap has been reached.
    pub fn is_full(&self) -> bool {
        self.occupancy() >= self.max_tenants
    }

    /// Rent owed by each tenant when the rent is split evenly.
    pub fn rent_share(&self) -> Decimal {
        let occupants = self.occupancy().max(1);
        self.monthly_rent
            .checked_div(Decimal::from(occupants))
            .unwrap_or(self.monthly_rent)
    }

    /// Overwrite the condition, clamped to `[0, 100]`.
    pub fn set_condition(&mut self, condition: f64) {
        self.condition = clamp_percent(condition);
    }

    /// Remove a tenant from the occupancy list. Returns whether it was present.
    pub fn evict(&mut self, tenant_id: TenantId) -> bool {
        let before = self.tenant_ids.len();
        self.tenant_ids.retain(|id| *id != tenant_id);
        self.tenant_ids.len() != before
    }
}
