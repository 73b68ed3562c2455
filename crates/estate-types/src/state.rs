//! The root game-state aggregate.
//!
//! [`GameState`] holds everything that is persisted in a save slot. Entity
//! collections are `BTreeMap` tables keyed by stable ids so that iteration
//! order, and therefore every random draw made while iterating, is the same
//! on every run with the same seed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::achievement::AchievementBook;
use crate::ids::{MissionId, PropertyId, TenantId};
use crate::market::MarketState;
use crate::mission::{Mission, MissionStatus};
use crate::notification::{ChannelKind, NotificationInbox};
use crate::player::PlayerProfile;
use crate::property::Property;
use crate::rejection::{Rejection, RejectionReason};
use crate::tenant::Tenant;
use crate::time::{GamePhase, GameTime};

/// Save format version written into every [`GameState`].
pub const STATE_VERSION: u32 = 1;

/// Global difficulty setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Missions succeed more often.
    Easy,
    /// Baseline.
    Normal,
    /// Missions succeed less often.
    Hard,
}

impl Difficulty {
    /// Additive bonus to mission success rates.
    pub const fn success_bonus(self) -> f64 {
        match self {
            Self::Easy => 0.05,
            Self::Normal => 0.0,
            Self::Hard => -0.05,
        }
    }
}

/// Player-adjustable game settings, persisted with the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameSettings {
    /// Ticks between autosaves; 0 disables autosave.
    pub autosave_interval_ticks: u64,
    /// Difficulty.
    pub difficulty: Difficulty,
    /// Channels enabled for every notification type in new player settings.
    pub default_channels: Vec<ChannelKind>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            autosave_interval_ticks: 24,
            difficulty: Difficulty::Normal,
            default_channels: vec![ChannelKind::InApp],
        }
    }
}

/// Everything that makes up one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameState {
    /// Save format version.
    pub version: u32,
    /// Simulated clock.
    pub time: GameTime,
    /// Lifecycle phase.
    pub phase: GamePhase,
    /// The player.
    pub player: PlayerProfile,
    /// Properties by id.
    pub properties: BTreeMap<PropertyId, Property>,
    /// Tenants by id.
    pub tenants: BTreeMap<TenantId, Tenant>,
    /// Market slice.
    pub market: MarketState,
    /// Missions by id.
    pub missions: BTreeMap<MissionId, Mission>,
    /// Achievement definitions and progress.
    pub achievements: AchievementBook,
    /// Notifications and settings.
    pub notifications: NotificationInbox,
    /// Game settings.
    pub settings: GameSettings,
}

impl GameState {
    /// An empty world for a new player.
    pub fn new(player: PlayerProfile, time: GameTime, settings: GameSettings) -> Self {
        Self {
            version: STATE_VERSION,
            time,
            phase: GamePhase::Setup,
            player,
            properties: BTreeMap::new(),
            tenants: BTreeMap::new(),
            market: MarketState::default(),
            missions: BTreeMap::new(),
            achievements: AchievementBook::default(),
            notifications: NotificationInbox::default(),
            settings,
        }
    }

    /// Look up a property, rejecting unknown ids.
    pub fn property(&self, id: PropertyId) -> Result<&Property, Rejection> {
        self.properties
            .get(&id)
            .ok_or_else(|| Rejection::not_found(format!("property {id}")))
    }

    /// Look up a property mutably, rejecting unknown ids.
    pub fn property_mut(&mut self, id: PropertyId) -> Result<&mut Property, Rejection> {
        self.properties
            .get_mut(&id)
            .ok_or_else(|| Rejection::not_found(format!("property {id}")))
    }

    /// Look up a tenant, rejecting unknown ids.
    pub fn tenant(&self, id: TenantId) -> Result<&Tenant, Rejection> {
        self.tenants
            .get(&id)
            .ok_or_else(|| Rejection::not_found(format!("tenant {id}")))
    }

    /// Look up a tenant mutably, rejecting unknown ids.
    pub fn tenant_mut(&mut self, id: TenantId) -> Result<&mut Tenant, Rejection> {
        self.tenants
            .get_mut(&id)
            .ok_or_else(|| Rejection::not_found(format!("tenant {id}")))
    }

    /// Look up a mission, rejecting unknown ids.
    pub fn mission(&self, id: MissionId) -> Result<&Mission, Rejection> {
        self.missions
            .get(&id)
            .ok_or_else(|| Rejection::not_found(format!("mission {id}")))
    }

    /// Look up a mission mutably, rejecting unknown ids.
    pub fn mission_mut(&mut self, id: MissionId) -> Result<&mut Mission, Rejection> {
        self.missions
            .get_mut(&id)
            .ok_or_else(|| Rejection::not_found(format!("mission {id}")))
    }

    /// Insert a property.
    pub fn insert_property(&mut self, property: Property) {
        self.properties.insert(property.id, property);
    }

    /// Move a tenant into its property.
    ///
    /// Rejected if the property does not exist or is full.
    pub fn insert_tenant(&mut self, tenant: Tenant) -> Result<(), Rejection> {
        let property = self.property_mut(tenant.property_id)?;
        if property.is_full() {
            return Err(Rejection::new(
                RejectionReason::CapacityFull,
                format!(
                    "{} already houses {} tenants",
                    property.name, property.max_tenants
                ),
            ));
        }
        property.tenant_ids.push(tenant.id);
        self.tenants.insert(tenant.id, tenant);
        Ok(())
    }

    /// Remove a tenant from the world and from its property.
    ///
    /// Other tenants' relationships with the departed tenant are dropped.
    pub fn remove_tenant(&mut self, id: TenantId) -> Result<Tenant, Rejection> {
        let tenant = self
            .tenants
            .remove(&id)
            .ok_or_else(|| Rejection::not_found(format!("tenant {id}")))?;
        if let Some(property) = self.properties.get_mut(&tenant.property_id) {
            property.evict(id);
        }
        for other in self.tenants.values_mut() {
            other.relationships.remove(&id);
        }
        Ok(tenant)
    }

    /// Tenants living in `property`, in id order.
    pub fn tenants_in(&self, property: PropertyId) -> impl Iterator<Item = &Tenant> {
        self.tenants
            .values()
            .filter(move |t| t.property_id == property)
    }

    /// Missions currently in `status`.
    pub fn missions_with_status(&self, status: MissionStatus) -> impl Iterator<Item = &Mission> {
        self.missions.values().filter(move |m| m.status == status)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::property::PropertyKind;
    use crate::tenant::{DailySchedule, Financials, Lifestyle, Preferences};

    fn world() -> (GameState, PropertyId) {
        let mut state = GameState::new(
            PlayerProfile::new("Rowan"),
            GameTime::default(),
            GameSettings::default(),
        );
        let property = Property {
            id: PropertyId::new(),
            name: String::from("Studio 4B"),
            kind: PropertyKind::Studio,
            area_sqm: 35.0,
            condition: 90.0,
            monthly_rent: Decimal::new(900, 0),
            purchase_price: Decimal::new(90_000, 0),
            current_value: Decimal::new(90_000, 0),
            max_tenants: 1,
            tenant_ids: Vec::new(),
            acquired_day: 0,
            last_maintenance_day: None,
        };
        let id = property.id;
        state.insert_property(property);
        (state, id)
    }

    fn tenant(property_id: PropertyId) -> Tenant {
        Tenant {
            id: TenantId::new(),
            name: String::from("Ada"),
            traits: Vec::new(),
            lifestyle: Lifestyle {
                noise_level: 3,
                cleanliness: 7,
                social_activity: 5,
                schedule: DailySchedule::Standard,
            },
            preferences: Preferences {
                preferred_traits: Vec::new(),
                disliked_traits: Vec::new(),
                noise_tolerance: 5,
            },
            satisfaction: 70.0,
            relationships: BTreeMap::new(),
            financials: Financials::with_income(Decimal::new(3000, 0)),
            complaints: Vec::new(),
            property_id,
            move_in_day: 0,
            rent_day: 0,
        }
    }

    #[test]
    fn insert_tenant_respects_capacity() {
        let (mut state, property_id) = world();
        state.insert_tenant(tenant(property_id)).unwrap();
        let second = state.insert_tenant(tenant(property_id));
        assert_eq!(
            second.map_err(|r| r.reason),
            Err(RejectionReason::CapacityFull)
        );
        assert_eq!(state.tenants.len(), 1);
    }

    #[test]
    fn remove_tenant_clears_property_occupancy() {
        let (mut state, property_id) = world();
        let t = tenant(property_id);
        let id = t.id;
        state.insert_tenant(t).unwrap();
        let removed = state.remove_tenant(id).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(state.property(property_id).unwrap().occupancy(), 0);
        assert!(state.remove_tenant(id).is_err());
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let (state, _) = world();
        let err = state.tenant(TenantId::new()).unwrap_err();
        assert_eq!(err.reason, RejectionReason::NotFound);
    }

    #[test]
    fn state_serializes_with_settings() {
        let (state, _) = world();
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("settings").is_some());
        let back: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
