//! New-game construction and the default starter world.
//!
//! [`new_game`] builds an empty [`GameState`] from the game configuration.
//! [`starter_world`] additionally hands the player a duplex with two
//! tenants and stocks the market with three vendors, including the
//! equipment that exploration missions ask for.

use estate_engines::market::default_seasonal_table;
use estate_types::{
    DailySchedule, Financials, GameSettings, GameState, GameTime, Lifestyle, PersonalityTrait,
    PlayerProfile, Preferences, Product, ProductCategory, ProductId, Property, PropertyId,
    PropertyKind, Tenant, TenantId, Vendor, VendorId,
};
use rust_decimal::Decimal;
use tracing::warn;

use crate::config::SimulationConfig;

/// Satisfaction a tenant starts with on move-in.
pub const INITIAL_SATISFACTION: f64 = 70.0;

/// The tenant-specific half of a new lease.
///
/// The orchestrator fills in the id, property, and move-in day when the
/// tenant is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantProfile {
    /// Display name.
    pub name: String,
    /// Personality traits.
    pub traits: Vec<PersonalityTrait>,
    /// Lifestyle scalars.
    pub lifestyle: Lifestyle,
    /// Co-tenant preferences.
    pub preferences: Preferences,
    /// Monthly income.
    pub monthly_income: Decimal,
}

impl TenantProfile {
    /// Create the tenant living in `property_id` from `move_in_day`.
    pub fn into_tenant(self, property_id: PropertyId, move_in_day: u64) -> Tenant {
        Tenant {
            id: TenantId::new(),
            name: self.name,
            traits: self.traits,
            lifestyle: self.lifestyle,
            preferences: self.preferences,
            satisfaction: INITIAL_SATISFACTION,
            relationships: std::collections::BTreeMap::new(),
            financials: Financials::with_income(self.monthly_income),
            complaints: Vec::new(),
            property_id,
            move_in_day,
            rent_day: Tenant::rent_day_for(move_in_day),
        }
    }
}

/// The pieces of a property the player chooses when acquiring one.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyListing {
    /// Display name.
    pub name: String,
    /// Kind of building.
    pub kind: PropertyKind,
    /// Floor area in square meters.
    pub area_sqm: f64,
    /// Monthly rent for the whole property.
    pub monthly_rent: Decimal,
    /// Price paid.
    pub purchase_price: Decimal,
    /// Occupancy cap.
    pub max_tenants: u32,
}

impl PropertyListing {
    /// Create the property in mint condition, acquired on `day`.
    pub fn into_property(self, day: u64) -> Property {
        Property {
            id: PropertyId::new(),
            name: self.name,
            kind: self.kind,
            area_sqm: self.area_sqm,
            condition: 100.0,
            monthly_rent: self.monthly_rent,
            purchase_price: self.purchase_price,
            current_value: self.purchase_price,
            max_tenants: self.max_tenants,
            tenant_ids: Vec::new(),
            acquired_day: day,
            last_maintenance_day: None,
        }
    }
}

/// An empty game for the configured player.
pub fn new_game(config: &SimulationConfig) -> GameState {
    let game = &config.game;
    let settings = GameSettings {
        autosave_interval_ticks: game.autosave_interval_ticks,
        difficulty: game.difficulty,
        default_channels: config.notifications.default_channels.clone(),
    };
    let mut state = GameState::new(
        PlayerProfile::new(game.player_name.clone()),
        GameTime::starting_at(game.start_date),
        settings,
    );
    state.market.seasonal = default_seasonal_table();
    state
}

/// A new game with a starter property, two tenants, and a stocked market.
pub fn starter_world(config: &SimulationConfig) -> GameState {
    let mut state = new_game(config);
    seed_market(&mut state);
    seed_estate(&mut state);
    state
}

fn seed_estate(state: &mut GameState) {
    let property = PropertyListing {
        name: String::from("Maple Street Duplex"),
        kind: PropertyKind::Duplex,
        area_sqm: 140.0,
        monthly_rent: Decimal::new(2_400, 0),
        purchase_price: Decimal::new(180_000, 0),
        max_tenants: 2,
    }
    .into_property(0);
    let property_id = property.id;
    state.insert_property(property);

    for profile in starter_tenants() {
        if let Err(rejection) = state.insert_tenant(profile.into_tenant(property_id, 0)) {
            warn!(%rejection, "starter tenant not placed");
        }
    }
}

fn starter_tenants() -> Vec<TenantProfile> {
    vec![
        TenantProfile {
            name: String::from("Ada Lindqvist"),
            traits: vec![PersonalityTrait::Quiet, PersonalityTrait::Tidy, PersonalityTrait::Studious],
            lifestyle: Lifestyle {
                noise_level: 2,
                cleanliness: 8,
                social_activity: 3,
                schedule: DailySchedule::EarlyBird,
            },
            preferences: Preferences {
                preferred_traits: vec![PersonalityTrait::Quiet, PersonalityTrait::Tidy],
                disliked_traits: vec![PersonalityTrait::PartyGoer],
                noise_tolerance: 4,
            },
            monthly_income: Decimal::new(4_200, 0),
        },
        TenantProfile {
            name: String::from("Bruno Okafor"),
            traits: vec![PersonalityTrait::Friendly, PersonalityTrait::Musical],
            lifestyle: Lifestyle {
                noise_level: 5,
                cleanliness: 6,
                social_activity: 7,
                schedule: DailySchedule::Standard,
            },
            preferences: Preferences {
                preferred_traits: vec![PersonalityTrait::Friendly, PersonalityTrait::Social],
                disliked_traits: vec![PersonalityTrait::Messy],
                noise_tolerance: 6,
            },
            monthly_income: Decimal::new(3_600, 0),
        },
    ]
}

fn vendor(name: &str, categories: Vec<ProductCategory>, reliability: f64) -> Vendor {
    Vendor {
        id: VendorId::new(),
        name: name.to_owned(),
        categories,
        reliability,
    }
}

fn product(
    vendor_id: VendorId,
    name: &str,
    item_key: &str,
    category: ProductCategory,
    price: i64,
    stock: u32,
) -> Product {
    let price = Decimal::new(price, 0);
    Product {
        id: ProductId::new(),
        vendor_id,
        name: name.to_owned(),
        item_key: item_key.to_owned(),
        category,
        base_price: price,
        current_price: price,
        stock,
        history: Vec::new(),
    }
}

fn seed_market(state: &mut GameState) {
    use ProductCategory::{Appliances, Cleaning, Equipment, Furniture, Materials, Tools};

    let hardware = vendor("Harbor Hardware", vec![Materials, Tools], 0.95);
    let homes = vendor("Oakline Home Goods", vec![Furniture, Appliances, Cleaning], 0.9);
    let outfitter = vendor("Ridge Outfitters", vec![Equipment], 0.85);

    let products = [
        product(hardware.id, "Lumber bundle", "lumber", Materials, 120, 40),
        product(hardware.id, "Paint bucket", "paint", Materials, 45, 60),
        product(hardware.id, "Tool kit", "tool_kit", Tools, 180, 15),
        product(homes.id, "Sofa", "sofa", Furniture, 650, 8),
        product(homes.id, "Washing machine", "washing_machine", Appliances, 540, 6),
        product(homes.id, "Cleaning supplies", "cleaning_supplies", Cleaning, 25, 100),
        product(outfitter.id, "Climbing rope", "climbing_rope", Equipment, 90, 20),
        product(outfitter.id, "Lantern", "lantern", Equipment, 40, 30),
    ];

    for v in [hardware, homes, outfitter] {
        state.market.vendors.insert(v.id, v);
    }
    for p in products {
        state.market.products.insert(p.id, p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_follows_config() {
        let mut config = SimulationConfig::default();
        config.game.player_name = String::from("Robin");
        config.game.autosave_interval_ticks = 6;
        let state = new_game(&config);
        assert_eq!(state.player.name, "Robin");
        assert_eq!(state.settings.autosave_interval_ticks, 6);
        assert_eq!(state.time.start, config.game.start_date);
        assert!(state.properties.is_empty());
        assert!(!state.market.seasonal.is_empty());
    }

    #[test]
    fn starter_world_houses_two_tenants() {
        let state = starter_world(&SimulationConfig::default());
        assert_eq!(state.properties.len(), 1);
        assert_eq!(state.tenants.len(), 2);
        let property = state.properties.values().next().map(|p| p.occupancy());
        assert_eq!(property, Some(2));
        assert!(state.tenants.values().all(|t| t.rent_day == 0));
    }

    #[test]
    fn starter_market_sells_mission_equipment() {
        let state = starter_world(&SimulationConfig::default());
        for key in ["climbing_rope", "lantern"] {
            assert!(
                state.market.products.values().any(|p| p.item_key == key && p.stock > 0),
                "{key} missing from market"
            );
        }
        assert!(
            state
                .market
                .products
                .values()
                .all(|p| state.market.vendors.contains_key(&p.vendor_id))
        );
    }

    #[test]
    fn profile_sets_rent_day_from_move_in() {
        let profile = starter_tenants().remove(0);
        let tenant = profile.into_tenant(PropertyId::new(), 47);
        assert_eq!(tenant.rent_day, 17);
        assert!((tenant.satisfaction - INITIAL_SATISFACTION).abs() < f64::EPSILON);
    }
}
