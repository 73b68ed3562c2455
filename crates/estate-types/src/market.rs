//! Goods market: vendors, products, price indices, events, and trends.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{MarketEventId, ProductId, TrendId, VendorId};
use crate::time::Season;

/// Product category. Demand, supply, trends, and seasonal factors are tracked per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    /// Lumber, paint, fixtures.
    Materials,
    /// Beds, sofas, tables.
    Furniture,
    /// Fridges, washers, heaters.
    Appliances,
    /// Hand and power tools.
    Tools,
    /// Cleaning supplies.
    Cleaning,
    /// Exploration gear (ropes, lanterns, permits).
    Equipment,
}

impl ProductCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Materials,
        Self::Furniture,
        Self::Appliances,
        Self::Tools,
        Self::Cleaning,
        Self::Equipment,
    ];
}

/// A vendor selling products on the market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vendor {
    /// Vendor identifier.
    pub id: VendorId,
    /// Display name.
    pub name: String,
    /// Categories the vendor stocks.
    pub categories: Vec<ProductCategory>,
    /// Delivery reliability in `[0, 1]`.
    pub reliability: f64,
}

/// One daily price sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PricePoint {
    /// Simulated day of the sample.
    pub day: u64,
    /// Price at the time of the sample.
    #[ts(as = "String")]
    pub price: Decimal,
}

/// A product offered by a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Vendor selling the product.
    pub vendor_id: VendorId,
    /// Display name.
    pub name: String,
    /// Inventory key credited on purchase.
    pub item_key: String,
    /// Product category.
    pub category: ProductCategory,
    /// Anchor price; the live price stays within half to double of it.
    #[ts(as = "String")]
    pub base_price: Decimal,
    /// Live price.
    #[ts(as = "String")]
    pub current_price: Decimal,
    /// Units in stock.
    pub stock: u32,
    /// Daily price samples, oldest first.
    pub history: Vec<PricePoint>,
}

impl Product {
    /// Lowest price the product may reach.
    pub fn price_floor(&self) -> Decimal {
        self.base_price / Decimal::TWO
    }

    /// Highest price the product may reach.
    pub fn price_ceiling(&self) -> Decimal {
        self.base_price.saturating_mul(Decimal::TWO)
    }
}

/// Kind of market event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum MarketEventKind {
    /// Supply drops sharply.
    Shortage,
    /// Supply rises sharply.
    Surplus,
    /// Demand rises sharply.
    DemandSpike,
    /// Demand falls sharply.
    DemandDrop,
    /// New regulation raises costs.
    RegulatoryChange,
    /// Logistics problems constrain supply.
    SupplyChainDisruption,
    /// Cheaper production lowers costs.
    TechnologicalAdvance,
}

impl MarketEventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Shortage,
        Self::Surplus,
        Self::DemandSpike,
        Self::DemandDrop,
        Self::RegulatoryChange,
        Self::SupplyChainDisruption,
        Self::TechnologicalAdvance,
    ];

    /// Which index the event pushes on.
    pub const fn target(self) -> ImpactTarget {
        match self {
            Self::DemandSpike | Self::DemandDrop => ImpactTarget::Demand,
            Self::Shortage
            | Self::Surplus
            | Self::RegulatoryChange
            | Self::SupplyChainDisruption
            | Self::TechnologicalAdvance => ImpactTarget::Supply,
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shortage => "shortage",
            Self::Surplus => "surplus",
            Self::DemandSpike => "demand spike",
            Self::DemandDrop => "demand drop",
            Self::RegulatoryChange => "regulatory change",
            Self::SupplyChainDisruption => "supply chain disruption",
            Self::TechnologicalAdvance => "technological advance",
        }
    }
}

/// Market index a [`MarketEvent`] acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ImpactTarget {
    /// The category demand index.
    Demand,
    /// The category supply index.
    Supply,
}

/// A temporary shock to one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarketEvent {
    /// Event identifier.
    pub id: MarketEventId,
    /// Kind of event.
    pub kind: MarketEventKind,
    /// Affected category.
    pub category: ProductCategory,
    /// Price multiplier applied to the category while active.
    pub impact: f64,
    /// Simulated day the event began.
    pub started_day: u64,
    /// Number of days the event lasts.
    pub duration_days: u64,
    /// Short description for notifications.
    pub description: String,
}

impl MarketEvent {
    /// Whether the event is still in effect on `day`.
    pub const fn is_active(&self, day: u64) -> bool {
        day < self.started_day.saturating_add(self.duration_days)
    }
}

/// A decaying price pressure on one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarketTrend {
    /// Trend identifier.
    pub id: TrendId,
    /// Affected category.
    pub category: ProductCategory,
    /// Signed strength; the price multiplier is `1 + strength`.
    pub strength: f64,
    /// Fraction of strength lost per simulated day.
    pub decay_per_day: f64,
    /// Event that started the trend, if any.
    pub source: Option<MarketEventId>,
}

/// Aggregate market indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarketIndices {
    /// Mean of `current_price / base_price` across products.
    pub price_index: f64,
    /// Demand index per category, 1.0 at equilibrium.
    pub demand: BTreeMap<ProductCategory, f64>,
    /// Supply index per category, 1.0 at equilibrium.
    pub supply: BTreeMap<ProductCategory, f64>,
}

impl Default for MarketIndices {
    fn default() -> Self {
        Self {
            price_index: 1.0,
            demand: ProductCategory::ALL.iter().map(|c| (*c, 1.0)).collect(),
            supply: ProductCategory::ALL.iter().map(|c| (*c, 1.0)).collect(),
        }
    }
}

impl MarketIndices {
    /// Demand index for `category` (1.0 if untracked).
    pub fn demand_for(&self, category: ProductCategory) -> f64 {
        self.demand.get(&category).copied().unwrap_or(1.0)
    }

    /// Supply index for `category` (1.0 if untracked).
    pub fn supply_for(&self, category: ProductCategory) -> f64 {
        self.supply.get(&category).copied().unwrap_or(1.0)
    }
}

/// The market slice of the game state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarketState {
    /// Vendors by id.
    pub vendors: BTreeMap<VendorId, Vendor>,
    /// Products by id.
    pub products: BTreeMap<ProductId, Product>,
    /// Price, demand, and supply indices.
    pub indices: MarketIndices,
    /// Active trends.
    pub trends: Vec<MarketTrend>,
    /// Active events.
    pub events: Vec<MarketEvent>,
    /// Seasonal price factor per category and season.
    pub seasonal: BTreeMap<ProductCategory, BTreeMap<Season, f64>>,
    /// Total number of market events ever generated.
    pub events_generated: u64,
}

impl MarketState {
    /// Seasonal factor for `category` in `season` (1.0 if unset).
    pub fn seasonal_factor(&self, category: ProductCategory, season: Season) -> f64 {
        self.seasonal
            .get(&category)
            .and_then(|by_season| by_season.get(&season))
            .copied()
            .unwrap_or(1.0)
    }

    /// Product of the impacts of events active on `day` for `category`.
    pub fn event_impact(&self, category: ProductCategory, day: u64) -> f64 {
        self.events
            .iter()
            .filter(|e| e.category == category && e.is_active(day))
            .map(|e| e.impact)
            .product()
    }

    /// Product of `1 + strength` over the trends for `category`.
    pub fn trend_factor(&self, category: ProductCategory) -> f64 {
        self.trends
            .iter()
            .filter(|t| t.category == category)
            .map(|t| 1.0 + t.strength)
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(category: ProductCategory, impact: f64, started_day: u64) -> MarketEvent {
        MarketEvent {
            id: MarketEventId::new(),
            kind: MarketEventKind::Shortage,
            category,
            impact,
            started_day,
            duration_days: 5,
            description: String::from("test"),
        }
    }

    #[test]
    fn event_activity_window() {
        let e = event(ProductCategory::Tools, 1.3, 10);
        assert!(e.is_active(10));
        assert!(e.is_active(14));
        assert!(!e.is_active(15));
    }

    #[test]
    fn impacts_compound_per_category() {
        let mut market = MarketState::default();
        market.events.push(event(ProductCategory::Tools, 1.5, 0));
        market.events.push(event(ProductCategory::Tools, 2.0, 0));
        market.events.push(event(ProductCategory::Furniture, 0.5, 0));
        assert!((market.event_impact(ProductCategory::Tools, 1) - 3.0).abs() < 1e-9);
        assert!((market.event_impact(ProductCategory::Cleaning, 1) - 1.0).abs() < 1e-9);
        assert!((market.event_impact(ProductCategory::Tools, 20) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn seasonal_factor_defaults_to_neutral() {
        let mut market = MarketState::default();
        assert!((market.seasonal_factor(ProductCategory::Tools, Season::Winter) - 1.0).abs() < 1e-9);
        market
            .seasonal
            .entry(ProductCategory::Tools)
            .or_default()
            .insert(Season::Winter, 1.2);
        assert!((market.seasonal_factor(ProductCategory::Tools, Season::Winter) - 1.2).abs() < 1e-9);
    }

    #[test]
    fn event_kinds_map_to_index() {
        assert_eq!(MarketEventKind::DemandSpike.target(), ImpactTarget::Demand);
        assert_eq!(MarketEventKind::Shortage.target(), ImpactTarget::Supply);
    }
}
