//! Supplier market: prices, demand and supply indices, events, and trends.

use std::collections::BTreeMap;

use estate_events::EventBus;
use estate_types::events::{
    MarketEventDetails, PricesUpdatedDetails, PurchaseDetails, TrendsUpdatedDetails,
};
use estate_types::{
    GameEvent, GameState, ImpactTarget, MarketEvent, MarketEventId, MarketEventKind,
    MarketState, PricePoint, ProductCategory, ProductId, Rejection, RejectionReason,
    ResourceDelta, Season, TrendId,
};
use estate_types::market::MarketTrend;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use tracing::{debug, info};

use crate::config::MarketConfig;
use crate::engine::{Inbox, SubEngine, TickContext};
use crate::error::EngineError;
use crate::rng::SimRng;

/// Engine name used in logs and tick summaries.
pub const MARKET_ENGINE: &str = "market";

/// Bounds for the demand and supply indices.
pub const INDEX_MIN: f64 = 0.25;
/// Upper bound for the demand and supply indices.
pub const INDEX_MAX: f64 = 4.0;

const RATIO_MIN: f64 = 0.5;
const RATIO_MAX: f64 = 2.0;

/// Price impact of an event kind and the multiplier it applies to its index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventProfile {
    /// Price multiplier while the event is active.
    pub impact: f64,
    /// Multiplier applied once to the targeted demand or supply index.
    pub index_factor: f64,
}

/// Fixed impact table for the market event taxonomy.
pub const fn event_profile(kind: MarketEventKind) -> EventProfile {
    let (impact, index_factor) = match kind {
        MarketEventKind::Shortage => (1.3, 0.7),
        MarketEventKind::Surplus => (0.8, 1.3),
        MarketEventKind::DemandSpike => (1.25, 1.4),
        MarketEventKind::DemandDrop => (0.85, 0.7),
        MarketEventKind::RegulatoryChange => (1.15, 0.9),
        MarketEventKind::SupplyChainDisruption => (1.35, 0.6),
        MarketEventKind::TechnologicalAdvance => (0.85, 1.2),
    };
    EventProfile {
        impact,
        index_factor,
    }
}

const fn category_name(category: ProductCategory) -> &'static str {
    match category {
        ProductCategory::Materials => "building materials",
        ProductCategory::Furniture => "furniture",
        ProductCategory::Appliances => "appliances",
        ProductCategory::Tools => "tools",
        ProductCategory::Cleaning => "cleaning supplies",
        ProductCategory::Equipment => "expedition equipment",
    }
}

/// Stock seasonal price factors for every category.
pub fn default_seasonal_table() -> BTreeMap<ProductCategory, BTreeMap<Season, f64>> {
    let rows: [(ProductCategory, [f64; 4]); 6] = [
        (ProductCategory::Materials, [1.05, 1.10, 1.00, 0.90]),
        (ProductCategory::Furniture, [1.00, 0.95, 1.05, 1.10]),
        (ProductCategory::Appliances, [1.00, 1.10, 0.95, 1.05]),
        (ProductCategory::Tools, [1.05, 1.05, 1.00, 0.90]),
        (ProductCategory::Cleaning, [1.10, 1.00, 1.00, 0.95]),
        (ProductCategory::Equipment, [1.00, 1.10, 1.00, 0.90]),
    ];
    rows.into_iter()
        .map(|(category, factors)| (category, Season::ALL.into_iter().zip(factors).collect()))
        .collect()
}

/// Multiplier on the base price the market is currently pulling toward.
pub fn target_multiplier(market: &MarketState, category: ProductCategory, season: Season, day: u64) -> f64 {
    let supply = market.indices.supply_for(category);
    let ratio = if supply > 0.0 {
        (market.indices.demand_for(category) / supply).clamp(RATIO_MIN, RATIO_MAX)
    } else {
        RATIO_MAX
    };
    market.seasonal_factor(category, season)
        * ratio
        * market.event_impact(category, day)
        * market.trend_factor(category)
}

/// One price step: random fluctuation, partial reversion toward `target`,
/// rounding to cents, then clamping into `[floor, ceiling]`.
pub fn nudge_price(
    current: Decimal,
    target: Decimal,
    fluctuation: f64,
    reversion: f64,
    floor: Decimal,
    ceiling: Decimal,
) -> Decimal {
    let (Some(current_f), Some(target_f)) = (current.to_f64(), target.to_f64()) else {
        return current.clamp(floor, ceiling);
    };
    let fluctuated = current_f * (1.0 + fluctuation);
    let reverted = fluctuated + (target_f - fluctuated) * reversion.clamp(0.0, 1.0);
    Decimal::from_f64(reverted)
        .unwrap_or(current)
        .round_dp(2)
        .clamp(floor, ceiling)
}

/// Mean of `current_price / base_price` across products (1.0 when empty).
pub fn price_index(market: &MarketState) -> f64 {
    let ratios: Vec<f64> = market
        .products
        .values()
        .filter_map(|p| p.current_price.checked_div(p.base_price))
        .filter_map(|r| r.to_f64())
        .collect();
    if ratios.is_empty() {
        return 1.0;
    }
    ratios.iter().sum::<f64>() / ratios.len() as f64
}

/// Buy `quantity` units of a product.
///
/// Debits the player, adds the items to inventory, reduces stock, and
/// emits `market:item_purchased`. Nothing changes when rejected.
pub fn purchase_item(
    state: &mut GameState,
    bus: &mut EventBus,
    product_id: ProductId,
    quantity: u32,
) -> Result<PurchaseDetails, Rejection> {
    if quantity == 0 {
        return Err(Rejection::new(
            RejectionReason::InvalidInput,
            "quantity must be at least 1",
        ));
    }
    let product = state
        .market
        .products
        .get(&product_id)
        .ok_or_else(|| Rejection::not_found(format!("product {product_id}")))?;
    if product.stock < quantity {
        return Err(Rejection::new(
            RejectionReason::OutOfStock,
            format!("{} has {} in stock, {quantity} requested", product.name, product.stock),
        ));
    }
    let total_cost = product
        .current_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| Rejection::new(RejectionReason::InvalidInput, "purchase total overflows"))?;
    let details = PurchaseDetails {
        product_id,
        category: product.category,
        item_key: product.item_key.clone(),
        quantity,
        total_cost,
    };

    state.player.apply_delta(&ResourceDelta::currency(-total_cost))?;
    state.player.add_item(&details.item_key, quantity);
    if let Some(product) = state.market.products.get_mut(&product_id) {
        product.stock = product.stock.saturating_sub(quantity);
    }

    info!(%product_id, quantity, %total_cost, "item purchased");
    bus.emit(GameEvent::ItemPurchased(details.clone()));
    Ok(details)
}

/// Drives the supplier market.
#[derive(Debug)]
pub struct MarketEngine {
    config: MarketConfig,
    purchases: Inbox<(ProductCategory, u32)>,
}

impl MarketEngine {
    /// Create the engine with the given tuning.
    pub fn new(config: MarketConfig) -> Self {
        Self {
            config,
            purchases: Inbox::new(),
        }
    }

    fn apply_purchases(&mut self, market: &mut MarketState) {
        for (category, quantity) in self.purchases.drain() {
            let demand = market.indices.demand.entry(category).or_insert(1.0);
            *demand = (*demand + self.config.purchase_demand_bump * f64::from(quantity))
                .clamp(INDEX_MIN, INDEX_MAX);
        }
    }

    fn revert_indices(&self, market: &mut MarketState, rng: &mut dyn SimRng, elapsed_days: f64) {
        let pull = (self.config.index_reversion_per_day * elapsed_days).min(1.0);
        let noise = self.config.index_noise_per_day * elapsed_days;
        for index in market
            .indices
            .demand
            .values_mut()
            .chain(market.indices.supply.values_mut())
        {
            let jitter = rng.uniform(-noise, noise);
            *index = (*index + (1.0 - *index) * pull + jitter).clamp(INDEX_MIN, INDEX_MAX);
        }
    }

    fn maybe_generate_event(
        &self,
        market: &mut MarketState,
        bus: &mut EventBus,
        rng: &mut dyn SimRng,
        day: u64,
        elapsed_days: f64,
    ) {
        if !rng.chance(self.config.event_chance_per_day * elapsed_days) {
            return;
        }
        let kinds = MarketEventKind::ALL;
        let categories = ProductCategory::ALL;
        let (Some(&kind), Some(&category)) = (
            kinds.get(rng.next_index(kinds.len())),
            categories.get(rng.next_index(categories.len())),
        ) else {
            return;
        };
        let spread = self
            .config
            .max_event_days
            .saturating_sub(self.config.min_event_days)
            .saturating_add(1);
        let extra = rng.next_index(usize::try_from(spread).unwrap_or(1));
        let duration_days = self
            .config
            .min_event_days
            .saturating_add(u64::try_from(extra).unwrap_or(0))
            .max(1);

        let profile = event_profile(kind);
        let index = match kind.target() {
            ImpactTarget::Demand => &mut market.indices.demand,
            ImpactTarget::Supply => &mut market.indices.supply,
        };
        let value = index.entry(category).or_insert(1.0);
        *value = (*value * profile.index_factor).clamp(INDEX_MIN, INDEX_MAX);

        let event = MarketEvent {
            id: MarketEventId::new(),
            kind,
            category,
            impact: profile.impact,
            started_day: day,
            duration_days,
            description: format!("{} in {}", kind.label(), category_name(category)),
        };
        market.trends.push(MarketTrend {
            id: TrendId::new(),
            category,
            strength: (profile.impact - 1.0) / 2.0,
            decay_per_day: self.config.trend_decay_per_day,
            source: Some(event.id),
        });
        market.events_generated = market.events_generated.saturating_add(1);

        info!(kind = kind.label(), ?category, duration_days, "market event");
        bus.emit(GameEvent::MarketEventOccurred(MarketEventDetails {
            event_id: event.id,
            kind,
            category,
            impact: event.impact,
            duration_days,
            description: event.description.clone(),
        }));
        market.events.push(event);
    }

    fn update_prices(&self, market: &mut MarketState, rng: &mut dyn SimRng, season: Season, day: u64, elapsed_days: f64) {
        let reversion = (self.config.price_reversion_per_day * elapsed_days).min(1.0);
        let multipliers: BTreeMap<ProductCategory, f64> = ProductCategory::ALL
            .iter()
            .map(|c| (*c, target_multiplier(market, *c, season, day)))
            .collect();
        let swing = self.config.price_fluctuation;
        for product in market.products.values_mut() {
            let multiplier = multipliers.get(&product.category).copied().unwrap_or(1.0);
            let target = product
                .base_price
                .to_f64()
                .and_then(|base| Decimal::from_f64(base * multiplier))
                .unwrap_or(product.base_price);
            let fluctuation = rng.uniform(-swing, swing);
            product.current_price = nudge_price(
                product.current_price,
                target,
                fluctuation,
                reversion,
                product.price_floor(),
                product.price_ceiling(),
            );
        }
        market.indices.price_index = price_index(market);
    }

    fn begin_day(&self, market: &mut MarketState, bus: &mut EventBus, day: u64) {
        let keep = self.config.history_len;
        for product in market.products.values_mut() {
            product.history.push(PricePoint {
                day,
                price: product.current_price,
            });
            let excess = product.history.len().saturating_sub(keep);
            if excess > 0 {
                product.history.drain(..excess);
            }
        }

        let floor = self.config.trend_floor;
        for trend in &mut market.trends {
            trend.strength *= (1.0 - trend.decay_per_day).max(0.0);
        }
        market.trends.retain(|t| t.strength.abs() >= floor);

        let before = market.events.len();
        market.events.retain(|e| e.is_active(day));
        let expired = before.saturating_sub(market.events.len());
        if expired > 0 {
            debug!(expired, day, "market events expired");
        }

        bus.emit(GameEvent::TrendsUpdated(TrendsUpdatedDetails {
            day,
            active_trends: u32::try_from(market.trends.len()).unwrap_or(u32::MAX),
            price_index: market.indices.price_index,
        }));
    }
}

impl SubEngine for MarketEngine {
    fn name(&self) -> &'static str {
        MARKET_ENGINE
    }

    fn initialize(&mut self, state: &GameState, bus: &mut EventBus) -> Result<(), EngineError> {
        if !self.purchases.is_subscribed() {
            self.purchases
                .subscribe(bus, "market:item_purchased", |event| match event {
                    GameEvent::ItemPurchased(details) => Some((details.category, details.quantity)),
                    _ => None,
                });
        }
        info!(
            products = state.market.products.len(),
            vendors = state.market.vendors.len(),
            "market engine initialized"
        );
        Ok(())
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<(), EngineError> {
        let season = ctx.state.time.season();
        let delta = ctx.delta;
        let market = &mut ctx.state.market;

        self.apply_purchases(market);
        self.revert_indices(market, ctx.rng, delta.elapsed_days);
        self.maybe_generate_event(market, ctx.bus, ctx.rng, delta.day, delta.elapsed_days);
        self.update_prices(market, ctx.rng, season, delta.day, delta.elapsed_days);

        ctx.bus.emit(GameEvent::PricesUpdated(PricesUpdatedDetails {
            tick: delta.tick,
            products: u32::try_from(market.products.len()).unwrap_or(u32::MAX),
            price_index: market.indices.price_index,
        }));

        for day in delta.new_days() {
            self.begin_day(market, ctx.bus, day);
        }
        Ok(())
    }

    fn cleanup(&mut self, bus: &mut EventBus) {
        self.purchases.unsubscribe_all(bus);
    }
}
