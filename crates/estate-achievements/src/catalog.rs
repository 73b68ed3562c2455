//! The built-in achievement set.

use estate_types::{
    AchievementCategory, AchievementCondition, AchievementDefinition, AchievementId,
    AchievementTier, ConditionKind, ItemGrant, RewardGrant,
};
use rust_decimal::Decimal;

struct Entry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: AchievementCategory,
    tier: AchievementTier,
    conditions: &'static [(ConditionKind, f64)],
    currency: i64,
    experience: u64,
    title: Option<&'static str>,
    item: Option<&'static str>,
    hidden: bool,
}

const CATALOG: [Entry; 14] = [
    Entry {
        id: "first_rent",
        name: "First Rent Check",
        description: "Collect rent for the first time.",
        category: AchievementCategory::Financial,
        tier: AchievementTier::Bronze,
        conditions: &[(ConditionKind::RentPayments, 1.0)],
        currency: 100,
        experience: 25,
        title: None,
        item: None,
        hidden: false,
    },
    Entry {
        id: "steady_income",
        name: "Steady Income",
        description: "Receive 50 rent payments.",
        category: AchievementCategory::Financial,
        tier: AchievementTier::Silver,
        conditions: &[(ConditionKind::RentPayments, 50.0)],
        currency: 1000,
        experience: 150,
        title: None,
        item: None,
        hidden: false,
    },
    Entry {
        id: "rent_baron",
        name: "Rent Baron",
        description: "Collect 50,000 in rent.",
        category: AchievementCategory::Financial,
        tier: AchievementTier::Gold,
        conditions: &[(ConditionKind::RentCollected, 50_000.0)],
        currency: 5000,
        experience: 500,
        title: Some("Rent Baron"),
        item: None,
        hidden: false,
    },
    Entry {
        id: "first_property",
        name: "Landlord",
        description: "Own your first property.",
        category: AchievementCategory::Property,
        tier: AchievementTier::Bronze,
        conditions: &[(ConditionKind::PropertiesOwned, 1.0)],
        currency: 200,
        experience: 50,
        title: None,
        item: None,
        hidden: false,
    },
    Entry {
        id: "property_mogul",
        name: "Property Mogul",
        description: "Own five properties.",
        category: AchievementCategory::Property,
        tier: AchievementTier::Gold,
        conditions: &[(ConditionKind::PropertiesOwned, 5.0)],
        currency: 3000,
        experience: 400,
        title: Some("Property Mogul"),
        item: None,
        hidden: false,
    },
    Entry {
        id: "full_house",
        name: "Full House",
        description: "House ten tenants at once.",
        category: AchievementCategory::Tenant,
        tier: AchievementTier::Silver,
        conditions: &[(ConditionKind::TenantsHoused, 10.0)],
        currency: 800,
        experience: 120,
        title: None,
        item: None,
        hidden: false,
    },
    Entry {
        id: "good_neighbors",
        name: "Good Neighbors",
        description: "Witness ten friendly tenant interactions.",
        category: AchievementCategory::Tenant,
        tier: AchievementTier::Silver,
        conditions: &[(ConditionKind::PositiveInteractions, 10.0)],
        currency: 500,
        experience: 100,
        title: None,
        item: None,
        hidden: false,
    },
    Entry {
        id: "first_expedition",
        name: "First Expedition",
        description: "Finish an exploration mission.",
        category: AchievementCategory::Exploration,
        tier: AchievementTier::Bronze,
        conditions: &[(ConditionKind::MissionsCompleted, 1.0)],
        currency: 150,
        experience: 40,
        title: None,
        item: None,
        hidden: false,
    },
    Entry {
        id: "seasoned_explorer",
        name: "Seasoned Explorer",
        description: "Succeed at ten missions.",
        category: AchievementCategory::Exploration,
        tier: AchievementTier::Gold,
        conditions: &[(ConditionKind::MissionsSucceeded, 10.0)],
        currency: 2500,
        experience: 600,
        title: None,
        item: Some("lantern"),
        hidden: false,
    },
    Entry {
        id: "bargain_hunter",
        name: "Bargain Hunter",
        description: "Buy 25 items from suppliers.",
        category: AchievementCategory::Market,
        tier: AchievementTier::Bronze,
        conditions: &[(ConditionKind::ItemsPurchased, 25.0)],
        currency: 300,
        experience: 60,
        title: None,
        item: None,
        hidden: false,
    },
    Entry {
        id: "market_watcher",
        name: "Market Watcher",
        description: "Live through five market events.",
        category: AchievementCategory::Market,
        tier: AchievementTier::Bronze,
        conditions: &[(ConditionKind::MarketEventsWitnessed, 5.0)],
        currency: 250,
        experience: 50,
        title: None,
        item: None,
        hidden: false,
    },
    Entry {
        id: "rising_star",
        name: "Rising Star",
        description: "Reach level 5.",
        category: AchievementCategory::Progression,
        tier: AchievementTier::Silver,
        conditions: &[(ConditionKind::PlayerLevel, 5.0)],
        currency: 1000,
        experience: 0,
        title: None,
        item: Some("climbing_rope"),
        hidden: false,
    },
    Entry {
        id: "tycoon",
        name: "Tycoon",
        description: "Hold 100,000 while owning ten properties.",
        category: AchievementCategory::Financial,
        tier: AchievementTier::Platinum,
        conditions: &[
            (ConditionKind::CurrencyHeld, 100_000.0),
            (ConditionKind::PropertiesOwned, 10.0),
        ],
        currency: 10_000,
        experience: 2000,
        title: Some("Tycoon"),
        item: None,
        hidden: true,
    },
    Entry {
        id: "one_year",
        name: "A Year in Real Estate",
        description: "Keep the business running for 365 days.",
        category: AchievementCategory::Progression,
        tier: AchievementTier::Gold,
        conditions: &[(ConditionKind::DaysPlayed, 365.0)],
        currency: 5000,
        experience: 1000,
        title: Some("Veteran"),
        item: None,
        hidden: true,
    },
];

/// The achievements every new game starts with.
pub fn default_catalog() -> Vec<AchievementDefinition> {
    CATALOG
        .iter()
        .map(|entry| AchievementDefinition {
            id: AchievementId::new(entry.id),
            name: entry.name.to_owned(),
            description: entry.description.to_owned(),
            category: entry.category,
            tier: entry.tier,
            conditions: entry
                .conditions
                .iter()
                .map(|(kind, target)| AchievementCondition {
                    kind: *kind,
                    target: *target,
                })
                .collect(),
            rewards: RewardGrant {
                currency: Decimal::from(entry.currency),
                experience: entry.experience,
                reputation: 0,
                items: entry
                    .item
                    .map(|key| ItemGrant {
                        item_key: key.to_owned(),
                        quantity: 1,
                    })
                    .into_iter()
                    .collect(),
                title: entry.title.map(str::to_owned),
            },
            hidden: entry.hidden,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn catalog_ids_are_unique_and_conditions_present() {
        let catalog = default_catalog();
        let ids: BTreeSet<_> = catalog.iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids.len(), catalog.len());
        assert!(catalog.iter().all(|d| !d.conditions.is_empty()));
        assert!(catalog.iter().any(|d| d.hidden));
    }
}
