//! Player-facing operations on the [`Orchestrator`].
//!
//! These are the calls the presentation layer makes. Validation failures
//! come back as a [`Rejection`] and leave the state untouched. Every
//! successful call runs the reaction stage before returning.

use estate_achievements::{
    AchievementEngine, AchievementError, AchievementView, ClaimOutcome, player_achievements,
};
use estate_engines::{exploration, market};
use estate_notify::{NotificationError, NotificationRequest, SendOutcome};
use estate_types::events::{
    MaintenanceDetails, MissionStartedDetails, PhaseChangedDetails, PropertyAddedDetails,
    PurchaseDetails, ResourcesChangedDetails, TenantAddedDetails, TenantRemovedDetails,
};
use estate_types::{
    AchievementId, ComplaintId, GameEvent, GamePhase, MissionId, MissionOutcome, NotificationId,
    NotificationSettings, ProductId, PropertyId, Rejection, RejectionReason, RemovalReason,
    ResourceDelta, Resources, Tenant, TenantId,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::info;

use crate::orchestrator::Orchestrator;
use crate::seed::{PropertyListing, TenantProfile};

/// Currency charged per square meter for each condition point restored.
pub const MAINTENANCE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Cost of bringing a property from `condition` back to 100.
pub fn maintenance_cost(area_sqm: f64, condition: f64) -> Decimal {
    let missing = (100.0 - condition).max(0.0);
    Decimal::from_f64(missing * area_sqm)
        .and_then(|units| units.checked_mul(MAINTENANCE_RATE))
        .map_or(Decimal::ZERO, |cost| cost.round_dp(2))
}

fn invalid(message: impl Into<String>) -> Rejection {
    Rejection::new(RejectionReason::InvalidInput, message)
}

impl Orchestrator {
    // -----------------------------------------------------------------------
    // Missions
    // -----------------------------------------------------------------------

    /// Start an available mission and schedule its resolution.
    pub fn start_mission(&mut self, mission_id: MissionId) -> Result<MissionStartedDetails, Rejection> {
        let details = exploration::start_mission(&mut self.state, &mut self.bus, mission_id)?;
        let duration = self.state.mission(mission_id)?.duration_hours;
        self.schedule_resolution(mission_id, u64::from(duration));
        self.settle();
        Ok(details)
    }

    /// Resolve a finished mission now instead of waiting for the scheduler.
    pub fn complete_mission(&mut self, mission_id: MissionId) -> Result<MissionOutcome, Rejection> {
        let outcome = exploration::complete_mission(
            &self.config.exploration,
            &mut self.state,
            &mut self.bus,
            &mut self.rng,
            mission_id,
        )?;
        self.cancel_resolution(mission_id);
        self.settle();
        Ok(outcome)
    }

    /// Abandon an in-progress mission. Costs are not refunded.
    pub fn cancel_mission(&mut self, mission_id: MissionId) -> Result<(), Rejection> {
        exploration::cancel_mission(&mut self.state, mission_id)?;
        self.cancel_resolution(mission_id);
        self.settle();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Player
    // -----------------------------------------------------------------------

    /// Claim the reward of a completed achievement and credit it.
    pub fn claim_reward(&mut self, achievement_id: &AchievementId) -> Result<ClaimOutcome, AchievementError> {
        let now = self.state.time.now();
        let player = self.state.player.id;
        let outcome = AchievementEngine::new(&mut self.state.achievements, &mut self.bus, now)
            .claim_reward(player, achievement_id)?;
        if let ClaimOutcome::Claimed(grant) = &outcome {
            self.state.player.apply_grant(grant);
        }
        self.settle();
        Ok(outcome)
    }

    /// The player's achievements with progress. Hidden ones appear once
    /// completed unless `include_hidden` is set.
    pub fn achievements(&self, include_hidden: bool) -> Vec<AchievementView> {
        player_achievements(&self.state.achievements, self.state.player.id, include_hidden)
    }

    /// Buy `quantity` units of a product.
    pub fn purchase_item(&mut self, product_id: ProductId, quantity: u32) -> Result<PurchaseDetails, Rejection> {
        let details = market::purchase_item(&mut self.state, &mut self.bus, product_id, quantity)?;
        self.settle();
        Ok(details)
    }

    /// Apply a signed change to the player's resources.
    ///
    /// Refused if currency or energy would go negative.
    pub fn update_player_resources(&mut self, delta: ResourceDelta) -> Result<Resources, Rejection> {
        self.state.player.apply_delta(&delta)?;
        let resources = self.state.player.resources.clone();
        self.bus.emit(GameEvent::ResourcesChanged(ResourcesChangedDetails {
            player_id: self.state.player.id,
            delta,
            resources: resources.clone(),
        }));
        self.settle();
        Ok(resources)
    }

    // -----------------------------------------------------------------------
    // Properties and tenants
    // -----------------------------------------------------------------------

    /// Buy a property. The purchase price is debited.
    pub fn add_property(&mut self, listing: PropertyListing) -> Result<PropertyId, Rejection> {
        if listing.name.trim().is_empty() {
            return Err(invalid("property name must not be empty"));
        }
        if listing.max_tenants == 0 {
            return Err(invalid("a property must house at least one tenant"));
        }
        if listing.area_sqm <= 0.0 || listing.monthly_rent.is_sign_negative() {
            return Err(invalid("area must be positive and rent must not be negative"));
        }
        if listing.purchase_price.is_sign_negative() {
            return Err(invalid("purchase price must not be negative"));
        }

        self.state
            .player
            .apply_delta(&ResourceDelta::currency(-listing.purchase_price))?;
        let property = listing.into_property(self.state.time.day());
        let details = PropertyAddedDetails {
            property_id: property.id,
            name: property.name.clone(),
            kind: property.kind,
            purchase_price: property.purchase_price,
        };
        self.state.insert_property(property);

        info!(property_id = %details.property_id, name = %details.name, "property added");
        let property_id = details.property_id;
        self.bus.emit(GameEvent::PropertyAdded(details));
        self.settle();
        Ok(property_id)
    }

    /// Restore a property to full condition, paying [`maintenance_cost`].
    pub fn perform_maintenance(&mut self, property_id: PropertyId) -> Result<MaintenanceDetails, Rejection> {
        let property = self.state.property(property_id)?;
        if property.condition >= 100.0 {
            return Err(Rejection::new(
                RejectionReason::InvalidState,
                format!("{} is already in full condition", property.name),
            ));
        }
        let cost = maintenance_cost(property.area_sqm, property.condition);
        self.state.player.apply_delta(&ResourceDelta::currency(-cost))?;

        let day = self.state.time.day();
        let property = self.state.property_mut(property_id)?;
        let condition_before = property.condition;
        property.set_condition(100.0);
        property.last_maintenance_day = Some(day);
        let details = MaintenanceDetails {
            property_id,
            condition_before,
            condition_after: property.condition,
            cost,
        };

        info!(%property_id, %cost, condition_before, "property maintained");
        self.bus.emit(GameEvent::PropertyMaintained(details.clone()));
        self.settle();
        Ok(details)
    }

    /// Move a new tenant into a property.
    pub fn add_tenant(&mut self, property_id: PropertyId, profile: TenantProfile) -> Result<TenantId, Rejection> {
        if profile.name.trim().is_empty() {
            return Err(invalid("tenant name must not be empty"));
        }
        let scalars = [
            profile.lifestyle.noise_level,
            profile.lifestyle.cleanliness,
            profile.lifestyle.social_activity,
            profile.preferences.noise_tolerance,
        ];
        if scalars.iter().any(|v| !(1..=10).contains(v)) {
            return Err(invalid("lifestyle scalars must be between 1 and 10"));
        }
        if profile.monthly_income.is_sign_negative() {
            return Err(invalid("income must not be negative"));
        }

        let tenant = profile.into_tenant(property_id, self.state.time.day());
        let details = TenantAddedDetails {
            tenant_id: tenant.id,
            property_id,
            name: tenant.name.clone(),
        };
        self.state.insert_tenant(tenant)?;

        info!(tenant_id = %details.tenant_id, %property_id, "tenant added");
        let tenant_id = details.tenant_id;
        self.bus.emit(GameEvent::TenantAdded(details));
        self.settle();
        Ok(tenant_id)
    }

    /// End a tenant's lease at the player's request.
    pub fn remove_tenant(&mut self, tenant_id: TenantId) -> Result<Tenant, Rejection> {
        let tenant = self.state.remove_tenant(tenant_id)?;
        info!(%tenant_id, "tenant removed");
        self.bus.emit(GameEvent::TenantRemoved(TenantRemovedDetails {
            tenant_id,
            property_id: tenant.property_id,
            name: tenant.name.clone(),
            reason: RemovalReason::Manual,
        }));
        self.settle();
        Ok(tenant)
    }

    /// Mark one complaint resolved.
    pub fn resolve_complaint(&mut self, tenant_id: TenantId, complaint_id: ComplaintId) -> Result<(), Rejection> {
        let tenant = self.state.tenant_mut(tenant_id)?;
        let complaint = tenant
            .complaints
            .iter_mut()
            .find(|c| c.id == complaint_id)
            .ok_or_else(|| Rejection::not_found(format!("complaint {complaint_id}")))?;
        if complaint.resolved {
            return Err(Rejection::new(
                RejectionReason::InvalidState,
                format!("complaint {complaint_id} is already resolved"),
            ));
        }
        complaint.resolved = true;
        info!(%tenant_id, %complaint_id, "complaint resolved");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    /// Send a custom notification to the player.
    pub fn send_notification(&mut self, request: NotificationRequest) -> SendOutcome {
        let now = self.state.time.now();
        let outcome = self
            .notifications
            .send_notification(&mut self.state.notifications, &mut self.bus, request, now);
        self.settle();
        outcome
    }

    /// Mark a notification read.
    pub fn mark_notification_read(&mut self, id: NotificationId) -> Result<(), NotificationError> {
        let now = self.state.time.now();
        self.notifications.mark_read(&mut self.state.notifications, id, now)
    }

    /// Mark every unread notification read. Returns how many changed.
    pub fn mark_all_notifications_read(&mut self) -> usize {
        let now = self.state.time.now();
        let player = self.state.player.id;
        self.notifications
            .mark_all_read(&mut self.state.notifications, player, now)
    }

    /// Archive a notification.
    pub fn archive_notification(&mut self, id: NotificationId) -> Result<(), NotificationError> {
        let now = self.state.time.now();
        self.notifications.archive(&mut self.state.notifications, id, now)
    }

    /// Delete a notification. It is purged by the next sweep.
    pub fn delete_notification(&mut self, id: NotificationId) -> Result<(), NotificationError> {
        self.notifications.delete(&mut self.state.notifications, id)
    }

    /// The player's notification settings, for editing.
    pub fn notification_settings_mut(&mut self) -> &mut NotificationSettings {
        let player = self.state.player.id;
        self.notifications
            .settings_for(&mut self.state.notifications, player)
    }

    // -----------------------------------------------------------------------
    // Phase
    // -----------------------------------------------------------------------

    /// Move the game to `next`.
    ///
    /// Allowed: setup to running, running and paused back and forth, and
    /// anything but stopped to stopped. Setting the current phase is a no-op.
    pub fn set_phase(&mut self, next: GamePhase) -> Result<(), Rejection> {
        use GamePhase::{Paused, Running, Setup, Stopped};

        let previous = self.state.phase;
        if previous == next {
            return Ok(());
        }
        let allowed = matches!(
            (previous, next),
            (Setup | Paused, Running) | (Running, Paused) | (Setup | Running | Paused, Stopped)
        );
        if !allowed {
            return Err(Rejection::new(
                RejectionReason::InvalidState,
                format!("cannot move from {previous:?} to {next:?}"),
            ));
        }

        self.state.phase = next;
        info!(?previous, current = ?next, "phase changed");
        self.bus.emit(GameEvent::PhaseChanged(PhaseChangedDetails {
            previous,
            current: next,
        }));
        self.settle();
        Ok(())
    }
}
