//! Notification templates rendered with `minijinja`.
//!
//! Each template has a title and a message source. They are registered in
//! the environment as `<id>.title` and `<id>.message` and rendered against
//! the JSON variables passed with the send request. Missing variables
//! render as empty strings.

use std::collections::BTreeMap;

use estate_types::{NotificationPriority, NotificationType, TemplateId};
use minijinja::Environment;

use crate::error::NotificationError;

/// Template ids used for game events.
pub mod ids {
    /// An achievement was completed.
    pub const ACHIEVEMENT_UNLOCKED: &str = "achievement_unlocked";
    /// A tenant missed rent.
    pub const RENT_MISSED: &str = "rent_missed";
    /// Two tenants fell out.
    pub const TENANT_CONFLICT: &str = "tenant_conflict";
    /// A tenant's satisfaction fell below the unhappy threshold.
    pub const TENANT_UNHAPPY: &str = "tenant_unhappy";
    /// A property needs maintenance.
    pub const MAINTENANCE_NEEDED: &str = "maintenance_needed";
    /// A market event began.
    pub const MARKET_EVENT: &str = "market_event";
    /// The player levelled up.
    pub const LEVEL_UP: &str = "level_up";
    /// A mission was resolved.
    pub const MISSION_COMPLETE: &str = "mission_complete";
    /// Saving the game failed.
    pub const SAVE_FAILED: &str = "save_failed";
}

/// A template definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    /// Template id.
    pub id: TemplateId,
    /// Notification type produced.
    pub kind: NotificationType,
    /// Priority produced.
    pub priority: NotificationPriority,
    /// Title source.
    pub title: String,
    /// Message source.
    pub message: String,
}

impl NotificationTemplate {
    /// Convenience constructor.
    pub fn new(
        id: &str,
        kind: NotificationType,
        priority: NotificationPriority,
        title: &str,
        message: &str,
    ) -> Self {
        Self {
            id: TemplateId::new(id),
            kind,
            priority,
            title: title.to_owned(),
            message: message.to_owned(),
        }
    }
}

/// A rendered template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Notification type.
    pub kind: NotificationType,
    /// Priority.
    pub priority: NotificationPriority,
    /// Rendered title.
    pub title: String,
    /// Rendered message.
    pub message: String,
}

/// The built-in templates.
pub fn builtin_templates() -> Vec<NotificationTemplate> {
    use NotificationPriority::{High, Low, Normal, Urgent};
    vec![
        NotificationTemplate::new(
            ids::ACHIEVEMENT_UNLOCKED,
            NotificationType::Achievement,
            Normal,
            "Achievement unlocked: {{ name }}",
            "You earned the {{ tier }} achievement \"{{ name }}\". Claim your reward!",
        ),
        NotificationTemplate::new(
            ids::RENT_MISSED,
            NotificationType::RentMissed,
            High,
            "Rent missed",
            "{{ tenant }} missed a rent payment of {{ amount }}\
             {% if misses > 1 %} ({{ misses }} in a row){% endif %}.",
        ),
        NotificationTemplate::new(
            ids::TENANT_CONFLICT,
            NotificationType::TenantConflict,
            Normal,
            "Tenant conflict",
            "{{ first }} and {{ second }} had a falling out.",
        ),
        NotificationTemplate::new(
            ids::TENANT_UNHAPPY,
            NotificationType::TenantUnhappy,
            Urgent,
            "{{ tenant }} is unhappy",
            "{{ tenant }}'s satisfaction dropped to {{ satisfaction }}. They may move out soon.",
        ),
        NotificationTemplate::new(
            ids::MAINTENANCE_NEEDED,
            NotificationType::Maintenance,
            High,
            "Maintenance needed",
            "{{ property }} is in poor condition ({{ condition }}%).",
        ),
        NotificationTemplate::new(
            ids::MARKET_EVENT,
            NotificationType::MarketEvent,
            Low,
            "Market news",
            "{{ description }}, expected to last {{ days }} days.",
        ),
        NotificationTemplate::new(
            ids::LEVEL_UP,
            NotificationType::LevelUp,
            Normal,
            "Level up!",
            "{{ player }} reached level {{ level }}.",
        ),
        NotificationTemplate::new(
            ids::MISSION_COMPLETE,
            NotificationType::MissionComplete,
            Normal,
            "{% if success %}Mission accomplished{% else %}Mission failed{% endif %}",
            "{{ mission }} {% if success %}succeeded{% else %}failed{% endif %}. \
             You receive {{ currency }}.",
        ),
        NotificationTemplate::new(
            ids::SAVE_FAILED,
            NotificationType::System,
            Urgent,
            "Save failed",
            "Could not save to slot {{ slot }}: {{ error }}",
        ),
    ]
}

/// Registered templates and the environment that renders them.
pub struct TemplateRegistry {
    env: Environment<'static>,
    meta: BTreeMap<TemplateId, (NotificationType, NotificationPriority)>,
}

impl core::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("templates", &self.meta.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            meta: BTreeMap::new(),
        }
    }

    /// A registry holding [`builtin_templates`].
    pub fn with_builtins() -> Result<Self, NotificationError> {
        let mut registry = Self::new();
        for template in builtin_templates() {
            registry.register(template)?;
        }
        Ok(registry)
    }

    /// Add or replace a template. Fails if either source does not compile.
    pub fn register(&mut self, template: NotificationTemplate) -> Result<(), NotificationError> {
        let id = template.id.as_str().to_owned();
        for (part, source) in [("title", template.title), ("message", template.message)] {
            let name = format!("{id}.{part}");
            self.env
                .add_template_owned(name.clone(), source)
                .map_err(|e| NotificationError::Template {
                    template: name,
                    reason: e.to_string(),
                })?;
        }
        self.meta
            .insert(template.id, (template.kind, template.priority));
        Ok(())
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &TemplateId) -> bool {
        self.meta.contains_key(id)
    }

    /// Render template `id` against `vars`.
    pub fn render(&self, id: &TemplateId, vars: &serde_json::Value) -> Result<Rendered, NotificationError> {
        let (kind, priority) = self
            .meta
            .get(id)
            .copied()
            .ok_or_else(|| NotificationError::UnknownTemplate(id.clone()))?;
        Ok(Rendered {
            kind,
            priority,
            title: self.render_part(id, "title", vars)?,
            message: self.render_part(id, "message", vars)?,
        })
    }

    fn render_part(&self, id: &TemplateId, part: &str, vars: &serde_json::Value) -> Result<String, NotificationError> {
        let name = format!("{}.{part}", id.as_str());
        let template = self
            .env
            .get_template(&name)
            .map_err(|e| NotificationError::Template {
                template: name.clone(),
                reason: e.to_string(),
            })?;
        template.render(vars).map_err(|e| NotificationError::Template {
            template: name,
            reason: e.to_string(),
        })
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builtins_compile_and_render() {
        let registry = TemplateRegistry::with_builtins().unwrap();
        let rendered = registry
            .render(
                &TemplateId::new(ids::RENT_MISSED),
                &json!({ "tenant": "Ada", "amount": "900", "misses": 2 }),
            )
            .unwrap();
        assert_eq!(rendered.kind, NotificationType::RentMissed);
        assert_eq!(rendered.priority, NotificationPriority::High);
        assert_eq!(
            rendered.message,
            "Ada missed a rent payment of 900 (2 in a row)."
        );

        let mission = registry
            .render(
                &TemplateId::new(ids::MISSION_COMPLETE),
                &json!({ "mission": "Ridge Caves", "success": false, "currency": "180" }),
            )
            .unwrap();
        assert_eq!(mission.title, "Mission failed");
    }

    #[test]
    fn missing_variables_render_empty() {
        let registry = TemplateRegistry::with_builtins().unwrap();
        let rendered = registry
            .render(&TemplateId::new(ids::LEVEL_UP), &json!({ "level": 3 }))
            .unwrap();
        assert_eq!(rendered.message, " reached level 3.");
    }

    #[test]
    fn unknown_and_broken_templates() {
        let mut registry = TemplateRegistry::new();
        let unknown = registry.render(&TemplateId::new("nope"), &json!({}));
        assert!(matches!(unknown, Err(NotificationError::UnknownTemplate(_))));

        let broken = NotificationTemplate::new(
            "broken",
            NotificationType::System,
            NotificationPriority::Low,
            "{% if %}",
            "fine",
        );
        assert!(matches!(
            registry.register(broken),
            Err(NotificationError::Template { .. })
        ));
    }
}
