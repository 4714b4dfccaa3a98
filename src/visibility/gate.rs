use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::constants::{ENV_DEV, ENV_PRD, TESTING_LABEL};
use crate::common::types::NormalizedAction;
use crate::metrics::VisibilityMetrics;

/// Precedence policy selected per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateMode {
    /// Query override always honored, toggle always available.
    #[default]
    AlwaysToggleable,
    /// Production builds are never in dev mode.
    ProdLocked,
    /// Query override and toggle only take effect in development builds.
    DevGatedQuery,
}

impl GateMode {
    /// Whether the query and manual overrides take effect in this build.
    fn overrides_allowed(self, build_is_dev: bool) -> bool {
        match self {
            GateMode::AlwaysToggleable => true,
            GateMode::ProdLocked | GateMode::DevGatedQuery => build_is_dev,
        }
    }
}

impl FromStr for GateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always-toggleable" | "a" => Ok(GateMode::AlwaysToggleable),
            "prod-locked" | "b" => Ok(GateMode::ProdLocked),
            "dev-gated-query" | "c" => Ok(GateMode::DevGatedQuery),
            other => Err(format!("unknown gate mode: {other}")),
        }
    }
}

/// Value of the `env` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOverride {
    Dev,
    Prd,
}

impl QueryOverride {
    /// `dev` and `prd` are recognized; anything else counts as absent.
    pub fn from_query_value(value: Option<&str>) -> Option<Self> {
        match value? {
            ENV_DEV => Some(QueryOverride::Dev),
            ENV_PRD => Some(QueryOverride::Prd),
            _ => None,
        }
    }

    fn as_bool(self) -> bool {
        matches!(self, QueryOverride::Dev)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManualOverride {
    #[default]
    Unset,
    ForcedOn,
    ForcedOff,
}

impl ManualOverride {
    fn as_bool(self) -> Option<bool> {
        match self {
            ManualOverride::Unset => None,
            ManualOverride::ForcedOn => Some(true),
            ManualOverride::ForcedOff => Some(false),
        }
    }

    fn forced(value: bool) -> Self {
        if value {
            ManualOverride::ForcedOn
        } else {
            ManualOverride::ForcedOff
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateInputs {
    pub build_is_dev: bool,
    pub query: Option<QueryOverride>,
    pub manual: ManualOverride,
}

/// Effective dev-mode value: manual > query > build, where the mode decides
/// whether manual and query count at all. A production build that ignores
/// both therefore resolves to `false`.
pub fn resolve(mode: GateMode, inputs: GateInputs) -> bool {
    if mode.overrides_allowed(inputs.build_is_dev) {
        if let Some(forced) = inputs.manual.as_bool() {
            return forced;
        }
        if let Some(query) = inputs.query {
            return query.as_bool();
        }
    }
    inputs.build_is_dev
}

/// Holds the manual override for one deployment. Shared by reference; the
/// toggle is the only writer.
#[derive(Debug)]
pub struct VisibilityGate {
    mode: GateMode,
    build_is_dev: bool,
    manual: Mutex<ManualOverride>,
}

impl VisibilityGate {
    pub fn new(mode: GateMode, build_is_dev: bool) -> Self {
        Self {
            mode,
            build_is_dev,
            manual: Mutex::new(ManualOverride::Unset),
        }
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    fn lock_manual(&self) -> MutexGuard<'_, ManualOverride> {
        // The override is a plain value, so a poisoned lock still holds a valid one.
        self.manual.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn inputs(&self, manual: ManualOverride, query: Option<QueryOverride>) -> GateInputs {
        GateInputs {
            build_is_dev: self.build_is_dev,
            query,
            manual,
        }
    }

    pub fn manual_override(&self) -> ManualOverride {
        *self.lock_manual()
    }

    pub fn toggle_available(&self) -> bool {
        self.mode.overrides_allowed(self.build_is_dev)
    }

    pub fn is_dev_mode(&self, query: Option<QueryOverride>) -> bool {
        let manual = *self.lock_manual();
        resolve(self.mode, self.inputs(manual, query))
    }

    /// Flip the currently effective value and pin it as the manual override.
    /// Returns the new effective value; a no-op when the mode forbids toggling.
    pub fn toggle(&self, query: Option<QueryOverride>) -> bool {
        let mut manual = self.lock_manual();
        let current = resolve(self.mode, self.inputs(*manual, query));
        if !self.toggle_available() {
            debug!(mode = ?self.mode, "dev-mode toggle ignored");
            VisibilityMetrics::record_toggle(false);
            return current;
        }
        *manual = ManualOverride::forced(!current);
        VisibilityMetrics::record_toggle(true);
        info!(dev_mode = !current, "dev-mode override set");
        resolve(self.mode, self.inputs(*manual, query))
    }

    /// Return to auto-detection from query and build.
    pub fn clear_override(&self) {
        *self.lock_manual() = ManualOverride::Unset;
    }
}

pub fn is_visible(is_dev_mode: bool, action: &NormalizedAction) -> bool {
    is_dev_mode || !action.has_label(TESTING_LABEL)
}

/// Actions shown for the given dev-mode value, in input order.
pub fn visible_actions(is_dev_mode: bool, actions: &[NormalizedAction]) -> Vec<&NormalizedAction> {
    actions
        .iter()
        .filter(|a| is_visible(is_dev_mode, a))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const QUERIES: [Option<QueryOverride>; 3] =
        [None, Some(QueryOverride::Dev), Some(QueryOverride::Prd)];
    const MANUALS: [ManualOverride; 3] = [
        ManualOverride::Unset,
        ManualOverride::ForcedOn,
        ManualOverride::ForcedOff,
    ];

    fn action(labels: &[&str]) -> NormalizedAction {
        NormalizedAction {
            date: NaiveDate::from_ymd_opt(2025, 10, 18).unwrap(),
            headline: String::new(),
            details: String::new(),
            link_text: "Learn more".to_string(),
            link_url: "#".to_string(),
            social_message: String::new(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            image_front: Default::default(),
            image_back: Default::default(),
            image_attributions: Vec::new(),
        }
    }

    #[test]
    fn test_query_values() {
        assert_eq!(QueryOverride::from_query_value(Some("dev")), Some(QueryOverride::Dev));
        assert_eq!(QueryOverride::from_query_value(Some("prd")), Some(QueryOverride::Prd));
        assert_eq!(QueryOverride::from_query_value(Some("DEV")), None);
        assert_eq!(QueryOverride::from_query_value(Some("staging")), None);
        assert_eq!(QueryOverride::from_query_value(None), None);
    }

    #[test]
    fn test_defaults_to_build_flag() {
        for mode in [GateMode::AlwaysToggleable, GateMode::ProdLocked, GateMode::DevGatedQuery] {
            for build_is_dev in [true, false] {
                let inputs = GateInputs {
                    build_is_dev,
                    ..Default::default()
                };
                assert_eq!(resolve(mode, inputs), build_is_dev, "{mode:?}");
            }
        }
    }

    #[test]
    fn test_always_toggleable_precedence() {
        let mode = GateMode::AlwaysToggleable;
        let prod_with_dev_query = GateInputs {
            build_is_dev: false,
            query: Some(QueryOverride::Dev),
            manual: ManualOverride::Unset,
        };
        assert!(resolve(mode, prod_with_dev_query));

        let dev_with_prd_query = GateInputs {
            build_is_dev: true,
            query: Some(QueryOverride::Prd),
            manual: ManualOverride::Unset,
        };
        assert!(!resolve(mode, dev_with_prd_query));

        let manual_beats_query = GateInputs {
            build_is_dev: false,
            query: Some(QueryOverride::Dev),
            manual: ManualOverride::ForcedOff,
        };
        assert!(!resolve(mode, manual_beats_query));
    }

    #[test]
    fn test_prod_locked_production_is_always_off() {
        let gate = VisibilityGate::new(GateMode::ProdLocked, false);
        assert!(!gate.toggle_available());
        for query in QUERIES {
            assert!(!gate.is_dev_mode(query));
            assert!(!gate.toggle(query));
            assert!(!gate.is_dev_mode(query));
        }
        assert_eq!(gate.manual_override(), ManualOverride::Unset);

        for query in QUERIES {
            for manual in MANUALS {
                let inputs = GateInputs {
                    build_is_dev: false,
                    query,
                    manual,
                };
                assert!(!resolve(GateMode::ProdLocked, inputs));
            }
        }
    }

    #[test]
    fn test_prod_locked_dev_build_behaves_like_always_toggleable() {
        let gate = VisibilityGate::new(GateMode::ProdLocked, true);
        assert!(gate.is_dev_mode(None));
        assert!(!gate.is_dev_mode(Some(QueryOverride::Prd)));
        assert!(!gate.toggle(None));
        assert_eq!(gate.manual_override(), ManualOverride::ForcedOff);
    }

    #[test]
    fn test_dev_gated_query_ignores_query_in_production() {
        let gate = VisibilityGate::new(GateMode::DevGatedQuery, false);
        assert!(!gate.is_dev_mode(Some(QueryOverride::Dev)));
        assert!(!gate.toggle_available());
        assert!(!gate.toggle(Some(QueryOverride::Dev)));
        assert_eq!(gate.manual_override(), ManualOverride::Unset);
    }

    #[test]
    fn test_dev_gated_query_honors_query_in_dev_build() {
        let gate = VisibilityGate::new(GateMode::DevGatedQuery, true);
        assert!(!gate.is_dev_mode(Some(QueryOverride::Prd)));
        assert!(gate.toggle_available());
        assert!(gate.toggle(Some(QueryOverride::Prd)));
        // manual now outranks the query
        assert!(gate.is_dev_mode(Some(QueryOverride::Prd)));
    }

    #[test]
    fn test_toggle_flips_effective_value() {
        let gate = VisibilityGate::new(GateMode::AlwaysToggleable, false);
        let query = Some(QueryOverride::Dev);
        assert!(gate.is_dev_mode(query));
        assert!(!gate.toggle(query));
        assert!(!gate.is_dev_mode(query));
        assert_eq!(gate.manual_override(), ManualOverride::ForcedOff);
        assert!(gate.toggle(query));
        assert!(gate.is_dev_mode(None));
    }

    #[test]
    fn test_toggle_in_dev_build_disables_dev_mode() {
        let gate = VisibilityGate::new(GateMode::AlwaysToggleable, true);
        assert!(!gate.toggle(None));
        assert!(!gate.is_dev_mode(None));
        gate.clear_override();
        assert!(gate.is_dev_mode(None));
    }

    #[test]
    fn test_gates_are_independent() {
        let first = VisibilityGate::new(GateMode::AlwaysToggleable, false);
        let second = VisibilityGate::new(GateMode::AlwaysToggleable, false);
        first.toggle(None);
        assert!(first.is_dev_mode(None));
        assert!(!second.is_dev_mode(None));
    }

    #[test]
    fn test_filter_hides_testing_only_outside_dev_mode() {
        let actions = vec![
            action(&["urgent"]),
            action(&["testing"]),
            action(&[]),
            action(&["local", "testing"]),
        ];

        for a in &actions {
            if a.has_label("testing") {
                assert!(is_visible(true, a));
                assert!(!is_visible(false, a));
            } else {
                assert_eq!(is_visible(true, a), is_visible(false, a));
            }
        }

        assert_eq!(visible_actions(false, &actions).len(), 2);
        assert_eq!(visible_actions(true, &actions).len(), 4);
        assert_eq!(visible_actions(false, &actions)[0].labels, vec!["urgent"]);
    }

    #[test]
    fn test_gate_mode_from_str() {
        assert_eq!("prod-locked".parse::<GateMode>(), Ok(GateMode::ProdLocked));
        assert_eq!(" B ".parse::<GateMode>(), Ok(GateMode::ProdLocked));
        assert_eq!("dev-gated-query".parse::<GateMode>(), Ok(GateMode::DevGatedQuery));
        assert!("sometimes".parse::<GateMode>().is_err());
    }
}
