use brandhive_core::UserId;
use serde::{Deserialize, Serialize};

/// Action recorded on a per-user override row.
///
/// Unknown wire values deserialize as [`OverrideAction::None`], which
/// classifies as a denial rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideAction {
    /// Read access to the resource.
    Read,
    /// Read and write access to the resource.
    Write,
    /// Write access including deletion.
    Delete,
    /// Explicit removal of access.
    #[serde(other)]
    None,
}

impl OverrideAction {
    /// Returns the stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::None => "none",
        }
    }
}

/// Per-user exception to the role default for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverride {
    /// Stable override row identifier.
    pub id: i64,
    /// User the override applies to.
    pub user_id: UserId,
    /// Module key the override applies to.
    pub resource: String,
    /// Granted or revoked action.
    pub action: OverrideAction,
    /// Marks the override as a grant; `false` is always a denial.
    pub is_allowed: bool,
}

impl PermissionOverride {
    /// Returns whether this row denies access regardless of role defaults.
    #[must_use]
    pub fn is_denial(&self) -> bool {
        !self.is_allowed || self.action == OverrideAction::None
    }
}

/// Resolved override state for one `(user, resource)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceAccessState {
    /// No override row exists; the role default applies.
    Inherited,
    /// An override row grants access.
    Granted,
    /// An override row removes access; always wins over role defaults.
    Denied,
}

impl ResourceAccessState {
    /// Classifies an optional override row into one of the three states.
    ///
    /// Any `(action, is_allowed)` combination maps to exactly one state,
    /// including rows created outside the guided toggle cycle.
    #[must_use]
    pub fn classify(row: Option<&PermissionOverride>) -> Self {
        match row {
            None => Self::Inherited,
            Some(row) if row.is_denial() => Self::Denied,
            Some(_) => Self::Granted,
        }
    }

    /// Returns the stable storage value for this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inherited => "inherited",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

/// One step of the admin toggle cycle: inherited → granted → denied → inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideTransition {
    /// Create an override row granting write access.
    Grant,
    /// Update the override row to an explicit denial.
    Deny,
    /// Delete the override row, reverting to the role default.
    Clear,
}

impl OverrideTransition {
    /// Returns the single legal transition out of a state.
    #[must_use]
    pub fn from_state(state: ResourceAccessState) -> Self {
        match state {
            ResourceAccessState::Inherited => Self::Grant,
            ResourceAccessState::Granted => Self::Deny,
            ResourceAccessState::Denied => Self::Clear,
        }
    }

    /// Returns the state this transition produces.
    #[must_use]
    pub fn resulting_state(&self) -> ResourceAccessState {
        match self {
            Self::Grant => ResourceAccessState::Granted,
            Self::Deny => ResourceAccessState::Denied,
            Self::Clear => ResourceAccessState::Inherited,
        }
    }
}

/// Finds the override row for a resource, if one exists.
#[must_use]
pub fn find_override<'a>(
    overrides: &'a [PermissionOverride],
    resource: &str,
) -> Option<&'a PermissionOverride> {
    overrides.iter().find(|row| row.resource == resource)
}

#[cfg(test)]
mod tests {
    use brandhive_core::UserId;

    use super::{
        OverrideAction, OverrideTransition, PermissionOverride, ResourceAccessState, find_override,
    };

    fn row(action: OverrideAction, is_allowed: bool) -> PermissionOverride {
        PermissionOverride {
            id: 1,
            user_id: UserId::new(42),
            resource: "agency".to_owned(),
            action,
            is_allowed,
        }
    }

    #[test]
    fn missing_row_is_inherited() {
        assert_eq!(
            ResourceAccessState::classify(None),
            ResourceAccessState::Inherited
        );
    }

    #[test]
    fn every_action_flag_combination_classifies() {
        let actions = [
            OverrideAction::Read,
            OverrideAction::Write,
            OverrideAction::Delete,
            OverrideAction::None,
        ];

        for action in actions {
            for is_allowed in [true, false] {
                let state = ResourceAccessState::classify(Some(&row(action, is_allowed)));
                let expected = if is_allowed && action != OverrideAction::None {
                    ResourceAccessState::Granted
                } else {
                    ResourceAccessState::Denied
                };
                assert_eq!(state, expected, "{} / {is_allowed}", action.as_str());
            }
        }
    }

    #[test]
    fn toggle_cycle_returns_to_start_after_three_steps() {
        let mut state = ResourceAccessState::Inherited;
        for _ in 0..3 {
            state = OverrideTransition::from_state(state).resulting_state();
        }
        assert_eq!(state, ResourceAccessState::Inherited);
    }

    #[test]
    fn transitions_follow_the_strict_cycle() {
        assert_eq!(
            OverrideTransition::from_state(ResourceAccessState::Inherited),
            OverrideTransition::Grant
        );
        assert_eq!(
            OverrideTransition::from_state(ResourceAccessState::Granted),
            OverrideTransition::Deny
        );
        assert_eq!(
            OverrideTransition::from_state(ResourceAccessState::Denied),
            OverrideTransition::Clear
        );
    }

    #[test]
    fn find_override_matches_resource_key_exactly() {
        let rows = vec![row(OverrideAction::Write, true)];
        assert!(find_override(&rows, "agency").is_some());
        assert!(find_override(&rows, "agenc").is_none());
        assert!(find_override(&rows, "brand").is_none());
    }
}
