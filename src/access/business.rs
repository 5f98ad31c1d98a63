use serde::{Deserialize, Serialize};

use crate::access::error::AccessError;
use crate::types::{BusinessId, BusinessMembership};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBusinessSelection {
    pub business_id: BusinessId,
}

/// Validate `requested` against the membership list.
///
/// Unknown ids are rejected so a stale id never reaches tenant-scoped fetches.
pub fn select_active_business(
    memberships: &[BusinessMembership],
    requested: BusinessId,
) -> Result<ActiveBusinessSelection, AccessError> {
    if memberships.iter().any(|m| m.business_id == requested) {
        Ok(ActiveBusinessSelection {
            business_id: requested,
        })
    } else {
        tracing::warn!("Rejected selection of business {} outside membership list", requested);
        Err(AccessError::InvalidSelection(requested))
    }
}

/// Whether a business selector should be offered at all
pub fn is_switchable(memberships: &[BusinessMembership]) -> bool {
    memberships.len() > 1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitcherOption {
    pub business_id: BusinessId,
    pub label: String,
}

/// What the business selector should show for the current memberships
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessSwitcher {
    pub visible: bool,
    pub active_business_id: Option<BusinessId>,
    pub options: Vec<SwitcherOption>,
}

/// Session-scoped active tenant. Only [`BusinessContext::select`] mutates it.
#[derive(Debug, Default)]
pub struct BusinessContext {
    chosen: Option<ActiveBusinessSelection>,
}

impl BusinessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit choice if it is still a membership, otherwise the first membership
    pub fn active(&self, memberships: &[BusinessMembership]) -> Option<BusinessId> {
        self.chosen
            .map(|selection| selection.business_id)
            .filter(|id| memberships.iter().any(|m| m.business_id == *id))
            .or_else(|| memberships.first().map(|m| m.business_id))
    }

    pub fn select(
        &mut self,
        memberships: &[BusinessMembership],
        requested: BusinessId,
    ) -> Result<ActiveBusinessSelection, AccessError> {
        let selection = select_active_business(memberships, requested)?;
        if is_switchable(memberships) {
            tracing::info!("Active business set to {}", selection.business_id);
            self.chosen = Some(selection);
        }
        Ok(selection)
    }

    pub fn switcher(&self, memberships: &[BusinessMembership]) -> BusinessSwitcher {
        let visible = is_switchable(memberships);
        BusinessSwitcher {
            visible,
            active_business_id: self.active(memberships),
            options: if visible {
                memberships
                    .iter()
                    .map(|m| SwitcherOption {
                        business_id: m.business_id,
                        label: format!("{} ({})", m.business_name, m.role_within_business),
                    })
                    .collect()
            } else {
                Vec::new()
            },
        }
    }

    pub fn clear(&mut self) {
        self.chosen = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MembershipRole;

    fn memberships(ids: &[i64]) -> Vec<BusinessMembership> {
        ids.iter()
            .map(|id| BusinessMembership::new(*id, format!("Business {id}"), MembershipRole::Staff))
            .collect()
    }

    #[test]
    fn test_select_known_business() {
        let selection = select_active_business(&memberships(&[1, 2]), BusinessId(2)).unwrap();
        assert_eq!(selection.business_id, BusinessId(2));
    }

    #[test]
    fn test_select_unknown_business_is_rejected() {
        let result = select_active_business(&memberships(&[1]), BusinessId(5));
        assert_eq!(result, Err(AccessError::InvalidSelection(BusinessId(5))));
    }

    #[test]
    fn test_defaults_to_first_membership() {
        let context = BusinessContext::new();
        assert_eq!(context.active(&memberships(&[3, 4])), Some(BusinessId(3)));
        assert_eq!(context.active(&[]), None);
    }

    #[test]
    fn test_single_membership_has_no_selector() {
        let mut context = BusinessContext::new();
        let list = memberships(&[9]);

        let switcher = context.switcher(&list);
        assert!(!switcher.visible);
        assert!(switcher.options.is_empty());
        assert_eq!(switcher.active_business_id, Some(BusinessId(9)));

        assert!(context.select(&list, BusinessId(9)).is_ok());
        assert_eq!(context.active(&list), Some(BusinessId(9)));
    }

    #[test]
    fn test_selection_persists_and_rejection_keeps_previous() {
        let mut context = BusinessContext::new();
        let list = memberships(&[1, 2, 3]);

        context.select(&list, BusinessId(3)).unwrap();
        assert!(context.select(&list, BusinessId(8)).is_err());

        assert_eq!(context.active(&list), Some(BusinessId(3)));
        let switcher = context.switcher(&list);
        assert!(switcher.visible);
        assert_eq!(switcher.options.len(), 3);
        assert_eq!(switcher.options[2].label, "Business 3 (staff)");
    }

    #[test]
    fn test_clear_falls_back_to_default() {
        let mut context = BusinessContext::new();
        let list = memberships(&[1, 2]);
        context.select(&list, BusinessId(2)).unwrap();

        context.clear();
        assert_eq!(context.active(&list), Some(BusinessId(1)));
    }
}
