/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role assumed when a profile is missing or carries no role.
pub const DEFAULT_ROLE: Role = Role::Owner;

/// Application-wide role of a user, independent of any business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    DataEntry,
    Owner,
}

impl Role {
    /// Landing page the redirect engine sends this role to
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin-dashboard",
            Role::DataEntry => "/data-entry-dashboard",
            Role::Owner => "/dashboard",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::DataEntry => "data_entry",
            Role::Owner => "owner",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        DEFAULT_ROLE
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a user holds inside one business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    BusinessAdmin,
    Staff,
    Viewer,
}

impl MembershipRole {
    pub fn is_administrative(&self) -> bool {
        match self {
            MembershipRole::BusinessAdmin => true,
            MembershipRole::Staff | MembershipRole::Viewer => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::BusinessAdmin => "business_admin",
            MembershipRole::Staff => "staff",
            MembershipRole::Viewer => "viewer",
        }
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessId(pub i64);

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BusinessId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(BusinessId)
    }
}

impl From<i64> for BusinessId {
    fn from(id: i64) -> Self {
        BusinessId(id)
    }
}

/// The authenticated subject, mirrored read-only from the identity backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(alias = "sub")]
    pub id: String,
    #[serde(default)]
    pub email: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Snapshot of one business membership as delivered by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessMembership {
    #[serde(alias = "id", alias = "businessId")]
    pub business_id: BusinessId,
    #[serde(default, alias = "name", alias = "businessName")]
    pub business_name: String,
    #[serde(alias = "role", alias = "roleWithinBusiness")]
    pub role_within_business: MembershipRole,
}

impl BusinessMembership {
    pub fn new(
        business_id: impl Into<BusinessId>,
        business_name: impl Into<String>,
        role_within_business: MembershipRole,
    ) -> Self {
        Self {
            business_id: business_id.into(),
            business_name: business_name.into(),
            role_within_business,
        }
    }
}

/// Role and memberships for one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub role: Role,
    #[serde(default, alias = "memberships", alias = "businessMemberships")]
    pub business_memberships: Vec<BusinessMembership>,
}

impl Profile {
    pub fn new(role: Role, business_memberships: Vec<BusinessMembership>) -> Self {
        Self {
            role,
            business_memberships,
        }
    }

    pub fn membership(&self, business_id: BusinessId) -> Option<&BusinessMembership> {
        self.business_memberships
            .iter()
            .find(|m| m.business_id == business_id)
    }
}
