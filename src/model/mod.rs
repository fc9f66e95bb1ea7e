/// Shared wire and domain types used across the handlers and the facade
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod permissions;

pub use permissions::Permission;

/// Check that a route id parameter is a well-formed resource id
pub fn is_valid_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Generate a new resource id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Scope a permission scheme applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeScope {
    Team,
    Channel,
}

impl SchemeScope {
    /// Parse the query-string form. Empty means "no scope filter".
    pub fn from_param(raw: &str) -> Option<Option<Self>> {
        match raw {
            "" => Some(None),
            "team" => Some(Some(SchemeScope::Team)),
            "channel" => Some(Some(SchemeScope::Channel)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeScope::Team => "team",
            SchemeScope::Channel => "channel",
        }
    }
}

/// A named set of role overrides that can be attached to teams or channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheme {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub scope: SchemeScope,
    #[serde(default)]
    pub create_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delete_at: Option<DateTime<Utc>>,
}

/// Partial update for a scheme; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemePatch {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub team_id: String,
    pub name: String,
    pub display_name: String,
}

/// A single user preference entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    #[serde(default)]
    pub user_id: String,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Preference category whose name field references a post id; updating one
/// requires read access to the post's channel
pub const PREFERENCE_CATEGORY_FLAGGED_POST: &str = "flagged_post";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub channel_id: String,
    pub message: String,
}

/// Authenticated session, built by the auth middleware from a bearer token.
/// Read-only to the request core; permission resolution goes through the
/// facade oracle.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub permissions: HashSet<String>,
}

impl Session {
    pub fn grants(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission.id)
    }
}

/// Deployment-level feature flags, independent of user permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseFeature {
    CustomPermissionSchemes,
}

impl LicenseFeature {
    pub fn id(&self) -> &'static str {
        match self {
            LicenseFeature::CustomPermissionSchemes => "custom_permission_schemes",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LicenseFeatures {
    #[serde(default)]
    pub custom_permission_schemes: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct License {
    pub features: LicenseFeatures,
}

impl License {
    pub fn feature_enabled(&self, feature: LicenseFeature) -> bool {
        match feature {
            LicenseFeature::CustomPermissionSchemes => self.features.custom_permission_schemes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_scope_parses_query_tokens() {
        assert_eq!(SchemeScope::from_param(""), Some(None));
        assert_eq!(SchemeScope::from_param("team"), Some(Some(SchemeScope::Team)));
        assert_eq!(SchemeScope::from_param("channel"), Some(Some(SchemeScope::Channel)));
        assert_eq!(SchemeScope::from_param("global"), None);
    }

    #[test]
    fn id_validation_requires_uuid() {
        assert!(is_valid_id(&new_id()));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("not-an-id"));
    }

    #[test]
    fn session_grant_lookup() {
        let mut granted = HashSet::new();
        granted.insert(permissions::READ_PERMISSION_SCHEMES.id.to_string());
        let session = Session {
            id: new_id(),
            user_id: new_id(),
            permissions: granted,
        };

        assert!(session.grants(&permissions::READ_PERMISSION_SCHEMES));
        assert!(!session.grants(&permissions::MANAGE_PERMISSION_SCHEMES));
    }
}
