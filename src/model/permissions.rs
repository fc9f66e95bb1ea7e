/// Permission identifiers recognized by the session oracle.
///
/// The API layer never decides what a permission *means* - it only names the
/// permission it requires and asks the facade whether the session holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission {
    pub id: &'static str,
}

/// Read access to permission schemes
pub const READ_PERMISSION_SCHEMES: Permission = Permission { id: "read_permission_schemes" };

/// Create, patch, and delete permission schemes
pub const MANAGE_PERMISSION_SCHEMES: Permission = Permission { id: "manage_permission_schemes" };

/// List the teams a scheme is attached to
pub const READ_TEAMS: Permission = Permission { id: "read_teams" };

/// List the channels a scheme is attached to
pub const READ_CHANNELS: Permission = Permission { id: "read_channels" };

/// Act on another user's account data (preferences included)
pub const EDIT_OTHER_USERS: Permission = Permission { id: "edit_other_users" };

/// Read the contents of a specific channel
pub const READ_CHANNEL: Permission = Permission { id: "read_channel" };
