use serde::{Deserialize, Serialize};

/// Authorization level of a chat message sender.
///
/// Decides access to the privileged vote subcommands.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum AuthLevel {
    #[default]
    None,
    Moderator,
    Admin,
}

impl AuthLevel {
    /// Whether this level may use the admin-only subcommands
    /// (`start`, `restart`, `cancel`, `broadcast`).
    pub fn is_privileged(&self) -> bool {
        *self >= AuthLevel::Moderator
    }
}
