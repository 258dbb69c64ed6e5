//! User profile - the displayable shape a message party resolves to

use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// Public profile of a user, as embedded in relayed messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
    pub color: Option<i32>,
}

impl UserProfile {
    /// Create a profile with only the required fields
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            image: None,
            color: None,
        }
    }

    /// Id-only stand-in for a party with no stored profile
    pub fn unresolved(id: impl Into<UserId>) -> Self {
        Self::new(id, String::new())
    }

    /// Check if this profile carries no directory data beyond the id
    pub fn is_unresolved(&self) -> bool {
        self.email.is_empty()
    }

    /// Set first and last name
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    /// Set the avatar color index
    pub fn with_color(mut self, color: i32) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the avatar image path
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}
