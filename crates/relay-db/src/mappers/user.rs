//! User profile <-> model mapper

use relay_core::{UserId, UserProfile};

use crate::models::UserModel;

impl From<UserModel> for UserProfile {
    fn from(model: UserModel) -> Self {
        UserProfile {
            id: UserId::from(model.id),
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            image: model.image,
            color: model.color,
        }
    }
}
