use serde::{Deserialize, Serialize};

use crate::auth::Principal;
use crate::database::repository::{min_length, Model};
use crate::database::store::{Collection, StoreError};
use crate::types::{ObjectId, Role};

/// Stored user. `password` is a bcrypt hash and is only ever serialized
/// towards the store; responses use [`PublicUser`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: ObjectId,
    pub user_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl Model for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn check(&self) -> Result<(), StoreError> {
        min_length("user_name", &self.user_name, 2)?;
        if !self.email.contains('@') {
            return Err(StoreError::Invalid("email: Invalid email.".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: ObjectId,
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
            role: user.role,
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Principal {
            id: user.id,
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_view_has_no_password() {
        let user = User {
            id: ObjectId::new(),
            user_name: "keeper".into(),
            email: "keeper@zoo.test".into(),
            password: "$2b$04$hash".into(),
            role: Role::User,
        };
        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "user");
    }
}
