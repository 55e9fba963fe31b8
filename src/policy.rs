//! The two gated actions and who may perform them.

use crate::auth::Principal;
use crate::database::Filter;
use crate::error::ApiError;
use crate::types::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    DeleteAnimal,
    DeleteCategory,
}

/// Which documents a permitted delete may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Any,
    OwnedBy(ObjectId),
}

impl Scope {
    /// The delete filter for `id` under this scope.
    pub fn filter(&self, id: &ObjectId) -> Filter {
        match self {
            Scope::Any => Filter::by_id(id),
            Scope::OwnedBy(owner) => Filter::by_id(id).eq("owner", owner.to_string()),
        }
    }
}

fn denied() -> ApiError {
    ApiError::unauthorized("Not authorized")
}

/// Decide against a known owner.
pub fn authorize(principal: &Principal, action: Action, target_owner: Option<&ObjectId>) -> Result<(), ApiError> {
    let permitted = match action {
        Action::DeleteCategory => principal.is_admin(),
        Action::DeleteAnimal => principal.is_admin() || target_owner == Some(&principal.id),
    };
    if permitted {
        Ok(())
    } else {
        Err(denied())
    }
}

/// Decide before the owner is known. Non-admin animal deletes are scoped to
/// the caller's own documents, so someone else's animal reads as not found.
pub fn delete_scope(principal: &Principal, action: Action) -> Result<Scope, ApiError> {
    if principal.is_admin() {
        return Ok(Scope::Any);
    }
    match action {
        Action::DeleteAnimal => Ok(Scope::OwnedBy(principal.id)),
        Action::DeleteCategory => {
            tracing::warn!("User '{}' attempted an admin-only delete", principal.user_name);
            authorize(principal, action, None).map(|()| Scope::Any)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Condition;
    use crate::types::Role;

    fn principal(role: Role) -> Principal {
        Principal {
            id: ObjectId::new(),
            user_name: "someone".into(),
            email: "someone@zoo.test".into(),
            role,
        }
    }

    #[test]
    fn animal_delete_is_owner_or_admin() {
        let owner = principal(Role::User);
        let other = principal(Role::User);
        let admin = principal(Role::Admin);

        assert!(authorize(&owner, Action::DeleteAnimal, Some(&owner.id)).is_ok());
        assert!(authorize(&other, Action::DeleteAnimal, Some(&owner.id)).is_err());
        assert!(authorize(&admin, Action::DeleteAnimal, Some(&owner.id)).is_ok());
    }

    #[test]
    fn category_delete_is_admin_only() {
        let user = principal(Role::User);
        assert!(authorize(&user, Action::DeleteCategory, None).is_err());
        assert!(authorize(&principal(Role::Admin), Action::DeleteCategory, None).is_ok());
        assert!(matches!(
            delete_scope(&user, Action::DeleteCategory),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn non_admin_animal_delete_is_owner_scoped() {
        let user = principal(Role::User);
        let target = ObjectId::new();

        let scope = delete_scope(&user, Action::DeleteAnimal).unwrap();
        assert_eq!(scope, Scope::OwnedBy(user.id));
        assert!(scope
            .filter(&target)
            .conditions
            .contains(&Condition::Eq("owner".into(), user.id.to_string().into())));

        let admin_scope = delete_scope(&principal(Role::Admin), Action::DeleteAnimal).unwrap();
        assert_eq!(admin_scope.filter(&target), Filter::by_id(&target));
    }
}
