//! Rule sets for each route that runs through the validation gate.

use super::{FieldRule, RuleSet};

const GENDERS: &[&str] = &["male", "female"];

fn id() -> FieldRule {
    FieldRule::param("id").is_object_id()
}

fn with_id(mut rules: Vec<FieldRule>) -> RuleSet {
    rules.insert(0, id());
    RuleSet::new(rules)
}

/// `GET`/`DELETE` on `/:id` routes.
pub fn id_param() -> RuleSet {
    RuleSet::new(vec![id()])
}

pub fn category_create() -> RuleSet {
    RuleSet::new(vec![FieldRule::body("category_name").is_string().not_empty().escape()])
}

pub fn category_update() -> RuleSet {
    with_id(vec![FieldRule::body("category_name").is_string().not_empty().escape()])
}

pub fn species_create() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::body("species_name").is_string().not_empty().escape(),
        FieldRule::body("category").is_object_id(),
        FieldRule::body("image").is_url(),
        FieldRule::body("location").is_point(),
    ])
}

pub fn species_update() -> RuleSet {
    with_id(vec![
        FieldRule::body("species_name").is_string().not_empty().escape().optional(),
        FieldRule::body("category").is_object_id().optional(),
        FieldRule::body("image").is_url().optional(),
        FieldRule::body("location").is_point().optional(),
    ])
}

pub fn animal_create() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::body("animal_name").is_string().escape().optional(),
        FieldRule::body("birthdate").is_date(),
        FieldRule::body("species").is_object_id(),
        FieldRule::body("gender").one_of(GENDERS),
    ])
}

pub fn animal_update() -> RuleSet {
    with_id(vec![
        FieldRule::body("animal_name").is_string().escape().optional(),
        FieldRule::body("birthdate").is_date().optional(),
        FieldRule::body("species").is_object_id().optional(),
        FieldRule::body("gender").one_of(GENDERS).optional(),
    ])
}

pub fn user_create() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::body("user_name").is_string().not_empty().escape(),
        FieldRule::body("email").is_email(),
        FieldRule::body("password").is_string().not_empty(),
    ])
}

pub fn user_update() -> RuleSet {
    with_id(vec![
        FieldRule::body("user_name").is_string().not_empty().escape().optional(),
        FieldRule::body("email").is_email().optional(),
        FieldRule::body("password").is_string().not_empty().optional(),
    ])
}

pub fn login() -> RuleSet {
    RuleSet::new(vec![
        FieldRule::body("username").is_string().not_empty().escape(),
        FieldRule::body("password").is_string().not_empty(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate, Location};
    use serde_json::{json, Map};
    use std::collections::HashMap;

    #[test]
    fn update_rules_share_the_id_param() {
        for rules in [category_update(), species_update(), animal_update(), user_update()] {
            let first = &rules.rules()[0];
            assert_eq!(first.field, "id");
            assert_eq!(first.location, Location::Param);
        }
        assert!(!id_param().has_body_rules());
    }

    #[test]
    fn animal_update_accepts_a_single_field() {
        let params = HashMap::from([("id".to_string(), "65a1f0c2e4b0a1b2c3d4e5f6".to_string())]);
        let mut body: Map<_, _> = json!({"animal_name": "Rex"}).as_object().cloned().unwrap();
        assert!(validate(&animal_update(), &params, &mut body).is_ok());
    }

    #[test]
    fn animal_create_requires_core_fields() {
        let mut body = Map::new();
        let err = validate(&animal_create(), &HashMap::new(), &mut body).unwrap_err();
        for field in ["birthdate", "species", "gender"] {
            assert!(err.message().contains(&format!("Missing value: {}", field)));
        }
        assert!(!err.message().contains("animal_name"));
    }
}
