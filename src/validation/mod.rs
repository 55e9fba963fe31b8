//! Declarative field rules for path parameters and JSON bodies.
//!
//! Every rule is evaluated, every violation is collected, and the result is a
//! single `BadRequest` of the form `"<violation>: <field>, ..."`. Sanitizers
//! rewrite the body in place, so handlers persist the sanitized value.

pub mod rules;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::geo::Point;
use crate::types::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Param,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    IsString,
    IsObjectId,
    NotEmpty,
    IsDate,
    IsUrl,
    IsEmail,
    OneOf(&'static [&'static str]),
    IsPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    /// HTML-escape `& < > " ' / \` and backtick.
    Escape,
    /// Trim and lowercase.
    NormalizeEmail,
    /// Rewrite an accepted date as `YYYY-MM-DD`.
    ToDate,
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: &'static str,
    pub location: Location,
    pub checks: Vec<Check>,
    pub sanitizers: Vec<Sanitizer>,
    pub optional: bool,
}

impl FieldRule {
    pub fn param(field: &'static str) -> Self {
        Self::new(field, Location::Param)
    }

    pub fn body(field: &'static str) -> Self {
        Self::new(field, Location::Body)
    }

    fn new(field: &'static str, location: Location) -> Self {
        Self {
            field,
            location,
            checks: vec![],
            sanitizers: vec![],
            optional: false,
        }
    }

    fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    fn sanitize(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizers.push(sanitizer);
        self
    }

    pub fn is_string(self) -> Self {
        self.check(Check::IsString)
    }

    pub fn is_object_id(self) -> Self {
        self.check(Check::IsObjectId)
    }

    pub fn not_empty(self) -> Self {
        self.check(Check::NotEmpty)
    }

    pub fn is_date(self) -> Self {
        self.check(Check::IsDate).sanitize(Sanitizer::ToDate)
    }

    pub fn is_url(self) -> Self {
        self.check(Check::IsUrl)
    }

    pub fn is_email(self) -> Self {
        self.check(Check::IsEmail).sanitize(Sanitizer::NormalizeEmail)
    }

    pub fn one_of(self, allowed: &'static [&'static str]) -> Self {
        self.check(Check::OneOf(allowed))
    }

    pub fn is_point(self) -> Self {
        self.check(Check::IsPoint)
    }

    pub fn escape(self) -> Self {
        self.sanitize(Sanitizer::Escape)
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// An ordered, cheaply clonable list of rules for one route.
#[derive(Debug, Clone)]
pub struct RuleSet(Arc<Vec<FieldRule>>);

impl RuleSet {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self(Arc::new(rules))
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.0
    }

    pub fn has_body_rules(&self) -> bool {
        self.0.iter().any(|r| r.location == Location::Body)
    }
}

impl Check {
    fn violation(&self) -> String {
        match self {
            Check::IsString => "Must be a string".to_string(),
            Check::IsObjectId => "Must be a valid id".to_string(),
            Check::NotEmpty => "Must not be empty".to_string(),
            Check::IsDate => "Must be a valid date".to_string(),
            Check::IsUrl => "Must be a valid URL".to_string(),
            Check::IsEmail => "Must be a valid email".to_string(),
            Check::OneOf(allowed) => format!("Must be one of {}", allowed.join("|")),
            Check::IsPoint => "Must be a GeoJSON point".to_string(),
        }
    }

    fn passes(&self, value: &Value) -> bool {
        match self {
            Check::IsString => value.is_string(),
            Check::IsObjectId => value.as_str().map_or(false, ObjectId::is_valid),
            Check::NotEmpty => match value {
                Value::Null => false,
                Value::String(s) => !s.is_empty(),
                Value::Array(items) => !items.is_empty(),
                Value::Object(map) => !map.is_empty(),
                _ => true,
            },
            Check::IsDate => value.as_str().and_then(parse_date).is_some(),
            Check::IsUrl => value.as_str().map_or(false, is_url),
            Check::IsEmail => value.as_str().map_or(false, is_email),
            Check::OneOf(allowed) => value.as_str().map_or(false, |s| allowed.contains(&s)),
            Check::IsPoint => serde_json::from_value::<Point>(value.clone())
                .map_or(false, |p| p.in_range()),
        }
    }
}

impl Sanitizer {
    fn apply(&self, value: &Value) -> Option<Value> {
        let s = value.as_str()?;
        let sanitized = match self {
            Sanitizer::Escape => escape(s),
            Sanitizer::NormalizeEmail => s.trim().to_lowercase(),
            Sanitizer::ToDate => parse_date(s)?.format("%Y-%m-%d").to_string(),
        };
        Some(Value::String(sanitized))
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
}

fn is_url(s: &str) -> bool {
    url::Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

fn is_email(s: &str) -> bool {
    let s = s.trim();
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            other => out.push(other),
        }
    }
    out
}

/// Run every rule. Sanitizers only touch fields whose checks all passed.
pub fn validate(
    rules: &RuleSet,
    params: &HashMap<String, String>,
    body: &mut Map<String, Value>,
) -> Result<(), ApiError> {
    let mut violations: Vec<String> = vec![];

    for rule in rules.rules() {
        let value = match rule.location {
            Location::Param => params.get(rule.field).cloned().map(Value::String),
            Location::Body => body.get(rule.field).cloned(),
        };

        let Some(value) = value else {
            if !rule.optional {
                violations.push(format!("Missing value: {}", rule.field));
            }
            continue;
        };

        let failed: Vec<String> = rule
            .checks
            .iter()
            .filter(|check| !check.passes(&value))
            .map(|check| format!("{}: {}", check.violation(), rule.field))
            .collect();

        if !failed.is_empty() {
            violations.extend(failed);
            continue;
        }

        if rule.location == Location::Body {
            let sanitized = rule
                .sanitizers
                .iter()
                .fold(value, |v, s| s.apply(&v).unwrap_or(v));
            body.insert(rule.field.to_string(), sanitized);
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        let message = violations.join(", ");
        tracing::debug!("Validation failed: {}", message);
        Err(ApiError::bad_request(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn collects_every_violation() {
        let rules = RuleSet::new(vec![
            FieldRule::param("id").is_object_id(),
            FieldRule::body("species_name").is_string(),
            FieldRule::body("category").is_object_id(),
            FieldRule::body("image").is_url(),
        ]);
        let params = HashMap::from([("id".to_string(), "nope".to_string())]);
        let mut payload = body(json!({"species_name": 42, "image": "not a url"}));

        let err = validate(&rules, &params, &mut payload).unwrap_err();
        let msg = err.message();
        assert!(msg.contains("Must be a valid id: id"));
        assert!(msg.contains("Must be a string: species_name"));
        assert!(msg.contains("Missing value: category"));
        assert!(msg.contains("Must be a valid URL: image"));
        assert_eq!(msg.matches(", ").count(), 3);
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let rules = RuleSet::new(vec![FieldRule::body("animal_name").is_string().optional()]);
        let mut payload = Map::new();
        assert!(validate(&rules, &HashMap::new(), &mut payload).is_ok());
    }

    #[test]
    fn escape_rewrites_the_stored_value() {
        let rules = RuleSet::new(vec![FieldRule::body("category_name").is_string().escape()]);
        let mut payload = body(json!({"category_name": "<b>Cats & Dogs</b>"}));
        validate(&rules, &HashMap::new(), &mut payload).unwrap();
        assert_eq!(payload["category_name"], "&lt;b&gt;Cats &amp; Dogs&lt;&#x2F;b&gt;");
    }

    #[test]
    fn dates_and_emails_are_normalized() {
        let rules = RuleSet::new(vec![
            FieldRule::body("birthdate").is_date(),
            FieldRule::body("email").is_email(),
        ]);
        let mut payload = body(json!({"birthdate": "2021/03/04", "email": " Keeper@Zoo.Test "}));
        validate(&rules, &HashMap::new(), &mut payload).unwrap();
        assert_eq!(payload["birthdate"], "2021-03-04");
        assert_eq!(payload["email"], "keeper@zoo.test");
    }

    #[test]
    fn individual_checks() {
        assert!(Check::IsUrl.passes(&json!("https://upload.wikimedia.org/a.jpg")));
        assert!(!Check::IsUrl.passes(&json!("ftp://example.com/a.jpg")));
        assert!(!Check::IsDate.passes(&json!("2021-13-01")));
        assert!(Check::OneOf(&["male", "female"]).passes(&json!("female")));
        assert!(!Check::OneOf(&["male", "female"]).passes(&json!("other")));
        assert!(Check::IsPoint.passes(&json!({"type": "Point", "coordinates": [24.9, 60.1]})));
        assert!(!Check::IsPoint.passes(&json!({"type": "Point", "coordinates": [200.0, 60.1]})));
        assert!(!Check::NotEmpty.passes(&json!("")));
        assert!(!Check::IsEmail.passes(&json!("keeper@zoo")));
    }
}
