//! User account record

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{record, Person, RecordKind};
use crate::engine::{Composite, CompositeDescriptor, SecretText};

/// Access level of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }

    /// Returns true if the role may change records
    pub fn can_edit(&self) -> bool {
        matches!(self, Role::Editor | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viewer" | "read" => Ok(Role::Viewer),
            "editor" | "write" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

crate::reflect_value!(Role);

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub login: String,
    pub password: SecretText,
    pub role: Role,
    pub person: Person,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub preferences: HashMap<String, String>,
}

impl User {
    pub fn new(login: impl Into<String>, password: &str, person: Person) -> Self {
        Self {
            login: login.into(),
            password: SecretText::new(password),
            person,
            created_at: Utc::now(),
            ..Self::default()
        }
    }

    /// Checks a candidate password against the stored one
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password == SecretText::new(candidate)
    }

    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login = Some(at);
    }
}

impl Composite for User {
    fn descriptor() -> &'static CompositeDescriptor {
        static DESCRIPTOR: OnceLock<CompositeDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            CompositeDescriptor::builder::<User>()
                .constructor(User::default)
                .member("login", |u| &u.login, |u| &mut u.login)
                .member("password", |u| &u.password, |u| &mut u.password)
                .member("role", |u| &u.role, |u| &mut u.role)
                .member("person", |u| &u.person, |u| &mut u.person)
                .member("created_at", |u| &u.created_at, |u| &mut u.created_at)
                .optional("last_login", |u| &u.last_login, |u| &mut u.last_login)
                .member("preferences", |u| &u.preferences, |u| &mut u.preferences)
                .build()
        })
    }
}

record!(User, RecordKind::User);
