use chrono::{DateTime, Utc};
use serde::Serialize;

use super::EntityId;

choice_enum! {
    Role {
        Admin = "admin" ("Admin"),
        User = "user" ("User"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: String,
    pub bio: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String) -> Self {
        Self {
            id: EntityId::generate(),
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            role: Role::User,
            phone: String::new(),
            bio: String::new(),
            date_joined: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn promote(&mut self) {
        self.role = Role::Admin;
    }
}
