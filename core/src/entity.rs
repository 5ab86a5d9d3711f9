//! Read-only typed projections over decoded API objects.
//!
//! # Design
//! The upstream API frequently omits fields, so every accessor returns an
//! `Option` — absent data never panics. Identity uses the dual `id`
//! (numeric) / `id_str` (string) representation, preferring the string form
//! because ids can exceed the range a JSON consumer can represent exactly.
//! Two views of the same kind compare equal iff both carry a canonical
//! identity and the identities match; a view without one equals nothing,
//! not even itself.

use serde_json::Value;

/// One decoded JSON object with typed field access.
#[derive(Debug, Clone)]
pub struct Entity(Value);

impl Entity {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Raw access to a field. Absent fields yield `None`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn u64_field(&self, name: &str) -> Option<u64> {
        self.field(name).and_then(Value::as_u64)
    }

    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.field(name).and_then(Value::as_bool)
    }

    /// Canonical identity: `id_str` when present, else the numeric `id`
    /// rendered as a string.
    pub fn id(&self) -> Option<String> {
        if let Some(id) = self.str_field("id_str") {
            return Some(id.to_string());
        }
        self.u64_field("id").map(|id| id.to_string())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

macro_rules! entity_view {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name(Entity);

        impl $name {
            pub fn new(value: Value) -> Self {
                Self(Entity::new(value))
            }

            pub fn entity(&self) -> &Entity {
                &self.0
            }

            pub fn id(&self) -> Option<String> {
                self.0.id()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                match (self.0.id(), other.0.id()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
        }

        impl From<Value> for $name {
            fn from(value: Value) -> Self {
                Self::new(value)
            }
        }
    };
}

entity_view! {
    /// A user profile.
    User
}

entity_view! {
    /// A status (post), as returned by the search endpoints.
    Status
}

entity_view! {
    /// A direct message between two users.
    DirectMessage
}

entity_view! {
    /// A user-curated list.
    List
}

impl User {
    pub fn screen_name(&self) -> Option<&str> {
        self.0.str_field("screen_name")
    }

    pub fn name(&self) -> Option<&str> {
        self.0.str_field("name")
    }

    pub fn followers_count(&self) -> Option<u64> {
        self.0.u64_field("followers_count")
    }

    pub fn protected(&self) -> Option<bool> {
        self.0.bool_field("protected")
    }
}

impl Status {
    pub fn text(&self) -> Option<&str> {
        self.0.str_field("text")
    }

    pub fn from_user(&self) -> Option<&str> {
        self.0.str_field("from_user")
    }
}

impl DirectMessage {
    pub fn text(&self) -> Option<&str> {
        self.0.str_field("text")
    }

    pub fn sender_screen_name(&self) -> Option<&str> {
        self.0.str_field("sender_screen_name")
    }

    pub fn recipient_screen_name(&self) -> Option<&str> {
        self.0.str_field("recipient_screen_name")
    }
}

impl List {
    pub fn name(&self) -> Option<&str> {
        self.0.str_field("name")
    }

    pub fn slug(&self) -> Option<&str> {
        self.0.str_field("slug")
    }

    pub fn member_count(&self) -> Option<u64> {
        self.0.u64_field("member_count")
    }
}
