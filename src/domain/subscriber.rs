use serde::{Deserialize, Serialize};

use super::{Categories, NewSubscriber, NormalizedEmail};

/// A subscriber record as it sits in storage.
///
/// Stored records are not re-validated on load; only [`NewSubscriber`] guards
/// what goes in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub categories: Categories,
}

impl Subscriber {
    pub fn normalized_email(&self) -> NormalizedEmail {
        NormalizedEmail::new(&self.email)
    }

    pub fn has_email(&self, email: &NormalizedEmail) -> bool {
        &self.normalized_email() == email
    }
}

impl From<NewSubscriber> for Subscriber {
    fn from(new_subscriber: NewSubscriber) -> Self {
        Self {
            name: new_subscriber.name.inner(),
            email: new_subscriber.email.inner(),
            categories: new_subscriber.categories,
        }
    }
}
