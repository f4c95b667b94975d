use super::{Categories, SubscriberEmail, SubscriberName};

/// A candidate record that passed the presence checks.
#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub name: SubscriberName,
    pub email: SubscriberEmail,
    pub categories: Categories,
}

impl NewSubscriber {
    pub fn parse(
        name: Option<String>,
        email: Option<String>,
        categories: Option<Vec<String>>,
    ) -> Result<NewSubscriber, String> {
        let name = SubscriberName::parse(name.unwrap_or_default())?;
        let email = SubscriberEmail::parse(email.unwrap_or_default())?;
        let categories = Categories::from(categories.unwrap_or_default());
        if categories.is_empty() {
            return Err("At least one category must be selected.".into());
        }
        Ok(Self {
            name,
            email,
            categories,
        })
    }
}
