#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberName(String);

impl SubscriberName {
    /// Only presence is checked: the name is kept exactly as submitted.
    pub fn parse(s: String) -> Result<SubscriberName, String> {
        if s.trim().is_empty() {
            Err("A subscriber name must not be empty.".into())
        } else {
            Ok(Self(s))
        }
    }

    pub fn inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
