use std::fmt;

/// An email address as submitted by the subscriber.
///
/// The original casing is what gets stored and displayed; identity
/// comparisons always go through [`NormalizedEmail`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(s: String) -> Result<SubscriberEmail, String> {
        if s.trim().is_empty() {
            Err("A subscriber email must not be empty.".into())
        } else {
            Ok(Self(s))
        }
    }

    pub fn normalized(&self) -> NormalizedEmail {
        NormalizedEmail::new(&self.0)
    }

    pub fn inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trimmed, lower-cased email used only to decide whether two records are the
/// same subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }
}

impl AsRef<str> for NormalizedEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
