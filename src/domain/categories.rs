use serde::{Deserialize, Serialize};

const SEPARATOR: &str = ", ";

/// Ordered list of the categories a subscriber follows.
///
/// Entries are trimmed and blank entries are dropped on the way in, so the
/// joined form always splits back into the same list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Categories(Vec<String>);

impl Categories {
    /// Splits a single-cell rendering such as `"tech, sport"`.
    pub fn parse_joined(joined: &str) -> Self {
        Self::from(joined.split(',').map(str::to_owned).collect::<Vec<_>>())
    }

    pub fn joined(&self) -> String {
        self.0.join(SEPARATOR)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for Categories {
    fn from(raw: Vec<String>) -> Self {
        Self(
            raw.into_iter()
                .map(|c| c.trim().to_owned())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }
}

impl From<Categories> for Vec<String> {
    fn from(categories: Categories) -> Self {
        categories.0
    }
}
