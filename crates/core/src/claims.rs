//! Access-token claim payload shared by the issuer and its consumers.

use serde::{Deserialize, Deserializer, Serialize};

/// Claims carried inside every access token.
///
/// Wire names follow the JWT registered claims (`sub`, `exp`) plus `admin`
/// and `collections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject -- the username. Empty when the token carried none.
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub admin: bool,
    /// Collections this user may read. Always a list on the way out; a bare
    /// string on the way in is wrapped.
    #[serde(
        rename = "collections",
        default,
        deserialize_with = "deserialize_collections"
    )]
    pub authorized_collections: Vec<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_collections<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(collection)) => vec![collection],
        Some(OneOrMany::Many(collections)) => collections,
    })
}

/// Authorization scopes: a single collection name or any list of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scopes(Vec<String>);

impl Scopes {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Scopes {
    fn from(collection: &str) -> Self {
        Self(vec![collection.to_string()])
    }
}

impl From<String> for Scopes {
    fn from(collection: String) -> Self {
        Self(vec![collection])
    }
}

impl From<Vec<String>> for Scopes {
    fn from(collections: Vec<String>) -> Self {
        Self(collections)
    }
}

impl<const N: usize> From<[&str; N]> for Scopes {
    fn from(collections: [&str; N]) -> Self {
        Self(collections.iter().map(|c| c.to_string()).collect())
    }
}
