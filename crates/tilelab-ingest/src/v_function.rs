use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name of a value-function variant, e.g. `legacy` or `n_tuple_small`.
///
/// Used verbatim in snapshot file names, so only ASCII alphanumerics, `_` and
/// `-` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VFunctionName(String);

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid v-function name {name:?}: use ASCII letters, digits, '_' or '-'")]
pub struct InvalidVFunctionName {
    pub name: String,
}

impl VFunctionName {
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidVFunctionName> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(Self(name))
        } else {
            Err(InvalidVFunctionName { name })
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for VFunctionName {
    type Err = InvalidVFunctionName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VFunctionName {
    type Error = InvalidVFunctionName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VFunctionName> for String {
    fn from(value: VFunctionName) -> Self {
        value.0
    }
}
