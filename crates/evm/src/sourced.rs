use serde::{Deserialize, Serialize};

/// A value read from chain, or a default assumed because the read failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Sourced<T> {
    Queried(T),
    Assumed(T),
}

impl<T> Sourced<T> {
    pub fn value(&self) -> &T {
        match self {
            Sourced::Queried(v) | Sourced::Assumed(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Sourced::Queried(v) | Sourced::Assumed(v) => v,
        }
    }

    pub fn is_assumed(&self) -> bool {
        matches!(self, Sourced::Assumed(_))
    }
}

impl<T: Copy> Sourced<T> {
    pub fn get(&self) -> T {
        *self.value()
    }
}
