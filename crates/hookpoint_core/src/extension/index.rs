//! Ordering key for unanchored extensions.
//!
//! # Invariants
//! - `First` sorts before every numeric index; `Last` sorts after.
//! - Numeric indices sort ascending; equal keys keep registration order
//!   because callers sort with a stable sort.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Index assigned to an extension registered without an explicit id.
pub const ANONYMOUS_DEFAULT_INDEX: i64 = 100;
/// Index assigned to a named extension registered without an explicit index.
pub const NAMED_DEFAULT_INDEX: i64 = 1_000_000_000;

/// Priority of an extension among its unanchored siblings.
///
/// Serialized as `"first"`, `"last"` or a bare integer. Fractional numbers
/// are rejected; use wider integer gaps to slot between neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "IndexRepr", into = "IndexRepr")]
pub enum ExtensionIndex {
    First,
    At(i64),
    Last,
}

impl ExtensionIndex {
    /// JSON projection used by `pluck("index")`.
    pub fn to_value(self) -> Value {
        match self {
            Self::First => Value::from("first"),
            Self::At(value) => Value::from(value),
            Self::Last => Value::from("last"),
        }
    }
}

impl From<i64> for ExtensionIndex {
    fn from(value: i64) -> Self {
        Self::At(value)
    }
}

impl From<i32> for ExtensionIndex {
    fn from(value: i32) -> Self {
        Self::At(i64::from(value))
    }
}

impl Display for ExtensionIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::At(value) => write!(f, "{value}"),
            Self::Last => f.write_str("last"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum IndexRepr {
    Number(i64),
    Sentinel(Sentinel),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Sentinel {
    First,
    Last,
}

impl From<IndexRepr> for ExtensionIndex {
    fn from(value: IndexRepr) -> Self {
        match value {
            IndexRepr::Number(number) => Self::At(number),
            IndexRepr::Sentinel(Sentinel::First) => Self::First,
            IndexRepr::Sentinel(Sentinel::Last) => Self::Last,
        }
    }
}

impl From<ExtensionIndex> for IndexRepr {
    fn from(value: ExtensionIndex) -> Self {
        match value {
            ExtensionIndex::First => Self::Sentinel(Sentinel::First),
            ExtensionIndex::At(number) => Self::Number(number),
            ExtensionIndex::Last => Self::Sentinel(Sentinel::Last),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExtensionIndex;

    #[test]
    fn sentinels_bracket_numeric_indices() {
        let mut keys = vec![
            ExtensionIndex::Last,
            ExtensionIndex::At(i64::MAX),
            ExtensionIndex::At(-5),
            ExtensionIndex::First,
            ExtensionIndex::At(i64::MIN),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                ExtensionIndex::First,
                ExtensionIndex::At(i64::MIN),
                ExtensionIndex::At(-5),
                ExtensionIndex::At(i64::MAX),
                ExtensionIndex::Last,
            ]
        );
    }

    #[test]
    fn deserializes_sentinels_and_numbers() {
        let first: ExtensionIndex = serde_json::from_str("\"first\"").expect("first sentinel");
        let last: ExtensionIndex = serde_json::from_str("\"last\"").expect("last sentinel");
        let number: ExtensionIndex = serde_json::from_str("42").expect("numeric index");
        assert_eq!(first, ExtensionIndex::First);
        assert_eq!(last, ExtensionIndex::Last);
        assert_eq!(number, ExtensionIndex::At(42));

        assert!(serde_json::from_str::<ExtensionIndex>("\"middle\"").is_err());
        assert!(serde_json::from_str::<ExtensionIndex>("1.5").is_err());
        assert_eq!(
            serde_json::to_string(&ExtensionIndex::Last).expect("serialize"),
            "\"last\""
        );
    }
}
