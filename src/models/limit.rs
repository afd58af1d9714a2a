/// A per-category spending ceiling for one month.
///
/// "Unlimited" is a real state, distinct from both a zero limit and a
/// missing override row. Stored as SQL NULL in `limit_cents` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Amount(i64),
    Unlimited,
}

impl Limit {
    /// Map a `limit_cents` column value (NULL = unlimited) to a Limit.
    pub fn from_cents(cents: Option<i64>) -> Self {
        match cents {
            Some(c) => Self::Amount(c),
            None => Self::Unlimited,
        }
    }

    /// Back to the column representation.
    pub fn as_cents(&self) -> Option<i64> {
        match self {
            Self::Amount(c) => Some(*c),
            Self::Unlimited => None,
        }
    }

    /// The amount reserved against the budget: concrete positive limits
    /// count in full, unlimited and non-positive limits reserve nothing.
    pub fn reserved_cents(&self) -> i64 {
        match self {
            Self::Amount(c) => (*c).max(0),
            Self::Unlimited => 0,
        }
    }

}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amount(c) => write!(f, "{c}"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}
