use super::Limit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    /// A committed monthly obligation (rent, childcare). Its limit is
    /// reserved against the budget whether or not it has been paid yet.
    Fixed,
    /// Discretionary spending tracked by actual spend against a limit.
    Variable,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Variable => "variable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(Self::Fixed),
            "variable" => Some(Self::Variable),
            _ => None,
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub emoji: String,
    pub kind: CategoryKind,
    /// Template limit copied into each month on first touch.
    pub default_limit: Limit,
    pub is_active: bool,
}

impl Category {
    pub fn new(name: String, emoji: String, kind: CategoryKind, default_limit: Limit) -> Self {
        Self {
            id: None,
            name,
            emoji,
            kind,
            default_limit,
            is_active: true,
        }
    }

}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.emoji, self.name)
    }
}

/// One row of a spend-per-category ranking, carrying the category's
/// last-known display fields.
#[derive(Debug, Clone)]
pub struct CategorySpend {
    pub emoji: String,
    pub name: String,
    pub total_cents: i64,
}
