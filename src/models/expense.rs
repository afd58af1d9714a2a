#[derive(Debug, Clone)]
pub struct Expense {
    pub id: Option<i64>,
    /// Positive count of minor currency units.
    pub amount_cents: i64,
    pub category_id: i64,
    /// Calendar date the money was spent, `YYYY-MM-DD`. Independent of
    /// entry time; compares lexicographically in chronological order.
    pub spent_date: String,
    /// Entry timestamp, ISO 8601.
    pub created_at: String,
    pub comment: Option<String>,
}

impl Expense {
    pub fn new(amount_cents: i64, category_id: i64, spent_date: String, created_at: String) -> Self {
        Self {
            id: None,
            amount_cents,
            category_id,
            spent_date,
            created_at,
            comment: None,
        }
    }
}
