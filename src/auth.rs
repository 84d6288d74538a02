//! Operator authorization policy.

/// Fixed allow-list of operator chat ids.
///
/// Created once at process start from configuration and injected into the
/// lifecycle controller; there is no global registry. Membership gates every
/// operator-only command and callback action.
#[derive(Debug, Clone)]
pub struct OperatorPolicy {
    operators: Vec<i64>,
}

impl OperatorPolicy {
    pub fn new(operators: Vec<i64>) -> Self {
        Self { operators }
    }

    /// Whether the conversant is on the allow-list.
    pub fn is_operator(&self, chat_id: i64) -> bool {
        self.operators.contains(&chat_id)
    }

    /// All operator chat ids, for notification fan-out.
    pub fn operators(&self) -> &[i64] {
        &self.operators
    }
}
