use super::{Expense, ExpenseDisplay};

/// A manager's pending requests, as last fetched. Acted-on rows are dropped
/// locally instead of re-fetching the whole queue.
#[derive(Debug, Clone, Default)]
pub struct ReviewQueue {
    requests: Vec<Expense>,
}

impl ReviewQueue {
    pub fn new(requests: Vec<Expense>) -> Self {
        Self { requests }
    }

    /// Drops the request with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.requests.len();
        self.requests.retain(|r| r.id != id);
        self.requests.len() != before
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn rows(&self) -> Vec<ExpenseDisplay> {
        self.requests.iter().map(ExpenseDisplay::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(ids: &[u32]) -> ReviewQueue {
        let json = format!(
            "[{}]",
            ids.iter()
                .map(|id| format!(r#"{{"id": {}, "amount": "10.00", "status": "pending"}}"#, id))
                .collect::<Vec<_>>()
                .join(",")
        );
        ReviewQueue::new(serde_json::from_str(&json).unwrap())
    }

    #[test]
    fn remove_drops_only_the_acted_row() {
        let mut q = queue(&[1, 2, 3]);
        assert!(q.remove("1"));
        let ids: Vec<String> = q.rows().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let mut q = queue(&[1]);
        assert!(!q.remove("42"));
        assert_eq!(q.len(), 1);
        assert!(q.remove("1"));
        assert!(q.is_empty());
    }
}
