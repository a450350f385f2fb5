use serde::{Deserialize, Serialize};

/// One approver row. `user` is the backend user id, empty until chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub user: String,
    pub required: bool,
}

/// The approval rule document posted to `/approval-rules/`.
///
/// Nothing here checks that approvers are distinct, that the list is
/// non-empty or that `min_approval` is a percentage; the backend decides.
/// `sequential` is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRule {
    pub username: String,
    pub description: String,
    pub manager: String,
    pub is_manager_approver: bool,
    pub approvers: Vec<Approver>,
    pub sequential: bool,
    pub min_approval: String,
}

impl ApprovalRule {
    pub fn add_approver(&mut self) {
        self.approvers.push(Approver::default());
    }

    /// Removes the row at `index`; out-of-range indexes are ignored.
    pub fn remove_approver(&mut self, index: usize) {
        if index < self.approvers.len() {
            self.approvers.remove(index);
        }
    }

    pub fn set_approver_user(&mut self, index: usize, user: impl Into<String>) {
        if let Some(row) = self.approvers.get_mut(index) {
            row.user = user.into();
        }
    }

    pub fn set_approver_required(&mut self, index: usize, required: bool) {
        if let Some(row) = self.approvers.get_mut(index) {
            row.required = required;
        }
    }
}

/// What the admin form asked for when it was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOp {
    AddApprover,
    RemoveApprover(usize),
    Save,
}

impl DraftOp {
    fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some(("remove_approver", index)) => index
                .parse()
                .map(DraftOp::RemoveApprover)
                .unwrap_or(DraftOp::Save),
            _ if raw == "add_approver" => DraftOp::AddApprover,
            _ => DraftOp::Save,
        }
    }
}

/// An approval rule being edited on the admin screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalRuleDraft {
    pub rule: ApprovalRule,
    pub op: Option<DraftOp>,
}

impl ApprovalRuleDraft {
    /// Rebuilds the draft from urlencoded form pairs. Approver rows use
    /// indexed names (`approver_user_0`, `approver_required_0`, ...) and
    /// `approver_count` keeps blank rows alive between posts.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut rule = ApprovalRule::default();
        let mut op = None;
        let mut rows = 0usize;
        let mut users: Vec<(usize, String)> = Vec::new();
        let mut required: Vec<usize> = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "username" => rule.username = value.clone(),
                "description" => rule.description = value.clone(),
                "manager" => rule.manager = value.clone(),
                "is_manager_approver" => rule.is_manager_approver = true,
                "sequential" => rule.sequential = true,
                "min_approval" => rule.min_approval = value.clone(),
                "approver_count" => rows = rows.max(value.parse().unwrap_or(0)),
                "op" => op = Some(DraftOp::parse(value)),
                other => {
                    if let Some(index) = row_index(other, "approver_user_") {
                        rows = rows.max(index + 1);
                        users.push((index, value.clone()));
                    } else if let Some(index) = row_index(other, "approver_required_") {
                        rows = rows.max(index + 1);
                        required.push(index);
                    }
                }
            }
        }

        rule.approvers = vec![Approver::default(); rows];
        for (index, user) in users {
            rule.set_approver_user(index, user);
        }
        for index in required {
            rule.set_approver_required(index, true);
        }

        Self { rule, op }
    }

    /// Applies a list-editing op. Returns false for `Save`, which the
    /// caller handles by submitting the rule.
    pub fn apply(&mut self) -> bool {
        match self.op {
            Some(DraftOp::AddApprover) => {
                self.rule.add_approver();
                true
            }
            Some(DraftOp::RemoveApprover(index)) => {
                self.rule.remove_approver(index);
                true
            }
            Some(DraftOp::Save) | None => false,
        }
    }
}

const MAX_APPROVER_ROWS: usize = 100;

fn row_index(key: &str, prefix: &str) -> Option<usize> {
    key.strip_prefix(prefix)?
        .parse()
        .ok()
        .filter(|index| *index < MAX_APPROVER_ROWS)
}
