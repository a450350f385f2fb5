pub mod approval_rule;
pub mod expense;
pub mod queue;
pub mod user;

pub use approval_rule::{ApprovalRule, ApprovalRuleDraft, Approver, DraftOp};
pub use expense::{
    Category, Expense, ExpenseAction, ExpenseDisplay, ExpenseForm, NewExpense, PaidBy, Receipt,
    StatusBadge,
};
pub use queue::ReviewQueue;
pub use user::{Authenticator, MockDirectory, Role, User, UserOption};

use serde::{Deserialize, Deserializer};

/// Backend identifiers arrive as JSON numbers or strings; both are kept as text.
pub(crate) fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Like [`id_from_number_or_string`], but `null` is allowed.
pub(crate) fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "id_from_number_or_string")] String);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(id)| id))
}

/// Treats an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
