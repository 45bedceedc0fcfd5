//! Compact action identifiers carried on inline-keyboard callbacks.
//!
//! A token is `name` or `name:arg1:arg2…`. Decoding never fails: an empty or
//! malformed token degrades to an empty argument list. The separator is not
//! escapable inside arguments; an argument containing `:` is a caller error.

pub const SEPARATOR: char = ':';

pub const BALANCE: &str = "balance";
pub const PAYMENTS_LAST: &str = "payments_last";
pub const CHECK_PAYMENT: &str = "check_payment";
pub const WITHDRAW: &str = "withdraw";
pub const CANCEL: &str = "cancel";
pub const DELETE_MESSAGE: &str = "delete_message";

pub fn pack(name: &str, args: &[&str]) -> String {
    let mut out = name.to_string();
    for arg in args {
        out.push(SEPARATOR);
        out.push_str(arg);
    }
    out
}

pub fn unpack(data: &str) -> (&str, Vec<&str>) {
    let mut parts = data.split(SEPARATOR);
    let name = parts.next().unwrap_or("");
    (name, parts.collect())
}

pub fn is_action(data: &str, name: &str) -> bool {
    data == name
}

/// True for `name` itself and for `name:arg…`, but not for `name2`.
pub fn has_action_prefix(data: &str, name: &str) -> bool {
    data == name || data.strip_prefix(name).is_some_and(|rest| rest.starts_with(SEPARATOR))
}

/// The action kinds the router dispatches on. Unknown names land in `Other`
/// so the dispatch loop can log and ignore them instead of erroring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Balance,
    PaymentsLast,
    CheckPayment,
    Withdraw,
    Cancel,
    DeleteMessage,
    Other(String, Vec<String>),
}

impl Action {
    pub fn parse(data: &str) -> Self {
        let (name, args) = unpack(data);
        if args.is_empty() {
            match name {
                BALANCE => return Self::Balance,
                PAYMENTS_LAST => return Self::PaymentsLast,
                CHECK_PAYMENT => return Self::CheckPayment,
                WITHDRAW => return Self::Withdraw,
                CANCEL => return Self::Cancel,
                DELETE_MESSAGE => return Self::DeleteMessage,
                _ => {}
            }
        }
        Self::Other(
            name.to_string(),
            args.into_iter().map(str::to_string).collect(),
        )
    }
}
