use std::{collections::HashMap, fs, path::Path};

use tracing::warn;

use crate::{
    domain::{ApiToken, UserId},
    Result,
};

/// Immutable identity ⇄ credential index, built once at startup.
///
/// The source table is `{ token: [user_id, …] }`. Each identity maps to at
/// most one token (the first enrollment wins); a token maps to the ordered
/// list of identities that receive its deposit notifications.
pub struct CredentialDirectory {
    by_user: HashMap<UserId, ApiToken>,
    by_token: HashMap<String, Vec<UserId>>,
}

impl CredentialDirectory {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let table: HashMap<String, Vec<serde_json::Value>> = serde_json::from_str(&raw)?;
        Ok(Self::from_table(table))
    }

    /// Ids are accepted as JSON numbers or numeric strings; anything else is
    /// skipped with a warning so one bad entry cannot take the table down.
    pub fn from_table(table: HashMap<String, Vec<serde_json::Value>>) -> Self {
        let mut by_user = HashMap::new();
        let mut by_token = HashMap::new();

        for (token, raw_ids) in table {
            let mut ids = Vec::new();
            for raw in raw_ids {
                let Some(id) = parse_user_id(&raw) else {
                    warn!("skipping unparseable user id {raw} for a credential");
                    continue;
                };
                let user = UserId(id);
                by_user.entry(user).or_insert_with(|| ApiToken(token.clone()));
                ids.push(user);
            }
            by_token.insert(token, ids);
        }

        Self { by_user, by_token }
    }

    pub fn token_for(&self, user: UserId) -> Option<&ApiToken> {
        self.by_user.get(&user)
    }

    /// Enrollment list for fan-out. Empty slice, not an error, when unknown.
    pub fn identities_for(&self, token: &str) -> &[UserId] {
        self.by_token.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn merchant_count(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

fn parse_user_id(raw: &serde_json::Value) -> Option<i64> {
    if let Some(n) = raw.as_i64() {
        return Some(n);
    }
    raw.as_str().and_then(|s| s.trim().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(v: serde_json::Value) -> HashMap<String, Vec<serde_json::Value>> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn resolves_identity_to_token() {
        let dir = CredentialDirectory::from_table(table(json!({
            "tok-a": [1, "2"],
            "tok-b": [3],
        })));

        assert_eq!(dir.token_for(UserId(1)), Some(&ApiToken("tok-a".into())));
        assert_eq!(dir.token_for(UserId(2)), Some(&ApiToken("tok-a".into())));
        assert_eq!(dir.token_for(UserId(3)), Some(&ApiToken("tok-b".into())));
        assert_eq!(dir.token_for(UserId(4)), None);
    }

    #[test]
    fn reverse_lookup_returns_enrollment_list() {
        let dir = CredentialDirectory::from_table(table(json!({
            "tok-a": [1, 2],
        })));

        assert_eq!(dir.identities_for("tok-a"), &[UserId(1), UserId(2)]);
        assert!(dir.identities_for("unknown").is_empty());
    }

    #[test]
    fn skips_unparseable_ids() {
        let dir = CredentialDirectory::from_table(table(json!({
            "tok-a": [1, "not-a-number", {"x": 1}],
        })));

        assert_eq!(dir.identities_for("tok-a"), &[UserId(1)]);
    }

    #[test]
    fn empty_table() {
        let dir = CredentialDirectory::from_table(HashMap::new());
        assert!(dir.is_empty());
        assert_eq!(dir.merchant_count(), 0);
    }
}
