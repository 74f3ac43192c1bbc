//! Decides whether an actor may trigger review app creation.
//!
//! Only creation is gated. Closing a pull request already requires being a
//! maintainer or the author, so teardown is never checked here.

/// Outcome of checking a permission level against the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDecision {
    pub allowed: bool,
    /// The permission level the actor was reported to have.
    pub permission: String,
    /// The allow-list entry that matched, if any.
    pub matched_level: Option<String>,
}

/// Checks `actor_permission` against `allow_list`, ignoring case and
/// surrounding whitespace.
#[must_use]
pub fn decide<S: AsRef<str>>(actor_permission: &str, allow_list: &[S]) -> AuthorizationDecision {
    let permission = actor_permission.trim();
    let matched_level = allow_list
        .iter()
        .map(|level| level.as_ref().trim())
        .find(|level| !level.is_empty() && level.eq_ignore_ascii_case(permission))
        .map(str::to_string);

    AuthorizationDecision {
        allowed: matched_level.is_some(),
        permission: permission.to_string(),
        matched_level,
    }
}
