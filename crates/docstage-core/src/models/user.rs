use uuid::Uuid;

/// Stable user identifier supplied by the auth provider.
///
/// Every persisted record is scoped by this value; credentials never reach the core.
pub type UserId = Uuid;
