//! Database ID type definitions.

/// The ID of a user row.
pub type UserId = i64;
/// The ID of an account row.
pub type AccountId = i64;
/// The ID of a category row.
pub type CategoryId = i64;
/// The ID of a transaction row.
pub type TransactionId = i64;
/// The ID of a bank institution row.
pub type InstitutionId = i64;
