use crate::error::BackendResult;
use crate::query::{AttributeUpdate, MatchedItem, Query, ResultPolicy};

/// A platform secure credential service.
///
/// The four primitives are a fixed black-box contract. All implementations
/// must satisfy:
/// - An item identity (class, service, access group, account,
///   synchronizable) maps to at most one live item.
/// - `add` never overwrites; it fails with `DuplicateItem` instead.
/// - `update`, `delete` and `copy_matching` fail with `ItemNotFound` when
///   nothing matches.
/// - Concurrent calls on the same identity are serialized internally.
pub trait SecureBackend: Send + Sync {
    /// Store a new item described by `query`, including `query.value`.
    fn add(&self, query: &Query) -> BackendResult<()>;

    /// Apply `changes` to every item matching `query`.
    fn update(&self, query: &Query, changes: &AttributeUpdate) -> BackendResult<()>;

    /// Delete every item matching `query`.
    fn delete(&self, query: &Query) -> BackendResult<()>;

    /// Return matching items shaped by `policy`.
    ///
    /// With [`MatchLimit::One`](crate::MatchLimit::One) at most one item is
    /// returned even if several match.
    fn copy_matching(&self, query: &Query, policy: &ResultPolicy)
        -> BackendResult<Vec<MatchedItem>>;
}
