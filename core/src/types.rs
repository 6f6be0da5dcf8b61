//! Shared primitive types used across the engine.

/// A storage-assigned integer row key. Monotonically increasing within a
/// price series; assigned by SQLite, never reused while newer rows survive.
pub type RowKey = i64;
