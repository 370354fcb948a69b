//! Read-only access to GOG Galaxy 2.0 databases.
//!
//! Each compared user supplies a Galaxy SQLite file; this crate validates
//! the file and extracts the raw library data (owned-title tuples and
//! installed release keys) the comparison pipeline consumes.

pub mod galaxy;

pub use galaxy::{GalaxyDb, GalaxyDbError, is_sqlite3};
