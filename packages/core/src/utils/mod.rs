//! Utility functions for ModelGraph Core
//!
//! Pure helpers shared by the mapper and the loader. Nothing here touches the
//! store, so everything can be unit-tested without a database.

mod flatten;
mod identity;

pub use flatten::{flatten, DEFAULT_SEPARATOR};
pub use identity::{canonical_json, content_identity, DeviceRole, DIGEST_HEX_LEN};
