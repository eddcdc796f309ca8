// Post sources — where incident snapshots come from.
//
// The source is selected at startup: a snapshot file when one is given,
// otherwise the data service's REST API.

pub mod http;
pub mod memory;
pub mod traits;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

pub use http::HttpSource;
pub use memory::{MemorySource, Snapshot};
pub use traits::PostSource;

/// Open the snapshot at `snapshot` if given, otherwise connect to `api_url`.
pub fn open(snapshot: Option<&Path>, api_url: &str) -> Result<Arc<dyn PostSource>> {
    match snapshot {
        Some(path) => Ok(Arc::new(MemorySource::open(path)?)),
        None => Ok(Arc::new(HttpSource::new(api_url)?)),
    }
}
