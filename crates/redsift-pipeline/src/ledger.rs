//! The error ledger: expected failures become rows instead of aborting a run.

use redsift_core::{
  FetchError,
  record::{ErrorKind, ErrorRecord},
  store::HarvestStore,
};
use tracing::warn;

use crate::{Result, error::store_err};

/// Append one ledger row for `item_id` and log it.
pub async fn record<S: HarvestStore>(
  store:   &S,
  kind:    ErrorKind,
  item_id: &str,
  error:   &FetchError,
) -> Result<()> {
  warn!(kind = kind.as_str(), item_id, %error, "recording failure");
  let row = ErrorRecord {
    item_id:   item_id.to_owned(),
    item_type: kind,
    error:     error.message().to_owned(),
  };
  store.insert_error(&row).await.map_err(store_err)
}
