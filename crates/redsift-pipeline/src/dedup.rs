//! Splitting a candidate id listing into stored and new ids.

use std::collections::BTreeSet;

use futures::StreamExt as _;
use redsift_core::{
  remote::IdStream,
  store::{HarvestStore, IdColumn},
};

use crate::{Result, error::store_err};

/// Drain `candidates` in chunks of `chunk_size` and return the ids not yet
/// present in `column`.
///
/// Duplicate candidates collapse. A listing error ends resolution and is
/// returned as-is; nothing is fetched on the caller's behalf until the whole
/// listing has been resolved.
pub async fn resolve_new_ids<S: HarvestStore>(
  store: &S,
  column: IdColumn,
  mut candidates: IdStream<'_>,
  chunk_size: usize,
) -> Result<BTreeSet<String>> {
  let chunk_size = chunk_size.max(1);
  let mut new_ids = BTreeSet::new();
  let mut chunk = Vec::with_capacity(chunk_size);

  while let Some(id) = candidates.next().await {
    chunk.push(id?);
    if chunk.len() == chunk_size {
      absorb_chunk(store, column, &mut chunk, &mut new_ids).await?;
    }
  }
  absorb_chunk(store, column, &mut chunk, &mut new_ids).await?;

  tracing::debug!(column = column.column(), new = new_ids.len(), "resolved candidate ids");
  Ok(new_ids)
}

async fn absorb_chunk<S: HarvestStore>(
  store:   &S,
  column:  IdColumn,
  chunk:   &mut Vec<String>,
  new_ids: &mut BTreeSet<String>,
) -> Result<()> {
  if chunk.is_empty() {
    return Ok(());
  }
  let existing = store.existing_ids(column, &chunk[..]).await.map_err(store_err)?;
  new_ids.extend(chunk.drain(..).filter(|id| !existing.contains(id)));
  Ok(())
}
