//! Analysis: fanning stored text out to every configured model.

use chrono::Utc;
use redsift_core::{
  inference::{InferenceBackend, Sampling},
  item::{is_sentinel, is_tombstone},
  record::{AnalysisDocument, AnalysisRecord, Category, SCHEMA_VERSION, SOURCE_REDDIT},
  remote::RedditClient,
  store::HarvestStore,
};
use tracing::{error, info, warn};

use crate::{
  Pipeline, Result,
  digest::sha512_hex,
  error::{PartialFanOut, store_err},
  lang::LanguageDetector,
  text::sanitize,
};

const POST_PROMPT: &str = "respond to this post title and post body: ";
const COMMENT_PROMPT: &str = "respond to this comment: ";

fn prompt(category: Category, text: &str) -> String {
  let lead = match category {
    Category::Post => POST_PROMPT,
    Category::Comment => COMMENT_PROMPT,
  };
  format!("{lead}{text}")
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Why an item was not sent to any model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  /// The id is not in the store.
  NotStored,
  /// Empty or tombstoned text.
  NoContent,
  /// Written by the sentinel account.
  Sentinel,
  /// Detected language, or `None` when detection failed.
  Language(Option<String>),
  /// `get_and_analyze_post` found the post already stored.
  AlreadyStored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
  Skipped(SkipReason),
  /// Every model answered, in order. `duplicates` counts answers whose
  /// hash was already on file and so were not stored again.
  Analyzed { models: Vec<String>, duplicates: usize },
}

/// Tally of a bulk analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkReport {
  pub analyzed: usize,
  pub skipped:  usize,
}

impl BulkReport {
  fn count(&mut self, outcome: &AnalysisOutcome) {
    match outcome {
      AnalysisOutcome::Skipped(_) => self.skipped += 1,
      AnalysisOutcome::Analyzed { .. } => self.analyzed += 1,
    }
  }
}

// ─── Triggers ────────────────────────────────────────────────────────────────

impl<S, R, B, D> Pipeline<S, R, B, D>
where
  S: HarvestStore,
  R: RedditClient,
  B: InferenceBackend,
  D: LanguageDetector,
{
  /// Analyse a stored post's title and body.
  pub async fn analyze_post(&self, post_id: &str) -> Result<AnalysisOutcome> {
    info!(post_id, "analyzing post");
    let Some(post) = self.store.get_post(post_id).await.map_err(store_err)? else {
      warn!(post_id, "post not stored");
      return Ok(AnalysisOutcome::Skipped(SkipReason::NotStored));
    };
    if post.post_body.is_empty() || is_tombstone(&post.post_body) {
      warn!(post_id, "post has no body");
      return Ok(AnalysisOutcome::Skipped(SkipReason::NoContent));
    }
    if is_sentinel(post.post_author.as_deref()) {
      return Ok(AnalysisOutcome::Skipped(SkipReason::Sentinel));
    }

    self
      .analyze(Category::Post, post_id, &post.analysis_text())
      .await
  }

  /// Analyse a stored comment's body.
  pub async fn analyze_comment(&self, comment_id: &str) -> Result<AnalysisOutcome> {
    info!(comment_id, "analyzing comment");
    let Some(comment) = self.store.get_comment(comment_id).await.map_err(store_err)? else {
      warn!(comment_id, "comment not stored");
      return Ok(AnalysisOutcome::Skipped(SkipReason::NotStored));
    };
    if comment.comment_body.is_empty() || comment.is_tombstone() {
      warn!(comment_id, "comment has no body");
      return Ok(AnalysisOutcome::Skipped(SkipReason::NoContent));
    }
    if is_sentinel(comment.comment_author.as_deref()) {
      return Ok(AnalysisOutcome::Skipped(SkipReason::Sentinel));
    }

    self
      .analyze(Category::Comment, comment_id, &comment.comment_body)
      .await
  }

  /// Analyse every stored post without an analysis record. The first
  /// backend failure ends the run.
  pub async fn analyze_posts(&self) -> Result<BulkReport> {
    let ids = self.store.unanalyzed_post_ids().await.map_err(store_err)?;
    info!(posts = ids.len(), "analyzing posts");

    let mut report = BulkReport::default();
    for post_id in &ids {
      report.count(&self.analyze_post(post_id).await?);
    }
    Ok(report)
  }

  /// Analyse every stored comment without an analysis record. The first
  /// backend failure ends the run.
  pub async fn analyze_comments(&self) -> Result<BulkReport> {
    let ids = self.store.unanalyzed_comment_ids().await.map_err(store_err)?;
    if ids.is_empty() {
      warn!("no comments to analyze");
    }

    let mut report = BulkReport::default();
    for comment_id in &ids {
      report.count(&self.analyze_comment(comment_id).await?);
    }
    Ok(report)
  }

  /// Collect a post that is not yet stored, then analyse it. A post already
  /// in the store is left alone.
  pub async fn get_and_analyze_post(&self, post_id: &str) -> Result<AnalysisOutcome> {
    if self.store.get_post(post_id).await.map_err(store_err)?.is_some() {
      info!(post_id, "post already stored");
      return Ok(AnalysisOutcome::Skipped(SkipReason::AlreadyStored));
    }

    warn!(post_id, "post not found in local store");
    self.collect_post(post_id).await?;
    self.analyze_post(post_id).await
  }

  // ── Fan-out ───────────────────────────────────────────────────────────────

  /// Gate `text` on language, then prompt each configured model in order and
  /// store one record per answer.
  async fn analyze(
    &self,
    category: Category,
    reference_id: &str,
    text: &str,
  ) -> Result<AnalysisOutcome> {
    match self.detector.detect(text) {
      Some(lang) if lang == self.settings.target_language => {}
      Some(lang) => {
        warn!(reference_id, %lang, "skipping: language not targeted");
        return Ok(AnalysisOutcome::Skipped(SkipReason::Language(Some(lang))));
      }
      None => {
        warn!(reference_id, "skipping: language not detected");
        return Ok(AnalysisOutcome::Skipped(SkipReason::Language(None)));
      }
    }

    let message = prompt(category, text);
    let timestamp = Utc::now();
    let mut answered = Vec::new();
    let mut duplicates = 0;

    for model in &self.settings.models {
      info!(%model, reference_id, "running model");
      let reply = match self
        .backend
        .chat(model, &message, Sampling::DETERMINISTIC)
        .await
      {
        Ok(reply) => reply,
        Err(e) => {
          if e.is_unreachable() {
            error!(%model, reference_id, error = %e, "analysis backend unreachable");
          } else {
            error!(%model, reference_id, error = %e, "analysis backend failed");
          }
          return Err(
            PartialFanOut {
              reference_id: reference_id.to_owned(),
              succeeded:    answered,
              failed_at:    model.clone(),
              error:        e,
            }
            .into(),
          );
        }
      };

      let plaintext = sanitize(&reply);
      let shasum_512 = sha512_hex(&plaintext);
      let analysis = match &self.cipher {
        Some(cipher) => cipher.encrypt(&plaintext)?,
        None => plaintext,
      };

      let record = AnalysisRecord {
        timestamp,
        shasum_512,
        analysis_document: AnalysisDocument {
          schema_version: SCHEMA_VERSION.into(),
          source: SOURCE_REDDIT.into(),
          category,
          reference_id: reference_id.to_owned(),
          llm: model.clone(),
          analysis,
        },
      };
      if !self.store.insert_analysis(&record).await.map_err(store_err)? {
        info!(%model, reference_id, "identical analysis already stored");
        duplicates += 1;
      }
      answered.push(model.clone());
    }

    Ok(AnalysisOutcome::Analyzed { models: answered, duplicates })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prompts_match_category() {
    assert_eq!(
      prompt(Category::Post, "TitleBody"),
      "respond to this post title and post body: TitleBody"
    );
    assert_eq!(prompt(Category::Comment, "hi"), "respond to this comment: hi");
  }
}
