//! Background jobs: one variant per trigger, run against a [`Pipeline`].

use std::{fmt, future::Future};

use redsift_core::{inference::InferenceBackend, remote::RedditClient, store::HarvestStore};
use redsift_pipeline::{AnalysisOutcome, LanguageDetector, Pipeline};
use tracing::info;

/// A unit of work a trigger hands off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
  CollectPost { post_id: String },
  CollectSubreddit { subreddit: String },
  CollectAuthor { author: String },
  CollectKnownAuthors,
  JoinNewSubreddits,
  AnalyzePost { post_id: String },
  AnalyzePosts,
  AnalyzeComment { comment_id: String },
  AnalyzeComments,
  GetAndAnalyzePost { post_id: String },
}

impl Job {
  /// The route that triggers this job, without the leading slash.
  pub fn route(&self) -> &'static str {
    match self {
      Self::CollectPost { .. } => "get_sub_post",
      Self::CollectSubreddit { .. } => "get_sub_posts",
      Self::CollectAuthor { .. } => "get_author_comments",
      Self::CollectKnownAuthors => "get_authors_comments",
      Self::JoinNewSubreddits => "join_new_subs",
      Self::AnalyzePost { .. } => "analyze_post",
      Self::AnalyzePosts => "analyze_posts",
      Self::AnalyzeComment { .. } => "analyze_comment",
      Self::AnalyzeComments => "analyze_comments",
      Self::GetAndAnalyzePost { .. } => "get_and_analyze_post",
    }
  }
}

impl fmt::Display for Job {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.route()) }
}

/// Something that can run a [`Job`] to completion.
///
/// Implemented for [`Pipeline`]; the HTTP layer depends only on this trait.
pub trait JobRunner: Send + Sync + 'static {
  fn run(&self, job: Job) -> impl Future<Output = Result<(), redsift_pipeline::Error>> + Send + '_;
}

impl<S, R, B, D> JobRunner for Pipeline<S, R, B, D>
where
  S: HarvestStore + 'static,
  R: RedditClient + 'static,
  B: InferenceBackend + 'static,
  D: LanguageDetector + 'static,
{
  async fn run(&self, job: Job) -> Result<(), redsift_pipeline::Error> {
    info!(%job, "job started");
    match job {
      Job::CollectPost { post_id } => self.collect_post(&post_id).await?,
      Job::CollectSubreddit { subreddit } => {
        let new_posts = self.collect_subreddit_posts(&subreddit).await?;
        info!(%subreddit, new_posts, "subreddit collected");
      }
      Job::CollectAuthor { author } => {
        self.collect_author(&author).await?;
        let new_comments = self.collect_author_comments(&author).await?;
        info!(%author, new_comments, "author collected");
      }
      Job::CollectKnownAuthors => self.collect_all_known_authors().await?,
      Job::JoinNewSubreddits => {
        let joined = self.join_new_subreddits().await?;
        info!(joined, "subreddits joined");
      }
      Job::AnalyzePost { post_id } => log_outcome(&post_id, &self.analyze_post(&post_id).await?),
      Job::AnalyzePosts => {
        let report = self.analyze_posts().await?;
        info!(analyzed = report.analyzed, skipped = report.skipped, "posts analyzed");
      }
      Job::AnalyzeComment { comment_id } => {
        log_outcome(&comment_id, &self.analyze_comment(&comment_id).await?)
      }
      Job::AnalyzeComments => {
        let report = self.analyze_comments().await?;
        info!(analyzed = report.analyzed, skipped = report.skipped, "comments analyzed");
      }
      Job::GetAndAnalyzePost { post_id } => {
        log_outcome(&post_id, &self.get_and_analyze_post(&post_id).await?)
      }
    }
    Ok(())
  }
}

fn log_outcome(reference_id: &str, outcome: &AnalysisOutcome) {
  match outcome {
    AnalysisOutcome::Skipped(reason) => info!(reference_id, ?reason, "analysis skipped"),
    AnalysisOutcome::Analyzed { models, duplicates } => {
      info!(reference_id, ?models, duplicates, "analysis stored")
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_is_route_name() {
    let job = Job::AnalyzeComment { comment_id: "c1".into() };
    assert_eq!(job.to_string(), "analyze_comment");
    assert_eq!(Job::JoinNewSubreddits.route(), "join_new_subs");
  }
}
