//! Indexing stage outcome types and document assembly.

use uuid::Uuid;

use crate::stores::SectionRecord;

/// Counters describing a completed indexing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexingStats {
    /// Sections produced by splitting the whole corpus.
    pub total_sections: usize,
    /// Sections inside the selection window.
    pub selected: usize,
    /// Sections written to the store.
    pub indexed: usize,
}

/// Pipeline phase an indexing failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexingPhase {
    /// Reading the corpus file.
    LoadCorpus,
    /// The batch embedding request.
    Embed,
    /// Writing documents to the vector store.
    Store,
}

impl std::fmt::Display for IndexingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadCorpus => write!(f, "load-corpus"),
            Self::Embed => write!(f, "embed"),
            Self::Store => write!(f, "store"),
        }
    }
}

/// Result of the indexing stage.
///
/// Indexing never aborts the surrounding run on its own: failures are
/// captured as a value and the orchestrator decides whether to continue.
/// An empty selection window still counts as [`Completed`](Self::Completed)
/// with zero rows written.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum IndexingOutcome {
    /// The corpus was loaded, split, selected, and written to the store.
    Completed(IndexingStats),
    /// A stage failed; `phase` names where.
    Failed {
        /// Which stage produced the failure.
        phase: IndexingPhase,
        /// Human-readable failure description.
        reason: String,
    },
}

impl IndexingOutcome {
    /// Short label for this outcome variant, for logs and metrics.
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Completed(_) => "completed",
            Self::Failed { .. } => "failed",
        }
    }

    /// Returns `true` if the outcome is [`Completed`](Self::Completed).
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns `true` if the outcome is [`Failed`](Self::Failed).
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Stats of a completed pass, if any.
    #[must_use]
    pub fn stats(&self) -> Option<IndexingStats> {
        match self {
            Self::Completed(stats) => Some(*stats),
            Self::Failed { .. } => None,
        }
    }

    /// Phase and reason of a failed pass, if any.
    #[must_use]
    pub fn failure(&self) -> Option<(IndexingPhase, &str)> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { phase, reason } => Some((*phase, reason.as_str())),
        }
    }

    /// Convenience constructor for a failure.
    #[must_use]
    pub fn failed(phase: IndexingPhase, reason: impl Into<String>) -> Self {
        Self::Failed {
            phase,
            reason: reason.into(),
        }
    }
}

/// Wraps selected sections as store records with fresh ids.
///
/// `window_start` anchors each record's `section_index` at the section's
/// absolute position in the original split output, so rows stay traceable
/// to their place in the corpus regardless of the window used.
pub fn build_section_records(
    sections: &[&str],
    window_start: usize,
    source: &str,
    delimiter: &str,
) -> Vec<SectionRecord> {
    sections
        .iter()
        .enumerate()
        .map(|(offset, content)| {
            SectionRecord::new(
                Uuid::new_v4().to_string(),
                source,
                window_start + offset,
                *content,
            )
            .with_metadata(serde_json::json!({ "delimiter": delimiter }))
        })
        .collect()
}
