//! Per-block conversion outcomes and the aggregate report.
//!
//! Multi-block operations never abort siblings on one block's failure, so the
//! controller reports an explicit outcome per block instead of swallowing
//! errors. Callers and tests assert on partial-failure results directly.

use thiserror::Error;

use crate::block::BlockId;

/// A block-scoped failure during conversion or revert.
///
/// The two writes of a toggle (content first, attribute second) are not a
/// transaction: whichever write failed, the earlier one is not rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("content write failed for block {id}")]
    ContentWrite { id: BlockId },
    #[error("attribute write failed for block {id}")]
    AttributeWrite { id: BlockId },
}

/// Why a block was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The user dismissed the URL prompt for an empty block.
    PromptCancelled,
    /// Prompt input or extracted link failed URL validation.
    InvalidUrl,
    /// A plain block with no leading link to extract.
    NoLink,
    /// No oEmbed provider matched, or the provider returned no html.
    NoEmbed,
    /// Page metadata could not be fetched.
    NoMetadata,
}

/// What happened to a single block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Converted,
    Reverted,
    Skipped(SkipReason),
    Failed(ConvertError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutcome {
    pub id: BlockId,
    pub status: OutcomeStatus,
}

impl BlockOutcome {
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(
            self.status,
            OutcomeStatus::Converted | OutcomeStatus::Reverted
        )
    }
}

/// Aggregate result of one multi-block operation, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversionReport {
    pub outcomes: Vec<BlockOutcome>,
}

impl ConversionReport {
    #[must_use]
    pub fn new(outcomes: Vec<BlockOutcome>) -> Self {
        Self { outcomes }
    }

    /// Number of blocks actually converted or reverted.
    #[must_use]
    pub fn changed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.changed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &BlockOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed(_)))
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockOutcome, ConversionReport, ConvertError, OutcomeStatus, SkipReason};
    use crate::block::BlockId;

    fn outcome(id: &str, status: OutcomeStatus) -> BlockOutcome {
        BlockOutcome {
            id: BlockId::new(id),
            status,
        }
    }

    #[test]
    fn report_counts_changed_blocks_and_failures() {
        let report = ConversionReport::new(vec![
            outcome("a", OutcomeStatus::Converted),
            outcome("b", OutcomeStatus::Skipped(SkipReason::NoLink)),
            outcome(
                "c",
                OutcomeStatus::Failed(ConvertError::ContentWrite {
                    id: BlockId::new("c"),
                }),
            ),
            outcome("d", OutcomeStatus::Reverted),
        ]);

        assert_eq!(report.changed(), 2);
        assert!(report.has_failures());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn empty_report_has_no_failures() {
        assert!(!ConversionReport::default().has_failures());
    }
}
