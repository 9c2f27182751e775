//! The per-block toggle state machine and its collaborator contracts.
//!
//! The controller owns no ambient state: the block store, the URL prompt, and
//! the resolvers are all injected, so hosts and tests supply their own.
//!
//! # Write ordering
//!
//! Both directions of the toggle perform two sequential writes - content
//! first, then the original-link attribute. The pair is NOT a transaction: if
//! the second write fails, the first is not rolled back, the block is left in
//! whatever state the last successful write produced, and the failure is
//! reported for that block alone.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::future::join_all;

use linkcard_providers::{
    MetadataResolver, OembedResolver, ProviderRegistry, ProxyFetch,
};
use linkcard_types::{
    BlockId, BlockOutcome, BlockSnapshot, BlockState, ContentFormat, ConversionReport,
    ConvertError, ConvertKind, ORIGINAL_LINK_ATTRIBUTE, OutcomeStatus, SkipReason,
};

use crate::card::{render_bookmark_card, wrap_embed};
use crate::classify::{classify, is_url};

/// Boxed future returned by collaborator contracts.
pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The host editor's block persistence.
///
/// Writes report success as a boolean; host-side failures surface as `false`,
/// never as panics.
pub trait BlockStore: Send + Sync {
    /// Persisted custom attributes of a block; `None` when the read fails.
    fn attrs<'a>(&'a self, id: &'a BlockId) -> BoxFut<'a, Option<BTreeMap<String, String>>>;

    /// Merge attribute updates into a block; a `None` value clears its key.
    fn set_attrs<'a>(
        &'a self,
        id: &'a BlockId,
        attrs: BTreeMap<String, Option<String>>,
    ) -> BoxFut<'a, bool>;

    /// Replace a block's content in the given format.
    fn update_block<'a>(
        &'a self,
        format: ContentFormat,
        content: String,
        id: &'a BlockId,
    ) -> BoxFut<'a, bool>;
}

/// The host's URL input dialog. Resolves to `None` on cancel.
pub trait UrlPrompt: Send + Sync {
    fn prompt_for_url(&self) -> BoxFut<'_, Option<String>>;
}

/// Drives the toggle state machine over one or more target blocks.
pub struct Controller {
    store: Arc<dyn BlockStore>,
    prompt: Arc<dyn UrlPrompt>,
    oembed: OembedResolver,
    metadata: MetadataResolver,
}

impl Controller {
    pub fn new(
        store: Arc<dyn BlockStore>,
        prompt: Arc<dyn UrlPrompt>,
        oembed: OembedResolver,
        metadata: MetadataResolver,
    ) -> Self {
        Self {
            store,
            prompt,
            oembed,
            metadata,
        }
    }

    /// A controller with default resolvers over the given proxy.
    pub fn with_proxy(
        store: Arc<dyn BlockStore>,
        prompt: Arc<dyn UrlPrompt>,
        proxy: Arc<dyn ProxyFetch>,
    ) -> Self {
        let registry = Arc::new(ProviderRegistry::new(proxy.clone()));
        Self::new(
            store,
            prompt,
            OembedResolver::new(registry, proxy.clone()),
            MetadataResolver::new(proxy),
        )
    }

    /// Toggle every target block, concurrently and independently.
    ///
    /// All block pipelines are launched together and awaited as a group; one
    /// block's failure never aborts its siblings, and callers must not assume
    /// any cross-block ordering of side effects. The report lists one outcome
    /// per block, in input order.
    pub async fn process_blocks(
        &self,
        blocks: Vec<BlockSnapshot>,
        kind: ConvertKind,
    ) -> ConversionReport {
        let outcomes = join_all(
            blocks
                .into_iter()
                .map(|block| self.process_block(block, kind)),
        )
        .await;
        ConversionReport::new(outcomes)
    }

    /// Toggle a single block; errors become a `Failed` outcome, never a panic.
    pub async fn process_block(&self, block: BlockSnapshot, kind: ConvertKind) -> BlockOutcome {
        let id = block.id.clone();
        let status = match self.run_block(block, kind).await {
            Ok(status) => {
                if matches!(status, OutcomeStatus::Skipped(_)) {
                    tracing::debug!(block = %id, ?status, "block skipped");
                }
                status
            }
            Err(error) => {
                tracing::error!(block = %id, %error, "block toggle failed");
                OutcomeStatus::Failed(error)
            }
        };
        BlockOutcome { id, status }
    }

    async fn run_block(
        &self,
        block: BlockSnapshot,
        kind: ConvertKind,
    ) -> Result<OutcomeStatus, ConvertError> {
        match classify(&block) {
            BlockState::Empty => {
                let Some(entered) = self.prompt.prompt_for_url().await else {
                    return Ok(OutcomeStatus::Skipped(SkipReason::PromptCancelled));
                };
                let entered = entered.trim().to_string();
                if !is_url(&entered) {
                    return Ok(OutcomeStatus::Skipped(SkipReason::InvalidUrl));
                }
                self.convert_block(&block.id, &entered, kind).await
            }
            BlockState::Converted { original_url } => {
                self.revert_block(&block.id, &original_url).await
            }
            BlockState::Plain { link: None } => Ok(OutcomeStatus::Skipped(SkipReason::NoLink)),
            BlockState::Plain { link: Some(link) } => {
                let link = link.trim().to_string();
                if !is_url(&link) {
                    return Ok(OutcomeStatus::Skipped(SkipReason::InvalidUrl));
                }
                self.convert_block(&block.id, &link, kind).await
            }
        }
    }

    async fn convert_block(
        &self,
        id: &BlockId,
        link: &str,
        kind: ConvertKind,
    ) -> Result<OutcomeStatus, ConvertError> {
        let html = match kind {
            ConvertKind::Embed => match self.oembed.embed_html(link).await {
                Some(embed) => wrap_embed(&embed),
                None => return Ok(OutcomeStatus::Skipped(SkipReason::NoEmbed)),
            },
            ConvertKind::BookmarkCard => match self.metadata.metadata(link).await {
                Some(metadata) => render_bookmark_card(&metadata),
                None => return Ok(OutcomeStatus::Skipped(SkipReason::NoMetadata)),
            },
        };

        if !self
            .store
            .update_block(ContentFormat::Dom, html, id)
            .await
        {
            return Err(ConvertError::ContentWrite { id: id.clone() });
        }

        let attrs = BTreeMap::from([(
            ORIGINAL_LINK_ATTRIBUTE.to_string(),
            Some(link.to_string()),
        )]);
        if !self.store.set_attrs(id, attrs).await {
            return Err(ConvertError::AttributeWrite { id: id.clone() });
        }

        tracing::info!(block = %id, url = link, ?kind, "link converted");
        Ok(OutcomeStatus::Converted)
    }

    async fn revert_block(
        &self,
        id: &BlockId,
        snapshot_url: &str,
    ) -> Result<OutcomeStatus, ConvertError> {
        // Prefer the freshly persisted attribute over the snapshot, which may
        // be stale by the time a multi-block operation reaches this block.
        let original = self
            .store
            .attrs(id)
            .await
            .and_then(|attrs| {
                attrs
                    .get(ORIGINAL_LINK_ATTRIBUTE)
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
            })
            .unwrap_or_else(|| snapshot_url.to_string());

        let title = self.metadata.page_title(&original).await;
        let markdown = format!("[{title}]({original})");
        if !self
            .store
            .update_block(ContentFormat::Markdown, markdown, id)
            .await
        {
            return Err(ConvertError::ContentWrite { id: id.clone() });
        }

        let attrs = BTreeMap::from([(ORIGINAL_LINK_ATTRIBUTE.to_string(), None)]);
        if !self.store.set_attrs(id, attrs).await {
            return Err(ConvertError::AttributeWrite { id: id.clone() });
        }

        tracing::info!(block = %id, url = %original, "conversion reverted");
        Ok(OutcomeStatus::Reverted)
    }
}
