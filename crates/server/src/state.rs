use std::sync::Arc;

use tracing::{info, warn};

use rfpcat_core::Config;
use rfpcat_ingest::{BlobStore, FormatDecoder};
use rfpcat_llm::{Categorizer, RfpCategorizer};
use rfpcat_outline::HeadingParser;

pub struct AppState {
    pub config: Config,
    /// `None` when no LLM provider is configured; categorization answers 503.
    pub categorizer: Option<Arc<dyn Categorizer>>,
    pub decoder: FormatDecoder,
    pub parser: HeadingParser,
}

impl AppState {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let marker = config.outline.heading_marker.clone();
        let categorizer = match RfpCategorizer::from_config(&config.llm, &config.ollama, &marker) {
            Ok(c) => {
                info!(provider = %config.llm.provider, "RFP categorizer ready");
                Some(Arc::new(c) as Arc<dyn Categorizer>)
            }
            Err(e) => {
                warn!(error = %e, "categorizer not available, POST /api/generate will answer 503");
                None
            }
        };
        let parser = HeadingParser::from_config(&config.outline)?;
        let blobs = BlobStore::bounded(config.server.max_blobs as usize);

        Ok(Self {
            config,
            categorizer,
            decoder: FormatDecoder::new(blobs),
            parser,
        })
    }

    pub fn blobs(&self) -> &BlobStore {
        self.decoder.blobs()
    }
}
