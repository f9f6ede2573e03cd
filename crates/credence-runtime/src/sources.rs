//! Concurrent evidence-source gathering.
//!
//! Each configured [`SourceFetcher`] is called concurrently. Every attempt
//! is bounded by a timeout; timeouts and transient failures are retried
//! with exponential backoff. A source that still fails is left absent and
//! recorded as a `source_unavailable` degradation, so a slow profile site
//! never blocks an evaluation.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use credence_core::{
    CodeHostingSnapshot, CompetitiveSnapshot, Degradation, DegradationKind, EvidenceSource,
    ProfessionalSnapshot, PublicIdentity, SourceSnapshots,
};

use crate::config::RuntimeConfig;

/// One fetched snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSnapshot {
    CodeHosting(CodeHostingSnapshot),
    CompetitiveCoding(CompetitiveSnapshot),
    ProfessionalNetwork(ProfessionalSnapshot),
}

impl SourceSnapshot {
    pub fn source(&self) -> EvidenceSource {
        match self {
            SourceSnapshot::CodeHosting(_) => EvidenceSource::CodeHosting,
            SourceSnapshot::CompetitiveCoding(_) => EvidenceSource::CompetitiveCoding,
            SourceSnapshot::ProfessionalNetwork(_) => EvidenceSource::ProfessionalNetwork,
        }
    }
}

/// Why a fetch failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("no profile found")]
    NotFound,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("transient failure: {0}")]
    Transient(String),

    #[error("invalid response: {0}")]
    Invalid(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Timeout(_) | FetchError::Transient(_))
    }
}

/// Retrieves one source's snapshot for a candidate.
///
/// Fetchers only see the public identity (name and profile links).
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    fn source(&self) -> EvidenceSource;

    async fn fetch(&self, identity: &PublicIdentity) -> Result<SourceSnapshot, FetchError>;
}

/// Result of gathering.
#[derive(Debug, Clone, Default)]
pub struct Gathered {
    pub snapshots: SourceSnapshots,
    pub degradations: Vec<Degradation>,
}

impl Gathered {
    /// Store a snapshot unless its slot is already filled.
    fn insert(&mut self, snapshot: SourceSnapshot) {
        let s = &mut self.snapshots;
        match snapshot {
            SourceSnapshot::CodeHosting(v) => {
                s.code_hosting.get_or_insert(v);
            }
            SourceSnapshot::CompetitiveCoding(v) => {
                s.competitive_coding.get_or_insert(v);
            }
            SourceSnapshot::ProfessionalNetwork(v) => {
                s.professional_network.get_or_insert(v);
            }
        }
    }
}

/// Runs fetchers with timeout and retry.
#[derive(Debug, Clone)]
pub struct SourceGatherer {
    timeout: Duration,
    retries: usize,
    retry_delay: Duration,
}

impl SourceGatherer {
    pub fn new(timeout: Duration, retries: usize, retry_delay: Duration) -> Self {
        Self {
            timeout,
            retries,
            retry_delay,
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.source_timeout, config.source_retries, config.retry_delay)
    }

    /// Fetch every source not already in `supplied`.
    pub async fn gather(
        &self,
        fetchers: &[Arc<dyn SourceFetcher>],
        identity: &PublicIdentity,
        supplied: &SourceSnapshots,
    ) -> Gathered {
        let present = supplied.present();
        let wanted: Vec<&dyn SourceFetcher> = fetchers
            .iter()
            .map(|f| f.as_ref())
            .filter(|f| !present.contains(&f.source()))
            .collect();

        let results = join_all(wanted.iter().map(|f| self.fetch(*f, identity))).await;

        let mut gathered = Gathered::default();
        for (fetcher, result) in wanted.iter().zip(results) {
            let source = fetcher.source();
            match result {
                Ok(snapshot) => {
                    tracing::debug!(source = %source, "Source fetched");
                    gathered.insert(snapshot);
                }
                Err(e) => {
                    tracing::warn!(source = %source, error = %e, "Source unavailable");
                    gathered.degradations.push(Degradation::new(
                        source.as_str(),
                        DegradationKind::SourceUnavailable,
                        e.to_string(),
                    ));
                }
            }
        }
        gathered
    }

    async fn fetch(
        &self,
        fetcher: &dyn SourceFetcher,
        identity: &PublicIdentity,
    ) -> Result<SourceSnapshot, FetchError> {
        let timeout = self.timeout;
        let attempt = move || async move {
            let snapshot = tokio::time::timeout(timeout, fetcher.fetch(identity))
                .await
                .map_err(|_| FetchError::Timeout(timeout))??;
            if snapshot.source() != fetcher.source() {
                return Err(FetchError::Invalid(format!(
                    "expected {} snapshot, got {}",
                    fetcher.source(),
                    snapshot.source()
                )));
            }
            Ok(snapshot)
        };

        attempt
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(self.retry_delay)
                    .with_max_times(self.retries),
            )
            .sleep(tokio::time::sleep)
            .when(FetchError::is_retryable)
            .notify(|err, delay| {
                tracing::warn!(
                    source = %fetcher.source(),
                    error = %err,
                    delay = ?delay,
                    "Source fetch failed, retrying"
                );
            })
            .await
    }
}
