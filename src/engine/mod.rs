//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Runs streams partition by partition and commits bookmarks
//! - `SyncConfig` - Failure and ordering policy
//! - `SyncReport` - Per-stream, per-partition outcomes of a run
//!
//! A partition's bookmark is only advanced after every record of its range
//! has been handed to the record sink, so a crash mid-range re-extracts
//! that range on the next run.

mod types;
mod watermark;

pub use types::{
    OrderCheck, PartitionOutcome, PartitionReport, StreamReport, SyncConfig, SyncReport,
    SyncStats,
};

use crate::config::TapConfig;
use crate::datetime::{format_iso8601, parse_value};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::pagination::{ContinuationPolicy, PageRequest, PaginationDriver};
use crate::partition::Partition;
use crate::sink::RecordSink;
use crate::state::BookmarkStore;
use crate::stream::{IncrementalConfig, StreamDescriptor, WatermarkSource};
use crate::template::{self, TemplateContext};
use crate::types::StringMap;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, Instrument, Span};
use watermark::WatermarkTracker;

/// Source of the wall clock
pub type Clock = fn() -> DateTime<Utc>;

/// Counters of one partition, kept even when the partition fails
#[derive(Debug, Default)]
struct Progress {
    records: usize,
    pages: usize,
}

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    client: HttpClient,
    store: BookmarkStore,
    sink: Arc<dyn RecordSink>,
    tap_config: TapConfig,
    context: TemplateContext,
    headers: StringMap,
    params: StringMap,
    config: SyncConfig,
    span: Span,
    clock: Clock,
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(
        client: HttpClient,
        store: BookmarkStore,
        sink: Arc<dyn RecordSink>,
        tap_config: TapConfig,
    ) -> Self {
        let context = TemplateContext::with_config(tap_config.as_value());
        Self {
            client,
            store,
            sink,
            tap_config,
            context,
            headers: StringMap::new(),
            params: StringMap::new(),
            config: SyncConfig::default(),
            span: Span::none(),
            clock: Utc::now,
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Parent span of every stream and partition span
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Headers sent with every stream's requests (templates)
    #[must_use]
    pub fn with_headers(mut self, headers: StringMap) -> Self {
        self.headers = headers;
        self
    }

    /// Query parameters sent with every stream's requests (templates)
    #[must_use]
    pub fn with_params(mut self, params: StringMap) -> Self {
        self.params = params;
        self
    }

    /// Replace the wall clock
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Bookmark store
    pub fn store(&self) -> &BookmarkStore {
        &self.store
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Sync streams in order, then persist the final state.
    ///
    /// Returns `Err` only for fatal errors; partition failures are reported
    /// in the [`SyncReport`].
    pub async fn sync(&mut self, streams: &[&StreamDescriptor]) -> Result<SyncReport> {
        let start = Instant::now();
        let mut report = SyncReport::default();

        // A malformed partition key fails the run before anything is written
        let plan = streams
            .iter()
            .map(|stream| {
                let partitions = stream.partitions.partitions(&self.tap_config);
                partitions.map(|partitions| (*stream, partitions))
            })
            .collect::<Result<Vec<_>>>()?;

        for (stream, partitions) in plan {
            let span = info_span!(parent: &self.span, "stream", stream = %stream.name);
            let stream_report = self.run_stream(stream, partitions).instrument(span).await?;
            report.streams.push(stream_report);
        }

        self.store.flush().await?;
        self.stats.set_duration(start.elapsed().as_millis() as u64);
        report.stats = self.stats.clone();

        info!(
            parent: &self.span,
            streams = self.stats.streams_synced,
            records = self.stats.records_synced,
            pages = self.stats.pages_fetched,
            failed_partitions = self.stats.partitions_failed,
            duration_ms = self.stats.duration_ms,
            "Sync finished"
        );
        Ok(report)
    }

    /// Sync one stream across all its partitions
    pub async fn sync_stream(&mut self, stream: &StreamDescriptor) -> Result<StreamReport> {
        let partitions = stream.partitions.partitions(&self.tap_config)?;
        let span = info_span!(parent: &self.span, "stream", stream = %stream.name);
        self.run_stream(stream, partitions).instrument(span).await
    }

    async fn run_stream(
        &mut self,
        stream: &StreamDescriptor,
        partitions: Vec<Partition>,
    ) -> Result<StreamReport> {
        self.sink
            .write_schema(
                &stream.name,
                &stream.schema,
                &stream.key_properties,
                &stream.bookmark_properties(),
            )
            .await?;

        let policy = stream.pagination.build();
        info!(
            partitions = partitions.len(),
            replication = stream.mode().as_catalog_str(),
            "Syncing stream"
        );

        let mut report = StreamReport {
            stream: stream.name.clone(),
            partitions: Vec::with_capacity(partitions.len()),
        };

        for partition in &partitions {
            let span = info_span!("partition", partition = %partition.id);
            let mut progress = Progress::default();

            let result = match stream.incremental() {
                Some(incremental) => {
                    self.sync_incremental(
                        stream,
                        incremental,
                        partition,
                        policy.as_ref(),
                        &mut progress,
                    )
                    .instrument(span)
                    .await
                }
                None => {
                    self.sync_full(stream, partition, policy.as_ref(), &mut progress)
                        .instrument(span)
                        .await
                }
            };

            self.stats.add_records(progress.records);
            self.stats.add_pages(progress.pages);

            let outcome = match result {
                Ok(bookmark) => {
                    self.stats.add_partition();
                    PartitionOutcome::Completed {
                        records: progress.records,
                        pages: progress.pages,
                        bookmark,
                    }
                }
                Err(e) if e.is_partition_scoped() && !self.config.fail_fast => {
                    error!(
                        stream = %stream.name,
                        partition = %partition.id,
                        records = progress.records,
                        error = %e,
                        "Partition failed, bookmark left unchanged"
                    );
                    self.stats.add_failure();
                    PartitionOutcome::Failed {
                        records: progress.records,
                        error: e.to_string(),
                    }
                }
                Err(e) => return Err(e),
            };

            report.partitions.push(PartitionReport {
                partition: partition.id.clone(),
                outcome,
            });
        }

        self.stats.add_stream();
        info!(records = report.records(), "Stream complete");
        Ok(report)
    }

    async fn sync_full(
        &self,
        stream: &StreamDescriptor,
        partition: &Partition,
        policy: &dyn ContinuationPolicy,
        progress: &mut Progress,
    ) -> Result<Option<Value>> {
        let request = self.base_request(stream, partition)?;
        info!("Extracting full table");
        self.drain(stream, partition, policy, request, None, progress)
            .await?;
        Ok(None)
    }

    async fn sync_incremental(
        &mut self,
        stream: &StreamDescriptor,
        incremental: &IncrementalConfig,
        partition: &Partition,
        policy: &dyn ContinuationPolicy,
        progress: &mut Progress,
    ) -> Result<Option<Value>> {
        let key = incremental.replication_key.as_str();

        let seed = format_iso8601(incremental.seed(self.tap_config.start_date()));
        if self
            .store
            .seed_if_absent(&stream.name, &partition.id, key, Value::String(seed.clone()))
            .await?
        {
            info!(seed = %seed, "No bookmark yet, starting from seed");
        }

        let last = self.bookmark(stream, partition, key)?;
        let range = incremental.range(last, (self.clock)());

        let mut request = self.base_request(stream, partition)?.with_param(
            &incremental.filter_param,
            incremental.filter_value(range.lower, range.upper),
        );
        if let Some((param, value)) = incremental.order() {
            request = request.with_param(param, value);
        }

        info!(
            since = %format_iso8601(range.lower),
            until = %format_iso8601(range.upper),
            "Extracting incrementally"
        );

        let tracker = match &incremental.watermark {
            WatermarkSource::Window => None,
            WatermarkSource::Record { path, refilter, .. } => {
                let tracker = WatermarkTracker::new(&stream.name, path, self.config.order_check)
                    .with_floor(Value::String(format_iso8601(range.lower)));
                Some(if *refilter {
                    tracker.with_refilter(incremental, range.upper)
                } else {
                    tracker
                })
            }
        };

        let latest = self
            .drain(stream, partition, policy, request, tracker, progress)
            .await?;

        let committed = match &incremental.watermark {
            WatermarkSource::Window => Some(Value::String(format_iso8601(range.upper))),
            WatermarkSource::Record { .. } => latest,
        };

        match committed {
            Some(value) => {
                info!(bookmark = %value, "Setting bookmark");
                self.store
                    .update(&stream.name, &partition.id, key, value)
                    .await?;
            }
            None => info!("No records, bookmark unchanged"),
        }

        Ok(self.store.get(&stream.name, &partition.id, key).cloned())
    }

    /// Run the pagination loop to exhaustion, emitting every record
    async fn drain(
        &self,
        stream: &StreamDescriptor,
        partition: &Partition,
        policy: &dyn ContinuationPolicy,
        request: PageRequest,
        mut tracker: Option<WatermarkTracker<'_>>,
        progress: &mut Progress,
    ) -> Result<Option<Value>> {
        let hydrate = stream.partitions.hydrate_field();
        let mut driver = PaginationDriver::new(&self.client, policy, &stream.envelope, request);

        while let Some(page) = driver.next_page().await? {
            progress.pages += 1;
            info!(
                page = page.number,
                records = page.len(),
                reported = ?page.reported_count,
                "Received records"
            );

            let advanced = match tracker.as_mut() {
                Some(tracker) => tracker.observe(&page.records)?,
                None => false,
            };

            let extracted = (self.clock)();
            for mut record in page.records {
                if let Some(field) = hydrate {
                    partition.hydrate(&mut record, field);
                }
                self.sink
                    .write_record(&stream.name, record, extracted)
                    .await?;
                progress.records += 1;
            }

            if advanced {
                let refilter = tracker.as_ref().and_then(WatermarkTracker::refilter);
                if let Some((param, value)) = refilter {
                    debug!(param, value = %value, "Moving filter to watermark");
                    driver.refilter(param, value);
                }
            }
        }

        Ok(tracker.and_then(WatermarkTracker::into_latest))
    }

    fn bookmark(
        &self,
        stream: &StreamDescriptor,
        partition: &Partition,
        key: &str,
    ) -> Result<DateTime<Utc>> {
        let value = self
            .store
            .get(&stream.name, &partition.id, key)
            .ok_or_else(|| Error::state(format!("No bookmark for {}/{partition}", stream.name)))?;
        parse_value(value).map_err(|e| {
            Error::state(format!(
                "Bookmark for {}/{partition} is not a datetime: {e}",
                stream.name
            ))
        })
    }

    fn base_request(
        &self,
        stream: &StreamDescriptor,
        partition: &Partition,
    ) -> Result<PageRequest> {
        let context = self.context.for_partition(&partition.id);
        let url = template::render(&stream.path, &context)?;

        let mut headers = self.headers.clone();
        headers.extend(stream.headers.clone());
        let mut params = self.params.clone();
        params.extend(stream.params.clone());

        let headers = template::render_map(&headers, &context)?;
        let params: StringMap = template::render_map(&params, &context)?
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .collect();

        Ok(PageRequest::new(url).with_headers(headers).with_params(params))
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("client", &self.client)
            .field("store", &self.store)
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
