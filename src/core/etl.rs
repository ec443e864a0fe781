use crate::core::failure::FailureCollector;
use crate::core::{ItemFailure, RunReport, Sink, Source, Transformer};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Sequential fallible pipeline: pull one item, transform it, record the outcome,
/// then write every successful record to the sink in a single call.
pub struct EtlEngine<S, T, K> {
    source: S,
    transformer: T,
    sink: K,
    monitor: SystemMonitor,
    progress: bool,
}

impl<S, T, K> EtlEngine<S, T, K>
where
    S: Source,
    T: Transformer<Input = S::Item>,
    K: Sink,
{
    pub fn new(source: S, transformer: T, sink: K) -> Self {
        Self::new_with_monitoring(source, transformer, sink, false)
    }

    pub fn new_with_monitoring(source: S, transformer: T, sink: K, monitor_enabled: bool) -> Self {
        Self {
            source,
            transformer,
            sink,
            monitor: SystemMonitor::new(monitor_enabled),
            progress: false,
        }
    }

    /// 顯示 indicatif 進度條 (測試中預設關閉)
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    pub async fn run(mut self) -> Result<RunReport> {
        tracing::info!("🚀 Starting ETL run");
        self.monitor.log_phase("Start", 0);

        let progress = self.progress_bar();
        let mut records = Vec::new();
        let mut failures = FailureCollector::new();
        let mut enumerated = 0usize;

        loop {
            let item = match self.source.next_item().await {
                Ok(Some(item)) => item,
                Ok(None) => break,
                Err(e) => {
                    progress.abandon();
                    tracing::error!("❌ Enumeration failed after {} items: {}", enumerated, e);
                    return Err(e);
                }
            };

            match self.transformer.transform(item).await {
                Ok(record) => records.push(record),
                Err(failure) => {
                    match &failure {
                        ItemFailure::MissingField { .. } => {
                            tracing::debug!("Skipping item {}: {}", enumerated, failure)
                        }
                        ItemFailure::ExtractionFailure { .. } => {
                            tracing::warn!("⚠️ Skipping item {}: {}", enumerated, failure)
                        }
                    }
                    failures.record(enumerated);
                }
            }

            enumerated += 1;
            progress.inc(1);
        }

        progress.finish_and_clear();
        debug_assert_eq!(records.len() + failures.len(), enumerated);

        tracing::info!(
            "🔧 Processed {} items: {} extracted, {} skipped",
            enumerated,
            records.len(),
            failures.len()
        );
        self.monitor.log_phase("Transform", enumerated);

        let output_path = self.sink.write(&records).await?;
        tracing::info!("💾 Wrote {} records to {}", records.len(), output_path);
        self.monitor.log_phase("Write", records.len());
        self.monitor.log_final();

        Ok(RunReport {
            output_path,
            records,
            failures: failures.into_indices(),
            enumerated,
        })
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }

        match self.source.size_hint() {
            Some(total) => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("=> "),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner} [{elapsed_precise}] {pos} items ({per_sec})")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb.enable_steady_tick(Duration::from_millis(120));
                pb
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DerivedRecord, ItemResult};
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct VecSource {
        items: VecDeque<String>,
        fail_after: Option<usize>,
        served: usize,
    }

    impl VecSource {
        fn new(items: &[&str]) -> Self {
            Self {
                items: items.iter().map(|s| s.to_string()).collect(),
                fail_after: None,
                served: 0,
            }
        }

        fn failing_after(items: &[&str], n: usize) -> Self {
            Self {
                fail_after: Some(n),
                ..Self::new(items)
            }
        }
    }

    #[async_trait]
    impl Source for VecSource {
        type Item = String;

        async fn next_item(&mut self) -> Result<Option<String>> {
            if self.fail_after == Some(self.served) {
                return Err(EtlError::EnumerationError {
                    message: "connection reset".to_string(),
                });
            }
            self.served += 1;
            Ok(self.items.pop_front())
        }

        fn size_hint(&self) -> Option<usize> {
            Some(self.items.len())
        }
    }

    /// Uppercases items; anything starting with "bad" fails.
    struct UppercaseTransformer;

    #[async_trait]
    impl Transformer for UppercaseTransformer {
        type Input = String;

        async fn transform(&self, item: String) -> ItemResult {
            if item.starts_with("bad") {
                Err(ItemFailure::extraction(format!("cannot handle {}", item)))
            } else if item.is_empty() {
                Err(ItemFailure::missing("value"))
            } else {
                Ok(item.to_uppercase())
            }
        }
    }

    #[derive(Clone, Default)]
    struct MemorySink {
        written: Arc<Mutex<Option<Vec<DerivedRecord>>>>,
    }

    impl MemorySink {
        fn written(&self) -> Option<Vec<DerivedRecord>> {
            self.written.lock().unwrap().clone()
        }
    }

    impl Sink for MemorySink {
        async fn write(&self, records: &[DerivedRecord]) -> Result<String> {
            *self.written.lock().unwrap() = Some(records.to_vec());
            Ok("memory://out.csv".to_string())
        }
    }

    #[tokio::test]
    async fn test_failed_positions_are_skipped_and_recorded() {
        let sink = MemorySink::default();
        let source = VecSource::new(&["a", "bad-1", "c", "bad-3", "e"]);
        let engine = EtlEngine::new(source, UppercaseTransformer, sink.clone());

        let report = engine.run().await.unwrap();

        assert_eq!(report.records, vec!["A", "C", "E"]);
        assert_eq!(report.failures, vec![1, 3]);
        assert_eq!(report.enumerated, 5);
        assert_eq!(report.output_path, "memory://out.csv");
        assert_eq!(sink.written().unwrap(), vec!["A", "C", "E"]);
    }

    #[tokio::test]
    async fn test_every_item_has_exactly_one_outcome() {
        let inputs = ["x", "", "bad", "y", "", "z", "bad-again"];
        let engine = EtlEngine::new(
            VecSource::new(&inputs),
            UppercaseTransformer,
            MemorySink::default(),
        );

        let report = engine.run().await.unwrap();

        assert_eq!(report.succeeded() + report.failed(), inputs.len());
        assert_eq!(report.failures, vec![1, 2, 4, 6]);
    }

    #[tokio::test]
    async fn test_empty_source_still_writes() {
        let sink = MemorySink::default();
        let engine = EtlEngine::new(VecSource::new(&[]), UppercaseTransformer, sink.clone());

        let report = engine.run().await.unwrap();

        assert_eq!(report.enumerated, 0);
        assert!(report.failures.is_empty());
        assert_eq!(sink.written(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_enumeration_failure_aborts_before_write() {
        let sink = MemorySink::default();
        let source = VecSource::failing_after(&["a", "b", "c"], 2);
        let engine = EtlEngine::new(source, UppercaseTransformer, sink.clone());

        let result = engine.run().await;

        assert!(matches!(result, Err(EtlError::EnumerationError { .. })));
        assert!(sink.written().is_none());
    }

    #[tokio::test]
    async fn test_progress_and_monitoring_do_not_change_results() {
        let engine = EtlEngine::new_with_monitoring(
            VecSource::new(&["a", "bad", "b"]),
            UppercaseTransformer,
            MemorySink::default(),
            true,
        )
        .with_progress(true);

        let report = engine.run().await.unwrap();

        assert_eq!(report.records, vec!["A", "B"]);
        assert_eq!(report.failures, vec![1]);
    }
}
