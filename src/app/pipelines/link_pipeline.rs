use crate::adapters::csv_sink::CsvSink;
use crate::adapters::twitter::{MediaLinkExtractor, TimelineSource};
use crate::config::AppConfig;
use crate::core::etl::EtlEngine;
use crate::core::{RunReport, Storage};
use crate::utils::error::Result;

pub type LinkEngine<S> = EtlEngine<TimelineSource, MediaLinkExtractor, CsvSink<S>>;

/// 推文 → 第一個圖片連結 → CSV
pub fn link_engine<S: Storage>(config: &AppConfig, storage: S) -> Result<LinkEngine<S>> {
    config.validate_links_job()?;
    let twitter = config.twitter()?;
    let links = config.links()?;

    tracing::info!(
        "🐦 Link extraction for @{} → {}",
        twitter.screen_name,
        links.output_path
    );

    let source = TimelineSource::new(twitter.clone())?;
    let extractor = MediaLinkExtractor::new(links.media_field());
    let sink = CsvSink::new(storage, links.output_path.clone()).with_header(links.header());

    Ok(
        EtlEngine::new_with_monitoring(source, extractor, sink, config.monitoring_enabled())
            .with_progress(config.progress_enabled()),
    )
}

pub async fn run_link_extraction<S: Storage>(config: &AppConfig, storage: S) -> Result<RunReport> {
    link_engine(config, storage)?.run().await
}
