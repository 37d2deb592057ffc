//! Extraction runner: fetch, extract, stamp, collect, report.

use std::pin::pin;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{RunError, UrlError};
use crate::pipeline::progress::ProgressObserver;
use crate::traits::{
    extractor::{ExtractionRequest, Extractor},
    fetcher::PageFetcher,
};
use crate::types::{
    config::{FailurePolicy, RunConfig},
    exec_info::{ExecutionInfo, NodeInfo},
    outcome::{RunReport, UrlOutcome},
    record::Record,
};

/// Process one URL: fetch, extract, stamp the source URL.
pub async fn process_url<F, E>(
    url: &str,
    prompt: &str,
    fetcher: &F,
    extractor: &E,
) -> Result<(Record, ExecutionInfo), UrlError>
where
    F: PageFetcher + ?Sized,
    E: Extractor + ?Sized,
{
    let started = Instant::now();
    let page = fetcher.fetch(url).await?;
    let mut exec_info = ExecutionInfo::new();
    exec_info.push(NodeInfo::new("FetchNode", started.elapsed()));

    let request = ExtractionRequest::new(prompt, page.body, url);
    let output = extractor.extract(&request).await?;
    exec_info.nodes.extend(output.exec_info.nodes);

    let mut record = output.record;
    record.set_source_url(url);

    Ok((record, exec_info))
}

/// Run the extraction over `urls`.
///
/// Records come back in input order. The observer is called once per URL, in
/// input order, after that URL's record is stamped; the first argument runs
/// from 1 to `urls.len()`.
///
/// Under [`FailurePolicy::Abort`] the first failure ends the run and no later
/// URL is fetched (with `concurrency > 1`, requests already in flight are
/// dropped). The failing URL gets no progress notification. Under
/// [`FailurePolicy::Isolate`] the failure is recorded, reported through
/// [`ProgressObserver::on_failure`], counted as processed, and the run
/// continues.
pub async fn run<F, E>(
    urls: &[String],
    fetcher: &F,
    extractor: &E,
    config: &RunConfig,
    mut progress: Option<&mut dyn ProgressObserver>,
) -> Result<RunReport, RunError>
where
    F: PageFetcher + ?Sized,
    E: Extractor + ?Sized,
{
    let total = urls.len();
    let prompt = config.effective_prompt();
    let mut report = RunReport::with_total(total);

    info!(
        total,
        fetcher = fetcher.name(),
        extractor = extractor.name(),
        concurrency = config.concurrency,
        policy = ?config.failure_policy,
        "Extraction run starting"
    );

    let tasks = stream::iter(urls.iter().enumerate())
        .map(|(index, url)| async move {
            let result = process_url(url, prompt, fetcher, extractor).await;
            (index, url, result)
        })
        .buffered(config.concurrency.max(1));
    let mut tasks = pin!(tasks);

    while let Some((index, url, result)) = tasks.next().await {
        match result {
            Ok((record, exec_info)) => {
                info!(
                    url = %url,
                    fields = record.len(),
                    "Execution info:\n{}",
                    exec_info.prettify()
                );
                report.push(UrlOutcome::Extracted {
                    url: url.clone(),
                    record,
                    exec_info,
                });
            }
            Err(error) => match config.failure_policy {
                FailurePolicy::Abort => {
                    warn!(url = %url, index, error = %error, "Aborting run");
                    return Err(RunError::Aborted {
                        url: url.clone(),
                        index,
                        total,
                        source: error,
                    });
                }
                FailurePolicy::Isolate => {
                    warn!(url = %url, index, error = %error, "URL failed, continuing");
                    if let Some(p) = progress.as_deref_mut() {
                        p.on_failure(index, url, &error);
                    }
                    report.push(UrlOutcome::Failed {
                        url: url.clone(),
                        error,
                    });
                }
            },
        }

        let processed = index + 1;
        debug!(processed, total, "Processing {}/{} URLs", processed, total);
        if let Some(p) = progress.as_deref_mut() {
            p.on_progress(processed, total);
        }
    }

    info!(
        total,
        succeeded = report.success_count(),
        failed = report.failure_count(),
        "Extraction run finished"
    );

    Ok(report)
}

/// Run with the HTTP fetcher and the OpenAI extractor.
///
/// `config` replaces the default [`GraphConfig`](crate::GraphConfig) keyed by
/// `api_key`; an empty or missing `custom_prompt` uses the default prompt.
/// Legacy policy: the first failure aborts the run.
#[cfg(feature = "openai")]
pub async fn run_scraper(
    urls: &[String],
    api_key: &str,
    custom_prompt: Option<&str>,
    config: Option<crate::types::config::GraphConfig>,
    progress: Option<&mut dyn ProgressObserver>,
) -> crate::error::Result<Vec<Record>> {
    use crate::ai::OpenAIExtractor;
    use crate::fetchers::HttpFetcher;
    use crate::types::config::GraphConfig;

    let mut run_config = RunConfig::new();
    if let Some(prompt) = custom_prompt {
        run_config = run_config.with_prompt(prompt);
    }

    let graph_config = config.unwrap_or_else(|| GraphConfig::default_for(api_key));
    let extractor = OpenAIExtractor::new(graph_config);
    let fetcher = HttpFetcher::from_config(&run_config)?;

    let report = run(urls, &fetcher, &extractor, &run_config, progress).await?;
    Ok(report.into_records())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::progress::RecordingProgress;
    use crate::testing::{MockExtractor, MockFetcher};
    use crate::types::record::PRODUCT_URL_KEY;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_process_url_stamps_source() {
        let fetcher = MockFetcher::new().with_page("https://a.com/1", "<p>A</p>");
        let extractor = MockExtractor::new().with_record(
            "https://a.com/1",
            [("Name", "A"), (PRODUCT_URL_KEY, "hallucinated")],
        );

        let (record, exec_info) = process_url("https://a.com/1", "prompt", &fetcher, &extractor)
            .await
            .unwrap();
        assert_eq!(record.get(PRODUCT_URL_KEY), Some("https://a.com/1"));
        assert_eq!(extractor.calls()[0].content, "<p>A</p>");

        let nodes: Vec<_> = exec_info.nodes.iter().map(|n| n.node_name.as_str()).collect();
        assert_eq!(nodes, ["FetchNode", "MockNode"]);
    }

    #[tokio::test]
    async fn test_empty_url_list() {
        let fetcher = MockFetcher::new();
        let extractor = MockExtractor::new();
        let mut progress = RecordingProgress::default();

        let report = run(&[], &fetcher, &extractor, &RunConfig::new(), Some(&mut progress))
            .await
            .unwrap();

        assert_eq!(report.total(), 0);
        assert!(progress.updates.is_empty());
    }

    #[tokio::test]
    async fn test_abort_skips_progress_for_failed_url() {
        let fetcher = MockFetcher::new()
            .with_page("https://a.com", "a")
            .with_status("https://b.com", 500);
        let extractor = MockExtractor::new().with_default_record([("Name", "x")]);
        let mut progress = RecordingProgress::default();

        let err = run(
            &urls(&["https://a.com", "https://b.com"]),
            &fetcher,
            &extractor,
            &RunConfig::new(),
            Some(&mut progress),
        )
        .await
        .unwrap_err();

        assert!(err.cause().is_fetch());
        assert_eq!(progress.updates, vec![(1, 2)]);
    }

    #[cfg(feature = "openai")]
    #[tokio::test]
    async fn test_run_scraper_against_mock_server() {
        use wiremock::matchers::{bearer_token, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/product/1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "<html><title>Gauze Pad</title><body><p>Brand: Acme</p></body></html>",
                "text/html",
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "gpt-4-turbo",
                "choices": [{
                    "message": {"role": "assistant", "content": "{\"Brand\": \"Acme\"}"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 50, "completion_tokens": 5, "total_tokens": 55}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/product/1", server.uri());
        let config = crate::types::config::GraphConfig::default_for("sk-test")
            .with_base_url(server.uri());
        let mut progress = RecordingProgress::default();

        let records = run_scraper(
            std::slice::from_ref(&url),
            "sk-test",
            None,
            Some(config),
            Some(&mut progress),
        )
        .await
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Brand"), Some("Acme"));
        assert_eq!(records[0].get(PRODUCT_URL_KEY), Some(url.as_str()));
        assert_eq!(progress.updates, vec![(1, 1)]);
    }
}
