// src/reading/mod.rs
pub mod snapshot;

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::extractors;
use crate::nea::{HttpFetcher, PageFetcher, ReadingConfig};
use crate::region::Region;
use crate::utils::error::{FetchError, ParseError, RefreshError};

pub use snapshot::Snapshot;

/// Values written by the extraction workers. `Invalid` is stored as the
/// 3-hour reading, every other region in `by_region`.
#[derive(Debug, Default)]
struct RegionTable {
    by_region: HashMap<Region, String>,
    three_hour: String,
}

impl RegionTable {
    fn store(&mut self, region: Region, value: String) {
        match region {
            Region::Invalid => self.three_hour = value,
            other => {
                self.by_region.insert(other, value);
            }
        }
    }

    /// Overwrites every region present in `other`.
    fn merge(&mut self, other: RegionTable) {
        self.by_region.extend(other.by_region);
        if !other.three_hour.is_empty() {
            self.three_hour = other.three_hour;
        }
    }

    fn get(&self, region: Region) -> String {
        match region {
            Region::Invalid => self.three_hour.clone(),
            other => self.by_region.get(&other).cloned().unwrap_or_default(),
        }
    }
}

// A worker that panicked never holds the lock while extracting, so the table
// behind a poisoned lock is still consistent.
fn lock_table(table: &Mutex<RegionTable>) -> MutexGuard<'_, RegionTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// PSI readings for every region, loaded from one page fetch.
///
/// Starts empty; `refresh` fetches the page and repopulates every region.
/// After a failed refresh the stored values are a mix of old and new and
/// should not be relied on until the next successful refresh.
pub struct Reading<F = HttpFetcher> {
    config: ReadingConfig,
    fetcher: F,
    page_text: Arc<str>,
    table: Arc<Mutex<RegionTable>>,
    fetched_at: Option<DateTime<Utc>>,
}

impl Reading<HttpFetcher> {
    /// Creates a reading that fetches over HTTP.
    pub fn from_config(config: ReadingConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::new(config, fetcher))
    }
}

impl<F> Reading<F> {
    pub fn new(config: ReadingConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            page_text: Arc::from(""),
            table: Arc::new(Mutex::new(RegionTable::default())),
            fetched_at: None,
        }
    }

    /// Stored value for `region`; `Invalid` gives the 3-hour reading.
    /// Empty if the region was never populated.
    pub fn get(&self, region: Region) -> String {
        lock_table(&self.table).get(region)
    }

    /// Raw text of the last fetched page.
    pub fn page_text(&self) -> &str {
        &self.page_text
    }

    pub fn config(&self) -> &ReadingConfig {
        &self.config
    }

    /// Copy of the current values, or `None` until a refresh has succeeded.
    /// `fetched_at` is the time of the last successful refresh; after a later
    /// failed refresh the values may already include that attempt's matches.
    pub fn snapshot(&self) -> Option<Snapshot> {
        let fetched_at = self.fetched_at?;
        let table = lock_table(&self.table);
        let twenty_four_hour: BTreeMap<Region, String> = table
            .by_region
            .iter()
            .map(|(region, value)| (*region, value.clone()))
            .collect();

        Some(Snapshot {
            source_url: self.config.source_url.clone(),
            fetched_at,
            three_hour: table.three_hour.clone(),
            twenty_four_hour,
        })
    }
}

impl<F: PageFetcher> Reading<F> {
    /// Fetches the page and re-parses every region.
    ///
    /// A fetch failure returns immediately without touching the stored
    /// values. A parse failure reports every region that came back empty;
    /// the regions that did match are still stored.
    pub async fn refresh(&mut self) -> Result<(), RefreshError> {
        let page = self.fetcher.fetch(&self.config.source_url).await?;
        tracing::info!("Fetched PSI page ({} bytes) from {}", page.len(), self.config.source_url);

        self.page_text = Arc::from(page);
        let parsed = parse_regions(Arc::clone(&self.page_text)).await;

        lock_table(&self.table).merge(parsed.table);
        if !parsed.failed.is_empty() {
            return Err(ParseError { regions: parsed.failed }.into());
        }

        self.fetched_at = Some(Utc::now());
        Ok(())
    }
}

/// Outcome of one parse pass.
#[derive(Debug, Default)]
struct ParsedPage {
    table: RegionTable,
    failed: Vec<Region>,
}

/// Runs one extraction worker per region over `page_text` and waits for all
/// of them. Workers only write into a table local to this call, so a worker
/// left running by a dropped future never reaches the caller's reading.
async fn parse_regions(page_text: Arc<str>) -> ParsedPage {
    let table = Arc::new(Mutex::new(RegionTable::default()));

    let handles: Vec<_> = Region::ALL
        .into_iter()
        .map(|region| {
            let page_text = Arc::clone(&page_text);
            let table = Arc::clone(&table);
            tokio::task::spawn_blocking(move || {
                let value = extractors::extractor_for(region)(&page_text);
                if value.is_empty() {
                    tracing::warn!("No PSI value found for {}", region);
                    return false;
                }
                tracing::debug!("Extracted PSI for {}: {}", region, value);
                lock_table(&table).store(region, value);
                true
            })
        })
        .collect();

    let mut failed = Vec::new();
    for (region, handle) in Region::ALL.into_iter().zip(handles) {
        match handle.await {
            Ok(true) => {}
            Ok(false) => failed.push(region),
            Err(e) => {
                tracing::warn!("Extraction worker for {} failed: {}", region, e);
                failed.push(region);
            }
        }
    }

    let table = std::mem::take(&mut *lock_table(&table));
    ParsedPage { table, failed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::Poll;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    const FULL_PAGE: &str = r#"
        <h2>PSI Readings</h2>
        <p>3-hr PSI: 42</p>
        <p>24-hr PSI: 35 - 58</p>
        <ul>
          <li><span class="value">67</span><span class="direction">North</span></li>
          <li><span class="value">55</span> <span class="direction">South</span></li>
          <li><span class="value">49</span><span class="direction">East</span></li>
          <li><span class="value">61</span><span class="direction">West</span></li>
          <li><span class="value">58</span><span class="direction">Central</span></li>
        </ul>
    "#;

    /// Hands out queued responses in order, then fails.
    struct ScriptedFetcher {
        responses: Mutex<Vec<Result<String, FetchError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(mut responses: Vec<Result<String, FetchError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(FetchError::Http(reqwest::StatusCode::SERVICE_UNAVAILABLE)))
        }
    }

    fn reading_with(responses: Vec<Result<String, FetchError>>) -> Reading<ScriptedFetcher> {
        Reading::new(ReadingConfig::default(), ScriptedFetcher::new(responses))
    }

    fn sequential_table(page_text: &str) -> BTreeMap<Region, String> {
        Region::ALL
            .into_iter()
            .map(|region| (region, extractors::extractor_for(region)(page_text)))
            .collect()
    }

    #[test]
    fn test_empty_reading_returns_empty_values() {
        let reading = reading_with(vec![]);
        for region in Region::ALL {
            assert_eq!(reading.get(region), "");
        }
        assert_eq!(reading.page_text(), "");
        assert!(reading.snapshot().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_refresh_populates_every_region() {
        let mut reading = reading_with(vec![Ok(FULL_PAGE.to_string())]);
        assert_ok!(reading.refresh().await);

        assert_eq!(reading.get(Region::Invalid), "42");
        assert_eq!(reading.get(Region::Overall), "35 - 58");
        assert_eq!(reading.get(Region::North), "67");
        assert_eq!(reading.get(Region::South), "55");
        assert_eq!(reading.get(Region::East), "49");
        assert_eq!(reading.get(Region::West), "61");
        assert_eq!(reading.get(Region::Central), "58");
        assert_eq!(reading.page_text(), FULL_PAGE);

        let snapshot = reading.snapshot().expect("snapshot after refresh");
        assert_eq!(snapshot.three_hour, "42");
        assert_eq!(snapshot.twenty_four_hour.len(), 6);
        assert!(!snapshot.twenty_four_hour.contains_key(&Region::Invalid));
        assert_eq!(snapshot.source_url, reading.config().source_url);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_missing_region_is_parse_error() {
        let page = FULL_PAGE.replace(r#"<span class="direction">South"#, r#"<span class="direction">Sth"#);
        let mut reading = reading_with(vec![Ok(page)]);

        let err = assert_err!(reading.refresh().await);
        match err {
            RefreshError::Parse(parse) => assert_eq!(parse.regions, vec![Region::South]),
            other => panic!("expected parse error, got {:?}", other),
        }
        // No rollback: regions that did match are still stored.
        assert_eq!(reading.get(Region::North), "67");
        assert_eq!(reading.get(Region::South), "");
        assert!(reading.snapshot().is_none(), "no successful refresh yet");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_snapshot_keeps_last_successful_fetch_time() {
        let page = FULL_PAGE.replace("3-hr PSI", "3-hour PSI");
        let mut reading = reading_with(vec![Ok(FULL_PAGE.to_string()), Ok(page)]);

        assert_ok!(reading.refresh().await);
        let first = reading.snapshot().expect("snapshot after refresh").fetched_at;

        assert_err!(reading.refresh().await);
        let after_failure = reading.snapshot().expect("earlier refresh still recorded").fetched_at;
        assert_eq!(after_failure, first);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_dropped_refresh_leaves_reading_untouched() {
        let mut reading = reading_with(vec![Ok(FULL_PAGE.to_string())]);

        let completed = {
            let mut refresh = tokio_test::task::spawn(reading.refresh());
            match refresh.poll() {
                Poll::Ready(result) => {
                    assert_ok!(result);
                    true
                }
                Poll::Pending => false,
            }
        };

        // Give any workers still running time to finish.
        tokio::time::sleep(Duration::from_millis(50)).await;

        if completed {
            assert_eq!(reading.get(Region::North), "67");
        } else {
            for region in Region::ALL {
                assert_eq!(reading.get(region), "", "region {}", region);
            }
            assert!(reading.snapshot().is_none());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_unrecognised_page_lists_all_regions() {
        let mut reading = reading_with(vec![Ok("<html>Under maintenance</html>".to_string())]);

        match reading.refresh().await {
            Err(RefreshError::Parse(parse)) => assert_eq!(parse.regions, Region::ALL.to_vec()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fetch_failure_skips_parsing() {
        let mut reading = reading_with(vec![
            Ok(FULL_PAGE.to_string()),
            Err(FetchError::Http(reqwest::StatusCode::BAD_GATEWAY)),
        ]);
        assert_ok!(reading.refresh().await);

        let err = assert_err!(reading.refresh().await);
        assert!(matches!(err, RefreshError::Fetch(FetchError::Http(_))), "got {:?}", err);
        assert_eq!(reading.fetcher.calls.load(Ordering::SeqCst), 2);

        // The page and values from the earlier refresh were not touched.
        assert_eq!(reading.page_text(), FULL_PAGE);
        assert_eq!(reading.get(Region::North), "67");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_refresh_again_after_failure() {
        let mut reading = reading_with(vec![
            Err(FetchError::Client("offline".to_string())),
            Ok(FULL_PAGE.to_string()),
        ]);
        assert_err!(reading.refresh().await);
        assert_eq!(reading.get(Region::Invalid), "");

        assert_ok!(reading.refresh().await);
        assert_eq!(reading.get(Region::Invalid), "42");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_parse_matches_sequential() {
        let expected = sequential_table(FULL_PAGE);
        let page_text: Arc<str> = Arc::from(FULL_PAGE);

        for _ in 0..100 {
            let parsed = parse_regions(Arc::clone(&page_text)).await;
            assert!(parsed.failed.is_empty(), "failed: {:?}", parsed.failed);

            let actual: BTreeMap<Region, String> = Region::ALL
                .into_iter()
                .map(|region| (region, parsed.table.get(region)))
                .collect();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_region_table_routes_invalid_to_three_hour() {
        let mut table = RegionTable::default();
        table.store(Region::Invalid, "42".to_string());
        table.store(Region::Overall, "35-58".to_string());

        assert_eq!(table.three_hour, "42");
        assert_eq!(table.get(Region::Invalid), "42");
        assert_eq!(table.get(Region::Overall), "35-58");
        assert!(!table.by_region.contains_key(&Region::Invalid));
        assert_eq!(table.get(Region::West), "");
    }

    #[test]
    fn test_region_table_merge_keeps_unmatched_values() {
        let mut stored = RegionTable::default();
        stored.store(Region::Invalid, "40".to_string());
        stored.store(Region::West, "50".to_string());

        let mut fresh = RegionTable::default();
        fresh.store(Region::West, "61".to_string());
        stored.merge(fresh);

        assert_eq!(stored.get(Region::West), "61");
        assert_eq!(stored.get(Region::Invalid), "40");
    }
}
