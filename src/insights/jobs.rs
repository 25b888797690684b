use super::record::{fields, Record};
use crate::config::DataConfig;
use crate::error::{InsightsError, Result};
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, info, warn};

/// Provider of parsed job records for a path.
///
/// `Ok(None)` means the path exists but cannot hold records (a directory).
pub trait RecordSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<Option<Vec<Record>>>;
}

/// Reads comma separated files with a header row and `"` quoting.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvFileSource;

impl CsvFileSource {
    pub fn parse<R: Read>(reader: R, path: &Path) -> Result<Vec<Record>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|source| InsightsError::csv(path, source))?
            .clone();

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row.map_err(|source| InsightsError::csv(path, source))?;
            if row.len() != headers.len() {
                debug!(
                    path = %path.display(),
                    line = row.position().map(|position| position.line()),
                    expected = headers.len(),
                    found = row.len(),
                    "ragged row; missing cells read as blank"
                );
            }

            // Cells past the header have no field name and are dropped.
            let record: Record = headers
                .iter()
                .enumerate()
                .map(|(index, field)| {
                    let cell = row.get(index).unwrap_or_default();
                    (field.to_string(), cell.to_string())
                })
                .collect();
            records.push(record);
        }

        Ok(records)
    }
}

impl RecordSource for CsvFileSource {
    fn load(&self, path: &Path) -> Result<Option<Vec<Record>>> {
        let metadata = fs::metadata(path).map_err(|source| InsightsError::io(path, source))?;
        if metadata.is_dir() {
            warn!(path = %path.display(), "wrong path name: expected a file, found a directory");
            return Ok(None);
        }

        let file = File::open(path).map_err(|source| InsightsError::io(path, source))?;
        Self::parse(file, path).map(Some)
    }
}

type Memo = HashMap<PathBuf, Arc<Vec<Record>>>;

/// Memoizing front for a [`RecordSource`], keyed by path.
///
/// Repeated reads of a path return the first parsed sequence until
/// [`JobLoader::invalidate`] or [`JobLoader::clear`] drops it.
pub struct JobLoader<S = CsvFileSource> {
    source: S,
    cache_enabled: bool,
    memo: Mutex<Memo>,
}

impl<S: RecordSource> JobLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache_enabled: true,
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &DataConfig, source: S) -> Self {
        Self {
            cache_enabled: config.cache_enabled,
            ..Self::new(source)
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Result<Option<Arc<Vec<Record>>>> {
        let path = path.as_ref();

        if self.cache_enabled {
            if let Some(records) = self.memo().get(path) {
                debug!(path = %path.display(), "job records served from memo");
                return Ok(Some(Arc::clone(records)));
            }
        }

        // Parse outside the lock; a concurrent reader of the same path may
        // parse too, and whichever result lands first is kept.
        debug!(path = %path.display(), "reading job records");
        let Some(records) = self.source.load(path)? else {
            return Ok(None);
        };
        info!(path = %path.display(), records = records.len(), "parsed job records");

        let records = Arc::new(records);
        if !self.cache_enabled {
            return Ok(Some(records));
        }

        let mut memo = self.memo();
        let stored = memo.entry(path.to_path_buf()).or_insert(records);
        Ok(Some(Arc::clone(stored)))
    }

    /// Like [`JobLoader::read`], with an unreadable directory treated as no records.
    pub(crate) fn records_or_empty(&self, path: &Path) -> Result<Arc<Vec<Record>>> {
        Ok(self.read(path)?.unwrap_or_default())
    }

    pub fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        self.memo().remove(path.as_ref()).is_some()
    }

    pub fn clear(&self) {
        self.memo().clear();
    }

    pub fn cached_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.memo().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn get_unique_values(&self, path: impl AsRef<Path>, field: &str) -> Result<Vec<String>> {
        let records = self.records_or_empty(path.as_ref())?;
        unique_values(&records, field)
    }

    pub fn get_unique_job_types(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        self.get_unique_values(path, fields::JOB_TYPE)
    }

    fn memo(&self) -> MutexGuard<'_, Memo> {
        self.memo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

static DEFAULT_LOADER: OnceLock<JobLoader> = OnceLock::new();

/// Process-wide CSV loader used by the path-based free functions.
pub fn default_loader() -> &'static JobLoader {
    DEFAULT_LOADER.get_or_init(|| JobLoader::new(CsvFileSource))
}

pub fn read(path: impl AsRef<Path>) -> Result<Option<Arc<Vec<Record>>>> {
    default_loader().read(path)
}

fn field_value<'r>(record: &'r Record, field: &str) -> Result<&'r str> {
    record
        .get(field)
        .map(String::as_str)
        .ok_or_else(|| InsightsError::MissingField {
            field: field.to_string(),
        })
}

/// Distinct non-empty values of `field`, sorted.
pub fn unique_values(records: &[Record], field: &str) -> Result<Vec<String>> {
    let mut values = BTreeSet::new();
    for record in records {
        let value = field_value(record, field)?;
        if !value.is_empty() {
            values.insert(value);
        }
    }

    Ok(values.into_iter().map(str::to_string).collect())
}

pub fn get_unique_values(path: impl AsRef<Path>, field: &str) -> Result<Vec<String>> {
    default_loader().get_unique_values(path, field)
}

/// Records whose `field` equals `value` exactly, in their original order.
pub fn filter_by_field(records: &[Record], field: &str, value: &str) -> Result<Vec<Record>> {
    let mut matched = Vec::new();
    for record in records {
        if field_value(record, field)? == value {
            matched.push(record.clone());
        }
    }

    Ok(matched)
}

pub fn get_unique_job_types(path: impl AsRef<Path>) -> Result<Vec<String>> {
    default_loader().get_unique_job_types(path)
}

pub fn filter_by_job_type(records: &[Record], job_type: &str) -> Result<Vec<Record>> {
    filter_by_field(records, fields::JOB_TYPE, job_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::record::record;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const JOBS_CSV: &str = "job_title,industry,job_type,min_salary,max_salary\n\
Analyst,Finance,FULL_TIME,1000,2000\n\
\"Writer, Senior\",Media,PART_TIME,,\n\
Intern,Finance,INTERN,abc,900\n\
Ghost,,,,\n";

    struct CountingSource {
        loads: AtomicUsize,
    }

    impl RecordSource for CountingSource {
        fn load(&self, path: &Path) -> Result<Option<Vec<Record>>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            CsvFileSource::parse(JOBS_CSV.as_bytes(), path).map(Some)
        }
    }

    fn counting_loader() -> JobLoader<CountingSource> {
        JobLoader::new(CountingSource {
            loads: AtomicUsize::new(0),
        })
    }

    #[test]
    fn parse_honours_header_and_quoting() {
        let records = CsvFileSource::parse(JOBS_CSV.as_bytes(), Path::new("inline")).expect("parse");
        assert_eq!(records.len(), 4);
        assert_eq!(records[1]["job_title"], "Writer, Senior");
        assert_eq!(records[1]["min_salary"], "");
        assert_eq!(records[0]["industry"], "Finance");
    }

    #[test]
    fn parse_pads_short_rows_and_drops_extra_cells() {
        let csv = "job_title,industry,job_type,min_salary,max_salary\n\
A,Finance,FULL_TIME,1000,2000\n\
B,Retail\n\
C,Media,INTERN,1,2,surplus\n";
        let records = CsvFileSource::parse(csv.as_bytes(), Path::new("ragged")).expect("parse");

        assert_eq!(records.len(), 3);
        assert_eq!(records[1]["industry"], "Retail");
        assert_eq!(records[1]["max_salary"], "");
        assert_eq!(records[2].len(), 5);
        assert_eq!(
            unique_values(&records, "job_type").expect("job types"),
            vec!["FULL_TIME", "INTERN"]
        );
    }

    #[test]
    fn parse_reports_invalid_utf8_as_csv_error() {
        let error = CsvFileSource::parse(&b"industry\n\xff\n"[..], Path::new("binary"))
            .expect_err("invalid utf-8");
        match error {
            InsightsError::Csv { path, .. } => assert_eq!(path, PathBuf::from("binary")),
            other => panic!("expected csv error, got {other:?}"),
        }
    }

    #[test]
    fn read_memoizes_per_path() {
        let loader = counting_loader();
        let first = loader.read("jobs.csv").expect("read").expect("records");
        let second = loader.read("jobs.csv").expect("read").expect("records");

        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.source().loads.load(Ordering::SeqCst), 1);

        loader.read("other.csv").expect("read");
        assert_eq!(loader.source().loads.load(Ordering::SeqCst), 2);
        assert_eq!(
            loader.cached_paths(),
            vec![PathBuf::from("jobs.csv"), PathBuf::from("other.csv")]
        );
    }

    #[test]
    fn invalidate_forces_a_fresh_read() {
        let loader = counting_loader();
        loader.read("jobs.csv").expect("read");
        assert!(loader.invalidate("jobs.csv"));
        assert!(!loader.invalidate("jobs.csv"));
        loader.read("jobs.csv").expect("read");
        assert_eq!(loader.source().loads.load(Ordering::SeqCst), 2);

        loader.clear();
        assert!(loader.cached_paths().is_empty());
    }

    #[test]
    fn concurrent_reads_share_one_memo_entry() {
        let loader = counting_loader();

        let results: Vec<Arc<Vec<Record>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        loader
                            .read("jobs.csv")
                            .expect("read")
                            .expect("records")
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("reader thread panicked"))
                .collect()
        });

        let stored = loader.read("jobs.csv").expect("read").expect("records");
        assert!(results.iter().all(|records| Arc::ptr_eq(records, &stored)));
        assert_eq!(loader.cached_paths(), vec![PathBuf::from("jobs.csv")]);

        let loads = loader.source().loads.load(Ordering::SeqCst);
        assert!((1..=8).contains(&loads), "unexpected load count {loads}");
    }

    #[test]
    fn disabled_cache_reparses_every_time() {
        let config = DataConfig {
            cache_enabled: false,
            ..DataConfig::default()
        };
        let loader = JobLoader::from_config(
            &config,
            CountingSource {
                loads: AtomicUsize::new(0),
            },
        );
        loader.read("jobs.csv").expect("read");
        loader.read("jobs.csv").expect("read");
        assert_eq!(loader.source().loads.load(Ordering::SeqCst), 2);
        assert!(loader.cached_paths().is_empty());
    }

    #[test]
    fn csv_source_reports_directories_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = JobLoader::new(CsvFileSource);
        assert!(loader.read(dir.path()).expect("directory is not fatal").is_none());
        assert!(loader.cached_paths().is_empty());
        assert!(loader
            .get_unique_job_types(dir.path())
            .expect("empty result")
            .is_empty());
    }

    #[test]
    fn csv_source_propagates_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.csv");
        match read(&missing) {
            Err(InsightsError::Io { path, source }) => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn unique_job_types_from_file_skip_blanks() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(JOBS_CSV.as_bytes()).expect("write csv");

        let job_types = get_unique_job_types(file.path()).expect("job types");
        assert_eq!(job_types, vec!["FULL_TIME", "INTERN", "PART_TIME"]);
    }

    #[test]
    fn unique_values_requires_the_field() {
        let records = vec![record([("industry", "Finance")])];
        match unique_values(&records, "job_type") {
            Err(InsightsError::MissingField { field }) => assert_eq!(field, "job_type"),
            other => panic!("expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn filter_by_job_type_is_exact_and_ordered() {
        let records = vec![
            record([("job_type", "FULL_TIME"), ("id", "1")]),
            record([("job_type", "full_time"), ("id", "2")]),
            record([("job_type", "PART_TIME"), ("id", "3")]),
            record([("job_type", "FULL_TIME"), ("id", "4")]),
        ];

        let filtered = filter_by_job_type(&records, "FULL_TIME").expect("filter");
        let ids: Vec<&str> = filtered.iter().map(|job| job["id"].as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);

        let again = filter_by_job_type(&filtered, "FULL_TIME").expect("filter");
        assert_eq!(again, filtered);
    }
}
