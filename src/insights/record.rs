use std::collections::BTreeMap;

/// One parsed row of job data: header field name to raw cell text.
///
/// Cells are kept as text on purpose; blank and malformed numeric columns
/// are common in exports and each query decides how to treat them.
pub type Record = BTreeMap<String, String>;

/// Field names consumed by the query helpers.
pub mod fields {
    pub const INDUSTRY: &str = "industry";
    pub const JOB_TYPE: &str = "job_type";
    pub const MIN_SALARY: &str = "min_salary";
    pub const MAX_SALARY: &str = "max_salary";
}

/// Builds a record from `(field, value)` pairs.
pub fn record<K, V, I>(pairs: I) -> Record
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
