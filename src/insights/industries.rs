use super::jobs::{self, JobLoader, RecordSource};
use super::record::{fields, Record};
use crate::error::Result;
use std::path::Path;

impl<S: RecordSource> JobLoader<S> {
    pub fn get_unique_industries(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        self.get_unique_values(path, fields::INDUSTRY)
    }
}

/// Every industry named in the source, without blanks or duplicates.
pub fn get_unique_industries(path: impl AsRef<Path>) -> Result<Vec<String>> {
    jobs::default_loader().get_unique_industries(path)
}

pub fn filter_by_industry(records: &[Record], industry: &str) -> Result<Vec<Record>> {
    jobs::filter_by_field(records, fields::INDUSTRY, industry)
}
