pub mod counter;
pub mod industries;
pub mod jobs;
pub mod record;
pub mod salaries;

pub use counter::count_occurrences;
pub use industries::{filter_by_industry, get_unique_industries};
pub use jobs::{
    filter_by_field, filter_by_job_type, get_unique_job_types, get_unique_values, read,
    unique_values, CsvFileSource, JobLoader, RecordSource,
};
pub use record::{fields, Record};
pub use salaries::{
    filter_by_salary_range, get_max_salary, get_min_salary, matches_salary_range, max_salary,
    min_salary, SalaryArg,
};
