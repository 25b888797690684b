use super::jobs::{self, JobLoader, RecordSource};
use super::record::{fields, Record};
use crate::error::{InsightsError, InvalidSalaryInput, Result};
use std::path::Path;
use tracing::debug;

/// Anything a caller may pass as the salary being looked up.
///
/// Integers are taken as-is, text is trimmed and parsed as a base-10
/// integer, and `None` is rejected as a missing salary.
pub trait SalaryArg {
    fn to_salary(&self) -> Result<i64, InvalidSalaryInput>;
}

macro_rules! integer_salary_arg {
    ($($ty:ty),*) => {
        $(
            impl SalaryArg for $ty {
                fn to_salary(&self) -> Result<i64, InvalidSalaryInput> {
                    Ok(i64::from(*self))
                }
            }
        )*
    };
}

integer_salary_arg!(i64, i32, u32, i16, u16, i8, u8);

macro_rules! wide_salary_arg {
    ($($ty:ty),*) => {
        $(
            impl SalaryArg for $ty {
                fn to_salary(&self) -> Result<i64, InvalidSalaryInput> {
                    i64::try_from(*self).map_err(|_| InvalidSalaryInput::NotAnInteger {
                        field: "salary",
                        value: self.to_string(),
                    })
                }
            }
        )*
    };
}

wide_salary_arg!(u64, usize, isize, i128, u128);

impl SalaryArg for str {
    fn to_salary(&self) -> Result<i64, InvalidSalaryInput> {
        parse_integer("salary", self)
    }
}

impl SalaryArg for String {
    fn to_salary(&self) -> Result<i64, InvalidSalaryInput> {
        self.as_str().to_salary()
    }
}

impl<T: SalaryArg + ?Sized> SalaryArg for &T {
    fn to_salary(&self) -> Result<i64, InvalidSalaryInput> {
        (**self).to_salary()
    }
}

impl<T: SalaryArg> SalaryArg for Option<T> {
    fn to_salary(&self) -> Result<i64, InvalidSalaryInput> {
        match self {
            Some(value) => value.to_salary(),
            None => Err(InvalidSalaryInput::MissingSalary),
        }
    }
}

fn parse_integer(field: &'static str, raw: &str) -> Result<i64, InvalidSalaryInput> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| InvalidSalaryInput::NotAnInteger {
            field,
            value: raw.to_string(),
        })
}

fn bound<'r>(job: &'r Record, field: &'static str) -> Result<&'r str, InvalidSalaryInput> {
    job.get(field)
        .map(String::as_str)
        .ok_or(InvalidSalaryInput::MissingBound { field })
}

/// Whether `salary` lies in the job's inclusive `[min_salary, max_salary]` range.
///
/// Fails with [`InsightsError::InvalidInput`] when either bound is missing or
/// not an integer, when the salary cannot be read as an integer, or when the
/// record's range is inverted.
pub fn matches_salary_range(job: &Record, salary: impl SalaryArg) -> Result<bool> {
    let raw_min = bound(job, fields::MIN_SALARY)?;
    let raw_max = bound(job, fields::MAX_SALARY)?;

    let max = parse_integer(fields::MAX_SALARY, raw_max)?;
    let min = parse_integer(fields::MIN_SALARY, raw_min)?;
    let salary = salary.to_salary()?;

    if min > max {
        return Err(InvalidSalaryInput::InvertedRange { min, max }.into());
    }

    Ok((min..=max).contains(&salary))
}

/// Jobs whose salary range contains `salary`, in their original order.
///
/// Records that [`matches_salary_range`] rejects as malformed are left out.
pub fn filter_by_salary_range(records: &[Record], salary: impl SalaryArg) -> Vec<Record> {
    records
        .iter()
        .filter(|job| match matches_salary_range(job, &salary) {
            Ok(matches) => matches,
            Err(err) => {
                debug!(error = %err, "excluding job with unusable salary range");
                false
            }
        })
        .cloned()
        .collect()
}

/// Digit-only cells parse as unsigned; anything else is noise for aggregation.
fn plain_digits(field: &'static str, raw: &str) -> Result<Option<u128>> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| InsightsError::SalaryOverflow {
            field,
            value: raw.to_string(),
        })
}

fn numeric_salaries(records: &[Record], field: &'static str) -> Result<Vec<u128>> {
    let mut salaries = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for record in records {
        let raw = record.get(field).ok_or_else(|| InsightsError::MissingField {
            field: field.to_string(),
        })?;
        match plain_digits(field, raw)? {
            Some(value) => salaries.push(value),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(field, skipped, "ignored blank or non-numeric salary values");
    }
    Ok(salaries)
}

pub fn max_salary(records: &[Record]) -> Result<u128> {
    numeric_salaries(records, fields::MAX_SALARY)?
        .into_iter()
        .max()
        .ok_or(InsightsError::EmptyAggregation {
            field: fields::MAX_SALARY,
        })
}

pub fn min_salary(records: &[Record]) -> Result<u128> {
    numeric_salaries(records, fields::MIN_SALARY)?
        .into_iter()
        .min()
        .ok_or(InsightsError::EmptyAggregation {
            field: fields::MIN_SALARY,
        })
}

impl<S: RecordSource> JobLoader<S> {
    pub fn get_max_salary(&self, path: impl AsRef<Path>) -> Result<u128> {
        max_salary(&self.records_or_empty(path.as_ref())?)
    }

    pub fn get_min_salary(&self, path: impl AsRef<Path>) -> Result<u128> {
        min_salary(&self.records_or_empty(path.as_ref())?)
    }
}

pub fn get_max_salary(path: impl AsRef<Path>) -> Result<u128> {
    jobs::default_loader().get_max_salary(path)
}

pub fn get_min_salary(path: impl AsRef<Path>) -> Result<u128> {
    jobs::default_loader().get_min_salary(path)
}
