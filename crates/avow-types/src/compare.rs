//! Comparison strategies.
//!
//! Value assertions compare through a [`ComparisonStrategy`] instead of
//! calling `==` directly, so a test can swap in a custom policy (a named
//! comparator, or date truncation) without changing the assertion itself.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone};

/// An equality and ordering policy for values of type `T`.
pub trait ComparisonStrategy<T> {
    /// Order two values, or `None` if they are not comparable.
    fn compare(&self, actual: &T, other: &T) -> Option<Ordering>;

    /// Whether the two values are equal under this strategy.
    fn are_equal(&self, actual: &T, other: &T) -> bool {
        self.compare(actual, other) == Some(Ordering::Equal)
    }

    fn is_less_than(&self, actual: &T, other: &T) -> bool {
        self.compare(actual, other) == Some(Ordering::Less)
    }

    fn is_greater_than(&self, actual: &T, other: &T) -> bool {
        self.compare(actual, other) == Some(Ordering::Greater)
    }

    fn is_less_than_or_equal_to(&self, actual: &T, other: &T) -> bool {
        matches!(
            self.compare(actual, other),
            Some(Ordering::Less | Ordering::Equal)
        )
    }

    /// Whether `values` holds an element equal to `value`.
    fn contains(&self, values: &[T], value: &T) -> bool {
        values.iter().any(|v| self.are_equal(v, value))
    }

    /// Name of a custom strategy, shown in failure messages.
    ///
    /// `None` means natural comparison, which needs no mention.
    fn description(&self) -> Option<String> {
        None
    }
}

/// Natural comparison through `PartialEq` and `PartialOrd`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StandardComparisonStrategy;

impl<T: PartialEq + PartialOrd> ComparisonStrategy<T> for StandardComparisonStrategy {
    fn compare(&self, actual: &T, other: &T) -> Option<Ordering> {
        actual.partial_cmp(other)
    }

    fn are_equal(&self, actual: &T, other: &T) -> bool {
        actual == other
    }
}

/// A named comparator function.
pub struct ComparatorStrategy<T, F> {
    name: String,
    comparator: F,
    _marker: PhantomData<fn(&T, &T)>,
}

impl<T, F> ComparatorStrategy<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    pub fn new(name: impl Into<String>, comparator: F) -> Self {
        Self {
            name: name.into(),
            comparator,
            _marker: PhantomData,
        }
    }
}

impl<T, F> ComparisonStrategy<T> for ComparatorStrategy<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, actual: &T, other: &T) -> Option<Ordering> {
        Some((self.comparator)(actual, other))
    }

    fn description(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

impl<T, F> fmt::Debug for ComparatorStrategy<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparatorStrategy")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Compare dates only down to the given precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateTruncation {
    /// Only the year counts.
    Year,
    /// Year and month count; the day is ignored.
    YearMonth,
    /// The calendar day counts; any time of day is ignored.
    Day,
}

/// A value with calendar fields that [`DateTruncation`] can compare.
pub trait Truncatable {
    /// The calendar date the value falls on.
    fn calendar_date(&self) -> NaiveDate;
}

impl Truncatable for NaiveDate {
    fn calendar_date(&self) -> NaiveDate {
        *self
    }
}

impl Truncatable for NaiveDateTime {
    fn calendar_date(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> Truncatable for DateTime<Tz> {
    fn calendar_date(&self) -> NaiveDate {
        self.date_naive()
    }
}

impl DateTruncation {
    fn key(&self, date: NaiveDate) -> (i32, u32, u32) {
        match self {
            Self::Year => (date.year(), 0, 0),
            Self::YearMonth => (date.year(), date.month(), 0),
            Self::Day => (date.year(), date.month(), date.day()),
        }
    }
}

impl<T: Truncatable> ComparisonStrategy<T> for DateTruncation {
    fn compare(&self, actual: &T, other: &T) -> Option<Ordering> {
        let actual = self.key(actual.calendar_date());
        let other = self.key(other.calendar_date());
        Some(actual.cmp(&other))
    }

    fn description(&self) -> Option<String> {
        let precision = match self {
            Self::Year => "year",
            Self::YearMonth => "year and month",
            Self::Day => "day",
        };
        Some(format!("{precision} precision"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn standard_strategy_uses_natural_order() {
        let s = StandardComparisonStrategy;
        assert!(s.are_equal(&3, &3));
        assert!(s.is_less_than(&2, &3));
        assert!(s.is_greater_than(&4, &3));
        assert!(s.is_less_than_or_equal_to(&3, &3));
        assert!(ComparisonStrategy::<i32>::description(&s).is_none());
    }

    #[test]
    fn standard_strategy_with_incomparable_floats() {
        let s = StandardComparisonStrategy;
        assert!(!s.are_equal(&f64::NAN, &f64::NAN));
        assert_eq!(s.compare(&f64::NAN, &1.0), None);
        assert!(!s.is_less_than(&f64::NAN, &1.0));
    }

    #[test]
    fn comparator_strategy_ignores_case() {
        let s = ComparatorStrategy::new("CaseInsensitive", |a: &String, b: &String| {
            a.to_lowercase().cmp(&b.to_lowercase())
        });
        assert!(s.are_equal(&"Yoda".to_string(), &"YODA".to_string()));
        assert!(s.contains(
            &["Luke".to_string(), "Yoda".to_string()],
            &"yoda".to_string()
        ));
        assert_eq!(s.description().as_deref(), Some("CaseInsensitive"));
    }

    #[test]
    fn year_month_truncation_ignores_day() {
        let s = DateTruncation::YearMonth;
        assert!(s.are_equal(&date(2011, 1, 1), &date(2011, 1, 31)));
        assert!(s.is_less_than(&date(2011, 1, 31), &date(2011, 2, 1)));
        assert!(!s.are_equal(&date(2011, 1, 1), &date(2012, 1, 1)));
    }

    #[test]
    fn year_truncation_ignores_month() {
        let s = DateTruncation::Year;
        assert!(s.are_equal(&date(2000, 1, 1), &date(2000, 12, 31)));
        assert!(s.is_greater_than(&date(2001, 1, 1), &date(2000, 12, 31)));
    }

    #[test]
    fn day_truncation_ignores_time() {
        let s = DateTruncation::Day;
        let morning = date(2020, 5, 4).and_hms_opt(8, 0, 0).unwrap();
        let evening = date(2020, 5, 4).and_hms_opt(22, 30, 0).unwrap();
        assert!(s.are_equal(&morning, &evening));
        assert!(!StandardComparisonStrategy.are_equal(&morning, &evening));
    }

    #[test]
    fn truncation_works_on_zoned_datetimes() {
        let a = Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2022, 3, 28, 12, 0, 0).unwrap();
        assert!(DateTruncation::YearMonth.are_equal(&a, &b));
        assert_eq!(
            ComparisonStrategy::<DateTime<Utc>>::description(&DateTruncation::YearMonth).as_deref(),
            Some("year and month precision")
        );
    }
}
