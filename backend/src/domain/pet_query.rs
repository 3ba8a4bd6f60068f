//! Pure filtering of pet listings.
//!
//! Three predicates are ANDed: a case-insensitive substring search over
//! name, breed and institution name, an age bucket and a vaccine bucket.
//! Input order is preserved and the input slice is never touched.

use std::fmt;
use std::str::FromStr;

use super::{Age, PetRecord};

/// Upper bound (inclusive) of the young bucket.
pub const YOUNG_MAX_YEARS: u32 = 2;
/// Upper bound (inclusive) of the adult bucket.
pub const ADULT_MAX_YEARS: u32 = 7;
/// Vaccine count from which a record counts as complete.
pub const COMPLETE_VACCINE_COUNT: usize = 3;

/// Raised when a bucket name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} bucket '{value}'; expected one of {expected}")]
pub struct UnknownBucket {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Age partition: young `<= 2`, adult `3..=7`, senior `> 7`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AgeBucket {
    #[default]
    All,
    Young,
    Adult,
    Senior,
}

impl AgeBucket {
    /// Bucket an age falls into. Never returns [`AgeBucket::All`].
    pub fn classify(age: Age) -> Self {
        match age.years() {
            years if years <= YOUNG_MAX_YEARS => Self::Young,
            years if years <= ADULT_MAX_YEARS => Self::Adult,
            _ => Self::Senior,
        }
    }

    pub fn matches(self, age: Age) -> bool {
        self == Self::All || self == Self::classify(age)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Young => "young",
            Self::Adult => "adult",
            Self::Senior => "senior",
        }
    }
}

impl FromStr for AgeBucket {
    type Err = UnknownBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "young" => Ok(Self::Young),
            "adult" => Ok(Self::Adult),
            "senior" => Ok(Self::Senior),
            other => Err(UnknownBucket {
                kind: "age",
                value: other.to_owned(),
                expected: "all|young|adult|senior",
            }),
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vaccine partition: complete `>= 3`, partial `1..=2`.
///
/// A record without vaccines belongs to neither named bucket and only
/// matches [`VaccineBucket::All`]. Pending product confirmation, this gap is
/// kept as observed in the listing app rather than folded into `partial`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VaccineBucket {
    #[default]
    All,
    Complete,
    Partial,
}

impl VaccineBucket {
    pub fn matches(self, count: usize) -> bool {
        match self {
            Self::All => true,
            Self::Complete => count >= COMPLETE_VACCINE_COUNT,
            Self::Partial => count > 0 && count < COMPLETE_VACCINE_COUNT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Complete => "complete",
            Self::Partial => "partial",
        }
    }
}

impl FromStr for VaccineBucket {
    type Err = UnknownBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "complete" => Ok(Self::Complete),
            "partial" => Ok(Self::Partial),
            other => Err(UnknownBucket {
                kind: "vaccine",
                value: other.to_owned(),
                expected: "all|complete|partial",
            }),
        }
    }
}

impl fmt::Display for VaccineBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combined filter criteria.
///
/// # Examples
/// ```
/// use adoption_backend::domain::{AgeBucket, PetFilter};
///
/// let filter = PetFilter::new("  LAB ").with_age(AgeBucket::Young);
/// assert_eq!(filter.search(), "lab");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFilter {
    search: String,
    age: AgeBucket,
    vaccines: VaccineBucket,
}

impl PetFilter {
    /// Filter on a search term; surrounding whitespace is ignored.
    pub fn new(search: &str) -> Self {
        Self {
            search: search.trim().to_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_age(mut self, age: AgeBucket) -> Self {
        self.age = age;
        self
    }

    pub fn with_vaccines(mut self, vaccines: VaccineBucket) -> Self {
        self.vaccines = vaccines;
        self
    }

    /// Normalised (lowercased, trimmed) search term.
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn age(&self) -> AgeBucket {
        self.age
    }

    pub fn vaccines(&self) -> VaccineBucket {
        self.vaccines
    }

    fn text_matches(&self, record: &PetRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }
        [record.name(), record.breed(), record.institution().name()]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&self.search))
    }

    /// True when `record` satisfies all three predicates.
    pub fn matches(&self, record: &PetRecord) -> bool {
        self.text_matches(record)
            && self.age.matches(record.age())
            && self.vaccines.matches(record.vaccines().len())
    }
}

/// Records matching `filter`, in input order.
pub fn filter_pets(records: &[PetRecord], filter: &PetFilter) -> Vec<PetRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}
