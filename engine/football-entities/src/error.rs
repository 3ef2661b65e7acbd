//! Error types for football entities and the dict mapper

use thiserror::Error;

/// An entity invariant was violated during construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Season from_year must be at least {minimum}, got {from_year}")]
    SeasonTooEarly { from_year: i32, minimum: i32 },

    #[error("Season to_year must be exactly 1 year greater than from_year, got {from_year}-{to_year}")]
    SeasonYearsNotConsecutive { from_year: i32, to_year: i32 },

    #[error("Invalid season string: '{input}'")]
    InvalidSeasonString { input: String },

    #[error("Start season {start} cannot be after end season {end}")]
    SeasonRangeReversed { start: String, end: String },

    #[error("Invalid inclusive option '{value}', expected one of: left, right, both, neither")]
    InvalidInclusive { value: String },

    #[error("Competition {name}: country must be absent for national team competitions")]
    CountryOnNationalCompetition { name: String },

    #[error("Competition {name}: national team competitions must be international")]
    NationalCompetitionNotInternational { name: String },

    #[error("Competition {name}: tier must be absent for friendly competitions")]
    TierOnFriendlyCompetition { name: String },

    #[error("Competition {name}: tier must be a positive integer, got {tier}")]
    NonPositiveTier { name: String, tier: i64 },

    #[error("Team {name}: year_founded {year_founded} is after the current year {current_year}")]
    FoundedInFuture { name: String, year_founded: i32, current_year: i32 },
}

/// A string did not match any member of a closed enumeration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {enum_name}")]
pub struct LookupError {
    pub enum_name: &'static str,
    pub value: String,
}

/// Errors raised while converting between dicts, entities and records
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapperError {
    #[error("{type_name} object has no dict mapper. All foreign key targets must implement DictMapped")]
    MissingMapper { type_name: &'static str },

    #[error("{type_name}: required field '{field}' missing from input")]
    MissingField { type_name: &'static str, field: &'static str },

    #[error("{type_name}: field '{field}' is not declared")]
    UndeclaredField { type_name: &'static str, field: String },

    #[error("{type_name}: field '{field}' is declared as {declared} but read as {requested}")]
    KindMismatch {
        type_name: &'static str,
        field: &'static str,
        declared: &'static str,
        requested: &'static str,
    },

    #[error("{type_name}: field '{field}' is declared for {declared} but read as {requested}")]
    TargetMismatch {
        type_name: &'static str,
        field: &'static str,
        declared: &'static str,
        requested: &'static str,
    },

    #[error("{type_name}: field '{field}' cannot be coerced: {message}")]
    Coercion { type_name: &'static str, field: &'static str, message: String },

    #[error("{type_name}: no alternative of union field '{field}' accepts the value {value}")]
    NoUnionMatch { type_name: &'static str, field: &'static str, value: String },

    #[error("{type_name}: relation '{field}' declares no local columns")]
    RelationWithoutColumns { type_name: &'static str, field: &'static str },

    #[error("{type_name}: relation '{field}' must be a mapping or an id, got {value}")]
    InvalidRelation { type_name: &'static str, field: &'static str, value: String },

    #[error("{type_name}: field '{field}': {source}")]
    Lookup {
        type_name: &'static str,
        field: &'static str,
        #[source]
        source: LookupError,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}
