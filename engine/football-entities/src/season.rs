//! Season value type and season ranges

use crate::error::{MapperError, ValidationError};
use crate::mapper::{DictMapped, FieldSpec, FieldValues, Values, INTEGER_ALTERNATIVES};
use chrono::Datelike;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Earliest season start year accepted
pub const MINIMUM_VALID_YEAR: i32 = 2_000;

const ENDASH: char = '\u{2013}';

/// Current calendar year (UTC)
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Separator used when rendering a season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashStyle {
    #[default]
    Dash,
    Endash,
}

/// A one-year competitive period spanning two consecutive calendar years
///
/// Equality, ordering and hashing only look at `from_year`; the surrogate id
/// assigned by storage never participates.
#[derive(Debug, Clone, Copy)]
pub struct Season {
    id: Option<i64>,
    from_year: i32,
    to_year: i32,
}

impl Season {
    /// Create a season from an explicit year pair
    pub fn new(from_year: i32, to_year: i32) -> Result<Self, ValidationError> {
        if from_year < MINIMUM_VALID_YEAR {
            return Err(ValidationError::SeasonTooEarly { from_year, minimum: MINIMUM_VALID_YEAR });
        }
        if Some(to_year) != from_year.checked_add(1) {
            return Err(ValidationError::SeasonYearsNotConsecutive { from_year, to_year });
        }
        Ok(Self { id: None, from_year, to_year })
    }

    /// Create the season starting in `from_year`
    pub fn starting(from_year: i32) -> Result<Self, ValidationError> {
        Self::new(from_year, from_year.saturating_add(1))
    }

    /// The season starting in the current calendar year
    pub fn current() -> Self {
        let from_year = current_year().max(MINIMUM_VALID_YEAR);
        Self { id: None, from_year, to_year: from_year + 1 }
    }

    /// Same season carrying a storage identifier
    pub fn with_id(self, id: i64) -> Self {
        Self { id: Some(id), ..self }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn from_year(&self) -> i32 {
        self.from_year
    }

    pub fn to_year(&self) -> i32 {
        self.to_year
    }

    /// Render with the requested separator
    pub fn to_string_with(&self, dash: DashStyle) -> String {
        match dash {
            DashStyle::Dash => format!("{}-{}", self.from_year, self.to_year),
            DashStyle::Endash => format!("{}{}{}", self.from_year, ENDASH, self.to_year),
        }
    }

    /// Season `years` after this one (negative steps go back)
    pub fn increment(&self, years: i32) -> Result<Self, ValidationError> {
        Self::starting(self.from_year.saturating_add(years))
    }

    pub fn next(&self) -> Result<Self, ValidationError> {
        self.increment(1)
    }

    pub fn previous(&self) -> Result<Self, ValidationError> {
        self.increment(-1)
    }
}

impl Default for Season {
    fn default() -> Self {
        Self::current()
    }
}

impl PartialEq for Season {
    fn eq(&self, other: &Self) -> bool {
        self.from_year == other.from_year
    }
}

impl Eq for Season {}

impl PartialOrd for Season {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Season {
    fn cmp(&self, other: &Self) -> Ordering {
        self.from_year.cmp(&other.from_year)
    }
}

impl Hash for Season {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from_year.hash(state);
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from_year, self.to_year)
    }
}

impl FromStr for Season {
    type Err = ValidationError;

    /// Parse `"YYYY-YYYY"`, `"YYYY–YYYY"` or a bare `"YYYY"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidSeasonString { input: s.to_string() };

        let years = s
            .trim()
            .split(['-', ENDASH])
            .map(|year| year.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        match years.as_slice() {
            [from_year] => Self::starting(*from_year),
            [from_year, to_year] => Self::new(*from_year, *to_year),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<i32> for Season {
    type Error = ValidationError;

    fn try_from(from_year: i32) -> Result<Self, Self::Error> {
        Self::starting(from_year)
    }
}

impl TryFrom<&str> for Season {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl DictMapped for Season {
    const TYPE_NAME: &'static str = "Season";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::scalar("id"),
        FieldSpec::union("from_year", INTEGER_ALTERNATIVES),
        FieldSpec::union("to_year", INTEGER_ALTERNATIVES),
    ];

    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError> {
        let year = |value: i64, field: &'static str| {
            i32::try_from(value).map_err(|e| MapperError::Coercion {
                type_name: Self::TYPE_NAME,
                field,
                message: e.to_string(),
            })
        };

        let from_year = match fields.union::<i64>("from_year")? {
            Some(value) => year(value, "from_year")?,
            None => current_year(),
        };
        let season = match fields.union::<i64>("to_year")? {
            Some(value) => Self::new(from_year, year(value, "to_year")?)?,
            None => Self::starting(from_year)?,
        };

        Ok(match fields.scalar::<i64>("id")? {
            Some(id) => season.with_id(id),
            None => season,
        })
    }

    fn to_dict(&self) -> Values {
        let mut values = Values::new();
        values.insert("id".into(), self.id.into());
        values.insert("from_year".into(), self.from_year.into());
        values.insert("to_year".into(), self.to_year.into());
        values
    }
}

/// Which endpoints a [`season_range`] includes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inclusive {
    Left,
    Right,
    #[default]
    Both,
    Neither,
}

impl Inclusive {
    fn includes_start(self) -> bool {
        matches!(self, Inclusive::Both | Inclusive::Left)
    }

    fn includes_end(self) -> bool {
        matches!(self, Inclusive::Both | Inclusive::Right)
    }
}

impl FromStr for Inclusive {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Inclusive::Left),
            "right" => Ok(Inclusive::Right),
            "both" => Ok(Inclusive::Both),
            "neither" => Ok(Inclusive::Neither),
            _ => Err(ValidationError::InvalidInclusive { value: s.to_string() }),
        }
    }
}

/// Lazy, finite, forward-only sequence of seasons
///
/// Calling [`season_range`] again, or cloning before iterating, walks the
/// same seasons a second time.
#[derive(Debug, Clone)]
pub struct SeasonRange {
    next_year: i32,
    last_year: i32,
}

impl Iterator for SeasonRange {
    type Item = Season;

    fn next(&mut self) -> Option<Season> {
        if self.next_year > self.last_year {
            return None;
        }
        let from_year = self.next_year;
        self.next_year += 1;
        Some(Season { id: None, from_year, to_year: from_year + 1 })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.last_year - self.next_year + 1).unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SeasonRange {}

impl std::iter::FusedIterator for SeasonRange {}

/// Seasons from `start` to `end`, endpoints included per `inclusive`
pub fn season_range(
    start: Season,
    end: Season,
    inclusive: Inclusive,
) -> Result<SeasonRange, ValidationError> {
    if start > end {
        return Err(ValidationError::SeasonRangeReversed {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let next_year =
        if inclusive.includes_start() { start.from_year } else { start.from_year + 1 };
    let last_year = if inclusive.includes_end() { end.from_year } else { end.from_year - 1 };

    Ok(SeasonRange { next_year, last_year })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{from_dict, to_dict};
    use serde_json::json;

    fn season(from_year: i32) -> Season {
        Season::starting(from_year).unwrap()
    }

    fn years(range: SeasonRange) -> Vec<String> {
        range.map(|season| season.to_string()).collect()
    }

    #[test]
    fn test_valid_pairs() {
        for from_year in [2000, 2010, 2022, 2099] {
            let season = Season::new(from_year, from_year + 1).unwrap();
            assert_eq!(season.from_year(), from_year);
            assert_eq!(season.to_year(), from_year + 1);
        }
    }

    #[test]
    fn test_invalid_pairs() {
        assert_eq!(
            Season::new(1999, 2000),
            Err(ValidationError::SeasonTooEarly { from_year: 1999, minimum: 2000 })
        );
        assert_eq!(
            Season::new(2020, 2022),
            Err(ValidationError::SeasonYearsNotConsecutive { from_year: 2020, to_year: 2022 })
        );
        assert!(Season::new(2020, 2020).is_err());
        assert!(Season::new(2021, 2020).is_err());
    }

    #[test]
    fn test_from_string_dash_and_endash() {
        let dash: Season = "2022-2023".parse().unwrap();
        let endash: Season = "2022\u{2013}2023".parse().unwrap();
        assert_eq!(dash, endash);
        assert_eq!(dash, Season::new(2022, 2023).unwrap());
        assert_eq!("2022".parse::<Season>().unwrap(), season(2022));
    }

    #[test]
    fn test_from_string_invalid() {
        assert!("2022-2024".parse::<Season>().is_err());
        assert!("twenty-two".parse::<Season>().is_err());
        assert!("2020-2021-2022".parse::<Season>().is_err());
        assert!("".parse::<Season>().is_err());
    }

    #[test]
    fn test_rendering() {
        let season = season(2021);
        assert_eq!(season.to_string(), "2021-2022");
        assert_eq!(season.to_string_with(DashStyle::Dash), "2021-2022");
        assert_eq!(season.to_string_with(DashStyle::Endash), "2021\u{2013}2022");
    }

    #[test]
    fn test_stepping() {
        let season = season(2021);
        assert_eq!(season.next().unwrap(), self::season(2022));
        assert_eq!(season.previous().unwrap(), self::season(2020));
        assert_eq!(season.increment(3).unwrap(), self::season(2024));
        assert!(self::season(2000).previous().is_err());
    }

    #[test]
    fn test_ordering_ignores_id() {
        assert!(season(2020) < season(2021));
        assert_eq!(season(2020).with_id(4), season(2020));
    }

    #[test]
    fn test_current_season() {
        let current = Season::default();
        assert_eq!(current.from_year(), current_year());
        assert_eq!(current.to_year(), current_year() + 1);
    }

    #[test]
    fn test_range_inclusive_both() {
        let range = season_range(season(2020), season(2022), Inclusive::Both).unwrap();
        assert_eq!(years(range), vec!["2020-2021", "2021-2022", "2022-2023"]);
    }

    #[test]
    fn test_range_inclusive_variants() {
        let range = |inclusive| season_range(season(2020), season(2022), inclusive).unwrap();
        assert_eq!(years(range(Inclusive::Neither)), vec!["2021-2022"]);
        assert_eq!(years(range(Inclusive::Left)), vec!["2020-2021", "2021-2022"]);
        assert_eq!(years(range(Inclusive::Right)), vec!["2021-2022", "2022-2023"]);
    }

    #[test]
    fn test_range_single_season() {
        assert_eq!(season_range(season(2020), season(2020), Inclusive::Both).unwrap().len(), 1);
        assert_eq!(season_range(season(2020), season(2020), Inclusive::Neither).unwrap().len(), 0);
        assert_eq!(season_range(season(2020), season(2021), Inclusive::Neither).unwrap().len(), 0);
    }

    #[test]
    fn test_range_reversed_fails() {
        assert!(season_range(season(2022), season(2020), Inclusive::Both).is_err());
    }

    #[test]
    fn test_range_is_restartable() {
        let first = season_range(season(2018), season(2020), Inclusive::Both).unwrap();
        let again = season_range(season(2018), season(2020), Inclusive::Both).unwrap();
        let copy = first.clone();
        assert_eq!(years(first), years(again));
        assert_eq!(copy.len(), 3);
    }

    #[test]
    fn test_inclusive_from_str() {
        assert_eq!("neither".parse::<Inclusive>().unwrap(), Inclusive::Neither);
        assert!("all".parse::<Inclusive>().is_err());
    }

    #[test]
    fn test_dict_round_trip() {
        let original = Season::new(2019, 2020).unwrap().with_id(12);
        let rebuilt: Season = from_dict(&to_dict(&original)).unwrap();
        assert_eq!(rebuilt, original);
        assert_eq!(rebuilt.id(), Some(12));
        assert_eq!(rebuilt.to_year(), 2020);
    }

    #[test]
    fn test_from_dict_coerces_strings_and_defaults_to_year() {
        let values = json!({"from_year": "2015"});
        let season: Season = from_dict(values.as_object().unwrap()).unwrap();
        assert_eq!(season.to_string(), "2015-2016");

        let values = json!({"from_year": 2015, "to_year": 2017});
        let error = from_dict::<Season>(values.as_object().unwrap()).unwrap_err();
        assert!(matches!(error, MapperError::Validation(ValidationError::SeasonYearsNotConsecutive { .. })));
    }
}
