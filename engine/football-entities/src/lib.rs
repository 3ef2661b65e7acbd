//! Football Entities - domain values for the football statistics ingester
//!
//! Immutable, validated value types (seasons, competitions, teams), the closed
//! enumerations they use, and the generic mapper that converts them to and
//! from a plain key-value representation.
//!
//! ## Architecture
//!
//! - **Enums**: closed string-valued sets with a single fallible lookup
//! - **Season**: year pair value type plus lazy season ranges
//! - **Competition / Team**: entities validated on construction
//! - **Mapper**: `DictMapped` field tables driving `from_dict` / `to_dict`
//!
//! ## Usage
//!
//! ```rust
//! use football_entities::{season_range, Inclusive, Season};
//!
//! let start: Season = "2020-2021".parse().unwrap();
//! let end = Season::starting(2022).unwrap();
//! let seasons: Vec<String> = season_range(start, end, Inclusive::Neither)
//!     .unwrap()
//!     .map(|season| season.to_string())
//!     .collect();
//! assert_eq!(seasons, vec!["2021-2022"]);
//! ```

pub mod competition;
pub mod enums;
pub mod error;
pub mod mapper;
pub mod season;
pub mod team;

pub use competition::{Competition, CompetitionDetails};
pub use enums::{ClosedEnum, CompetitionFormat, CompetitionType, Gender, Position, TeamType};
pub use error::{LookupError, MapperError, ValidationError};
pub use mapper::{from_dict, to_dict, DictMapped, FieldKind, FieldSpec, FieldValues, Related, Values};
pub use season::{current_year, season_range, DashStyle, Inclusive, Season, SeasonRange};
pub use team::Team;
