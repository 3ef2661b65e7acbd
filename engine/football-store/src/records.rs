//! Storage-shaped records, one per table
//!
//! Records mirror the tables 1:1. Foreign keys are held as [`Related`] so a
//! record can carry either the referenced id or a nested record that still
//! needs persisting.

use crate::error::RepositoryError;
use crate::schema::{
    TableSchema, COMPETITION_TABLE, FIXTURE_TABLE, PLAYER_INSTANCE_TABLE, PLAYER_TABLE,
    SEASON_TABLE, TEAM_INSTANCE_TABLE, TEAM_TABLE, VENUE_TABLE,
};
use chrono::NaiveDate;
use football_entities::{
    from_dict, ClosedEnum, Competition, CompetitionFormat, CompetitionType, DictMapped, FieldKind,
    FieldSpec, FieldValues, Gender, MapperError, Position, Related, Season, Team, TeamType, Values,
};
use serde_json::Value;

/// A mapped type stored in one table
pub trait Record: DictMapped + Send + Sync + 'static {
    const SCHEMA: &'static TableSchema;

    fn id(&self) -> Option<i64>;

    /// Column values for an insert, surrogate key excluded
    ///
    /// Fails when a relation is still pending, since its id is unknown.
    fn to_row(&self) -> Result<Values, RepositoryError> {
        let dict = self.to_dict();

        for field in Self::FIELDS {
            if matches!(field.kind, FieldKind::Relation(_)) && dict.contains_key(field.name) {
                return Err(RepositoryError::UnresolvedRelation {
                    type_name: Self::TYPE_NAME,
                    field: field.name,
                });
            }
        }

        Ok(Self::SCHEMA
            .insert_columns()
            .map(|column| {
                (column.name.to_string(), dict.get(column.name).cloned().unwrap_or(Value::Null))
            })
            .collect())
    }
}

/// A record that has a domain entity counterpart
pub trait EntityRecord: Record {
    type Entity: DictMapped;

    fn from_entity(entity: &Self::Entity) -> Result<Self, MapperError> {
        from_dict(&entity.to_dict())
    }

    fn to_entity(&self) -> Result<Self::Entity, MapperError> {
        from_dict(&self.to_dict())
    }
}

/// Insert `id` into `values`
fn insert_id(values: &mut Values, id: Option<i64>) {
    values.insert("id".into(), id.into());
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: Option<i64>,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub country: String,
}

impl DictMapped for PlayerRecord {
    const TYPE_NAME: &'static str = "PlayerRecord";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::scalar("id"),
        FieldSpec::scalar("name"),
        FieldSpec::scalar("date_of_birth"),
        FieldSpec::scalar("country"),
    ];

    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError> {
        Ok(Self {
            id: fields.scalar("id")?,
            name: fields.required("name")?,
            date_of_birth: fields.required("date_of_birth")?,
            country: fields.required("country")?,
        })
    }

    fn to_dict(&self) -> Values {
        let mut values = Values::new();
        insert_id(&mut values, self.id);
        values.insert("name".into(), self.name.clone().into());
        values.insert("date_of_birth".into(), self.date_of_birth.to_string().into());
        values.insert("country".into(), self.country.clone().into());
        values
    }
}

impl Record for PlayerRecord {
    const SCHEMA: &'static TableSchema = &PLAYER_TABLE;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// A player's appearance for a team instance in one fixture
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInstanceRecord {
    pub id: Option<i64>,
    pub player: Related<PlayerRecord>,
    /// Keyed by (team_id, fixture_id); the mapper resolves it through team_id
    pub team: Related<TeamInstanceRecord>,
    pub fixture: Related<FixtureRecord>,
    pub position: Position,
}

impl DictMapped for PlayerInstanceRecord {
    const TYPE_NAME: &'static str = "PlayerInstanceRecord";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::scalar("id"),
        FieldSpec::relation("player", "PlayerRecord", &["player_id"], "id"),
        FieldSpec::relation("team", "TeamInstanceRecord", &["team_id", "fixture_id"], "id"),
        FieldSpec::relation("fixture", "FixtureRecord", &["fixture_id"], "id"),
        FieldSpec::enumeration("position", "Position"),
    ];

    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError> {
        Ok(Self {
            id: fields.scalar("id")?,
            player: fields.required_relation("player")?,
            team: fields.required_relation("team")?,
            fixture: fields.required_relation("fixture")?,
            position: fields.required_enumeration("position")?,
        })
    }

    fn to_dict(&self) -> Values {
        let mut values = Values::new();
        insert_id(&mut values, self.id);
        self.player.write_into(&mut values, "player", "player_id");
        self.team.write_into(&mut values, "team", "team_id");
        self.fixture.write_into(&mut values, "fixture", "fixture_id");
        values.insert("position".into(), self.position.as_str().into());
        values
    }
}

impl Record for PlayerInstanceRecord {
    const SCHEMA: &'static TableSchema = &PLAYER_INSTANCE_TABLE;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamRecord {
    pub id: Option<i64>,
    pub name: String,
    pub gender: Gender,
    pub country: String,
    pub team_type: TeamType,
    pub year_founded: i32,
}

impl DictMapped for TeamRecord {
    const TYPE_NAME: &'static str = "TeamRecord";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::scalar("id"),
        FieldSpec::scalar("name"),
        FieldSpec::enumeration("gender", "Gender"),
        FieldSpec::scalar("country"),
        FieldSpec::enumeration("team_type", "TeamType"),
        FieldSpec::scalar("year_founded"),
    ];

    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError> {
        Ok(Self {
            id: fields.scalar("id")?,
            name: fields.required("name")?,
            gender: fields.required_enumeration("gender")?,
            country: fields.required("country")?,
            team_type: fields.required_enumeration("team_type")?,
            year_founded: fields.required("year_founded")?,
        })
    }

    fn to_dict(&self) -> Values {
        let mut values = Values::new();
        insert_id(&mut values, self.id);
        values.insert("name".into(), self.name.clone().into());
        values.insert("gender".into(), self.gender.as_str().into());
        values.insert("country".into(), self.country.clone().into());
        values.insert("team_type".into(), self.team_type.as_str().into());
        values.insert("year_founded".into(), self.year_founded.into());
        values
    }
}

impl Record for TeamRecord {
    const SCHEMA: &'static TableSchema = &TEAM_TABLE;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl EntityRecord for TeamRecord {
    type Entity = Team;
}

/// A team as it appeared in one fixture
#[derive(Debug, Clone, PartialEq)]
pub struct TeamInstanceRecord {
    pub id: Option<i64>,
    pub team: Related<TeamRecord>,
    pub fixture_id: Option<i64>,
}

impl DictMapped for TeamInstanceRecord {
    const TYPE_NAME: &'static str = "TeamInstanceRecord";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::scalar("id"),
        FieldSpec::relation("team", "TeamRecord", &["team_id"], "id"),
        FieldSpec::scalar("fixture_id"),
    ];

    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError> {
        Ok(Self {
            id: fields.scalar("id")?,
            team: fields.required_relation("team")?,
            fixture_id: fields.scalar("fixture_id")?,
        })
    }

    fn to_dict(&self) -> Values {
        let mut values = Values::new();
        insert_id(&mut values, self.id);
        self.team.write_into(&mut values, "team", "team_id");
        values.insert("fixture_id".into(), self.fixture_id.into());
        values
    }
}

impl Record for TeamInstanceRecord {
    const SCHEMA: &'static TableSchema = &TEAM_INSTANCE_TABLE;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompetitionRecord {
    pub id: Option<i64>,
    pub name: String,
    pub alt_name: String,
    pub gender: Gender,
    pub country: Option<String>,
    pub tier: Option<i64>,
    pub competition_type: CompetitionType,
    pub competition_format: CompetitionFormat,
    pub team_type: TeamType,
}

impl DictMapped for CompetitionRecord {
    const TYPE_NAME: &'static str = "CompetitionRecord";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::scalar("id"),
        FieldSpec::scalar("name"),
        FieldSpec::scalar("alt_name"),
        FieldSpec::enumeration("gender", "Gender"),
        FieldSpec::scalar("country"),
        FieldSpec::scalar("tier"),
        FieldSpec::enumeration("competition_type", "CompetitionType"),
        FieldSpec::enumeration("competition_format", "CompetitionFormat"),
        FieldSpec::enumeration("team_type", "TeamType"),
    ];

    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError> {
        Ok(Self {
            id: fields.scalar("id")?,
            name: fields.required("name")?,
            alt_name: fields.required("alt_name")?,
            gender: fields.required_enumeration("gender")?,
            country: fields.scalar("country")?,
            tier: fields.scalar("tier")?,
            competition_type: fields.required_enumeration("competition_type")?,
            competition_format: fields.required_enumeration("competition_format")?,
            team_type: fields.required_enumeration("team_type")?,
        })
    }

    fn to_dict(&self) -> Values {
        let mut values = Values::new();
        insert_id(&mut values, self.id);
        values.insert("name".into(), self.name.clone().into());
        values.insert("alt_name".into(), self.alt_name.clone().into());
        values.insert("gender".into(), self.gender.as_str().into());
        values.insert("country".into(), self.country.clone().into());
        values.insert("tier".into(), self.tier.into());
        values.insert("competition_type".into(), self.competition_type.as_str().into());
        values.insert("competition_format".into(), self.competition_format.as_str().into());
        values.insert("team_type".into(), self.team_type.as_str().into());
        values
    }
}

impl Record for CompetitionRecord {
    const SCHEMA: &'static TableSchema = &COMPETITION_TABLE;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl EntityRecord for CompetitionRecord {
    type Entity = Competition;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRecord {
    pub id: Option<i64>,
    pub from_year: i32,
    pub to_year: i32,
}

impl DictMapped for SeasonRecord {
    const TYPE_NAME: &'static str = "SeasonRecord";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::scalar("id"),
        FieldSpec::scalar("from_year"),
        FieldSpec::scalar("to_year"),
    ];

    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError> {
        Ok(Self {
            id: fields.scalar("id")?,
            from_year: fields.required("from_year")?,
            to_year: fields.required("to_year")?,
        })
    }

    fn to_dict(&self) -> Values {
        let mut values = Values::new();
        insert_id(&mut values, self.id);
        values.insert("from_year".into(), self.from_year.into());
        values.insert("to_year".into(), self.to_year.into());
        values
    }
}

impl Record for SeasonRecord {
    const SCHEMA: &'static TableSchema = &SEASON_TABLE;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl EntityRecord for SeasonRecord {
    type Entity = Season;
}

/// Postal address of a venue, stored as four venue columns
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub city: String,
    pub area: Option<String>,
    pub street: String,
    pub post_code: Option<String>,
}

impl DictMapped for Address {
    const TYPE_NAME: &'static str = "Address";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::scalar("city"),
        FieldSpec::scalar("area"),
        FieldSpec::scalar("street"),
        FieldSpec::scalar("post_code"),
    ];

    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError> {
        Ok(Self {
            city: fields.required("city")?,
            area: fields.scalar("area")?,
            street: fields.required("street")?,
            post_code: fields.scalar("post_code")?,
        })
    }

    fn to_dict(&self) -> Values {
        let mut values = Values::new();
        values.insert("city".into(), self.city.clone().into());
        values.insert("area".into(), self.area.clone().into());
        values.insert("street".into(), self.street.clone().into());
        values.insert("post_code".into(), self.post_code.clone().into());
        values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VenueRecord {
    pub id: Option<i64>,
    pub name: String,
    pub country: String,
    pub address: Address,
}

impl DictMapped for VenueRecord {
    const TYPE_NAME: &'static str = "VenueRecord";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::scalar("id"),
        FieldSpec::scalar("name"),
        FieldSpec::scalar("country"),
        FieldSpec::composite("address", &["city", "area", "street", "post_code"]),
    ];

    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError> {
        Ok(Self {
            id: fields.scalar("id")?,
            name: fields.required("name")?,
            country: fields.required("country")?,
            address: fields.composite("address")?.ok_or(MapperError::MissingField {
                type_name: Self::TYPE_NAME,
                field: "address",
            })?,
        })
    }

    fn to_dict(&self) -> Values {
        let mut values = Values::new();
        insert_id(&mut values, self.id);
        values.insert("name".into(), self.name.clone().into());
        values.insert("country".into(), self.country.clone().into());
        values.extend(self.address.to_dict());
        values
    }
}

impl Record for VenueRecord {
    const SCHEMA: &'static TableSchema = &VENUE_TABLE;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureRecord {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub season: Related<SeasonRecord>,
    pub competition: Related<CompetitionRecord>,
    pub home_team: Related<TeamInstanceRecord>,
    pub away_team: Related<TeamInstanceRecord>,
    pub game_week: i32,
    pub venue: Related<VenueRecord>,
}

impl DictMapped for FixtureRecord {
    const TYPE_NAME: &'static str = "FixtureRecord";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::scalar("id"),
        FieldSpec::scalar("date"),
        FieldSpec::relation("season", "SeasonRecord", &["season_id"], "id"),
        FieldSpec::relation("competition", "CompetitionRecord", &["competition_id"], "id"),
        FieldSpec::relation("home_team", "TeamInstanceRecord", &["home_team_id"], "id"),
        FieldSpec::relation("away_team", "TeamInstanceRecord", &["away_team_id"], "id"),
        FieldSpec::scalar("game_week"),
        FieldSpec::relation("venue", "VenueRecord", &["venue_id"], "id"),
    ];

    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError> {
        Ok(Self {
            id: fields.scalar("id")?,
            date: fields.required("date")?,
            season: fields.required_relation("season")?,
            competition: fields.required_relation("competition")?,
            home_team: fields.required_relation("home_team")?,
            away_team: fields.required_relation("away_team")?,
            game_week: fields.required("game_week")?,
            venue: fields.required_relation("venue")?,
        })
    }

    fn to_dict(&self) -> Values {
        let mut values = Values::new();
        insert_id(&mut values, self.id);
        values.insert("date".into(), self.date.to_string().into());
        self.season.write_into(&mut values, "season", "season_id");
        self.competition.write_into(&mut values, "competition", "competition_id");
        self.home_team.write_into(&mut values, "home_team", "home_team_id");
        self.away_team.write_into(&mut values, "away_team", "away_team_id");
        values.insert("game_week".into(), self.game_week.into());
        self.venue.write_into(&mut values, "venue", "venue_id");
        values
    }
}

impl Record for FixtureRecord {
    const SCHEMA: &'static TableSchema = &FIXTURE_TABLE;

    fn id(&self) -> Option<i64> {
        self.id
    }
}
