//! Team entity

use crate::enums::{ClosedEnum, Gender, TeamType};
use crate::error::{MapperError, ValidationError};
use crate::mapper::{DictMapped, FieldSpec, FieldValues, Values, INTEGER_ALTERNATIVES};
use crate::season::current_year;

/// A club or national side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    id: Option<i64>,
    name: String,
    gender: Gender,
    country: String,
    team_type: TeamType,
    year_founded: i32,
}

impl Team {
    pub fn new(
        name: impl Into<String>,
        gender: Gender,
        country: impl Into<String>,
        team_type: TeamType,
        year_founded: i32,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let current_year = current_year();
        if year_founded > current_year {
            return Err(ValidationError::FoundedInFuture { name, year_founded, current_year });
        }

        Ok(Self { id: None, name, gender, country: country.into(), team_type, year_founded })
    }

    /// Same team carrying a storage identifier
    pub fn with_id(self, id: i64) -> Self {
        Self { id: Some(id), ..self }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn team_type(&self) -> TeamType {
        self.team_type
    }

    pub fn year_founded(&self) -> i32 {
        self.year_founded
    }
}

impl DictMapped for Team {
    const TYPE_NAME: &'static str = "Team";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::scalar("id"),
        FieldSpec::scalar("name"),
        FieldSpec::enumeration("gender", "Gender"),
        FieldSpec::scalar("country"),
        FieldSpec::enumeration("team_type", "TeamType"),
        FieldSpec::union("year_founded", INTEGER_ALTERNATIVES),
    ];

    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError> {
        let year_founded = fields
            .union::<i64>("year_founded")?
            .ok_or(MapperError::MissingField { type_name: Self::TYPE_NAME, field: "year_founded" })?;
        let year_founded = i32::try_from(year_founded).map_err(|e| MapperError::Coercion {
            type_name: Self::TYPE_NAME,
            field: "year_founded",
            message: e.to_string(),
        })?;

        let team = Self::new(
            fields.required::<String>("name")?,
            fields.required_enumeration("gender")?,
            fields.required::<String>("country")?,
            fields.required_enumeration("team_type")?,
            year_founded,
        )?;

        Ok(match fields.scalar::<i64>("id")? {
            Some(id) => team.with_id(id),
            None => team,
        })
    }

    fn to_dict(&self) -> Values {
        let mut values = Values::new();
        values.insert("id".into(), self.id.into());
        values.insert("name".into(), self.name.clone().into());
        values.insert("gender".into(), self.gender.as_str().into());
        values.insert("country".into(), self.country.clone().into());
        values.insert("team_type".into(), self.team_type.as_str().into());
        values.insert("year_founded".into(), self.year_founded.into());
        values
    }
}
