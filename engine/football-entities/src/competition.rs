//! Competition entity

use crate::enums::{ClosedEnum, CompetitionFormat, CompetitionType, Gender, TeamType};
use crate::error::{MapperError, ValidationError};
use crate::mapper::{DictMapped, FieldSpec, FieldValues, Values};
use serde::{Deserialize, Serialize};

/// Unvalidated competition data, as found in the reference file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionDetails {
    /// Internal key, e.g. `premier_league`
    pub name: String,
    /// Display name used by the statistics site, e.g. `Premier League`
    pub alt_name: String,
    pub gender: Gender,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub tier: Option<i64>,
    pub competition_type: CompetitionType,
    pub competition_format: CompetitionFormat,
    pub team_type: TeamType,
}

/// A validated competition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Competition {
    id: Option<i64>,
    details: CompetitionDetails,
}

impl Competition {
    /// Validate `details` into a competition
    pub fn new(details: CompetitionDetails) -> Result<Self, ValidationError> {
        let name = || details.name.clone();

        if details.team_type == TeamType::National {
            if details.country.is_some() {
                return Err(ValidationError::CountryOnNationalCompetition { name: name() });
            }
            if details.competition_type != CompetitionType::International {
                return Err(ValidationError::NationalCompetitionNotInternational { name: name() });
            }
        }

        if let Some(tier) = details.tier {
            if details.competition_format == CompetitionFormat::Friendly {
                return Err(ValidationError::TierOnFriendlyCompetition { name: name() });
            }
            if tier < 1 {
                return Err(ValidationError::NonPositiveTier { name: name(), tier });
            }
        }

        Ok(Self { id: None, details })
    }

    /// Same competition carrying a storage identifier
    pub fn with_id(self, id: i64) -> Self {
        Self { id: Some(id), ..self }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn alt_name(&self) -> &str {
        &self.details.alt_name
    }

    pub fn gender(&self) -> Gender {
        self.details.gender
    }

    pub fn country(&self) -> Option<&str> {
        self.details.country.as_deref()
    }

    pub fn tier(&self) -> Option<i64> {
        self.details.tier
    }

    pub fn competition_type(&self) -> CompetitionType {
        self.details.competition_type
    }

    pub fn competition_format(&self) -> CompetitionFormat {
        self.details.competition_format
    }

    pub fn team_type(&self) -> TeamType {
        self.details.team_type
    }
}

impl DictMapped for Competition {
    const TYPE_NAME: &'static str = "Competition";
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
        let name: String = fields.required("name")?;
        let competition = Self::new(CompetitionDetails {
            alt_name: fields.scalar_or("alt_name", name.clone())?,
            name,
            gender: fields.required_enumeration("gender")?,
            country: fields.scalar("country")?,
            tier: fields.scalar("tier")?,
            competition_type: fields.required_enumeration("competition_type")?,
            competition_format: fields.required_enumeration("competition_format")?,
            team_type: fields.required_enumeration("team_type")?,
        })?;

        Ok(match fields.scalar::<i64>("id")? {
            Some(id) => competition.with_id(id),
            None => competition,
        })
    }

    fn to_dict(&self) -> Values {
        let details = &self.details;
        let mut values = Values::new();
        values.insert("id".into(), self.id.into());
        values.insert("name".into(), details.name.clone().into());
        values.insert("alt_name".into(), details.alt_name.clone().into());
        values.insert("gender".into(), details.gender.as_str().into());
        values.insert("country".into(), details.country.clone().into());
        values.insert("tier".into(), details.tier.into());
        values.insert("competition_type".into(), details.competition_type.as_str().into());
        values.insert("competition_format".into(), details.competition_format.as_str().into());
        values.insert("team_type".into(), details.team_type.as_str().into());
        values
    }
}
