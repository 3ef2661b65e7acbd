//! Football repository: entity-level persistence on top of a record store

use crate::backend::RecordStore;
use crate::error::{RepositoryError, Result, StoreError};
use crate::records::{CompetitionRecord, EntityRecord, Record, SeasonRecord, TeamRecord};
use crate::schema::ID_COLUMN;
use football_entities::{from_dict, Competition, Season, Team, Values};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Persists entities through their records
///
/// Every write goes through the mapper: entity → record → row, and rows
/// coming back are mapped record → entity.
pub struct FootballRepository<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> FootballRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `record` unconditionally and return it with its new id
    pub async fn add_record<R: Record>(&self, record: &R) -> Result<R> {
        let row = record.to_row()?;
        let id = self.store.insert(R::SCHEMA, row).await?;
        debug!("Added {} with id {}", R::TYPE_NAME, id);
        with_id(record, id)
    }

    /// Persist `entity` unconditionally and return it with its new id
    pub async fn add<R: EntityRecord>(&self, entity: &R::Entity) -> Result<R::Entity> {
        let record = R::from_entity(entity)?;
        let stored = self.add_record(&record).await?;
        Ok(stored.to_entity()?)
    }

    /// Look `record` up by equality on `uniqueness_fields`, inserting it
    /// when nothing matches
    ///
    /// An insert rejected by a unique constraint is retried once as a lookup.
    pub async fn get_or_create_record<R: Record>(
        &self,
        record: &R,
        uniqueness_fields: &[&str],
    ) -> Result<R> {
        let row = record.to_row()?;
        let criteria = criteria::<R>(&row, uniqueness_fields)?;

        if let Some(found) = self.find_record::<R>(&criteria).await? {
            debug!("Found existing {} matching {:?}", R::TYPE_NAME, uniqueness_fields);
            return Ok(found);
        }

        match self.store.insert(R::SCHEMA, row).await {
            Ok(id) => {
                debug!("Created {} with id {}", R::TYPE_NAME, id);
                with_id(record, id)
            }
            Err(StoreError::UniqueViolation { table }) => {
                warn!("Unique violation on {} while creating {}, retrying lookup", table, R::TYPE_NAME);
                self.find_record::<R>(&criteria)
                    .await?
                    .ok_or(RepositoryError::Store(StoreError::UniqueViolation { table }))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Entity-level [`get_or_create_record`](Self::get_or_create_record)
    pub async fn get_or_create<R: EntityRecord>(
        &self,
        entity: &R::Entity,
        uniqueness_fields: &[&str],
    ) -> Result<R::Entity> {
        let record = R::from_entity(entity)?;
        let stored = self.get_or_create_record(&record, uniqueness_fields).await?;
        Ok(stored.to_entity()?)
    }

    async fn find_record<R: Record>(&self, criteria: &Values) -> Result<Option<R>> {
        match self.store.find_one(R::SCHEMA, criteria).await? {
            Some(row) => Ok(Some(from_dict::<R>(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn add_competition(&self, competition: &Competition) -> Result<Competition> {
        let stored = self.add::<CompetitionRecord>(competition).await?;
        info!("Added competition {}", stored.name());
        Ok(stored)
    }

    pub async fn get_competition_by_name(&self, name: &str) -> Result<Competition> {
        let mut criteria = Values::new();
        criteria.insert("name".to_string(), Value::from(name));

        match self.find_record::<CompetitionRecord>(&criteria).await? {
            Some(record) => Ok(record.to_entity()?),
            None => Err(RepositoryError::CompetitionNotFound { name: name.to_string() }),
        }
    }

    pub async fn get_or_create_competition(&self, competition: &Competition) -> Result<Competition> {
        self.get_or_create::<CompetitionRecord>(competition, &["name"]).await
    }

    pub async fn list_competitions(&self) -> Result<Vec<Competition>> {
        let rows = self.store.find_all(CompetitionRecord::SCHEMA).await?;
        let mut competitions = Vec::with_capacity(rows.len());
        for row in &rows {
            let record: CompetitionRecord = from_dict(row)?;
            competitions.push(record.to_entity()?);
        }
        Ok(competitions)
    }

    pub async fn add_season(&self, season: &Season) -> Result<Season> {
        self.add::<SeasonRecord>(season).await
    }

    pub async fn get_or_create_season(&self, season: &Season) -> Result<Season> {
        self.get_or_create::<SeasonRecord>(season, &["from_year"]).await
    }

    pub async fn get_or_create_team(&self, team: &Team) -> Result<Team> {
        self.get_or_create::<TeamRecord>(team, &["name", "country"]).await
    }
}

/// Equality criteria on `fields`, taken from `row`
fn criteria<R: Record>(row: &Values, fields: &[&str]) -> Result<Values> {
    let mut criteria = Values::new();
    for field in fields {
        if *field == ID_COLUMN || R::SCHEMA.column(field).is_none() {
            return Err(RepositoryError::UnknownField {
                type_name: R::TYPE_NAME,
                field: field.to_string(),
            });
        }
        criteria.insert(field.to_string(), row.get(*field).cloned().unwrap_or(Value::Null));
    }
    Ok(criteria)
}

fn with_id<R: Record>(record: &R, id: i64) -> Result<R> {
    let mut values = record.to_dict();
    values.insert(ID_COLUMN.to_string(), Value::from(id));
    Ok(from_dict(&values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryRecordStore;
    use crate::records::{Address, FixtureRecord, TeamInstanceRecord, VenueRecord};
    use crate::schema::{TableSchema, SEASON_TABLE, TEAM_TABLE};
    use chrono::NaiveDate;
    use football_entities::{
        CompetitionDetails, CompetitionFormat, CompetitionType, Gender, Related, TeamType,
    };
    use std::sync::atomic::{AtomicBool, Ordering};

    fn repository() -> FootballRepository<InMemoryRecordStore> {
        FootballRepository::new(InMemoryRecordStore::new())
    }

    fn premier_league() -> Competition {
        Competition::new(CompetitionDetails {
            name: "premier_league".to_string(),
            alt_name: "Premier League".to_string(),
            gender: Gender::Male,
            country: Some("england".to_string()),
            tier: Some(1),
            competition_type: CompetitionType::Domestic,
            competition_format: CompetitionFormat::League,
            team_type: TeamType::Club,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_add_and_get_competition_by_name() {
        let repository = repository();
        let added = repository.add_competition(&premier_league()).await.unwrap();
        assert_eq!(added.id(), Some(1));

        let found = repository.get_competition_by_name("premier_league").await.unwrap();
        assert_eq!(found, added);
        assert_eq!(found.alt_name(), "Premier League");
    }

    #[tokio::test]
    async fn test_get_competition_by_name_not_found() {
        let error = repository().get_competition_by_name("serie_a").await.unwrap_err();
        assert!(error.is_not_found());
        assert!(matches!(error, RepositoryError::CompetitionNotFound { name } if name == "serie_a"));
    }

    #[tokio::test]
    async fn test_get_or_create_season_is_idempotent() {
        let repository = repository();
        let season: Season = "2022-2023".parse().unwrap();

        let first = repository.get_or_create_season(&season).await.unwrap();
        let second = repository.get_or_create_season(&season).await.unwrap();

        assert!(first.id().is_some());
        assert_eq!(first.id(), second.id());
        assert_eq!(repository.store().row_count(&SEASON_TABLE).await, 1);
    }

    #[tokio::test]
    async fn test_add_season_twice_violates_unique_key() {
        let repository = repository();
        let season = Season::new(2019, 2020).unwrap();
        repository.add_season(&season).await.unwrap();

        let error = repository.add_season(&season).await.unwrap_err();
        assert!(matches!(error, RepositoryError::Store(StoreError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_get_or_create_team_by_name_and_country() {
        let repository = repository();
        let scottish = Team::new("rangers", Gender::Male, "scotland", TeamType::Club, 1872).unwrap();
        let english = Team::new("rangers", Gender::Male, "england", TeamType::Club, 1882).unwrap();

        let a = repository.get_or_create_team(&scottish).await.unwrap();
        let b = repository.get_or_create_team(&english).await.unwrap();
        let c = repository.get_or_create_team(&scottish).await.unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), c.id());
        assert_eq!(repository.store().row_count(&TEAM_TABLE).await, 2);
    }

    #[tokio::test]
    async fn test_get_or_create_unknown_field() {
        let season = Season::new(2020, 2021).unwrap();
        let error = repository().get_or_create::<SeasonRecord>(&season, &["label"]).await.unwrap_err();
        assert!(matches!(
            error,
            RepositoryError::UnknownField { type_name: "SeasonRecord", ref field } if field == "label"
        ));
    }

    #[tokio::test]
    async fn test_list_competitions() {
        let repository = repository();
        assert!(repository.list_competitions().await.unwrap().is_empty());

        repository.get_or_create_competition(&premier_league()).await.unwrap();
        repository.get_or_create_competition(&premier_league()).await.unwrap();

        let competitions = repository.list_competitions().await.unwrap();
        assert_eq!(competitions.len(), 1);
        assert_eq!(competitions[0].name(), "premier_league");
    }

    #[tokio::test]
    async fn test_record_with_pending_relation_is_rejected() {
        let repository = repository();
        let instance = TeamInstanceRecord {
            id: None,
            team: Related::Pending(Box::new(TeamRecord {
                id: None,
                name: "hearts".to_string(),
                gender: Gender::Male,
                country: "scotland".to_string(),
                team_type: TeamType::Club,
                year_founded: 1874,
            })),
            fixture_id: None,
        };

        let error = repository.add_record(&instance).await.unwrap_err();
        assert!(matches!(error, RepositoryError::UnresolvedRelation { field: "team", .. }));
    }

    #[tokio::test]
    async fn test_fixture_persisted_after_its_relations() {
        let repository = repository();
        let season = repository.get_or_create_season(&Season::new(2023, 2024).unwrap()).await.unwrap();
        let competition = repository.add_competition(&premier_league()).await.unwrap();
        let team = repository
            .get_or_create_team(&Team::new("everton", Gender::Male, "england", TeamType::Club, 1878).unwrap())
            .await
            .unwrap();
        let team_id = team.id().unwrap();

        let home = repository
            .add_record(&TeamInstanceRecord { id: None, team: Related::Id(team_id), fixture_id: None })
            .await
            .unwrap();
        let away = repository
            .add_record(&TeamInstanceRecord { id: None, team: Related::Id(team_id), fixture_id: None })
            .await
            .unwrap();
        let venue = repository
            .add_record(&VenueRecord {
                id: None,
                name: "goodison_park".to_string(),
                country: "england".to_string(),
                address: Address {
                    city: "liverpool".to_string(),
                    area: Some("walton".to_string()),
                    street: "goodison_road".to_string(),
                    post_code: None,
                },
            })
            .await
            .unwrap();

        let fixture = repository
            .add_record(&FixtureRecord {
                id: None,
                date: NaiveDate::from_ymd_opt(2023, 8, 19).unwrap(),
                season: Related::Id(season.id().unwrap()),
                competition: Related::Id(competition.id().unwrap()),
                home_team: Related::Id(home.id.unwrap()),
                away_team: Related::Id(away.id.unwrap()),
                game_week: 2,
                venue: Related::Id(venue.id.unwrap()),
            })
            .await
            .unwrap();

        assert_eq!(fixture.id, Some(1));
        assert_eq!(venue.address.area.as_deref(), Some("walton"));
        assert_ne!(home.id, away.id);
    }

    /// Store whose first lookup misses, as if another writer raced ahead
    struct RacingStore {
        inner: InMemoryRecordStore,
        hide_next_lookup: AtomicBool,
    }

    #[async_trait::async_trait]
    impl RecordStore for RacingStore {
        async fn insert(&self, table: &'static TableSchema, row: Values) -> std::result::Result<i64, StoreError> {
            self.inner.insert(table, row).await
        }

        async fn find_one(
            &self,
            table: &'static TableSchema,
            criteria: &Values,
        ) -> std::result::Result<Option<Values>, StoreError> {
            if self.hide_next_lookup.swap(false, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_one(table, criteria).await
        }

        async fn find_all(&self, table: &'static TableSchema) -> std::result::Result<Vec<Values>, StoreError> {
            self.inner.find_all(table).await
        }
    }

    #[tokio::test]
    async fn test_unique_violation_retried_as_lookup() {
        let inner = InMemoryRecordStore::new();
        let season = Season::new(2021, 2022).unwrap();
        let existing = FootballRepository::new(inner.clone()).add_season(&season).await.unwrap();

        let repository = FootballRepository::new(RacingStore { inner, hide_next_lookup: AtomicBool::new(true) });
        let found = repository.get_or_create_season(&season).await.unwrap();

        assert_eq!(found.id(), existing.id());
    }
}
