//! Table declarations shared by every store backend

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Text,
    Date,
}

/// One column of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
}

impl Column {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self { name, sql_type, nullable: false }
    }

    pub const fn nullable(name: &'static str, sql_type: SqlType) -> Self {
        Self { name, sql_type, nullable: true }
    }
}

/// Name, columns and natural key of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    /// Every column, surrogate `id` first
    pub columns: &'static [Column],
    /// Columns enforced unique by storage; empty when there is none
    pub unique_key: &'static [&'static str],
}

/// Name of the surrogate primary key column
pub const ID_COLUMN: &str = "id";

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Columns written on insert (everything except the surrogate key)
    pub fn insert_columns(&self) -> impl Iterator<Item = &'static Column> {
        self.columns.iter().filter(|column| column.name != ID_COLUMN)
    }
}

const fn integer(name: &'static str) -> Column {
    Column::new(name, SqlType::Integer)
}

const fn text(name: &'static str) -> Column {
    Column::new(name, SqlType::Text)
}

pub const PLAYER_TABLE: TableSchema = TableSchema {
    name: "player",
    columns: &[integer("id"), text("name"), Column::new("date_of_birth", SqlType::Date), text("country")],
    unique_key: &[],
};

pub const PLAYER_INSTANCE_TABLE: TableSchema = TableSchema {
    name: "player_instance",
    columns: &[
        integer("id"),
        integer("player_id"),
        integer("team_id"),
        integer("fixture_id"),
        text("position"),
    ],
    unique_key: &["player_id", "fixture_id"],
};

pub const TEAM_TABLE: TableSchema = TableSchema {
    name: "team",
    columns: &[
        integer("id"),
        text("name"),
        text("gender"),
        text("country"),
        text("team_type"),
        integer("year_founded"),
    ],
    unique_key: &["name", "country"],
};

pub const TEAM_INSTANCE_TABLE: TableSchema = TableSchema {
    name: "team_instance",
    columns: &[integer("id"), integer("team_id"), Column::nullable("fixture_id", SqlType::Integer)],
    unique_key: &[],
};

pub const COMPETITION_TABLE: TableSchema = TableSchema {
    name: "competition",
    columns: &[
        integer("id"),
        text("name"),
        text("alt_name"),
        text("gender"),
        Column::nullable("country", SqlType::Text),
        Column::nullable("tier", SqlType::Integer),
        text("competition_type"),
        text("competition_format"),
        text("team_type"),
    ],
    unique_key: &["name"],
};

pub const SEASON_TABLE: TableSchema = TableSchema {
    name: "season",
    columns: &[integer("id"), integer("from_year"), integer("to_year")],
    unique_key: &["from_year"],
};

pub const VENUE_TABLE: TableSchema = TableSchema {
    name: "venue",
    columns: &[
        integer("id"),
        text("name"),
        text("country"),
        text("city"),
        Column::nullable("area", SqlType::Text),
        text("street"),
        Column::nullable("post_code", SqlType::Text),
    ],
    unique_key: &[],
};

pub const FIXTURE_TABLE: TableSchema = TableSchema {
    name: "fixture",
    columns: &[
        integer("id"),
        Column::new("date", SqlType::Date),
        integer("season_id"),
        integer("competition_id"),
        integer("home_team_id"),
        integer("away_team_id"),
        integer("game_week"),
        integer("venue_id"),
    ],
    unique_key: &[],
};

/// Every table, in foreign-key dependency order
pub const ALL_TABLES: &[&TableSchema] = &[
    &PLAYER_TABLE,
    &TEAM_TABLE,
    &COMPETITION_TABLE,
    &SEASON_TABLE,
    &VENUE_TABLE,
    &FIXTURE_TABLE,
    &TEAM_INSTANCE_TABLE,
    &PLAYER_INSTANCE_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_starts_with_id() {
        for table in ALL_TABLES {
            assert_eq!(table.columns[0].name, ID_COLUMN, "table {}", table.name);
            assert!(table.insert_columns().all(|column| column.name != ID_COLUMN));
        }
    }

    #[test]
    fn test_unique_keys_are_columns() {
        for table in ALL_TABLES {
            for key in table.unique_key {
                assert!(table.column(key).is_some(), "{}.{}", table.name, key);
            }
        }
    }
}
