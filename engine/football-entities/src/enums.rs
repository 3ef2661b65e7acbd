//! Closed string-valued enumerations shared by entities and records

use crate::error::LookupError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A closed set of string-valued variants with one fallible lookup
pub trait ClosedEnum: Sized + Copy + 'static {
    /// Enum name used in lookup errors
    const NAME: &'static str;

    /// All members, in declaration order
    const MEMBERS: &'static [Self];

    /// Stored value, e.g. `"group_knockout"`
    fn as_str(&self) -> &'static str;

    /// Upper-case member name, e.g. `"GROUP_KNOCKOUT"`
    fn member_name(&self) -> &'static str;

    /// Resolve a string to a member by value, falling back to the member name
    fn lookup(value: &str) -> Result<Self, LookupError> {
        Self::MEMBERS
            .iter()
            .find(|member| member.as_str() == value)
            .or_else(|| Self::MEMBERS.iter().find(|member| member.member_name() == value))
            .copied()
            .ok_or_else(|| LookupError { enum_name: Self::NAME, value: value.to_string() })
    }

    /// All stored values, in declaration order
    fn values() -> Vec<&'static str> {
        Self::MEMBERS.iter().map(|member| member.as_str()).collect()
    }
}

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($value:literal, $member:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl ClosedEnum for $name {
            const NAME: &'static str = stringify!($name);
            const MEMBERS: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }

            fn member_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $member),+
                }
            }
        }

        impl FromStr for $name {
            type Err = LookupError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as ClosedEnum>::lookup(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                <Self as ClosedEnum>::lookup(&value).map_err(serde::de::Error::custom)
            }
        }
    };
}

closed_enum! {
    /// Gender of a team, player or competition
    Gender {
        Male => ("male", "MALE"),
        Female => ("female", "FEMALE"),
    }
}

closed_enum! {
    /// Playing position of a player in a fixture
    Position {
        Goalkeeper => ("goalkeeper", "GOALKEEPER"),
        Defender => ("defender", "DEFENDER"),
        Midfielder => ("midfielder", "MIDFIELDER"),
        Forward => ("forward", "FORWARD"),
    }
}

closed_enum! {
    CompetitionType {
        Domestic => ("domestic", "DOMESTIC"),
        International => ("international", "INTERNATIONAL"),
    }
}

closed_enum! {
    CompetitionFormat {
        Friendly => ("friendly", "FRIENDLY"),
        League => ("league", "LEAGUE"),
        Knockout => ("knockout", "KNOCKOUT"),
        GroupKnockout => ("group_knockout", "GROUP_KNOCKOUT"),
    }
}

closed_enum! {
    /// Whether a team is a club side or a national side
    TeamType {
        Club => ("club", "CLUB"),
        National => ("national", "NATIONAL"),
    }
}
