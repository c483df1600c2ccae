//! Player records and the 25-attribute model.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{ATTRIBUTE_MAX, ATTRIBUTE_MIN};
use crate::error::ConfigError;

/// Number of rated attributes carried by every player.
pub const ATTRIBUTE_COUNT: usize = 25;

macro_rules! attribute_table {
    ($($variant:ident => $field:ident),+ $(,)?) => {
        /// Named player attribute.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum Attribute {
            $($variant),+
        }

        impl Attribute {
            /// Every attribute in declaration order.
            pub const ALL: [Self; ATTRIBUTE_COUNT] = [$(Self::$variant),+];

            /// Stable snake_case name used in team files and weight tables.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($field)),+
                }
            }
        }

        /// Full attribute sheet. Team files must name every field.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct Attributes {
            $(pub $field: f64),+
        }

        impl Attributes {
            /// Sheet with every attribute set to the same rating.
            #[must_use]
            pub const fn uniform(value: f64) -> Self {
                Self {
                    $($field: value),+
                }
            }

            #[must_use]
            pub const fn get(&self, attribute: Attribute) -> f64 {
                match attribute {
                    $(Attribute::$variant => self.$field),+
                }
            }

            pub const fn set(&mut self, attribute: Attribute, value: f64) {
                match attribute {
                    $(Attribute::$variant => self.$field = value),+
                }
            }

            fn map(&self, f: impl Fn(f64) -> f64) -> Self {
                Self {
                    $($field: f(self.$field)),+
                }
            }
        }
    };
}

attribute_table! {
    GripStrength => grip_strength,
    ArmStrength => arm_strength,
    CoreStrength => core_strength,
    Agility => agility,
    Acceleration => acceleration,
    TopSpeed => top_speed,
    Jumping => jumping,
    Reactions => reactions,
    Stamina => stamina,
    Balance => balance,
    Height => height,
    Durability => durability,
    Awareness => awareness,
    Creativity => creativity,
    Determination => determination,
    Bravery => bravery,
    Consistency => consistency,
    Composure => composure,
    Patience => patience,
    HandEyeCoordination => hand_eye_coordination,
    ThrowAccuracy => throw_accuracy,
    FormTechnique => form_technique,
    Finesse => finesse,
    Deception => deception,
    Teamwork => teamwork,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|attribute| attribute.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownAttribute {
                name: s.to_string(),
            })
    }
}

/// Court position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Position {
    pub const ALL: [Self; 5] = [Self::PG, Self::SG, Self::SF, Self::PF, Self::C];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PG => "PG",
            Self::SG => "SG",
            Self::SF => "SF",
            Self::PF => "PF",
            Self::C => "C",
        }
    }

    const fn slot(self) -> i8 {
        match self {
            Self::PG => 0,
            Self::SG => 1,
            Self::SF => 2,
            Self::PF => 3,
            Self::C => 4,
        }
    }

    /// How naturally a player at `self` can guard (or replace) one at `other`.
    #[must_use]
    pub const fn compatibility(self, other: Self) -> f64 {
        match (self.slot() - other.slot()).abs() {
            0 => 1.0,
            1 => 0.7,
            2 => 0.4,
            _ => 0.2,
        }
    }

    #[must_use]
    pub const fn is_guard(self) -> bool {
        matches!(self, Self::PG | Self::SG)
    }

    #[must_use]
    pub const fn is_big(self) -> bool {
        matches!(self, Self::PF | Self::C)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PG" => Ok(Self::PG),
            "SG" => Ok(Self::SG),
            "SF" => Ok(Self::SF),
            "PF" => Ok(Self::PF),
            "C" => Ok(Self::C),
            _ => Err(ConfigError::UnknownVariant {
                field: "position",
                value: s.to_string(),
            }),
        }
    }
}

/// Immutable base record for a rostered player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub position: Position,
    pub attributes: Attributes,
}

impl Player {
    #[must_use]
    pub fn new(name: impl Into<String>, position: Position, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            position,
            attributes,
        }
    }

    #[must_use]
    pub const fn attr(&self, attribute: Attribute) -> f64 {
        self.attributes.get(attribute)
    }

    /// Check every attribute lies in `[1, 100]`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AttributeOutOfRange` for the first offending attribute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for attribute in Attribute::ALL {
            let value = self.attr(attribute);
            if !value.is_finite() || !(ATTRIBUTE_MIN..=ATTRIBUTE_MAX).contains(&value) {
                return Err(ConfigError::AttributeOutOfRange {
                    player: self.name.clone(),
                    attribute: attribute.as_str(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Copy with every attribute scaled by `1 - penalty`, floored at 1.
    ///
    /// `penalty` is a fraction in `[0, 1]`; values outside are clamped.
    #[must_use]
    pub fn degraded(&self, penalty: f64) -> Self {
        let factor = 1.0 - penalty.clamp(0.0, 1.0);
        Self {
            name: self.name.clone(),
            position: self.position,
            attributes: self
                .attributes
                .map(|value| (value * factor).max(ATTRIBUTE_MIN)),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Player with every attribute at `rating`.
    pub fn uniform_player(name: &str, position: Position, rating: f64) -> Player {
        Player::new(name, position, Attributes::uniform(rating))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_names_roundtrip_through_from_str() {
        assert_eq!(Attribute::ALL.len(), ATTRIBUTE_COUNT);
        for attribute in Attribute::ALL {
            assert_eq!(attribute.as_str().parse::<Attribute>(), Ok(attribute));
        }
        assert!(matches!(
            "wingspan".parse::<Attribute>(),
            Err(ConfigError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn set_and_get_address_the_same_field() {
        let mut sheet = Attributes::uniform(50.0);
        sheet.set(Attribute::Height, 88.0);
        assert!((sheet.get(Attribute::Height) - 88.0).abs() < f64::EPSILON);
        assert!((sheet.height - 88.0).abs() < f64::EPSILON);
        assert!((sheet.get(Attribute::Jumping) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn degraded_copy_scales_and_floors() {
        let mut player = fixtures::uniform_player("Ada", Position::PG, 60.0);
        player.attributes.set(Attribute::Height, 1.5);
        let tired = player.degraded(0.25);
        assert!((tired.attr(Attribute::Agility) - 45.0).abs() < 1e-9);
        assert!((tired.attr(Attribute::Height) - 1.0).abs() < 1e-9);
        let spent = player.degraded(2.0);
        assert!((spent.attr(Attribute::Agility) - 1.0).abs() < 1e-9);
        assert!((player.attr(Attribute::Agility) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn validation_rejects_out_of_range_attributes() {
        let mut player = fixtures::uniform_player("Bo", Position::C, 50.0);
        player.validate().expect("uniform sheet is valid");
        player.attributes.set(Attribute::Composure, 101.0);
        assert!(matches!(
            player.validate(),
            Err(ConfigError::AttributeOutOfRange { attribute, .. }) if attribute == "composure"
        ));
        player.attributes.set(Attribute::Composure, 0.0);
        assert!(player.validate().is_err());
    }

    #[test]
    fn team_file_must_name_every_attribute() {
        let mut value = serde_json::to_value(Attributes::uniform(40.0)).expect("serialize");
        value
            .as_object_mut()
            .expect("object")
            .remove("teamwork");
        assert!(serde_json::from_value::<Attributes>(value.clone()).is_err());
        value
            .as_object_mut()
            .expect("object")
            .insert("teamwork".into(), 40.into());
        value
            .as_object_mut()
            .expect("object")
            .insert("wingspan".into(), 40.into());
        assert!(serde_json::from_value::<Attributes>(value).is_err());
    }

    #[test]
    fn position_compatibility_falls_off_with_distance() {
        assert!((Position::PG.compatibility(Position::PG) - 1.0).abs() < f64::EPSILON);
        assert!((Position::PG.compatibility(Position::SG) - 0.7).abs() < f64::EPSILON);
        assert!((Position::C.compatibility(Position::SF) - 0.4).abs() < f64::EPSILON);
        assert!((Position::C.compatibility(Position::PG) - 0.2).abs() < f64::EPSILON);
        assert_eq!("pf".parse::<Position>(), Ok(Position::PF));
        assert!("G".parse::<Position>().is_err());
    }
}
