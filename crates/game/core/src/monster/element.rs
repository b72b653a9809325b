//! Elemental types and their strength chart.

/// Elemental type carried by monsters and techniques.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display, strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Element {
    Aether,
    Normal,
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

/// Row of the type chart for a defending element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeChart {
    pub strong_attack: Option<Element>,
    pub weak_attack: Option<Element>,
    /// Attacking element that deals double damage.
    pub extra_damage: Option<Element>,
    /// Attacking element that deals half damage.
    pub resist_damage: Option<Element>,
}

impl Element {
    pub const fn chart(self) -> TypeChart {
        use Element::*;
        let (strong, weak, extra, resist) = match self {
            Aether | Normal => (None, None, None, None),
            Wood => (Some(Earth), Some(Fire), Some(Metal), Some(Water)),
            Fire => (Some(Metal), Some(Earth), Some(Water), Some(Wood)),
            Earth => (Some(Water), Some(Metal), Some(Wood), Some(Fire)),
            Metal => (Some(Wood), Some(Water), Some(Fire), Some(Earth)),
            Water => (Some(Fire), Some(Wood), Some(Earth), Some(Metal)),
        };
        TypeChart {
            strong_attack: strong,
            weak_attack: weak,
            extra_damage: extra,
            resist_damage: resist,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
