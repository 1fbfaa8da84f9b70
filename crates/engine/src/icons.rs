//! Category icons.
//!
//! Icons form a closed set. Stored values, legacy emoji and legacy icon
//! library names are resolved through [`ICON_ALIASES`]; anything unknown
//! falls back to [`CategoryIcon::Other`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CategoryIcon {
    Food,
    Transport,
    Shopping,
    Housing,
    Entertainment,
    Health,
    Education,
    Salary,
    Gift,
    Travel,
    Bills,
    Savings,
    #[default]
    Other,
}

/// Lookup table from accepted spellings to an icon. Keys are compared
/// case-insensitively after trimming.
const ICON_ALIASES: &[(&str, CategoryIcon)] = &[
    ("food", CategoryIcon::Food),
    ("🍔", CategoryIcon::Food),
    ("utensils", CategoryIcon::Food),
    ("transport", CategoryIcon::Transport),
    ("🚗", CategoryIcon::Transport),
    ("car", CategoryIcon::Transport),
    ("bus", CategoryIcon::Transport),
    ("shopping", CategoryIcon::Shopping),
    ("🛍️", CategoryIcon::Shopping),
    ("🛍", CategoryIcon::Shopping),
    ("shoppingbag", CategoryIcon::Shopping),
    ("shoppingcart", CategoryIcon::Shopping),
    ("housing", CategoryIcon::Housing),
    ("🏠", CategoryIcon::Housing),
    ("home", CategoryIcon::Housing),
    ("house", CategoryIcon::Housing),
    ("entertainment", CategoryIcon::Entertainment),
    ("🎬", CategoryIcon::Entertainment),
    ("film", CategoryIcon::Entertainment),
    ("gamepad2", CategoryIcon::Entertainment),
    ("health", CategoryIcon::Health),
    ("❤️", CategoryIcon::Health),
    ("❤", CategoryIcon::Health),
    ("heart", CategoryIcon::Health),
    ("heartpulse", CategoryIcon::Health),
    ("education", CategoryIcon::Education),
    ("📚", CategoryIcon::Education),
    ("book", CategoryIcon::Education),
    ("graduationcap", CategoryIcon::Education),
    ("salary", CategoryIcon::Salary),
    ("💰", CategoryIcon::Salary),
    ("briefcase", CategoryIcon::Salary),
    ("banknote", CategoryIcon::Salary),
    ("gift", CategoryIcon::Gift),
    ("🎁", CategoryIcon::Gift),
    ("travel", CategoryIcon::Travel),
    ("✈️", CategoryIcon::Travel),
    ("plane", CategoryIcon::Travel),
    ("bills", CategoryIcon::Bills),
    ("🧾", CategoryIcon::Bills),
    ("receipt", CategoryIcon::Bills),
    ("zap", CategoryIcon::Bills),
    ("savings", CategoryIcon::Savings),
    ("🐷", CategoryIcon::Savings),
    ("piggybank", CategoryIcon::Savings),
    ("other", CategoryIcon::Other),
    ("🤷", CategoryIcon::Other),
    ("helpcircle", CategoryIcon::Other),
];

impl CategoryIcon {
    pub const ALL: [CategoryIcon; 13] = [
        Self::Food,
        Self::Transport,
        Self::Shopping,
        Self::Housing,
        Self::Entertainment,
        Self::Health,
        Self::Education,
        Self::Salary,
        Self::Gift,
        Self::Travel,
        Self::Bills,
        Self::Savings,
        Self::Other,
    ];

    /// Canonical key stored in the database and used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Shopping => "shopping",
            Self::Housing => "housing",
            Self::Entertainment => "entertainment",
            Self::Health => "health",
            Self::Education => "education",
            Self::Salary => "salary",
            Self::Gift => "gift",
            Self::Travel => "travel",
            Self::Bills => "bills",
            Self::Savings => "savings",
            Self::Other => "other",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Food => "🍔",
            Self::Transport => "🚗",
            Self::Shopping => "🛍️",
            Self::Housing => "🏠",
            Self::Entertainment => "🎬",
            Self::Health => "❤️",
            Self::Education => "📚",
            Self::Salary => "💰",
            Self::Gift => "🎁",
            Self::Travel => "✈️",
            Self::Bills => "🧾",
            Self::Savings => "🐷",
            Self::Other => "🤷",
        }
    }

    /// Resolves any accepted spelling, returning `None` when unknown.
    pub fn lookup(value: &str) -> Option<Self> {
        let key: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        ICON_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, icon)| *icon)
    }

    /// Resolves any accepted spelling, falling back to [`CategoryIcon::Other`].
    pub fn resolve(value: &str) -> Self {
        Self::lookup(value).unwrap_or_default()
    }
}

impl fmt::Display for CategoryIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CategoryIcon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CategoryIcon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::resolve(&raw))
    }
}
