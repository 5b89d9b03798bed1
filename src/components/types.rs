use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an entry in one of the external catalogs (weapon types, gases, progs, ...).
pub type CatalogId = u64;

/// Identifier of a physical item in the world.
pub type ItemId = u64;

/// Identifies one revision of one prototype.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtoKey {
    pub id: u64,
    pub revision: u32,
}

impl ProtoKey {
    pub fn new(id: u64, revision: u32) -> Self {
        Self { id, revision }
    }
}

impl fmt::Display for ProtoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}r{}", self.id, self.revision)
    }
}

/// Approval lifecycle of a prototype revision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RevisionStatus {
    Draft,
    Current,
    Superseded,
}

impl fmt::Display for RevisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RevisionStatus::Draft => "Draft",
            RevisionStatus::Current => "Current",
            RevisionStatus::Superseded => "Superseded",
        };
        f.write_str(text)
    }
}

/// Normalise free text for enum lookups: lower case, no spaces, dashes or underscores.
fn squash(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    Tiny,
    VerySmall,
    Small,
    Medium,
    Large,
    VeryLarge,
    Huge,
    Enormous,
}

impl SizeCategory {
    pub const ALL: [SizeCategory; 8] = [
        SizeCategory::Tiny,
        SizeCategory::VerySmall,
        SizeCategory::Small,
        SizeCategory::Medium,
        SizeCategory::Large,
        SizeCategory::VeryLarge,
        SizeCategory::Huge,
        SizeCategory::Enormous,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SizeCategory::Tiny => "Tiny",
            SizeCategory::VerySmall => "Very Small",
            SizeCategory::Small => "Small",
            SizeCategory::Medium => "Medium",
            SizeCategory::Large => "Large",
            SizeCategory::VeryLarge => "Very Large",
            SizeCategory::Huge => "Huge",
            SizeCategory::Enormous => "Enormous",
        }
    }

    /// Comma separated list of every size, for corrective prompts.
    pub fn options() -> String {
        Self::ALL
            .iter()
            .map(|size| size.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SizeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = squash(s);
        if let Ok(index) = key.parse::<usize>() {
            return Self::ALL
                .get(index)
                .copied()
                .ok_or_else(|| format!("There is no size with index {}.", index));
        }
        if key == "normal" {
            return Ok(SizeCategory::Medium);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|size| squash(size.name()) == key)
            .ok_or_else(|| {
                format!(
                    "That is not a valid size. Valid sizes are: {}.",
                    Self::options()
                )
            })
    }
}

/// Check difficulty used for things like stealthy draws or implant installation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Automatic,
    Trivial,
    ExtremelyEasy,
    VeryEasy,
    Easy,
    Normal,
    Hard,
    VeryHard,
    ExtremelyHard,
    Insane,
    Impossible,
}

impl Difficulty {
    pub const ALL: [Difficulty; 11] = [
        Difficulty::Automatic,
        Difficulty::Trivial,
        Difficulty::ExtremelyEasy,
        Difficulty::VeryEasy,
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::VeryHard,
        Difficulty::ExtremelyHard,
        Difficulty::Insane,
        Difficulty::Impossible,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Automatic => "Automatic",
            Difficulty::Trivial => "Trivial",
            Difficulty::ExtremelyEasy => "Extremely Easy",
            Difficulty::VeryEasy => "Very Easy",
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::VeryHard => "Very Hard",
            Difficulty::ExtremelyHard => "Extremely Hard",
            Difficulty::Insane => "Insane",
            Difficulty::Impossible => "Impossible",
        }
    }

    pub fn options() -> String {
        Self::ALL
            .iter()
            .map(|difficulty| difficulty.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = squash(s);
        if let Ok(index) = key.parse::<usize>() {
            return Self::ALL
                .get(index)
                .copied()
                .ok_or_else(|| format!("There is no difficulty with index {}.", index));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|difficulty| squash(difficulty.name()) == key)
            .ok_or_else(|| {
                format!(
                    "That is not a valid difficulty. Valid difficulties are: {}.",
                    Self::options()
                )
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorGender {
    Male,
    Female,
    Neuter,
}

impl fmt::Display for ConnectorGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectorGender::Male => "Male",
            ConnectorGender::Female => "Female",
            ConnectorGender::Neuter => "Neuter",
        };
        f.write_str(text)
    }
}

impl FromStr for ConnectorGender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match squash(s).as_str() {
            "male" | "m" => Ok(ConnectorGender::Male),
            "female" | "f" => Ok(ConnectorGender::Female),
            "neuter" | "n" | "none" => Ok(ConnectorGender::Neuter),
            _ => Err(format!(
                "'{}' is not a connector gender. Use male, female or neuter.",
                s
            )),
        }
    }
}

/// A `(gender, type-name)` compatibility tag for power, gas and mechanical connections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ConnectorType {
    pub gender: ConnectorGender,
    pub connection_type: String,
}

impl ConnectorType {
    pub fn new(gender: ConnectorGender, connection_type: impl Into<String>) -> Self {
        Self {
            gender,
            connection_type: connection_type.into(),
        }
    }

    /// Male mates only with female, neuter mates with anything; the type names must agree.
    pub fn can_connect(&self, other: &ConnectorType) -> bool {
        if !self
            .connection_type
            .eq_ignore_ascii_case(&other.connection_type)
        {
            return false;
        }
        match (self.gender, other.gender) {
            (ConnectorGender::Neuter, _) | (_, ConnectorGender::Neuter) => true,
            (ConnectorGender::Male, ConnectorGender::Female)
            | (ConnectorGender::Female, ConnectorGender::Male) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.connection_type, self.gender)
    }
}

/// Structural contract for anything exposing connectors; neither side needs the other's type.
pub trait Connectable {
    fn connectors(&self) -> Vec<ConnectorType>;

    /// True when any connector on `self` mates with any connector on `other`.
    fn can_connect_to(&self, other: &dyn Connectable) -> bool {
        let theirs = other.connectors();
        self.connectors()
            .iter()
            .any(|mine| theirs.iter().any(|connector| mine.can_connect(connector)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_parses_names_spacing_and_indexes() {
        assert_eq!("medium".parse::<SizeCategory>(), Ok(SizeCategory::Medium));
        assert_eq!("very small".parse::<SizeCategory>(), Ok(SizeCategory::VerySmall));
        assert_eq!("Very_Large".parse::<SizeCategory>(), Ok(SizeCategory::VeryLarge));
        assert_eq!("normal".parse::<SizeCategory>(), Ok(SizeCategory::Medium));
        assert_eq!("2".parse::<SizeCategory>(), Ok(SizeCategory::Small));
        assert!("gargantuan".parse::<SizeCategory>().is_err());
        assert!("99".parse::<SizeCategory>().is_err());
    }

    #[test]
    fn difficulty_display_matches_parse() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.name().parse::<Difficulty>(), Ok(difficulty));
        }
    }

    #[test]
    fn connector_matching_rules() {
        let male = ConnectorType::new(ConnectorGender::Male, "Power");
        let female = ConnectorType::new(ConnectorGender::Female, "power");
        let neuter = ConnectorType::new(ConnectorGender::Neuter, "Power");
        let other_female = ConnectorType::new(ConnectorGender::Female, "Gas");

        assert!(male.can_connect(&female));
        assert!(female.can_connect(&male));
        assert!(neuter.can_connect(&male));
        assert!(neuter.can_connect(&female));
        assert!(neuter.can_connect(&neuter));
        assert!(!male.can_connect(&male));
        assert!(!female.can_connect(&female));
        assert!(!male.can_connect(&other_female));
    }

    #[test]
    fn proto_key_display() {
        assert_eq!(ProtoKey::new(12, 3).to_string(), "#12r3");
    }
}
