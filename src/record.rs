#![allow(dead_code)]

use serde::{Deserialize, Serialize, Serializer};

const STAT_TIER_THRESHOLDS: [u32; 5] = [150, 120, 100, 90, 60];
const AGGREGATE_TIER_THRESHOLDS: [u32; 5] = [700, 600, 500, 400, 300];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    I,
    II,
    III,
    IV,
    V,
    VI,
}

impl Tier {
    const ORDER: [Tier; 6] = [Tier::I, Tier::II, Tier::III, Tier::IV, Tier::V, Tier::VI];

    pub fn aggregate_label(self) -> &'static str {
        match self {
            Tier::I => "Legendary",
            Tier::II => "Excellent",
            Tier::III => "Good",
            Tier::IV => "Average",
            Tier::V => "Below Average",
            Tier::VI => "Poor",
        }
    }

    fn from_thresholds(value: u32, thresholds: &[u32; 5]) -> Tier {
        thresholds
            .iter()
            .position(|threshold| value >= *threshold)
            .map(|idx| Self::ORDER[idx])
            .unwrap_or(Tier::VI)
    }
}

/// Tier of a single base stat, evaluated from the highest threshold down.
pub fn stat_tier(value: u32) -> Tier {
    Tier::from_thresholds(value, &STAT_TIER_THRESHOLDS)
}

/// Tier of a base stat total. The scale is wider than [`stat_tier`] because a
/// total spans six stats.
pub fn aggregate_tier(value: u32) -> Tier {
    Tier::from_thresholds(value, &AGGREGATE_TIER_THRESHOLDS)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpAtk,
    SpDef,
    Speed,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::SpAtk,
        Stat::SpDef,
        Stat::Speed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stat::Hp => "HP",
            Stat::Attack => "Attack",
            Stat::Defense => "Defense",
            Stat::SpAtk => "Sp Atk",
            Stat::SpDef => "Sp Def",
            Stat::Speed => "Speed",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Stat::Hp => 0,
            Stat::Attack => 1,
            Stat::Defense => 2,
            Stat::SpAtk => 3,
            Stat::SpDef => 4,
            Stat::Speed => 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextKind {
    Ability,
    Type,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextField {
    Ability1,
    Ability2,
    HiddenAbility,
    Type1,
    Type2,
}

impl TextField {
    pub const ALL: [TextField; 5] = [
        TextField::Ability1,
        TextField::Ability2,
        TextField::HiddenAbility,
        TextField::Type1,
        TextField::Type2,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextField::Ability1 => "Ability 1",
            TextField::Ability2 => "Ability 2",
            TextField::HiddenAbility => "Hidden Ability",
            TextField::Type1 => "Type 1",
            TextField::Type2 => "Type 2",
        }
    }

    pub fn kind(self) -> TextKind {
        match self {
            TextField::Ability1 | TextField::Ability2 | TextField::HiddenAbility => {
                TextKind::Ability
            }
            TextField::Type1 | TextField::Type2 => TextKind::Type,
        }
    }

    pub fn index(self) -> usize {
        match self {
            TextField::Ability1 => 0,
            TextField::Ability2 => 1,
            TextField::HiddenAbility => 2,
            TextField::Type1 => 3,
            TextField::Type2 => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatBlock([u32; 6]);

impl StatBlock {
    pub fn new(values: [u32; 6]) -> Self {
        Self(values)
    }

    pub fn get(&self, stat: Stat) -> u32 {
        self.0[stat.index()]
    }

    pub fn set(&mut self, stat: Stat, value: u32) {
        self.0[stat.index()] = value;
    }

    pub fn total(&self) -> u32 {
        self.0.iter().fold(0u32, |acc, value| acc.saturating_add(*value))
    }
}

/// One creature entry. The base stat total is always derived from `stats`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "RecordJson")]
pub struct Record {
    pub id: u32,
    pub name: String,
    pub type_1: Option<String>,
    pub type_2: Option<String>,
    pub ability_1: Option<String>,
    pub ability_2: Option<String>,
    pub hidden_ability: Option<String>,
    pub stats: StatBlock,
}

impl Record {
    pub fn aggregate(&self) -> u32 {
        self.stats.total()
    }

    pub fn text(&self, field: TextField) -> Option<&str> {
        let value = match field {
            TextField::Ability1 => &self.ability_1,
            TextField::Ability2 => &self.ability_2,
            TextField::HiddenAbility => &self.hidden_ability,
            TextField::Type1 => &self.type_1,
            TextField::Type2 => &self.type_2,
        };
        value.as_deref()
    }

    pub fn set_text(&mut self, field: TextField, value: Option<String>) {
        let value = value.filter(|text| !text.is_empty());
        match field {
            TextField::Ability1 => self.ability_1 = value,
            TextField::Ability2 => self.ability_2 = value,
            TextField::HiddenAbility => self.hidden_ability = value,
            TextField::Type1 => self.type_1 = value,
            TextField::Type2 => self.type_2 = value,
        }
    }
}

#[derive(Deserialize)]
struct RecordJson {
    #[serde(rename = "#")]
    id: u32,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type 1", default)]
    type_1: Option<String>,
    #[serde(rename = "Type 2", default)]
    type_2: Option<String>,
    #[serde(rename = "Ability 1", default)]
    ability_1: Option<String>,
    #[serde(rename = "Ability 2", default)]
    ability_2: Option<String>,
    #[serde(rename = "Hidden Ability", default)]
    hidden_ability: Option<String>,
    #[serde(rename = "HP", default)]
    hp: Option<u32>,
    #[serde(rename = "Attack", default)]
    attack: Option<u32>,
    #[serde(rename = "Defense", default)]
    defense: Option<u32>,
    #[serde(rename = "Sp Atk", default)]
    sp_atk: Option<u32>,
    #[serde(rename = "Sp Def", default)]
    sp_def: Option<u32>,
    #[serde(rename = "Speed", default)]
    speed: Option<u32>,
}

impl From<RecordJson> for Record {
    fn from(entry: RecordJson) -> Self {
        let non_empty = |value: Option<String>| value.filter(|text| !text.is_empty());
        Record {
            id: entry.id,
            name: entry.name,
            type_1: non_empty(entry.type_1),
            type_2: non_empty(entry.type_2),
            ability_1: non_empty(entry.ability_1),
            ability_2: non_empty(entry.ability_2),
            hidden_ability: non_empty(entry.hidden_ability),
            stats: StatBlock::new([
                entry.hp.unwrap_or(0),
                entry.attack.unwrap_or(0),
                entry.defense.unwrap_or(0),
                entry.sp_atk.unwrap_or(0),
                entry.sp_def.unwrap_or(0),
                entry.speed.unwrap_or(0),
            ]),
        }
    }
}

#[derive(Serialize)]
struct RecordExport<'a> {
    #[serde(rename = "#")]
    id: u32,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Ability 1")]
    ability_1: Option<&'a str>,
    #[serde(rename = "Ability 2")]
    ability_2: Option<&'a str>,
    #[serde(rename = "Hidden Ability")]
    hidden_ability: Option<&'a str>,
    #[serde(rename = "Type 1")]
    type_1: Option<&'a str>,
    #[serde(rename = "Type 2")]
    type_2: Option<&'a str>,
    #[serde(rename = "HP")]
    hp: u32,
    #[serde(rename = "Attack")]
    attack: u32,
    #[serde(rename = "Defense")]
    defense: u32,
    #[serde(rename = "Sp Atk")]
    sp_atk: u32,
    #[serde(rename = "Sp Def")]
    sp_def: u32,
    #[serde(rename = "Speed")]
    speed: u32,
    #[serde(rename = "BST")]
    bst: u32,
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RecordExport {
            id: self.id,
            name: &self.name,
            ability_1: self.ability_1.as_deref(),
            ability_2: self.ability_2.as_deref(),
            hidden_ability: self.hidden_ability.as_deref(),
            type_1: self.type_1.as_deref(),
            type_2: self.type_2.as_deref(),
            hp: self.stats.get(Stat::Hp),
            attack: self.stats.get(Stat::Attack),
            defense: self.stats.get(Stat::Defense),
            sp_atk: self.stats.get(Stat::SpAtk),
            sp_def: self.stats.get(Stat::SpDef),
            speed: self.stats.get(Stat::Speed),
            bst: self.aggregate(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
pub(crate) fn sample_record(name: &str, stats: [u32; 6]) -> Record {
    Record {
        id: 1,
        name: name.to_string(),
        type_1: Some("Grass".to_string()),
        type_2: Some("Poison".to_string()),
        ability_1: Some("Overgrow".to_string()),
        ability_2: None,
        hidden_ability: Some("Chlorophyll".to_string()),
        stats: StatBlock::new(stats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_tier_boundaries_are_inclusive() {
        assert_eq!(stat_tier(150), Tier::I);
        assert_eq!(stat_tier(149), Tier::II);
        assert_eq!(stat_tier(120), Tier::II);
        assert_eq!(stat_tier(100), Tier::III);
        assert_eq!(stat_tier(90), Tier::IV);
        assert_eq!(stat_tier(60), Tier::V);
        assert_eq!(stat_tier(59), Tier::VI);
        assert_eq!(stat_tier(0), Tier::VI);
    }

    #[test]
    fn aggregate_tier_uses_its_own_scale() {
        assert_eq!(aggregate_tier(720), Tier::I);
        assert_eq!(aggregate_tier(600), Tier::II);
        assert_eq!(aggregate_tier(534), Tier::III);
        assert_eq!(aggregate_tier(400), Tier::IV);
        assert_eq!(aggregate_tier(318), Tier::V);
        assert_eq!(aggregate_tier(299), Tier::VI);
        assert_eq!(stat_tier(150), aggregate_tier(700));
        assert_ne!(stat_tier(150), aggregate_tier(150));
    }

    #[test]
    fn missing_stats_count_as_zero() {
        let record: Record = serde_json::from_str(
            r##"{"#": 7, "Name": "Squirtle", "Type 1": "Water", "HP": 44, "Attack": 48, "Speed": null}"##,
        )
        .unwrap();
        assert_eq!(record.stats.get(Stat::Defense), 0);
        assert_eq!(record.stats.get(Stat::Speed), 0);
        assert_eq!(record.aggregate(), 92);
    }

    #[test]
    fn stored_total_in_input_is_ignored() {
        let record: Record = serde_json::from_str(
            r##"{"#": 1, "Name": "Bulbasaur", "HP": 45, "Attack": 49, "Defense": 49,
                "Sp Atk": 65, "Sp Def": 65, "Speed": 45, "BST": 9999}"##,
        )
        .unwrap();
        assert_eq!(record.aggregate(), 318);
    }

    #[test]
    fn empty_strings_load_as_absent() {
        let record: Record = serde_json::from_str(
            r##"{"#": 25, "Name": "Pikachu", "Type 1": "Electric", "Type 2": "", "Ability 2": null}"##,
        )
        .unwrap();
        assert_eq!(record.text(TextField::Type1), Some("Electric"));
        assert_eq!(record.text(TextField::Type2), None);
        assert_eq!(record.text(TextField::Ability2), None);
    }

    #[test]
    fn serialized_record_carries_every_field_and_total() {
        let record = sample_record("Bulbasaur", [45, 49, 49, 65, 65, 45]);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["#"], 1);
        assert_eq!(value["Name"], "Bulbasaur");
        assert_eq!(value["Type 2"], "Poison");
        assert!(value["Ability 2"].is_null());
        assert_eq!(value["Sp Atk"], 65);
        assert_eq!(value["BST"], 318);
        assert_eq!(value.as_object().unwrap().len(), 14);
    }
}
