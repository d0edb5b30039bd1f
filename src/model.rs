//! Shared data model: cached skill records, structured skills and character stats.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Option key (`value1`, `value2`, ...) to numeric value for one skill level.
/// The API sends `null` for options that do not apply at a level.
pub type OptionValues = BTreeMap<String, Option<f64>>;

/// One skill as persisted in `<jobName>/<jobGrowName>.json`, keyed by skill id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    pub skill_name: String,
    /// `"active"` or `"passive"`.
    pub skill_type: String,
    /// Human-readable description with `{value1}`-style placeholders.
    pub option_desc: String,
    /// Level number (as a string, the way JSON object keys are stored) to its
    /// option values.
    pub levels: BTreeMap<String, OptionValues>,
    #[serde(default)]
    pub speed_coeff: Option<f64>,
    #[serde(default)]
    pub speed_dependency: Option<SpeedDependency>,
}

/// All cached skills of one job grow, keyed by skill id, kept as the JSON
/// found on disk. Entries become [`SkillRecord`]s one at a time on lookup,
/// so a hand-edited entry that no longer parses only affects itself.
pub type SkillBatch = serde_json::Map<String, Value>;

/// Which character stat shortens a skill's scalable cast time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedDependency {
    Attack,
    Cast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillType {
    Active,
    Passive,
    Other(String),
}

impl From<&str> for SkillType {
    fn from(value: &str) -> Self {
        match value {
            "active" => SkillType::Active,
            "passive" => SkillType::Passive,
            other => SkillType::Other(other.to_string()),
        }
    }
}

/// Option values of a single skill level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillLevelInfo {
    pub values: OptionValues,
}

impl SkillLevelInfo {
    pub fn new(values: OptionValues) -> Self {
        Self { values }
    }

    /// Numeric value of `key`, or `None` when absent or null at this level.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied().flatten()
    }
}

/// Structured view of a [`SkillRecord`] with integer level numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillData {
    pub skill_id: String,
    pub name: String,
    pub skill_type: SkillType,
    pub description: String,
    pub levels: BTreeMap<u32, SkillLevelInfo>,
    /// Portion of the cast time that scales with speed stats.
    pub speed_coeff: f64,
    pub speed_dependency: Option<SpeedDependency>,
}

impl SkillData {
    pub fn level(&self, level: u32) -> Option<&SkillLevelInfo> {
        self.levels.get(&level)
    }

    pub fn max_level(&self) -> Option<u32> {
        self.levels.keys().next_back().copied()
    }
}

/// Timing and interaction data the remote API does not provide. Read from a
/// hand-curated file; see [`crate::skill::load_meta_file`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillMeta {
    pub cooldown: f64,
    pub base_cast_time: f64,
    /// Lockout after the cast completes.
    pub delay_after: f64,
    pub is_install: bool,
    /// Skills this skill's after-delay may be cancelled into.
    pub cancel_rules: BTreeSet<String>,
    /// Skills this skill may merge with mid-cast.
    pub merge_rules: BTreeSet<String>,
}

/// Speed bonuses in percent, as shown on the character status screen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CharacterStats {
    pub attack_speed: f64,
    pub cast_speed: f64,
}

const ATTACK_SPEED_STATUS: &str = "공격 속도";
const CAST_SPEED_STATUS: &str = "캐스팅 속도";

impl CharacterStats {
    /// Extracts speed stats from a character status response, whose `status`
    /// array holds `{ "name": ..., "value": ... }` rows. Missing rows read as 0.
    pub fn from_status(status: &Value) -> Self {
        let mut stats = Self::default();
        let rows = status
            .get("status")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for row in rows {
            let Some(name) = row.get("name").and_then(Value::as_str) else {
                continue;
            };
            let value = row.get("value").and_then(Value::as_f64).unwrap_or(0.0);
            match name {
                ATTACK_SPEED_STATUS => stats.attack_speed = value,
                CAST_SPEED_STATUS => stats.cast_speed = value,
                _ => {}
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_defaults_speed_fields_when_absent() {
        let record: SkillRecord = serde_json::from_value(json!({
            "skillName": "Upper Slash",
            "skillType": "active",
            "optionDesc": "Damage: {value1}%",
            "levels": {"1": {"value1": 120.0}}
        }))
        .unwrap();
        assert_eq!(record.speed_coeff, None);
        assert_eq!(record.speed_dependency, None);
    }

    #[test]
    fn test_record_accepts_null_option_values() {
        let record: SkillRecord = serde_json::from_value(json!({
            "skillName": "Guard",
            "skillType": "passive",
            "optionDesc": "",
            "levels": {"1": {"value1": null, "value2": 3}},
            "speedCoeff": 1,
            "speedDependency": "cast"
        }))
        .unwrap();
        assert_eq!(record.levels["1"]["value1"], None);
        assert_eq!(record.levels["1"]["value2"], Some(3.0));
        assert_eq!(record.speed_dependency, Some(SpeedDependency::Cast));
    }

    #[test]
    fn test_skill_type_from_str() {
        assert_eq!(SkillType::from("active"), SkillType::Active);
        assert_eq!(SkillType::from("passive"), SkillType::Passive);
        assert_eq!(SkillType::from("buff"), SkillType::Other("buff".into()));
    }

    #[test]
    fn test_meta_defaults_missing_fields() {
        let meta: SkillMeta = serde_json::from_value(json!({
            "baseCastTime": 0.5,
            "cancelRules": ["s2"]
        }))
        .unwrap();
        assert_eq!(meta.base_cast_time, 0.5);
        assert_eq!(meta.cooldown, 0.0);
        assert!(!meta.is_install);
        assert!(meta.cancel_rules.contains("s2"));
        assert!(meta.merge_rules.is_empty());
    }

    #[test]
    fn test_character_stats_from_status() {
        let status = json!({
            "characterId": "abc",
            "status": [
                {"name": "HP", "value": 100000},
                {"name": "공격 속도", "value": 45.2},
                {"name": "캐스팅 속도", "value": 60}
            ]
        });
        let stats = CharacterStats::from_status(&status);
        assert_eq!(stats.attack_speed, 45.2);
        assert_eq!(stats.cast_speed, 60.0);
    }

    #[test]
    fn test_character_stats_missing_rows_are_zero() {
        let stats = CharacterStats::from_status(&json!({"status": []}));
        assert_eq!(stats, CharacterStats::default());
        assert_eq!(CharacterStats::from_status(&json!({})), CharacterStats::default());
    }
}
