//! Structured skills built from cached records, and the cast-time model.

use crate::error::{Error, LookupError, Result};
use crate::model::{
    CharacterStats, SkillData, SkillLevelInfo, SkillMeta, SkillRecord, SkillType, SpeedDependency,
};
use crate::skill_db::SkillDatabase;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_SPEED_COEFF: f64 = 1.0;

/// Converts one cached record into [`SkillData`]. Called per lookup; the
/// result is not cached.
pub fn load_skill(db: &SkillDatabase, job_grow_id: &str, skill_id: &str) -> Result<SkillData> {
    let raw = db.skill_record(job_grow_id, skill_id)?;
    Ok(skill_data_from_record(skill_id, &raw)?)
}

pub fn skill_data_from_record(
    skill_id: &str,
    raw: &SkillRecord,
) -> Result<SkillData, LookupError> {
    let levels = raw
        .levels
        .iter()
        .map(|(level, values)| {
            let level = level
                .trim()
                .parse::<u32>()
                .map_err(|_| LookupError::InvalidLevel {
                    skill_id: skill_id.to_string(),
                    level: level.clone(),
                })?;
            Ok((level, SkillLevelInfo::new(values.clone())))
        })
        .collect::<Result<BTreeMap<_, _>, LookupError>>()?;

    Ok(SkillData {
        skill_id: skill_id.to_string(),
        name: raw.skill_name.clone(),
        skill_type: SkillType::from(raw.skill_type.as_str()),
        description: raw.option_desc.clone(),
        levels,
        speed_coeff: raw.speed_coeff.unwrap_or(DEFAULT_SPEED_COEFF),
        speed_dependency: raw.speed_dependency,
    })
}

/// A skill with its hand-curated timing data attached.
#[derive(Debug, Clone, PartialEq)]
pub struct FullSkill {
    pub data: SkillData,
    pub meta: SkillMeta,
}

impl FullSkill {
    pub fn new(data: SkillData, meta: SkillMeta) -> Self {
        Self { data, meta }
    }

    /// Cast time under the given stats.
    ///
    /// Only the `speed_coeff` part scales with speed; `base_cast_time` is a
    /// fixed addend.
    pub fn cast_time(&self, stats: &CharacterStats) -> f64 {
        let factor = match self.data.speed_dependency {
            Some(SpeedDependency::Attack) => 1.0 + stats.attack_speed / 100.0,
            Some(SpeedDependency::Cast) => 1.0 + stats.cast_speed / 100.0,
            None => 1.0,
        };
        self.meta.base_cast_time + self.data.speed_coeff / factor
    }
}

/// skillId to its meta, as stored in `<data_path>/meta/<jobGrowName>.json`.
pub type MetaTable = BTreeMap<String, SkillMeta>;

/// Reads a meta file. A missing file is an empty table: meta is optional.
pub fn load_meta_file(path: &Path) -> Result<MetaTable> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no skill meta file");
        return Ok(MetaTable::new());
    }
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Loads a skill and pairs it with its meta entry, falling back to
/// `SkillMeta::default()` when the table has none.
pub fn load_full_skill(
    db: &SkillDatabase,
    meta: &MetaTable,
    job_grow_id: &str,
    skill_id: &str,
) -> Result<FullSkill> {
    let data = load_skill(db, job_grow_id, skill_id)?;
    let meta = meta.get(skill_id).cloned().unwrap_or_default();
    Ok(FullSkill::new(data, meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionValues;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(levels: &[&str]) -> SkillRecord {
        SkillRecord {
            skill_name: "Ghost Slash".into(),
            skill_type: "active".into(),
            option_desc: "Damage: {value1}%".into(),
            levels: levels
                .iter()
                .map(|l| {
                    (
                        l.to_string(),
                        OptionValues::from([("value1".into(), Some(100.0))]),
                    )
                })
                .collect(),
            speed_coeff: None,
            speed_dependency: None,
        }
    }

    fn skill(base: f64, coeff: f64, dependency: Option<SpeedDependency>) -> FullSkill {
        let mut data = skill_data_from_record("s1", &record(&["1"])).unwrap();
        data.speed_coeff = coeff;
        data.speed_dependency = dependency;
        FullSkill::new(
            data,
            SkillMeta {
                base_cast_time: base,
                ..SkillMeta::default()
            },
        )
    }

    #[test]
    fn test_levels_become_integers() {
        let data = skill_data_from_record("s1", &record(&["1", "10", "2", "40"])).unwrap();
        assert_eq!(data.levels.keys().copied().collect::<Vec<_>>(), [1, 2, 10, 40]);
        assert_eq!(data.max_level(), Some(40));
        assert_eq!(data.level(10).and_then(|l| l.value("value1")), Some(100.0));
        assert_eq!(data.skill_type, SkillType::Active);
        assert_eq!(data.description, "Damage: {value1}%");
    }

    #[test]
    fn test_missing_speed_fields_default() {
        let data = skill_data_from_record("s1", &record(&["1"])).unwrap();
        assert_eq!(data.speed_coeff, 1.0);
        assert_eq!(data.speed_dependency, None);
    }

    #[test]
    fn test_non_numeric_level_is_rejected() {
        let err = skill_data_from_record("s1", &record(&["1", "max"])).unwrap_err();
        assert_eq!(
            err,
            LookupError::InvalidLevel {
                skill_id: "s1".into(),
                level: "max".into()
            }
        );
    }

    #[test]
    fn test_cast_time_attack_dependency() {
        let skill = skill(0.5, 2.0, Some(SpeedDependency::Attack));
        let stats = CharacterStats {
            attack_speed: 50.0,
            cast_speed: 200.0,
        };
        let expected = 0.5 + 2.0 / 1.5;
        assert!((skill.cast_time(&stats) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_cast_time_cast_dependency() {
        let skill = skill(0.25, 3.0, Some(SpeedDependency::Cast));
        let stats = CharacterStats {
            attack_speed: 0.0,
            cast_speed: 100.0,
        };
        assert!((skill.cast_time(&stats) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_cast_time_without_dependency_ignores_stats() {
        let skill = skill(0.5, 2.0, None);
        let stats = CharacterStats {
            attack_speed: 80.0,
            cast_speed: 120.0,
        };
        assert_eq!(skill.cast_time(&stats), 2.5);
        assert_eq!(skill.cast_time(&CharacterStats::default()), 2.5);
    }

    #[test]
    fn test_load_skill_from_unpopulated_db_fails() {
        let db = SkillDatabase::new("unused");
        let err = load_skill(&db, "g1", "s1").unwrap_err();
        assert!(matches!(err, Error::Lookup(LookupError::JobGrow(_))));
    }

    #[test]
    fn test_load_full_skill_pairs_meta() {
        use crate::api::fake::FakeApi;

        let tmp = TempDir::new().unwrap();
        let api = FakeApi::new()
            .with(
                "/skills/j1?jobGrowId=g1",
                json!({"skills": [{"skillId": "s1", "name": "Wave"}, {"skillId": "s2", "name": "Guard"}]}),
            )
            .with(
                "/skills/j1/s1",
                json!({"type": "active", "levelInfo": {"optionDesc": "", "rows": [{"level": 1, "optionValue": {"value1": 5}}]}}),
            )
            .with(
                "/skills/j1/s2",
                json!({"type": "passive", "levelInfo": {"optionDesc": "", "rows": []}}),
            );
        let mut db = SkillDatabase::new(tmp.path());
        db.ensure_cached(&api, "j1", "g1", "job", "grow");

        let meta = MetaTable::from([(
            "s1".to_string(),
            SkillMeta {
                base_cast_time: 0.5,
                ..SkillMeta::default()
            },
        )]);

        let wave = load_full_skill(&db, &meta, "g1", "s1").unwrap();
        assert_eq!(wave.data.name, "Wave");
        assert_eq!(wave.meta.base_cast_time, 0.5);
        assert_eq!(wave.cast_time(&CharacterStats::default()), 1.5);

        let guard = load_full_skill(&db, &meta, "g1", "s2").unwrap();
        assert_eq!(guard.data.skill_type, SkillType::Passive);
        assert_eq!(guard.meta, SkillMeta::default());
        assert!(guard.data.levels.is_empty());
    }

    #[test]
    fn test_meta_file_missing_is_empty() {
        let tmp = TempDir::new().unwrap();
        let table = load_meta_file(&tmp.path().join("nope.json")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_meta_file_parses_entries() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("grow.json");
        fs::write(
            &path,
            json!({
                "s1": {"cooldown": 6.0, "baseCastTime": 0.4, "delayAfter": 0.2,
                       "isInstall": true, "mergeRules": ["s2"]}
            })
            .to_string(),
        )
        .unwrap();

        let table = load_meta_file(&path).unwrap();
        let meta = &table["s1"];
        assert_eq!(meta.cooldown, 6.0);
        assert_eq!(meta.base_cast_time, 0.4);
        assert!(meta.is_install);
        assert!(meta.merge_rules.contains("s2"));
    }
}
