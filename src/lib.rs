//! df-skilldb: Dungeon & Fighter skill catalog cache and cast-time model.
//!
//! The pipeline runs in three steps: [`jobs::resolve_jobs`] walks each job's
//! advancement chain, [`skill_db::SkillDatabase::populate`] fills the on-disk
//! and in-memory skill cache, and [`skill::load_skill`] turns cached records
//! into structured skills whose cast time [`skill::FullSkill::cast_time`]
//! computes.

pub mod api;
pub mod config;
pub mod error;
pub mod jobs;
pub mod model;
pub mod skill;
pub mod skill_db;
