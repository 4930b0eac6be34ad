//! Skill estimation from project paths.
//!
//! Path segments are matched against a fixed keyword table. XP from paths
//! with no known segment is credited to a catch-all category.

use std::collections::HashMap;

use serde::Serialize;

use crate::analytics::aggregate::{SkillLevel, classify_skill_level};
use crate::model::{ProgressRecord, ProgressStatus, Transaction};

/// Credited when no path segment is a known keyword.
pub const GENERAL_SKILL: &str = "General Programming";

const SKILL_KEYWORDS: &[(&str, &str)] = &[
    ("go", "Go Programming"),
    ("piscine-go", "Go Programming"),
    ("js", "JavaScript"),
    ("javascript", "JavaScript"),
    ("piscine-js", "JavaScript"),
    ("react", "Frontend Development"),
    ("vue", "Frontend Development"),
    ("angular", "Frontend Development"),
    ("front", "Frontend Development"),
    ("net", ".NET Development"),
    ("blockchain", "Blockchain"),
    ("graphql", "GraphQL & APIs"),
    ("restapi", "REST APIs"),
    ("api", "API Development"),
    ("ux", "UI/UX Design"),
    ("ui", "UI/UX Design"),
    ("forum", "Full Stack Development"),
    ("social-network", "Full Stack Development"),
    ("backend", "Backend Development"),
    ("mongodb", "Database Design"),
    ("sql", "Database Design"),
    ("mysql", "Database Design"),
    ("postgresql", "Database Design"),
    ("docker", "DevOps"),
    ("kubernetes", "DevOps"),
    ("cicd", "DevOps"),
    ("hack", "Cybersecurity"),
    ("cipher", "Cryptography"),
    ("ascii", "Algorithms"),
    ("algorithms", "Algorithms"),
    ("sorting", "Algorithms"),
    ("lem-in", "Algorithms"),
    ("game", "Game Development"),
    ("ai", "Artificial Intelligence"),
    ("ml", "Machine Learning"),
    ("object", "Object-Oriented Programming"),
    ("groupie-tracker", "Web Development"),
    ("web", "Web Development"),
    ("netpractice", "Networking"),
    ("network", "Networking"),
];

/// Skill named by the first path segment that is a known keyword.
pub fn skill_for_path(path: &str) -> Option<&'static str> {
    let lower = path.to_lowercase();
    lower.split('/').find_map(|segment| {
        SKILL_KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == segment)
            .map(|(_, skill)| *skill)
    })
}

/// Derived proficiency for one skill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSkill {
    pub name: String,
    pub total_xp: i64,
    pub project_count: usize,
    pub passed_count: usize,
    /// Share of all XP, 0–100.
    pub percent: f64,
    /// Passed share of projects, 0–100; zero without projects.
    pub pass_rate: f64,
    pub level: SkillLevel,
}

#[derive(Default)]
struct Tally {
    xp: i64,
    projects: usize,
    passed: usize,
}

/// Skills sorted by XP, highest first.
///
/// Progress records only count towards skills that already earned XP.
pub fn aggregate_skills(xp: &[Transaction], progress: &[ProgressRecord]) -> Vec<AggregatedSkill> {
    let mut order: Vec<&'static str> = Vec::new();
    let mut tallies: HashMap<&'static str, Tally> = HashMap::new();

    for tx in xp {
        let skill = skill_for_path(&tx.path).unwrap_or(GENERAL_SKILL);
        tallies
            .entry(skill)
            .or_insert_with(|| {
                order.push(skill);
                Tally::default()
            })
            .xp += tx.amount;
    }

    for record in progress {
        if let Some(skill) = skill_for_path(&record.project_path)
            && let Some(tally) = tallies.get_mut(skill)
        {
            tally.projects += 1;
            if record.status() == ProgressStatus::Passed {
                tally.passed += 1;
            }
        }
    }

    let total: i64 = tallies.values().map(|t| t.xp).sum();

    let mut skills: Vec<AggregatedSkill> = order
        .into_iter()
        .filter_map(|name| {
            let tally = tallies.get(name)?;
            let percent = if total > 0 {
                tally.xp as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            let pass_rate = if tally.projects > 0 {
                tally.passed as f64 / tally.projects as f64 * 100.0
            } else {
                0.0
            };
            Some(AggregatedSkill {
                name: name.to_string(),
                total_xp: tally.xp,
                project_count: tally.projects,
                passed_count: tally.passed,
                percent,
                pass_rate,
                level: classify_skill_level(percent, tally.projects, pass_rate),
            })
        })
        .collect();

    skills.sort_by(|a, b| b.total_xp.cmp(&a.total_xp));
    skills
}
