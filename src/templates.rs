//! Built-in milestone templates applied to new projects.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskTemplate {
    pub title: String,
    pub word_target: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MilestoneTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub tasks: Vec<TaskTemplate>,
}

const PHASES: [&str; 4] = ["Outline", "Draft", "Revise", "Finalize"];

const CORE_CHAPTERS: [(&str, &str, u32); 5] = [
    ("core-introduction", "Introduction", 0),
    ("core-literature-review", "Literature Review", 5500),
    ("core-methodology", "Methodology", 2500),
    ("core-findings", "Findings", 2500),
    ("core-conclusion", "Conclusion", 1500),
];

/// Default word target for a templated task. Only drafting carries one.
fn default_target(phase: &str, chapter_target: u32) -> u32 {
    if phase == "Draft" {
        chapter_target
    } else {
        0
    }
}

/// The five core chapters, each with outline/draft/revise/finalize tasks.
pub fn core_milestones() -> Vec<MilestoneTemplate> {
    CORE_CHAPTERS
        .iter()
        .map(|&(key, name, target)| MilestoneTemplate {
            key,
            name,
            tasks: PHASES
                .iter()
                .map(|phase| TaskTemplate {
                    title: format!("{phase} {}", name.to_lowercase()),
                    word_target: default_target(phase, target),
                })
                .collect(),
        })
        .collect()
}
