// crates/aird-pipeline/src/survey.rs
// ============================================================================
// Module: Survey Collaborator
// Description: Question-based requirements scored against rubrics.
// Purpose: Attach non-measurable readiness signals to the report.
// Dependencies: aird-core, serde, serde_yaml, tracing
// ============================================================================

//! ## Overview
//! The survey asks one question per factor (at minimum) and scores each
//! answer against an optional rubric. Answers load from a YAML file keyed
//! by requirement or `factor.requirement`; a missing answer records an em
//! dash. Questions without a rubric pass by default, so an unanswered
//! default survey still passes everywhere.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use aird_core::Factor;
use aird_core::QuestionResult;
use serde::Deserialize;

// ============================================================================
// SECTION: Questions
// ============================================================================

/// Rubric deciding whether an answer passes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rubric {
    /// Pass on yes-like answers (`yes`, `y`, `true`, `1`).
    YesNo,
    /// Pass when the answer is in the accepted set, case-insensitively.
    Choice {
        /// Accepted answers.
        pass_if: Vec<String>,
    },
}

/// One survey question.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Question {
    /// Owning factor.
    pub factor: Factor,
    /// Requirement key the question covers.
    pub requirement: String,
    /// Question text shown to the user.
    pub question: String,
    /// Optional scoring rubric; absent rubrics pass by default.
    #[serde(default)]
    pub rubric: Option<Rubric>,
}

/// Built-in question registry: one question per factor.
#[must_use]
pub fn default_questions() -> Vec<Question> {
    let catalog: [(Factor, &str, &str); 6] = [
        (
            Factor::Clean,
            "quality_rules_documented",
            "Are data quality rules documented and enforced for this source?",
        ),
        (
            Factor::Contextual,
            "business_definitions_present",
            "Do the core tables have documented business definitions and keys?",
        ),
        (
            Factor::Consumable,
            "serving_interface_documented",
            "Is the data served through a stable, documented interface?",
        ),
        (
            Factor::Current,
            "freshness_sla_monitored",
            "Is data freshness monitored against an agreed SLA?",
        ),
        (
            Factor::Correlated,
            "lineage_tracked",
            "Is lineage tracked from source systems into this data?",
        ),
        (
            Factor::Compliant,
            "access_policies_applied",
            "Are access controls and retention policies applied to this data?",
        ),
    ];
    catalog
        .into_iter()
        .map(|(factor, requirement, question)| Question {
            factor,
            requirement: requirement.to_string(),
            question: question.to_string(),
            rubric: None,
        })
        .collect()
}

// ============================================================================
// SECTION: Answers
// ============================================================================

/// Loads the optional answers file (YAML map), leniently.
///
/// Keys are requirement keys or `factor.requirement`; values are answer
/// strings. Malformed documents degrade to an empty map with a warning.
#[must_use]
pub fn load_answers(path: Option<&Path>) -> BTreeMap<String, String> {
    let Some(path) = path else {
        return BTreeMap::new();
    };
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read survey answers");
            return BTreeMap::new();
        }
    };
    match serde_yaml::from_str::<BTreeMap<String, serde_yaml::Value>>(&text) {
        Ok(raw) => raw
            .into_iter()
            .map(|(key, value)| {
                let answer = match value {
                    serde_yaml::Value::String(text) => text,
                    other => serde_yaml::to_string(&other)
                        .map(|rendered| rendered.trim().to_string())
                        .unwrap_or_default(),
                };
                (key, answer)
            })
            .collect(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "malformed survey answers");
            BTreeMap::new()
        }
    }
}

// ============================================================================
// SECTION: Scoring
// ============================================================================

/// Placeholder answer recorded for unanswered questions.
const UNANSWERED: &str = "\u{2014}";

/// Scores one answer against a rubric; absent rubrics pass.
fn apply_rubric(rubric: Option<&Rubric>, answer: &str) -> bool {
    match rubric {
        None => true,
        Some(Rubric::YesNo) => {
            matches!(answer.trim().to_ascii_lowercase().as_str(), "yes" | "y" | "true" | "1")
        }
        Some(Rubric::Choice {
            pass_if,
        }) => {
            let normalized = answer.trim().to_ascii_lowercase();
            pass_if.iter().any(|accepted| accepted.to_ascii_lowercase() == normalized)
        }
    }
}

/// Runs the survey over questions and answers.
///
/// Answers are looked up by `factor.requirement` first, then by bare
/// requirement key. Each question yields one result row with identical
/// verdicts at all three levels.
#[must_use]
pub fn run_survey(
    questions: &[Question],
    answers: &BTreeMap<String, String>,
) -> Vec<QuestionResult> {
    questions
        .iter()
        .map(|question| {
            let scoped_key = format!("{}.{}", question.factor.as_str(), question.requirement);
            let answer = answers
                .get(&scoped_key)
                .or_else(|| answers.get(&question.requirement))
                .map_or(UNANSWERED, String::as_str);
            let pass = apply_rubric(question.rubric.as_ref(), answer);
            QuestionResult {
                factor: question.factor,
                requirement: question.requirement.clone(),
                question_text: question.question.clone(),
                answer: answer.to_string(),
                l1_pass: pass,
                l2_pass: pass,
                l3_pass: pass,
            }
        })
        .collect()
}
