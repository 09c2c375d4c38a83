// crates/aird-pipeline/tests/survey_questions.rs
// ============================================================================
// Module: Survey Tests
// Description: Question scoring with rubrics and answer files.
// Purpose: Verify the default survey passes and rubrics gate answers.
// Dependencies: aird-pipeline, aird-core, tempfile
// ============================================================================

//! ## Overview
//! Covers the survey collaborator: the default registry carries one
//! question per factor and passes unanswered, yes/no and choice rubrics
//! gate answers, scoped answer keys win over bare keys, and an assess run
//! with the survey flag attaches question results to the report.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::collections::BTreeMap;

use aird_core::CancellationToken;
use aird_core::Factor;
use aird_pipeline::Pipeline;
use aird_pipeline::run_survey;
use aird_pipeline::survey::Question;
use aird_pipeline::survey::Rubric;
use aird_pipeline::survey::default_questions;
use aird_pipeline::survey::load_answers;

use crate::common::seed_dirty_products;
use crate::common::test_config;

// ============================================================================
// SECTION: Default Survey
// ============================================================================

#[test]
fn default_survey_covers_every_factor_and_passes_unanswered() {
    let results = run_survey(&default_questions(), &BTreeMap::new());
    assert!(results.len() >= 6);
    for factor in Factor::ALL {
        let row = results.iter().find(|result| result.factor == factor).unwrap();
        assert!(!row.question_text.is_empty());
        assert_eq!(row.answer, "\u{2014}");
        assert!(row.l1_pass && row.l2_pass && row.l3_pass);
    }
}

// ============================================================================
// SECTION: Rubrics
// ============================================================================

/// Builds one yes/no question for rubric tests.
fn yes_no_question() -> Question {
    Question {
        factor: Factor::Clean,
        requirement: "quality_rules_documented".to_string(),
        question: "Are rules documented?".to_string(),
        rubric: Some(Rubric::YesNo),
    }
}

#[test]
fn yes_no_rubric_gates_answers() {
    let questions = vec![yes_no_question()];
    for (answer, expected) in
        [("yes", true), ("Y", true), ("TRUE", true), ("1", true), ("no", false), ("", false)]
    {
        let mut answers = BTreeMap::new();
        answers.insert("quality_rules_documented".to_string(), answer.to_string());
        let results = run_survey(&questions, &answers);
        assert_eq!(results[0].l1_pass, expected, "answer: {answer:?}");
        assert_eq!(results[0].l3_pass, expected);
    }
}

#[test]
fn choice_rubric_accepts_listed_answers_case_insensitively() {
    let questions = vec![Question {
        factor: Factor::Current,
        requirement: "freshness_sla_monitored".to_string(),
        question: "How is freshness monitored?".to_string(),
        rubric: Some(Rubric::Choice {
            pass_if: vec!["automated".to_string(), "scheduled".to_string()],
        }),
    }];
    let mut answers = BTreeMap::new();
    answers.insert("freshness_sla_monitored".to_string(), "Automated".to_string());
    assert!(run_survey(&questions, &answers)[0].l1_pass);
    answers.insert("freshness_sla_monitored".to_string(), "manual".to_string());
    assert!(!run_survey(&questions, &answers)[0].l1_pass);
}

#[test]
fn scoped_answer_keys_win_over_bare_keys() {
    let questions = vec![yes_no_question()];
    let mut answers = BTreeMap::new();
    answers.insert("quality_rules_documented".to_string(), "no".to_string());
    answers.insert("clean.quality_rules_documented".to_string(), "yes".to_string());
    let results = run_survey(&questions, &answers);
    assert_eq!(results[0].answer, "yes");
    assert!(results[0].l1_pass);
}

// ============================================================================
// SECTION: Answer Files
// ============================================================================

#[test]
fn answer_files_load_and_malformed_ones_degrade() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("answers.yaml");
    std::fs::write(&path, "quality_rules_documented: yes\nlineage_tracked: no\n").unwrap();
    let answers = load_answers(Some(&path));
    assert_eq!(answers.get("quality_rules_documented").map(String::as_str), Some("yes"));
    let broken = dir.path().join("broken.yaml");
    std::fs::write(&broken, "- [unbalanced").unwrap();
    assert!(load_answers(Some(&broken)).is_empty());
    assert!(load_answers(None).is_empty());
}

// ============================================================================
// SECTION: Pipeline Integration
// ============================================================================

#[test]
fn assess_with_survey_attaches_question_results() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        survey: true,
        ..test_config(&connection, dir.path())
    };
    let outcome = pipeline.assess(&config, None, &CancellationToken::new()).unwrap();
    let report = outcome.into_report().unwrap();
    let questions = report.question_results.unwrap();
    assert!(questions.len() >= 6);
    for factor in Factor::ALL {
        assert!(questions.iter().any(|row| row.factor == factor));
    }
    assert!(questions.iter().all(|row| row.l1_pass));
}
