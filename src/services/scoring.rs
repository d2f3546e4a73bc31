use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::db::models::Question;
use crate::services::answers::is_correct;
use crate::services::responses::ResponseMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct PaperScore {
    pub(crate) marks_earned: f64,
    pub(crate) marks_total: f64,
    pub(crate) percentage: f64,
}

/// Per-paper results keyed by paper id.
pub(crate) type ScoreMap = BTreeMap<String, PaperScore>;

/// Question sets fetched for one submission, keyed by paper id.
pub(crate) type QuestionSets = HashMap<String, Vec<Question>>;

impl PaperScore {
    pub(crate) fn new(marks_earned: f64, marks_total: f64) -> Self {
        Self { marks_earned, marks_total, percentage: percentage(marks_earned, marks_total) }
    }
}

/// 0 for an empty paper, otherwise the share of marks earned on a 0..=100 scale.
pub(crate) fn percentage(marks_earned: f64, marks_total: f64) -> f64 {
    if marks_total > 0.0 {
        100.0 * marks_earned / marks_total
    } else {
        0.0
    }
}

/// Scores every selected paper independently. Pure and deterministic: the same
/// responses and question sets always produce the same map.
pub(crate) fn score_papers(
    paper_ids: &[String],
    responses: &ResponseMap,
    question_sets: &QuestionSets,
) -> ScoreMap {
    paper_ids
        .iter()
        .map(|paper_id| {
            let questions = question_sets.get(paper_id).map(Vec::as_slice).unwrap_or_default();
            (paper_id.clone(), score_paper(questions, responses))
        })
        .collect()
}

fn score_paper(questions: &[Question], responses: &ResponseMap) -> PaperScore {
    let mut marks_earned = 0.0;
    let mut marks_total = 0.0;

    for question in questions {
        marks_total += question.marks;

        let submitted = responses.get(&question.id).and_then(|entry| entry.answer.as_ref());
        if is_correct(question.correct_answer.as_ref(), submitted) {
            marks_earned += question.marks;
        }
    }

    PaperScore::new(marks_earned, marks_total)
}

/// Sum of all papers, used for the overall result card.
pub(crate) fn overall(scores: &ScoreMap) -> PaperScore {
    let (earned, total) = scores
        .values()
        .fold((0.0, 0.0), |(earned, total), score| {
            (earned + score.marks_earned, total + score.marks_total)
        });
    PaperScore::new(earned, total)
}
