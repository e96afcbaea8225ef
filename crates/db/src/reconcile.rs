//! Planning of in-place poll structure edits.
//!
//! An edit is a three-way diff between the stored questions/choices of a poll
//! and an incoming, ordered list of drafts. Drafts that carry the id of a
//! stored row patch that row; drafts without a known id become inserts; stored
//! rows no draft retains are scheduled for removal. Planning is pure: the
//! repository applies the plan and performs the vote guards inside a single
//! transaction.

use std::collections::{HashMap, HashSet};

use roompoll_common::IdGenerator;

use crate::entities::{choice, question};

/// Incoming question, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    /// Id of an existing question to patch. Unknown ids are ignored.
    pub id: Option<String>,
    pub text: String,
    pub choices: Vec<ChoiceDraft>,
}

/// Incoming choice, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceDraft {
    /// Id of an existing choice of the same question. Unknown ids are ignored.
    pub id: Option<String>,
    pub text: String,
}

impl QuestionDraft {
    /// Draft for a brand-new question.
    #[must_use]
    pub fn new(text: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: None,
            text: text.into(),
            choices: choices
                .into_iter()
                .map(|text| ChoiceDraft {
                    id: None,
                    text: text.into(),
                })
                .collect(),
        }
    }
}

/// Whether a planned row already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Insert,
    Patch,
}

/// A question after planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedQuestion {
    pub action: RowAction,
    pub id: String,
    pub text: String,
    pub order: i32,
    pub choices: Vec<PlannedChoice>,
    /// Stored choices of this question that the draft no longer contains,
    /// by ascending order.
    pub removed_choices: Vec<choice::Model>,
}

/// A choice after planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChoice {
    pub action: RowAction,
    pub id: String,
    pub text: String,
    pub order: i32,
}

/// Complete plan for one poll edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollEditPlan {
    pub questions: Vec<PlannedQuestion>,
    /// Stored questions no draft retains, by ascending order.
    pub removed_questions: Vec<question::Model>,
}

impl PollEditPlan {
    /// Whether the plan removes any stored row.
    #[must_use]
    pub fn removes_anything(&self) -> bool {
        !self.removed_questions.is_empty()
            || self.questions.iter().any(|q| !q.removed_choices.is_empty())
    }
}

/// Diff `drafts` against the stored questions and choices of a poll.
///
/// `order` of every planned row is its index in the draft list. A stored id
/// is retained at most once; a repeated id is planned as an insert.
#[must_use]
pub fn plan_poll_edit(
    existing_questions: &[question::Model],
    existing_choices: &[choice::Model],
    drafts: Vec<QuestionDraft>,
    id_gen: &IdGenerator,
) -> PollEditPlan {
    let questions_by_id: HashMap<&str, &question::Model> = existing_questions
        .iter()
        .map(|q| (q.id.as_str(), q))
        .collect();

    let mut choices_by_question: HashMap<&str, Vec<&choice::Model>> = HashMap::new();
    for choice in existing_choices {
        choices_by_question
            .entry(choice.question_id.as_str())
            .or_default()
            .push(choice);
    }

    let mut retained_questions: HashSet<String> = HashSet::new();
    let mut planned = Vec::with_capacity(drafts.len());

    for (i, draft) in drafts.into_iter().enumerate() {
        let known = draft
            .id
            .as_deref()
            .filter(|id| questions_by_id.contains_key(id) && !retained_questions.contains(*id));

        let (action, id) = match known {
            Some(id) => (RowAction::Patch, id.to_string()),
            None => (RowAction::Insert, id_gen.generate()),
        };
        retained_questions.insert(id.clone());

        let siblings: &[&choice::Model] = match action {
            RowAction::Patch => choices_by_question
                .get(id.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default(),
            RowAction::Insert => &[],
        };

        let (choices, removed_choices) = plan_choices(siblings, draft.choices, id_gen);

        planned.push(PlannedQuestion {
            action,
            id,
            text: draft.text,
            order: i32::try_from(i).unwrap_or(i32::MAX),
            choices,
            removed_choices,
        });
    }

    let mut removed_questions: Vec<question::Model> = existing_questions
        .iter()
        .filter(|q| !retained_questions.contains(&q.id))
        .cloned()
        .collect();
    removed_questions.sort_by_key(|q| q.order);

    PollEditPlan {
        questions: planned,
        removed_questions,
    }
}

fn plan_choices(
    siblings: &[&choice::Model],
    drafts: Vec<ChoiceDraft>,
    id_gen: &IdGenerator,
) -> (Vec<PlannedChoice>, Vec<choice::Model>) {
    let known: HashSet<&str> = siblings.iter().map(|c| c.id.as_str()).collect();
    let mut retained: HashSet<String> = HashSet::new();

    let choices = drafts
        .into_iter()
        .enumerate()
        .map(|(j, draft)| {
            let reuse = draft
                .id
                .filter(|id| known.contains(id.as_str()) && !retained.contains(id));
            let (action, id) = match reuse {
                Some(id) => (RowAction::Patch, id),
                None => (RowAction::Insert, id_gen.generate()),
            };
            retained.insert(id.clone());

            PlannedChoice {
                action,
                id,
                text: draft.text,
                order: i32::try_from(j).unwrap_or(i32::MAX),
            }
        })
        .collect();

    let mut removed: Vec<choice::Model> = siblings
        .iter()
        .filter(|c| !retained.contains(&c.id))
        .map(|c| (*c).clone())
        .collect();
    removed.sort_by_key(|c| c.order);

    (choices, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, text: &str, order: i32) -> question::Model {
        question::Model {
            id: id.to_string(),
            poll_id: "p1".to_string(),
            text: text.to_string(),
            order,
        }
    }

    fn choice(id: &str, question_id: &str, text: &str, order: i32) -> choice::Model {
        choice::Model {
            id: id.to_string(),
            question_id: question_id.to_string(),
            text: text.to_string(),
            order,
        }
    }

    fn keep_choice(id: &str, text: &str) -> ChoiceDraft {
        ChoiceDraft {
            id: Some(id.to_string()),
            text: text.to_string(),
        }
    }

    fn new_choice(text: &str) -> ChoiceDraft {
        ChoiceDraft {
            id: None,
            text: text.to_string(),
        }
    }

    fn stored() -> (Vec<question::Model>, Vec<choice::Model>) {
        (
            vec![question("q1", "Approve?", 0), question("q2", "Budget?", 1)],
            vec![
                choice("c1", "q1", "Yes", 0),
                choice("c2", "q1", "No", 1),
                choice("c3", "q2", "High", 0),
                choice("c4", "q2", "Low", 1),
            ],
        )
    }

    #[test]
    fn test_create_plans_only_inserts() {
        let drafts = vec![QuestionDraft::new("Approve?", ["Yes", "No"])];
        let plan = plan_poll_edit(&[], &[], drafts, &IdGenerator::new());

        assert_eq!(plan.questions.len(), 1);
        let q = &plan.questions[0];
        assert_eq!(q.action, RowAction::Insert);
        assert_eq!(q.order, 0);
        assert_eq!(q.choices.len(), 2);
        assert!(q.choices.iter().all(|c| c.action == RowAction::Insert));
        assert_eq!(q.choices[1].order, 1);
        assert_eq!(q.choices[1].text, "No");
        assert!(!plan.removes_anything());
    }

    #[test]
    fn test_unchanged_drafts_patch_everything() {
        let (questions, choices) = stored();
        let drafts = vec![
            QuestionDraft {
                id: Some("q1".to_string()),
                text: "Approve?".to_string(),
                choices: vec![keep_choice("c1", "Yes"), keep_choice("c2", "No")],
            },
            QuestionDraft {
                id: Some("q2".to_string()),
                text: "Budget?".to_string(),
                choices: vec![keep_choice("c3", "High"), keep_choice("c4", "Low")],
            },
        ];

        let plan = plan_poll_edit(&questions, &choices, drafts, &IdGenerator::new());

        assert!(!plan.removes_anything());
        let ids: Vec<&str> = plan.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, ["q1", "q2"]);
        assert!(plan.questions.iter().all(|q| q.action == RowAction::Patch));
        assert!(
            plan.questions
                .iter()
                .flat_map(|q| &q.choices)
                .all(|c| c.action == RowAction::Patch)
        );
    }

    #[test]
    fn test_reordering_reassigns_order() {
        let (questions, choices) = stored();
        let drafts = vec![
            QuestionDraft {
                id: Some("q2".to_string()),
                text: "Budget?".to_string(),
                choices: vec![keep_choice("c4", "Low"), keep_choice("c3", "High")],
            },
            QuestionDraft {
                id: Some("q1".to_string()),
                text: "Approve?".to_string(),
                choices: vec![keep_choice("c1", "Yes"), keep_choice("c2", "No")],
            },
        ];

        let plan = plan_poll_edit(&questions, &choices, drafts, &IdGenerator::new());

        assert_eq!(plan.questions[0].id, "q2");
        assert_eq!(plan.questions[0].order, 0);
        assert_eq!(plan.questions[0].choices[0].id, "c4");
        assert_eq!(plan.questions[0].choices[0].order, 0);
        assert_eq!(plan.questions[1].id, "q1");
        assert_eq!(plan.questions[1].order, 1);
    }

    #[test]
    fn test_dropped_choice_is_scheduled_for_removal() {
        let (questions, choices) = stored();
        let drafts = vec![
            QuestionDraft {
                id: Some("q1".to_string()),
                text: "Approve?".to_string(),
                choices: vec![keep_choice("c1", "Yes"), new_choice("Abstain")],
            },
            QuestionDraft {
                id: Some("q2".to_string()),
                text: "Budget?".to_string(),
                choices: vec![keep_choice("c3", "High"), keep_choice("c4", "Low")],
            },
        ];

        let plan = plan_poll_edit(&questions, &choices, drafts, &IdGenerator::new());

        let q1 = &plan.questions[0];
        assert_eq!(q1.removed_choices.len(), 1);
        assert_eq!(q1.removed_choices[0].text, "No");
        assert_eq!(q1.choices[1].action, RowAction::Insert);
        assert_eq!(q1.choices[1].text, "Abstain");
        assert!(plan.removed_questions.is_empty());
    }

    #[test]
    fn test_dropped_question_is_scheduled_for_removal() {
        let (questions, choices) = stored();
        let drafts = vec![QuestionDraft {
            id: Some("q1".to_string()),
            text: "Approve the minutes?".to_string(),
            choices: vec![keep_choice("c1", "Yes"), keep_choice("c2", "No")],
        }];

        let plan = plan_poll_edit(&questions, &choices, drafts, &IdGenerator::new());

        assert_eq!(plan.questions[0].text, "Approve the minutes?");
        assert_eq!(plan.removed_questions.len(), 1);
        assert_eq!(plan.removed_questions[0].id, "q2");
    }

    #[test]
    fn test_foreign_ids_become_inserts() {
        let (questions, choices) = stored();
        let drafts = vec![
            QuestionDraft {
                id: Some("q-from-another-poll".to_string()),
                text: "New?".to_string(),
                // c3 belongs to q2, not to this question
                choices: vec![keep_choice("c3", "High"), new_choice("Other")],
            },
            QuestionDraft {
                id: Some("q1".to_string()),
                text: "Approve?".to_string(),
                choices: vec![keep_choice("c1", "Yes"), keep_choice("c2", "No")],
            },
        ];

        let plan = plan_poll_edit(&questions, &choices, drafts, &IdGenerator::new());

        let first = &plan.questions[0];
        assert_eq!(first.action, RowAction::Insert);
        assert_ne!(first.id, "q-from-another-poll");
        assert!(first.choices.iter().all(|c| c.action == RowAction::Insert));
        assert_ne!(first.choices[0].id, "c3");
        assert_eq!(plan.removed_questions.len(), 1);
        assert_eq!(plan.removed_questions[0].id, "q2");
    }

    #[test]
    fn test_repeated_id_is_retained_once() {
        let (questions, choices) = stored();
        let drafts = vec![
            QuestionDraft {
                id: Some("q1".to_string()),
                text: "Approve?".to_string(),
                choices: vec![keep_choice("c1", "Yes"), keep_choice("c1", "Yes again")],
            },
            QuestionDraft {
                id: Some("q1".to_string()),
                text: "Copy".to_string(),
                choices: vec![new_choice("A"), new_choice("B")],
            },
        ];

        let plan = plan_poll_edit(&questions, &choices, drafts, &IdGenerator::new());

        assert_eq!(plan.questions[0].action, RowAction::Patch);
        assert_eq!(plan.questions[0].choices[1].action, RowAction::Insert);
        assert_eq!(plan.questions[1].action, RowAction::Insert);
        assert_ne!(plan.questions[1].id, "q1");
        assert_eq!(plan.questions[0].removed_choices[0].id, "c2");
    }
}
