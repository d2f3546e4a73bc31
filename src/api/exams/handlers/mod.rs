mod attempts;
mod catalog;

pub(super) use attempts::{get_attempt, list_attempts, save_response, start_exam, submit_exam};
pub(super) use catalog::{get_paper, list_papers, list_subjects};
