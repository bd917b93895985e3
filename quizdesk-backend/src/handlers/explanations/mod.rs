pub mod clear_queue;
pub mod queue_status;
pub mod regenerate;
pub mod status;

pub use clear_queue::clear_queue;
pub use queue_status::queue_status;
pub use regenerate::regenerate;
pub use status::explanation_status;

use quizdesk_db::{Passage, Question};
use quizdesk_job_queue::NewExplanationJob;

/// Snapshot of the passage and question taken when the job is queued.
pub fn job_for(passage: &Passage, question: &Question) -> NewExplanationJob {
    NewExplanationJob {
        question_id: question.id,
        passage_content: passage.content.clone(),
        passage_comment: passage.comment.clone(),
        question_text: question.question_text.clone(),
        options: question.options.clone(),
        correct_answer: question.correct_answer.clone(),
    }
}
