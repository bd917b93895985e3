//! Prompt construction for explanation requests.

use std::fmt::Write as _;

use quizdesk_job_queue::ExplanationInput;

use crate::types::Message;

fn system_prompt(subject: &str, level: &str) -> String {
    format!(
        "You are a patient {subject} tutor writing for {level} students. \
         Explain answers to multiple-choice questions clearly and concisely, \
         grounding every point in the passage. Reply in plain prose without headings."
    )
}

fn user_prompt(input: &ExplanationInput) -> String {
    let mut prompt = String::with_capacity(input.passage_content.len() + 512);
    prompt.push_str("Passage:\n");
    prompt.push_str(input.passage_content.trim());
    prompt.push_str("\n\n");

    if let Some(comment) = input
        .passage_comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        prompt.push_str("Instructor note:\n");
        prompt.push_str(comment);
        prompt.push_str("\n\n");
    }

    prompt.push_str("Question:\n");
    prompt.push_str(input.question_text.trim());
    prompt.push_str("\n\nOptions:\n");
    for (index, option) in input.options.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(prompt, "{}. {}", index + 1, option.trim());
    }

    let _ = write!(
        prompt,
        "\nCorrect answer: {}\n\n\
         Explain why this answer is correct and briefly why each other option is not.",
        input.correct_answer.trim()
    );
    prompt
}

/// System and user messages for one explanation request.
pub fn build_messages(input: &ExplanationInput) -> Vec<Message> {
    vec![
        Message::system(system_prompt(&input.subject, &input.level)),
        Message::user(user_prompt(input)),
    ]
}
