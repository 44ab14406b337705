use crate::diary::types::{ContextExcerpt, PromptTemplate};
use std::fmt::Write;

/// Voice, length and output-shape constraints sent with every generation.
pub(crate) fn system_instruction(max_words: usize) -> String {
    format!(
        "You are writing a short private diary entry as the assistant, in the first person.\n\
         Be honest about friction as well as progress. Stay concrete; refer to the listed \
         context instead of inventing events.\n\
         Keep the body under {max_words} words.\n\
         Reply with a single JSON object and nothing else: \
         {{\"title\": string, \"body\": string, \"tags\": [up to 5 short lowercase strings]}}."
    )
}

/// Template stem followed by the context excerpt as bullets.
pub(crate) fn user_prompt(template: &PromptTemplate, excerpt: &ContextExcerpt) -> String {
    let mut prompt = String::with_capacity(512);
    prompt.push_str(template.template);
    let _ = write!(prompt, "\n\nSuggested title: {}\n", template.title_hint);

    if excerpt.is_empty() {
        prompt.push_str("\nNothing specific is going on right now.\n");
        return prompt;
    }

    prompt.push_str("\nWhat is going on:\n");
    if !excerpt.top_priorities.is_empty() {
        let _ = writeln!(prompt, "- Top priorities: {}", excerpt.top_priorities.join("; "));
    }
    if !excerpt.recently_completed.is_empty() {
        let _ = writeln!(
            prompt,
            "- Recently completed: {}",
            excerpt.recently_completed.join("; ")
        );
    }
    if let Some(event) = &excerpt.next_event {
        let _ = writeln!(prompt, "- Next event: {event}");
    }
    if !excerpt.recent_tools.is_empty() {
        let _ = writeln!(prompt, "- Recently used tools: {}", excerpt.recent_tools.join(", "));
    }
    prompt
}
