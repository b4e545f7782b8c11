//! Prompt templates for long-form requests.

use crate::marker::StopMarker;
use crate::types::Conversation;

/// Builds the system instruction for a long, sectioned explanation.
///
/// The model is told to append `marker` in plain text once the answer is
/// complete, which is what ends the continuation loop.
pub fn long_form_system_prompt(marker: &StopMarker) -> String {
    format!(
        "You are an AI assistant that provides detailed information on any topic.\n\
         You will be provided with a user prompt that asks for an explanation of a complex topic, \
         and you need to generate a detailed response.\n\
         \n\
         Input:\n\
         \x20   1- A user prompt asking for an explanation of a complex topic.\n\
         \n\
         Output:\n\
         \x20   1- A detailed explanation of the topic, divided into 5 main sections, \
         and 10 subsections inside each section.\n\
         \x20   2- Once the required output is generated to 100% completion, append the following \
         text to the end of the response in PLAIN TEXT: '{}'\n",
        marker
    )
}

/// Builds a conversation asking for a long-form explanation of `topic`.
pub fn explain_request(topic: &str, marker: &StopMarker) -> Conversation {
    Conversation::new(
        long_form_system_prompt(marker),
        format!("Explain {}.", topic.trim().trim_end_matches('.')),
    )
}
