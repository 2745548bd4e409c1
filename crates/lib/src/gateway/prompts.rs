//! Prompt text for the three gateway operations.

use crate::model::ChatMessage;

pub fn search_prompt(query: &str) -> String {
    format!(
        r#"Based on the latest web search results, find recent Indian government policies or bills related to "{query}".
Return the findings as a JSON array of objects.
For each bill, provide a realistic but simulated 'voteCount' object with 'for' and 'against' numbers.
Each object should represent a bill and have the following structure:
{{
  "id": "a-unique-string-identifier-you-generate",
  "title": "The official title of the bill or policy",
  "summary": "A concise, one-sentence summary.",
  "category": "A relevant category like 'Technology', 'Economy', 'Environment', etc.",
  "status": "'Passed', 'In Process', 'Appealed', or 'Announced'. Based on the latest info.",
  "date": "The most relevant date (e.g. passed, introduced, or announced date) in 'Month Day, Year' format (e.g. 'Aug 11, 2023').",
  "voteCount": {{
    "for": "A realistic but simulated number of 'for' votes.",
    "against": "A realistic but simulated number of 'against' votes."
  }}
}}
Do not include any other fields. If no bills are found, return an empty array [].
Your response should only contain the JSON array, with no other text or markdown formatting."#
    )
}

/// `language` is accepted for forward compatibility; output is not translated.
pub fn analysis_prompt(title: &str, _language: &str) -> String {
    format!(
        "Analyze the Indian government bill titled \"{title}\". Provide real-world, factual information. \
Generate a simplified explanation, diverse viewpoints (pro, con, neutral), potential impact data, \
a summary of real parliamentary debates, a list of real media content with URLs, interactive flashcards, \
and a mind map of the bill's structure."
    )
}

/// Thread rendered as "name: text" lines.
pub fn conversation_history(thread: &[ChatMessage]) -> String {
    thread
        .iter()
        .map(|m| format!("{}: {}", m.name, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn chat_prompt(thread: &[ChatMessage], bill_title: &str, available_names: &[&str]) -> String {
    let history = conversation_history(thread);
    let last_speaker = thread.last().map(|m| m.name.as_str()).unwrap_or("nobody");
    format!(
        r#"This is a discussion forum about the Indian bill: "{bill_title}".
Conversation so far:
{history}

The last message was from "{last_speaker}".
Generate the next 2-3 replies to continue the conversation naturally.
- Use a mix of English and Romanized Hindi (Hinglish).
- Keep replies short, conversational, and opinionated.
- Assign each reply to a name from this list of available speakers: [{names}]. Do not use a name more than once.
- Return a JSON array of objects, where each object has "name" and "text"."#,
        names = available_names.join(", ")
    )
}
