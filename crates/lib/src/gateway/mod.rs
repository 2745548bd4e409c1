//! AI gateway: builds prompts and schemas, calls the generation service, and validates what
//! comes back before it enters the domain model.
//!
//! Each operation is a single round trip with no retry. Search and analysis surface typed
//! errors; discussion never fails outward and degrades to an apology from "Admin" instead.

mod extract;
mod prompts;
mod schema;
mod validate;

use std::collections::{HashSet, VecDeque};

use crate::llm::{GenerateRequest, GenerationError, GenerationService};
use crate::model::{
    BillAnalysis, Bill, ChatMessage, ADMIN_DISPLAY_NAME, PARTICIPANT_ROSTER, USER_DISPLAY_NAME,
};

pub use extract::{parse_json, strip_code_fence};
pub use schema::{analysis_schema, chat_replies_schema};
pub use validate::{coerce_count, ReplyDraft};

/// Replies admitted per discussion turn.
const MAX_REPLIES: usize = 3;

const DEGRADED_REPLY_TEXT: &str = "Sorry, could not generate a response. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON in model output: {0}")]
    InvalidJson(serde_json::Error),
    #[error("model output has the wrong shape: {0}")]
    Shape(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search query is empty")]
    EmptyQuery,
    #[error("bill search failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("bill search returned unusable data: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("bill title is empty")]
    EmptyTitle,
    #[error("bill analysis failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("bill analysis returned unusable data: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, thiserror::Error)]
pub enum ChatGenerationError {
    #[error("discussion reply failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("discussion reply returned unusable data: {0}")]
    Parse(#[from] ParseError),
    #[error("discussion reply had no usable speakers")]
    NoUsableReplies,
}

/// Outcome of a discussion turn. `Degraded` is a normal, displayable result: the conversation
/// keeps going with an apology instead of an error state.
#[derive(Debug)]
pub enum ChatContinuation {
    Replies(Vec<ChatMessage>),
    Degraded {
        message: ChatMessage,
        error: ChatGenerationError,
    },
}

impl ChatContinuation {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Messages to append to the thread.
    pub fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            Self::Replies(replies) => replies,
            Self::Degraded { message, .. } => vec![message],
        }
    }
}

/// Gateway over a generation service. Construct once and share; it holds no mutable state.
pub struct CivicGateway<S> {
    service: S,
}

impl<S: GenerationService> CivicGateway<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    #[cfg(test)]
    fn service(&self) -> &S {
        &self.service
    }

    /// Find recent bills matching `query` using web-grounded generation.
    pub async fn search_bills(&self, query: &str) -> Result<Vec<Bill>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let request = GenerateRequest {
            prompt: prompts::search_prompt(query),
            response_schema: None,
            web_grounding: true,
        };
        let result = async {
            let text = self.service.generate(request).await?;
            let value = extract::parse_json(&text)?;
            Ok::<_, SearchError>(validate::bills_from_value(value)?)
        }
        .await;
        match &result {
            Ok(bills) => log::info!("gateway: search {:?} returned {} bill(s)", query, bills.len()),
            Err(e) => log::warn!("gateway: search {:?} failed: {}", query, e),
        }
        result
    }

    /// Fetch the structured analysis for a bill. `language` is accepted but not applied.
    pub async fn analyze_bill(&self, title: &str, language: &str) -> Result<BillAnalysis, AnalysisError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AnalysisError::EmptyTitle);
        }
        let request = GenerateRequest {
            prompt: prompts::analysis_prompt(title, language),
            response_schema: Some(schema::analysis_schema()),
            web_grounding: false,
        };
        let result = async {
            let text = self.service.generate(request).await?;
            let value = extract::parse_json(&text)?;
            Ok::<_, AnalysisError>(validate::analysis_from_value(value)?)
        }
        .await;
        if let Err(ref e) = result {
            log::warn!("gateway: analysis of {:?} failed: {}", title, e);
        }
        result
    }

    /// Ask for 2-3 replies from participants who have not spoken yet. Never fails outward.
    pub async fn continue_chat(&self, thread: &[ChatMessage], bill_title: &str) -> ChatContinuation {
        let base_id = next_id_base(thread);
        match self.try_continue_chat(thread, bill_title).await {
            Ok(drafts) => ChatContinuation::Replies(
                drafts
                    .into_iter()
                    .enumerate()
                    .map(|(i, d)| ChatMessage::ai(base_id + i as u64 + 1, d.name, d.text))
                    .collect(),
            ),
            Err(error) => {
                log::warn!("gateway: {}", error);
                ChatContinuation::Degraded {
                    message: ChatMessage::ai(base_id + 1, ADMIN_DISPLAY_NAME, DEGRADED_REPLY_TEXT),
                    error,
                }
            }
        }
    }

    async fn try_continue_chat(
        &self,
        thread: &[ChatMessage],
        bill_title: &str,
    ) -> Result<Vec<ReplyDraft>, ChatGenerationError> {
        let available = available_speakers(thread);
        let request = GenerateRequest {
            prompt: prompts::chat_prompt(thread, bill_title, &available),
            response_schema: Some(schema::chat_replies_schema()),
            web_grounding: false,
        };
        let text = self.service.generate(request).await?;
        let value = extract::parse_json(&text)?;
        let drafts = validate::replies_from_value(value)?;
        let replies = assign_speakers(thread, drafts);
        if replies.is_empty() {
            return Err(ChatGenerationError::NoUsableReplies);
        }
        Ok(replies)
    }
}

/// Roster names not yet used in the thread, in roster order.
pub fn available_speakers(thread: &[ChatMessage]) -> Vec<&'static str> {
    PARTICIPANT_ROSTER
        .iter()
        .copied()
        .filter(|name| !thread.iter().any(|m| m.name == *name))
        .collect()
}

/// Enforce unique, unused speaker names. A reply naming someone who already spoke is moved
/// to the next free roster name, or dropped when the roster is exhausted.
fn assign_speakers(thread: &[ChatMessage], drafts: Vec<ReplyDraft>) -> Vec<ReplyDraft> {
    let mut used: HashSet<String> = thread.iter().map(|m| m.name.clone()).collect();
    used.insert(USER_DISPLAY_NAME.to_string());
    used.insert(ADMIN_DISPLAY_NAME.to_string());
    let mut spare: VecDeque<&str> = available_speakers(thread).into();

    let mut out = Vec::new();
    for mut draft in drafts {
        if out.len() == MAX_REPLIES {
            break;
        }
        if used.contains(&draft.name) {
            let replacement = loop {
                match spare.pop_front() {
                    Some(name) if used.contains(name) => continue,
                    other => break other,
                }
            };
            match replacement {
                Some(name) => {
                    log::debug!("gateway: reassigned reply from {} to {}", draft.name, name);
                    draft.name = name.to_string();
                }
                None => {
                    log::debug!("gateway: dropped reply from already-used speaker {}", draft.name);
                    continue;
                }
            }
        }
        used.insert(draft.name.clone());
        out.push(draft);
    }
    out
}

fn next_id_base(thread: &[ChatMessage]) -> u64 {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let last = thread.iter().map(|m| m.id).max().unwrap_or(0);
    now.max(last)
}
