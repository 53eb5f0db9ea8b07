//! Cortex inference Complete API and the assistant prompt.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::CortexError;

pub const COMPLETE_PATH: &str = "/api/v2/cortex/inference:complete";

pub fn request_body(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": prompt }],
        "stream": false,
    })
}

/// Assistant persona wrapped around a user question. The `Context:` section
/// is only included when there is context to give.
pub fn build_prompt(organization: &str, question: &str, context: Option<&str>) -> String {
    let mut prompt = format!(
        "You are a helpful procurement analytics assistant for {}.\n\
         Answer the following question about procurement data concisely.\n\n",
        organization
    );
    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str(&format!("Context: {}\n\n", context));
    }
    prompt.push_str(&format!(
        "Question: {}\n\nProvide a clear, actionable response.",
        question
    ));
    prompt
}

#[derive(Deserialize)]
struct CompleteResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}

/// Text of the first choice; empty when the model returned no choices.
pub fn parse_completion(body: &str) -> Result<String, CortexError> {
    let response: CompleteResponse = serde_json::from_str(body)?;
    Ok(response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .unwrap_or_default())
}
