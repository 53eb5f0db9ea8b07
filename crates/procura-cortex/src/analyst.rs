//! Cortex Analyst message API: natural language to SQL over a semantic model.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::CortexError;

pub const ANALYST_PATH: &str = "/api/v2/cortex/analyst/message";

/// Request body for a single-turn analyst question.
pub fn request_body(question: &str, semantic_model_file: &str) -> Value {
    json!({
        "messages": [{
            "role": "user",
            "content": [{ "type": "text", "text": question }]
        }],
        "semantic_model_file": semantic_model_file,
    })
}

#[derive(Deserialize)]
struct AnalystResponse {
    message: AnalystMessage,
    #[serde(default)]
    request_id: Option<String>,
}

#[derive(Deserialize)]
struct AnalystMessage {
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentItem {
    Text {
        text: String,
    },
    Sql {
        statement: String,
    },
    Suggestions {
        #[serde(default)]
        suggestions: Vec<String>,
    },
    #[serde(other)]
    Other,
}

/// What the analyst said about a question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalystReply {
    /// Text items joined with blank lines.
    pub explanation: Option<String>,
    /// Generated SQL, when the question was answerable.
    pub sql: Option<String>,
    /// Rephrasings offered when the question was ambiguous.
    pub suggestions: Vec<String>,
    pub request_id: Option<String>,
}

impl AnalystReply {
    /// Explanation with suggestions appended as a bullet list.
    pub fn explanation_with_suggestions(&self) -> Option<String> {
        if self.suggestions.is_empty() {
            return self.explanation.clone();
        }
        let bullets: Vec<String> = self
            .suggestions
            .iter()
            .map(|s| format!("- {}", s))
            .collect();
        Some(match &self.explanation {
            Some(text) => format!("{}\n\n{}", text, bullets.join("\n")),
            None => bullets.join("\n"),
        })
    }
}

pub fn parse_reply(body: &str) -> Result<AnalystReply, CortexError> {
    let response: AnalystResponse = serde_json::from_str(body)?;

    let mut texts = Vec::new();
    let mut reply = AnalystReply {
        request_id: response.request_id,
        ..AnalystReply::default()
    };
    for item in response.message.content {
        match item {
            ContentItem::Text { text } if !text.trim().is_empty() => {
                texts.push(text.trim().to_string())
            }
            ContentItem::Sql { statement } if !statement.trim().is_empty() => {
                // Keep the first statement; the API sends at most one per reply.
                reply.sql.get_or_insert(statement);
            }
            ContentItem::Suggestions { suggestions } => reply.suggestions.extend(suggestions),
            _ => {}
        }
    }
    if !texts.is_empty() {
        reply.explanation = Some(texts.join("\n\n"));
    }
    Ok(reply)
}
