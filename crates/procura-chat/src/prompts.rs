//! Fixed texts used by the router and chat surfaces.

use procura_core::types::{ConversationHistory, ConversationTurn};
use serde::Serialize;

/// Heading placed before the rendered result table.
pub const RESULTS_HEADING: &str = "**Results:**";

/// Heading for answers produced by the document backend.
pub const DOCUMENT_HEADING: &str = "**Document Analysis:**";

/// Heading for answers produced by the generic completion backend.
pub const GENERAL_HEADING: &str = "**Assistant Response:**";

/// Degraded-mode answer for document questions when the document backend
/// has nothing to say.
pub const CANNED_DOCUMENT_SUMMARY: &str = "**Document Search Results**

Based on the supplier compliance documents:

\u{1f4c4} **Payment Terms Summary**
Most contracts specify Net 30-60 day payment terms. Strategic suppliers typically have Net 30 with 2% early payment discount.

\u{1f4c4} **Key Findings**
- 85% of contracts include Force Majeure provisions
- Average contract term: 2-3 years
- 72% include annual price adjustment clauses tied to commodity indices

*Would you like me to search for specific supplier documents?*";

/// Last-resort answer. Has no external dependency.
pub const HELP_MESSAGE: &str = "I can help you analyze procurement data in two ways:

1. **Structured Data (Numbers/Metrics)** - Powered by Cortex Analyst
   Ask about spend, suppliers, risk scores, forecasts, savings, invoices

2. **Documents (Contracts/Compliance)** - Powered by Cortex Search
   Ask about contract terms, audit findings, regulatory status

What would you like to know?";

/// Greeting that opens a new conversation.
pub const WELCOME_MESSAGE: &str = "Welcome! I can help you with:

**Structured Data (Cortex Analyst)**
- \"What is our total spend with high-risk suppliers?\"
- \"Show top 5 EMEA suppliers by spend with low financial health\"
- \"What are the potential savings from should-cost analysis?\"
- \"Identify suppliers for BioFlow precision components with high financial risk\"

**Documents (Cortex Search)**
- \"What are the payment terms for our German suppliers?\"
- \"Summarize indemnification clauses for BioFlow suppliers\"

How can I help you today?";

/// A fresh conversation opened by the assistant greeting.
pub fn welcome_history() -> ConversationHistory {
    let mut history = ConversationHistory::new();
    history.push(ConversationTurn::assistant(WELCOME_MESSAGE));
    history
}

/// One-click questions offered next to the chat box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QuickQuery {
    pub label: &'static str,
    pub question: &'static str,
}

pub const QUICK_QUERIES: &[QuickQuery] = &[
    QuickQuery {
        label: "High-Risk Suppliers",
        question: "Show me suppliers with financial health score below 50",
    },
    QuickQuery {
        label: "Savings Opportunities",
        question: "What are the potential savings from should-cost analysis?",
    },
];

/// Find a quick query by its button label (case-insensitive).
pub fn quick_query(label: &str) -> Option<&'static QuickQuery> {
    QUICK_QUERIES
        .iter()
        .find(|q| q.label.eq_ignore_ascii_case(label.trim()))
}
