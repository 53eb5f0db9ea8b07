//! Keyword-based intent classification.
//!
//! Each [`KeywordRule`] maps a set of case-insensitive substrings to an
//! [`Intent`]. Rules are data: they come from `[router]` in the config and
//! can be replaced wholesale without touching the routing code.

use std::fmt;

use procura_core::config::{RouterConfig, DEFAULT_DOCUMENT_KEYWORDS, DEFAULT_STRUCTURED_KEYWORDS};
use serde::{Deserialize, Serialize};

/// The classified category of a user question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Numbers and metrics answered from the semantic model.
    StructuredAnalytics,
    /// Contracts, clauses, and compliance documents.
    DocumentSearch,
    /// Anything else.
    General,
}

impl Intent {
    /// Lower is tried first when several intents match.
    pub fn priority(self) -> u8 {
        match self {
            Intent::StructuredAnalytics => 0,
            Intent::DocumentSearch => 1,
            Intent::General => 2,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::StructuredAnalytics => write!(f, "structured_analytics"),
            Intent::DocumentSearch => write!(f, "document_search"),
            Intent::General => write!(f, "general"),
        }
    }
}

/// Keywords that select one intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordRule {
    pub intent: Intent,
    keywords: Vec<String>,
}

impl KeywordRule {
    /// Build a rule. Keywords are lowercased; blank entries are dropped since
    /// an empty substring would match every question.
    pub fn new<I, S>(intent: Intent, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { intent, keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// First keyword found in an already-lowercased question.
    fn first_match(&self, lowered: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
    }
}

/// Maps a question to its ranked candidate intents.
#[derive(Clone, Debug)]
pub struct IntentClassifier {
    rules: Vec<KeywordRule>,
}

impl IntentClassifier {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(vec![
            KeywordRule::new(Intent::StructuredAnalytics, &config.structured_keywords),
            KeywordRule::new(Intent::DocumentSearch, &config.document_keywords),
        ])
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Classify a question.
    ///
    /// Returns every intent whose keywords appear in the question, ordered by
    /// [`Intent::priority`], without duplicates. If nothing matches the
    /// result is `[General]`, so the list is never empty.
    pub fn classify(&self, question: &str) -> Vec<Intent> {
        let lowered = question.to_lowercase();

        let mut intents: Vec<Intent> = self
            .rules
            .iter()
            .filter(|rule| rule.first_match(&lowered).is_some())
            .map(|rule| rule.intent)
            .collect();
        intents.sort_by_key(|i| i.priority());
        intents.dedup();

        if intents.is_empty() {
            intents.push(Intent::General);
        }
        intents
    }

    /// The keyword that triggered each matched rule, for logging.
    pub fn explain(&self, question: &str) -> Vec<(Intent, String)> {
        let lowered = question.to_lowercase();
        self.rules
            .iter()
            .filter_map(|rule| {
                rule.first_match(&lowered)
                    .map(|k| (rule.intent, k.to_string()))
            })
            .collect()
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(vec![
            KeywordRule::new(Intent::StructuredAnalytics, DEFAULT_STRUCTURED_KEYWORDS),
            KeywordRule::new(Intent::DocumentSearch, DEFAULT_DOCUMENT_KEYWORDS),
        ])
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::default()
    }

    // ---- Structured analytics ----

    #[test]
    fn test_spend_is_structured() {
        assert_eq!(
            classifier().classify("What is our total spend with high-risk suppliers?"),
            vec![Intent::StructuredAnalytics]
        );
    }

    #[test]
    fn test_top_is_structured() {
        assert_eq!(
            classifier().classify("Show top 5 EMEA vendors"),
            vec![Intent::StructuredAnalytics]
        );
    }

    #[test]
    fn test_multi_word_keyword() {
        assert_eq!(
            classifier().classify("How many open POs do we have?"),
            vec![Intent::StructuredAnalytics]
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(
            classifier().classify("AVERAGE LEAD TIME"),
            vec![Intent::StructuredAnalytics]
        );
    }

    #[test]
    fn test_substring_match_inside_words() {
        // "stop" contains "top"; substring matching is intentional.
        assert_eq!(
            classifier().classify("when should we stop ordering"),
            vec![Intent::StructuredAnalytics]
        );
    }

    // ---- Document search ----

    #[test]
    fn test_clause_is_document() {
        assert_eq!(
            classifier().classify("Summarize indemnification clauses for BioFlow"),
            vec![Intent::DocumentSearch]
        );
    }

    #[test]
    fn test_compliance_is_document() {
        assert_eq!(
            classifier().classify("Which ISO certificates expire soon?"),
            vec![Intent::DocumentSearch]
        );
    }

    // ---- Priority ----

    #[test]
    fn test_structured_ranked_before_document() {
        assert_eq!(
            classifier().classify("contract spend for German vendors"),
            vec![Intent::StructuredAnalytics, Intent::DocumentSearch]
        );
    }

    #[test]
    fn test_priority_holds_even_if_rules_reordered() {
        let c = IntentClassifier::new(vec![
            KeywordRule::new(Intent::DocumentSearch, ["contract"]),
            KeywordRule::new(Intent::StructuredAnalytics, ["spend"]),
        ]);
        assert_eq!(
            c.classify("contract spend"),
            vec![Intent::StructuredAnalytics, Intent::DocumentSearch]
        );
    }

    #[test]
    fn test_duplicate_rules_collapse() {
        let c = IntentClassifier::new(vec![
            KeywordRule::new(Intent::DocumentSearch, ["contract"]),
            KeywordRule::new(Intent::DocumentSearch, ["clause"]),
        ]);
        assert_eq!(
            c.classify("contract clause"),
            vec![Intent::DocumentSearch]
        );
    }

    // ---- General fallback ----

    #[test]
    fn test_no_keywords_is_general() {
        assert_eq!(
            classifier().classify("Hello, who are you?"),
            vec![Intent::General]
        );
    }

    #[test]
    fn test_empty_question_is_general() {
        assert_eq!(classifier().classify(""), vec![Intent::General]);
    }

    #[test]
    fn test_non_ascii_question() {
        assert_eq!(
            classifier().classify("Qu'est-ce que c'est? \u{1f4c8}"),
            vec![Intent::General]
        );
        assert_eq!(
            classifier().classify("Lieferanten-Risiko (RISK) für Bayern"),
            vec![Intent::StructuredAnalytics]
        );
    }

    #[test]
    fn test_no_rules_is_general() {
        let c = IntentClassifier::new(vec![]);
        assert_eq!(c.classify("total spend"), vec![Intent::General]);
    }

    // ---- Rule construction ----

    #[test]
    fn test_blank_keywords_are_dropped() {
        let rule = KeywordRule::new(Intent::DocumentSearch, ["", "  ", "Audit"]);
        assert_eq!(rule.keywords(), &["audit".to_string()]);
        let c = IntentClassifier::new(vec![rule]);
        assert_eq!(c.classify("anything at all"), vec![Intent::General]);
    }

    #[test]
    fn test_from_config_uses_custom_keywords() {
        let config = RouterConfig {
            structured_keywords: vec!["kpi".to_string()],
            document_keywords: vec!["sla".to_string()],
            ..RouterConfig::default()
        };
        let c = IntentClassifier::from_config(&config);
        assert_eq!(c.classify("latest KPI"), vec![Intent::StructuredAnalytics]);
        assert_eq!(c.classify("SLA penalties"), vec![Intent::DocumentSearch]);
        // Default keywords no longer apply.
        assert_eq!(c.classify("total spend"), vec![Intent::General]);
    }

    #[test]
    fn test_explain_reports_trigger_keyword() {
        let hits = classifier().explain("payment terms by supplier");
        assert_eq!(
            hits,
            vec![
                (Intent::StructuredAnalytics, "supplier".to_string()),
                (Intent::DocumentSearch, "terms".to_string()),
            ]
        );
    }

    #[test]
    fn test_intent_display_and_serde_agree() {
        for intent in [
            Intent::StructuredAnalytics,
            Intent::DocumentSearch,
            Intent::General,
        ] {
            let json = serde_json::to_string(&intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent));
        }
    }
}
