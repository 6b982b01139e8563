//! Rule-based signature position suggestions

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const SIGNATURE_KEYWORDS: &[&str] = &[
    "signature",
    "sign here",
    "signed by",
    "signature of",
    "please sign",
    "witness signature",
    "authorized signature",
];
const CONTRACT_INDICATORS: &[&str] = &["contract", "agreement", "terms", "conditions"];
const FORM_INDICATORS: &[&str] = &["form", "application", "request"];

const SIGNATURE_PATTERNS: &[&str] = &[
    r"signature[\s:]*[_\s]*",
    r"sign[\s]*here",
    r"signed[\s:]*",
    r"authorized[\s]*by",
    r"signatory",
    r"undersigned",
    r"date[\s]*[_\s]*signature",
];
const DATE_PATTERNS: &[&str] = &[
    r"date[\s:]*[_\s]*",
    r"dated[\s]*this",
    r"\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}",
];
const AGREEMENT_KEYWORDS: &[&str] = &["agreement", "contract", "terms and conditions", "hereby agree"];
const KEY_TERMS: &[&str] = &["agreement", "contract", "party", "undersigned", "witness"];

const SIGNATURE_FIELD_PATTERN: &str = r"signature|sign here|signatory";
const DATE_FIELD_PATTERN: &str = r"date[\s:]*|dated|_____/_____/_____";

/// Suggested position in inches from the top-left corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedPosition {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub reason: String,
}

/// Keyword-based suggestion with a numeric confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureSuggestion {
    pub positions: Vec<SuggestedPosition>,
    pub confidence: f64,
    pub reasoning: String,
}

/// Suggest where a signature belongs from the document text
pub fn suggest_positions(text: &str) -> SignatureSuggestion {
    let lower = text.to_lowercase();
    let found: Vec<&str> = SIGNATURE_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lower.contains(k))
        .collect();

    let (mut confidence, mut reasoning, reason) = if found.is_empty() {
        (
            0.3,
            "No signature keywords found, suggesting standard position".to_string(),
            "Standard document end placement",
        )
    } else {
        (
            (0.5 + found.len() as f64 * 0.1).min(0.9),
            format!("Found signature keywords: {}", found.join(", ")),
            "End of document placement",
        )
    };

    if CONTRACT_INDICATORS.iter().any(|k| lower.contains(k)) {
        confidence = (confidence + 0.1).min(1.0);
        reasoning.push_str(" - Contract document type detected");
    } else if FORM_INDICATORS.iter().any(|k| lower.contains(k)) {
        reasoning.push_str(" - Form document type detected");
    }

    SignatureSuggestion {
        positions: vec![SuggestedPosition {
            page: 1,
            x: 1.0,
            y: 10.0,
            reason: reason.to_string(),
        }],
        confidence,
        reasoning,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Medium,
    High,
}

/// Pattern-based analysis of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureAnalysis {
    pub suggested_page: usize,
    pub suggested_x: f64,
    pub suggested_y: f64,
    pub confidence: Confidence,
    pub reasoning: String,
    pub has_date_field: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}

struct Patterns {
    signature: Vec<(&'static str, Regex)>,
    date: Vec<Regex>,
    signature_field: Option<Regex>,
    date_field: Option<Regex>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        signature: SIGNATURE_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok().map(|re| (*p, re)))
            .collect(),
        date: DATE_PATTERNS.iter().filter_map(|p| Regex::new(p).ok()).collect(),
        signature_field: Regex::new(SIGNATURE_FIELD_PATTERN).ok(),
        date_field: Regex::new(DATE_FIELD_PATTERN).ok(),
    })
}

/// Analyze a page of text for signature indicators, date fields and the
/// document type
pub fn analyze_for_signature(text: &str, page: usize) -> SignatureAnalysis {
    let lower = text.to_lowercase();
    let patterns = patterns();

    let mut analysis = SignatureAnalysis {
        suggested_page: page,
        suggested_x: 100.0,
        suggested_y: 100.0,
        confidence: Confidence::Medium,
        reasoning: "Default signature placement at bottom of document".to_string(),
        has_date_field: false,
        document_type: None,
    };

    if let Some((pattern, _)) = patterns.signature.iter().find(|(_, re)| re.is_match(&lower)) {
        analysis.confidence = Confidence::High;
        analysis.reasoning = format!("Found signature indicator: \"{pattern}\"");
        analysis.suggested_x = 400.0;
        analysis.suggested_y = 650.0;
    }

    for re in &patterns.date {
        if re.is_match(&lower) {
            analysis.has_date_field = true;
            analysis
                .reasoning
                .push_str(" | Document contains date field near signature area");
        }
    }

    if AGREEMENT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        analysis.document_type = Some("agreement".to_string());
        analysis.suggested_y = 700.0;
    }

    analysis
}

/// Fields and terms found in a document's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyInformation {
    pub has_signature_field: bool,
    pub has_date_field: bool,
    /// Length of the text in characters
    pub document_length: usize,
    /// Contract vocabulary present in the text, in a fixed order
    pub key_terms: Vec<String>,
}

/// Scan text for signature and date fields and common contract terms
pub fn extract_key_information(text: &str) -> KeyInformation {
    let lower = text.to_lowercase();
    let patterns = patterns();
    let matches = |re: &Option<Regex>| re.as_ref().is_some_and(|re| re.is_match(&lower));

    KeyInformation {
        has_signature_field: matches(&patterns.signature_field),
        has_date_field: matches(&patterns.date_field),
        document_length: text.chars().count(),
        key_terms: KEY_TERMS
            .iter()
            .filter(|term| lower.contains(*term))
            .map(|term| term.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_suggest_without_keywords() {
        let suggestion = suggest_positions("Quarterly report");
        assert_eq!(suggestion.confidence, 0.3);
        assert_eq!(
            suggestion.reasoning,
            "No signature keywords found, suggesting standard position"
        );
        assert_eq!(suggestion.positions[0].reason, "Standard document end placement");
        assert_eq!((suggestion.positions[0].x, suggestion.positions[0].y), (1.0, 10.0));
    }

    #[test]
    fn test_suggest_counts_keywords() {
        // "signature", "sign here" and "signature of"
        let suggestion = suggest_positions("Signature of tenant. Sign here:");
        assert!((suggestion.confidence - 0.8).abs() < 1e-9);
        assert_eq!(
            suggestion.reasoning,
            "Found signature keywords: signature, sign here, signature of"
        );
    }

    #[test]
    fn test_suggest_confidence_capped() {
        let text = "signature sign here signed by signature of please sign witness signature authorized signature";
        let suggestion = suggest_positions(text);
        assert!((suggestion.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_suggest_contract_bonus() {
        let suggestion = suggest_positions("Rental agreement. Signature:");
        assert!((suggestion.confidence - 0.7).abs() < 1e-9);
        assert!(suggestion.reasoning.ends_with(" - Contract document type detected"));
    }

    #[test]
    fn test_suggest_form_type() {
        let suggestion = suggest_positions("Leave application");
        assert_eq!(suggestion.confidence, 0.3);
        assert!(suggestion.reasoning.ends_with(" - Form document type detected"));
    }

    #[test]
    fn test_analyze_default() {
        let analysis = analyze_for_signature("Meeting notes", 2);
        assert_eq!(analysis.suggested_page, 2);
        assert_eq!((analysis.suggested_x, analysis.suggested_y), (100.0, 100.0));
        assert_eq!(analysis.confidence, Confidence::Medium);
        assert!(!analysis.has_date_field);
        assert_eq!(analysis.document_type, None);
    }

    #[test]
    fn test_analyze_signature_indicator() {
        let analysis = analyze_for_signature("The signatory confirms", 1);
        assert_eq!(analysis.confidence, Confidence::High);
        assert_eq!((analysis.suggested_x, analysis.suggested_y), (400.0, 650.0));
        assert_eq!(analysis.reasoning, "Found signature indicator: \"signatory\"");
    }

    #[test]
    fn test_analyze_date_and_agreement() {
        let analysis = analyze_for_signature("Service Agreement signed 12/05/2024", 1);
        assert!(analysis.has_date_field);
        assert!(analysis.reasoning.contains("date field"));
        assert_eq!(analysis.document_type.as_deref(), Some("agreement"));
        assert_eq!(analysis.suggested_y, 700.0);
        assert_eq!(analysis.suggested_x, 400.0);
    }

    #[test]
    fn test_key_information_from_contract() {
        let info = extract_key_information(
            "This Agreement is made between each Party. Dated: ____. Signature of the undersigned",
        );
        assert!(info.has_signature_field);
        assert!(info.has_date_field);
        assert_eq!(info.document_length, 84);
        assert_eq!(info.key_terms, vec!["agreement", "party", "undersigned"]);
    }

    #[test]
    fn test_key_information_plain_text() {
        let info = extract_key_information("Weekly café notes");
        assert!(!info.has_signature_field);
        assert!(!info.has_date_field);
        assert_eq!(info.document_length, 17);
        assert!(info.key_terms.is_empty());
    }

    #[test]
    fn test_key_information_blank_date_line() {
        let info = extract_key_information("Sign here _____/_____/_____");
        assert!(info.has_signature_field);
        assert!(info.has_date_field);
    }
}
