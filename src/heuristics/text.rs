//! Keyword-driven analysis of issue reports, comments, and satisfaction
//! surveys.
//!
//! All keyword tables are process-wide immutable constants, so the analyzer
//! is side-effect free and safe to call from concurrent report passes.

use crate::analytics::extract::{parse_float, round2};
use crate::models::{AttrBlock, Priority};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keywords that signal a negative report.
pub const NEGATIVE_KEYWORDS: [&str; 10] = [
    "problem", "issue", "broken", "missing", "urgent", "critical", "poor", "bad", "lack", "no",
];

/// Keywords that signal a positive report.
pub const POSITIVE_KEYWORDS: [&str; 6] = [
    "good", "excellent", "working", "available", "complete", "satisfied",
];

/// Topic categories with the keywords that pull a text into them.
pub const TOPIC_KEYWORDS: [(&str, &[&str]); 6] = [
    ("infrastructure", &["power", "water", "building", "facility", "structure"]),
    ("staffing", &["staff", "worker", "personnel", "doctor", "nurse"]),
    ("funding", &["money", "budget", "funding", "financial", "cost"]),
    ("equipment", &["equipment", "machine", "device", "tool"]),
    ("supplies", &["supply", "commodity", "medicine", "drug", "stock"]),
    ("services", &["service", "patient", "treatment", "care"]),
];

const SUMMARY_LIMIT: usize = 200;

/// Overall sentiment of a free-text report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

/// Result of analyzing a record's issues and comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub sentiment: Sentiment,
    pub topics: Vec<String>,
    pub priority: Priority,
    pub insights: Vec<String>,
    pub summary: String,
}

/// Analyze the issues and comments of one record.
///
/// Keywords are matched as substrings against the lower-cased text; each
/// keyword counts at most once regardless of repetitions.
pub fn analyze_text(issues: &str, comments: &str) -> TextAnalysis {
    if issues.is_empty() && comments.is_empty() {
        return TextAnalysis {
            sentiment: Sentiment::Neutral,
            topics: Vec::new(),
            priority: Priority::Low,
            insights: Vec::new(),
            summary: "No issues or comments provided".to_string(),
        };
    }

    let combined = format!("{issues} {comments}").trim().to_string();
    let lower = combined.to_lowercase();

    let negative_count = NEGATIVE_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();
    let positive_count = POSITIVE_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();

    let (sentiment, priority) = if negative_count > positive_count {
        let priority = if negative_count > 3 {
            Priority::High
        } else {
            Priority::Medium
        };
        (Sentiment::Negative, priority)
    } else if positive_count > negative_count {
        (Sentiment::Positive, Priority::Low)
    } else {
        (Sentiment::Neutral, Priority::Medium)
    };

    let topics: Vec<String> = TOPIC_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(topic, _)| topic.to_string())
        .collect();

    let insights = vec![format!(
        "Detected {sentiment} sentiment with {} key topics",
        topics.len()
    )];

    let summary = if combined.chars().count() > SUMMARY_LIMIT {
        let truncated: String = combined.chars().take(SUMMARY_LIMIT).collect();
        format!("{truncated}...")
    } else {
        combined
    };

    let topics = if topics.is_empty() {
        vec!["general".to_string()]
    } else {
        topics
    };

    TextAnalysis {
        sentiment,
        topics,
        priority,
        insights,
        summary,
    }
}

/// Counts of satisfaction responses per quality band.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub excellent: u64,
    pub good: u64,
    pub fair: u64,
    pub poor: u64,
}

/// Result of analyzing a satisfaction-survey block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionAnalysis {
    pub average_score: f64,
    pub total_responses: usize,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub score_distribution: ScoreDistribution,
}

/// Analyze the satisfaction-survey block of one record. Every
/// numeric-coercible value is a response; the rest are ignored.
pub fn analyze_satisfaction(block: Option<&AttrBlock>) -> SatisfactionAnalysis {
    let Some(block) = block.filter(|b| !b.is_empty()) else {
        return SatisfactionAnalysis::default();
    };

    let scores: Vec<f64> = block.values().filter_map(parse_float).collect();
    let average = if scores.is_empty() {
        0.0
    } else {
        round2(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    let mut insights = Vec::new();
    let mut recommendations = Vec::new();
    if average < 3.0 {
        insights.push("Patient satisfaction is below average".to_string());
        recommendations.push("Investigate service quality and patient experience".to_string());
    } else if average >= 4.0 {
        insights.push("Patient satisfaction is above average".to_string());
        recommendations.push("Maintain current service standards".to_string());
    }

    let mut distribution = ScoreDistribution::default();
    for score in &scores {
        if *score >= 4.5 {
            distribution.excellent += 1;
        } else if *score >= 3.5 {
            distribution.good += 1;
        } else if *score >= 2.5 {
            distribution.fair += 1;
        } else {
            distribution.poor += 1;
        }
    }

    SatisfactionAnalysis {
        average_score: average,
        total_responses: scores.len(),
        insights,
        recommendations,
        score_distribution: distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(value: serde_json::Value) -> AttrBlock {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_empty_inputs_yield_neutral_default() {
        let analysis = analyze_text("", "");

        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(analysis.priority, Priority::Low);
        assert!(analysis.topics.is_empty());
        assert!(analysis.insights.is_empty());
        assert_eq!(analysis.summary, "No issues or comments provided");
    }

    #[test]
    fn test_four_negative_keywords_escalate_to_high() {
        let analysis = analyze_text(
            "The generator is broken and the roof is in poor shape",
            "urgent repairs needed, situation is critical",
        );

        assert_eq!(analysis.sentiment, Sentiment::Negative);
        assert_eq!(analysis.priority, Priority::High);
    }

    #[test]
    fn test_mild_negative_is_medium_priority() {
        let analysis = analyze_text("There is a problem with the borehole", "");

        assert_eq!(analysis.sentiment, Sentiment::Negative);
        assert_eq!(analysis.priority, Priority::Medium);
    }

    #[test]
    fn test_positive_text_is_low_priority() {
        let analysis = analyze_text("", "Equipment is working and staff are satisfied");

        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.priority, Priority::Low);
    }

    #[test]
    fn test_topic_extraction() {
        let analysis = analyze_text("power outage and nurse shortage", "");
        assert_eq!(analysis.topics, vec!["infrastructure", "staffing"]);

        let analysis = analyze_text("nothing to report here today", "");
        assert_eq!(analysis.topics, vec!["general"]);
    }

    #[test]
    fn test_insight_counts_matched_topics_before_fallback() {
        let analysis = analyze_text("all quiet", "");
        assert_eq!(
            analysis.insights,
            vec!["Detected neutral sentiment with 0 key topics".to_string()]
        );
    }

    #[test]
    fn test_summary_truncation() {
        let long = "x".repeat(250);
        let analysis = analyze_text(&long, "");

        assert_eq!(analysis.summary.chars().count(), 203);
        assert!(analysis.summary.ends_with("..."));

        let short = analyze_text("short note", "");
        assert_eq!(short.summary, "short note");
    }

    #[test]
    fn test_satisfaction_empty_block() {
        let analysis = analyze_satisfaction(None);
        assert_eq!(analysis.average_score, 0.0);
        assert_eq!(analysis.total_responses, 0);
        assert!(analysis.insights.is_empty());

        let empty = block(json!({}));
        let analysis = analyze_satisfaction(Some(&empty));
        assert_eq!(analysis.total_responses, 0);
    }

    #[test]
    fn test_satisfaction_below_average() {
        let b = block(json!({"overall": 2, "wait_time": "2.5", "comment": "slow"}));
        let analysis = analyze_satisfaction(Some(&b));

        assert_eq!(analysis.average_score, 2.25);
        assert_eq!(analysis.total_responses, 2);
        assert_eq!(analysis.insights, vec!["Patient satisfaction is below average"]);
        assert_eq!(
            analysis.recommendations,
            vec!["Investigate service quality and patient experience"]
        );
        assert_eq!(analysis.score_distribution.fair, 1);
        assert_eq!(analysis.score_distribution.poor, 1);
    }

    #[test]
    fn test_satisfaction_above_average() {
        let b = block(json!({"overall": 4.6, "courtesy": 4.0}));
        let analysis = analyze_satisfaction(Some(&b));

        assert_eq!(analysis.average_score, 4.3);
        assert_eq!(analysis.insights, vec!["Patient satisfaction is above average"]);
        assert_eq!(analysis.score_distribution.excellent, 1);
        assert_eq!(analysis.score_distribution.good, 1);
    }

    #[test]
    fn test_satisfaction_middle_band_has_no_insight() {
        let b = block(json!({"overall": 3.5}));
        let analysis = analyze_satisfaction(Some(&b));

        assert!(analysis.insights.is_empty());
        assert!(analysis.recommendations.is_empty());
    }
}
