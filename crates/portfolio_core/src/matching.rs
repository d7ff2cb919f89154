//! crates/portfolio_core/src/matching.rs
//!
//! Keyword scoring over the FAQ catalog and follow-up suggestion ranking.

use crate::catalog::QA_CATALOG;
use crate::domain::{Locale, QaEntry, Suggestion};
use crate::i18n::TranslationTable;
use tracing::debug;

/// A single keyword hit scores exactly this much.
pub const DEFAULT_MATCH_THRESHOLD: u32 = 2;

pub const DEFAULT_SUGGESTION_COUNT: usize = 4;

const KEYWORD_SCORE: u32 = 2;
const QUESTION_WORD_SCORE: u32 = 1;
const MIN_QUESTION_WORD_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    /// Minimum score an entry needs to count as a match.
    pub threshold: u32,
    /// How many follow-ups to offer after each reply.
    pub suggestion_count: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            suggestion_count: DEFAULT_SUGGESTION_COUNT,
        }
    }
}

/// Read-only view over the catalog and its translations.
#[derive(Debug, Clone)]
pub struct QaEngine {
    catalog: &'static [QaEntry],
    translations: TranslationTable,
    config: MatchConfig,
}

impl QaEngine {
    pub fn new(
        catalog: &'static [QaEntry],
        translations: TranslationTable,
        config: MatchConfig,
    ) -> Self {
        Self {
            catalog,
            translations,
            config,
        }
    }

    /// The compiled-in catalog with its German and French tables.
    pub fn builtin(config: MatchConfig) -> Self {
        Self::new(QA_CATALOG, TranslationTable::builtin(), config)
    }

    pub fn catalog(&self) -> &'static [QaEntry] {
        self.catalog
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    /// Returns the highest scoring entry, or `None` when the best score is
    /// below the threshold. Ties go to the entry that comes first in the catalog.
    pub fn score_and_match(&self, user_input: &str) -> Option<&'static QaEntry> {
        let normalized = user_input.trim().to_lowercase();

        let mut best: Option<&'static QaEntry> = None;
        let mut best_score = 0;
        for entry in self.catalog {
            let score = score_entry(entry, &normalized);
            if score > best_score {
                best_score = score;
                best = Some(entry);
            }
        }

        debug!(
            best = best.map(|e| e.id),
            score = best_score,
            threshold = self.config.threshold,
            "qa_match_scored"
        );
        best.filter(|_| best_score >= self.config.threshold)
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<&'static QaEntry> {
        self.catalog.iter().find(|entry| entry.id == id)
    }

    pub fn translate_question<'a>(&'a self, question: &'a str, locale: Locale) -> &'a str {
        self.translations.translate_question(question, locale)
    }

    pub fn translate_answer<'a>(&'a self, answer: &'a str, locale: Locale) -> &'a str {
        self.translations.translate_answer(answer, locale)
    }

    /// Picks up to `count` follow-up questions the user has not seen answered.
    ///
    /// Entries in categories related to the current one come first; catalog
    /// order is kept within both groups.
    pub fn suggest_follow_ups(
        &self,
        current_entry_id: Option<&str>,
        asked_ids: &[String],
        locale: Locale,
        count: usize,
    ) -> Vec<Suggestion> {
        let related = current_entry_id
            .and_then(|id| self.lookup_by_id(id))
            .map(|entry| entry.category.related())
            .unwrap_or(&[]);

        let (priority, rest): (Vec<&QaEntry>, Vec<&QaEntry>) = self
            .catalog
            .iter()
            .partition(|entry| related.contains(&entry.category));

        priority
            .into_iter()
            .chain(rest)
            .filter(|entry| Some(entry.id) != current_entry_id)
            .filter(|entry| !asked_ids.iter().any(|asked| asked == entry.id))
            .take(count)
            .map(|entry| Suggestion {
                id: entry.id.to_string(),
                text: self.translate_question(entry.question, locale).to_string(),
            })
            .collect()
    }
}

fn score_entry(entry: &QaEntry, normalized_input: &str) -> u32 {
    let keyword_hits = entry
        .keywords
        .iter()
        .filter(|keyword| normalized_input.contains(&keyword.to_lowercase()))
        .count() as u32;

    let question = entry.question.to_lowercase();
    let word_hits = question
        .split_whitespace()
        .filter(|word| word.chars().count() >= MIN_QUESTION_WORD_LEN)
        .filter(|word| normalized_input.contains(word))
        .count() as u32;

    keyword_hits * KEYWORD_SCORE + word_hits * QUESTION_WORD_SCORE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    fn engine() -> QaEngine {
        QaEngine::builtin(MatchConfig::default())
    }

    #[test]
    fn first_keyword_alone_matches_its_entry() {
        let engine = engine();
        let filler = "z".repeat(40);
        for entry in engine.catalog() {
            let input = format!("{} {}", entry.keywords[0], filler);
            let matched = engine.score_and_match(&input).map(|e| e.id);
            assert_eq!(matched, Some(entry.id), "input {input:?}");
        }
    }

    #[test]
    fn unrelated_input_does_not_match() {
        assert!(engine().score_and_match("asdlkfj qwer").is_none());
        assert!(engine().score_and_match("   ").is_none());
    }

    #[test]
    fn input_is_normalized() {
        let matched = engine().score_and_match("  WHERE are you BASED?  ");
        assert_eq!(matched.map(|e| e.id), Some("location"));
    }

    #[test]
    fn question_words_alone_score_one_each() {
        // "currently" is a question word of `location` but not one of its keywords.
        let engine = QaEngine::builtin(MatchConfig {
            threshold: 1,
            ..MatchConfig::default()
        });
        assert_eq!(
            engine.score_and_match("currently").map(|e| e.id),
            Some("location")
        );
        assert!(QaEngine::builtin(MatchConfig::default())
            .score_and_match("currently")
            .is_none());
    }

    #[test]
    fn ties_resolve_to_catalog_order() {
        static TIED: &[QaEntry] = &[
            QaEntry {
                id: "first",
                keywords: &["alpha"],
                question: "x",
                answer: "a1",
                category: Category::Role,
            },
            QaEntry {
                id: "second",
                keywords: &["alpha"],
                question: "y",
                answer: "a2",
                category: Category::Team,
            },
        ];
        let engine = QaEngine::new(TIED, TranslationTable::new(), MatchConfig::default());
        assert_eq!(engine.score_and_match("alpha").map(|e| e.id), Some("first"));
    }

    #[test]
    fn threshold_is_tunable() {
        let strict = QaEngine::builtin(MatchConfig {
            threshold: 5,
            ..MatchConfig::default()
        });
        assert!(strict.score_and_match("visa zzzz").is_none());
    }

    #[test]
    fn lookup_by_id_finds_exact_entry() {
        let engine = engine();
        assert_eq!(engine.lookup_by_id("salary").map(|e| e.id), Some("salary"));
        assert!(engine.lookup_by_id("nope").is_none());
    }

    #[test]
    fn suggestions_prioritize_related_categories() {
        let suggestions = engine().suggest_follow_ups(Some("location"), &[], Locale::En, 4);
        let ids: Vec<_> = suggestions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["work-permit", "visa-sponsorship", "start-date", "work-mode"]
        );
    }

    #[test]
    fn suggestions_skip_current_and_asked() {
        let asked = vec!["work-permit".to_string(), "salary".to_string()];
        let suggestions = engine().suggest_follow_ups(Some("location"), &asked, Locale::En, 20);
        assert!(suggestions
            .iter()
            .all(|s| s.id != "location" && !asked.contains(&s.id)));
        assert_eq!(suggestions.len(), QA_CATALOG.len() - 3);
    }

    #[test]
    fn suggestions_without_current_follow_catalog_order() {
        let suggestions = engine().suggest_follow_ups(None, &[], Locale::En, 2);
        let ids: Vec<_> = suggestions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["location", "work-permit"]);
    }

    #[test]
    fn suggestions_never_pad_when_exhausted() {
        let engine = engine();
        let asked: Vec<String> = engine.catalog().iter().map(|e| e.id.to_string()).collect();
        assert!(engine.suggest_follow_ups(None, &asked, Locale::En, 4).is_empty());
    }

    #[test]
    fn suggestion_text_is_localized() {
        let suggestions = engine().suggest_follow_ups(None, &[], Locale::De, 1);
        assert_eq!(suggestions[0].id, "location");
        assert_eq!(suggestions[0].text, "Wo befinden Sie sich derzeit?");
    }
}
