//! Candidate query synthesis.
//!
//! Blends three strategies: template expansion over controlled vocabularies,
//! replay of proven patterns, and splicing of historically effective terms.
//! Output is deduplicated, filtered against exhausted topics, and capped.

use std::collections::HashSet;

use tracing::debug;

use crate::config::{EngineConfig, VocabularyConfig};

use super::state::{LearningState, QueryContext};

/// Placeholders bound to caller-supplied context values. A template that
/// uses one of these is skipped entirely when the value is absent.
const CONTEXT_PLACEHOLDERS: [&str; 3] = ["[agency]", "[location]", "[topic]"];

pub struct CandidateGenerator<'a> {
    vocab: &'a VocabularyConfig,
    max_candidates: usize,
    pattern_limit: usize,
    term_limit: usize,
    expansion_cap: usize,
}

impl<'a> CandidateGenerator<'a> {
    #[must_use]
    pub fn new(vocab: &'a VocabularyConfig, engine: &EngineConfig) -> Self {
        Self {
            vocab,
            max_candidates: engine.max_candidates,
            pattern_limit: engine.pattern_limit,
            term_limit: engine.term_limit,
            expansion_cap: engine.vocab_expansion_cap,
        }
    }

    /// Produce the deduplicated, filtered, capped candidate set for one
    /// invocation. May be empty when the context binds no placeholders;
    /// the caller decides whether that is an error.
    #[must_use]
    pub fn generate(&self, context: &QueryContext, state: &LearningState) -> Vec<String> {
        let mut candidates = Vec::new();

        for template in &self.vocab.templates {
            candidates.extend(self.expand_template(template, context));
        }

        // Replay recently proven patterns with the current agency spliced in.
        if let Some(agency) = &context.agency_name {
            for pattern in state.recent_patterns(self.pattern_limit) {
                candidates.push(pattern.replace("[agency]", agency));
            }

            for term in state.top_effective_terms(self.term_limit) {
                candidates.push(format!("{agency} {term}"));
            }
        }

        let filtered = self.postprocess(candidates, state);
        debug!(
            context_key = %state.context_key,
            count = filtered.len(),
            "generated candidate queries"
        );
        filtered
    }

    fn expand_template(&self, template: &str, context: &QueryContext) -> Vec<String> {
        let mut variants = vec![template.to_string()];

        for (placeholder, value) in CONTEXT_PLACEHOLDERS.iter().zip([
            context.agency_name.as_ref(),
            context.location.as_ref(),
            context.topic.as_ref(),
        ]) {
            if !template.contains(placeholder) {
                continue;
            }
            let Some(value) = value else {
                // Required context value missing: drop the whole template.
                return Vec::new();
            };
            for v in &mut variants {
                *v = v.replace(placeholder, value);
            }
        }

        let vocabularies: [(&str, &[String]); 6] = [
            ("[vehicle]", &self.vocab.vehicle_types),
            ("[event]", &self.vocab.event_types),
            ("[service]", &self.vocab.service_types),
            ("[technology]", &self.vocab.technology_types),
            ("[policy]", &self.vocab.policy_types),
            ("[challenge]", &self.vocab.challenge_types),
        ];

        for (placeholder, values) in vocabularies {
            if !template.contains(placeholder) {
                continue;
            }
            let mut expanded = Vec::with_capacity(variants.len() * self.expansion_cap);
            for variant in &variants {
                for value in values.iter().take(self.expansion_cap) {
                    expanded.push(variant.replace(placeholder, value));
                }
            }
            variants = expanded;
        }

        variants
    }

    fn postprocess(&self, candidates: Vec<String>, state: &LearningState) -> Vec<String> {
        let exhausted: Vec<String> = state
            .exhausted_topics
            .iter()
            .map(|t| t.to_lowercase())
            .collect();

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for candidate in candidates {
            if out.len() >= self.max_candidates {
                break;
            }
            let lower = candidate.to_lowercase();
            if exhausted.iter().any(|t| lower.contains(t)) {
                continue;
            }
            if seen.insert(candidate.clone()) {
                out.push(candidate);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator_parts() -> (VocabularyConfig, EngineConfig) {
        (VocabularyConfig::default(), EngineConfig::default())
    }

    fn agency_context() -> QueryContext {
        QueryContext {
            agency_name: Some("Metro Transit".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn direct_template_substitution_produces_expected_query() {
        let (vocab, engine) = generator_parts();
        let generator = CandidateGenerator::new(&vocab, &engine);
        let state = LearningState::new("agency:1");
        let candidates = generator.generate(&agency_context(), &state);
        assert!(
            candidates.contains(&"Metro Transit bus contract award".to_string()),
            "expected direct [agency] [vehicle] [event] expansion, got {candidates:?}"
        );
    }

    #[test]
    fn candidates_are_deduplicated_and_capped() {
        let (mut vocab, engine) = generator_parts();
        // Two templates that resolve to the same literal string.
        vocab.templates = vec![
            "[agency] bus contract".to_string(),
            "[agency] bus contract".to_string(),
        ];
        let generator = CandidateGenerator::new(&vocab, &engine);
        let state = LearningState::new("agency:1");
        let candidates = generator.generate(&agency_context(), &state);
        assert_eq!(candidates, vec!["Metro Transit bus contract".to_string()]);

        let (vocab, engine) = generator_parts();
        let generator = CandidateGenerator::new(&vocab, &engine);
        let candidates = generator.generate(&agency_context(), &state);
        assert!(candidates.len() <= engine.max_candidates);
    }

    #[test]
    fn exhausted_topics_suppress_candidates_case_insensitively() {
        let (vocab, engine) = generator_parts();
        let generator = CandidateGenerator::new(&vocab, &engine);
        let mut state = LearningState::new("agency:1");
        state.exhausted_topics.push("BUS".to_string());
        let candidates = generator.generate(&agency_context(), &state);
        assert!(!candidates.is_empty());
        for candidate in &candidates {
            assert!(
                !candidate.to_lowercase().contains("bus"),
                "exhausted topic leaked: {candidate}"
            );
        }
    }

    #[test]
    fn templates_missing_context_bindings_are_skipped() {
        let (vocab, engine) = generator_parts();
        let generator = CandidateGenerator::new(&vocab, &engine);
        let state = LearningState::new("global");
        let candidates = generator.generate(&QueryContext::default(), &state);
        for candidate in &candidates {
            assert!(!candidate.contains('['), "unbound placeholder: {candidate}");
        }
        // Context-free templates still survive.
        assert!(!candidates.is_empty());
    }

    #[test]
    fn proven_patterns_and_effective_terms_are_spliced() {
        let (mut vocab, engine) = generator_parts();
        vocab.templates.clear();
        let generator = CandidateGenerator::new(&vocab, &engine);
        let mut state = LearningState::new("agency:1");
        state
            .proven_patterns
            .push("[agency] zero-emission fleet plan".to_string());
        state.effective_terms.insert("electrification".to_string(), 40.0);

        let candidates = generator.generate(&agency_context(), &state);
        assert!(candidates.contains(&"Metro Transit zero-emission fleet plan".to_string()));
        assert!(candidates.contains(&"Metro Transit electrification".to_string()));
    }

    #[test]
    fn pattern_replay_bounded_to_most_recent_five() {
        let (mut vocab, engine) = generator_parts();
        vocab.templates.clear();
        let generator = CandidateGenerator::new(&vocab, &engine);
        let mut state = LearningState::new("agency:1");
        for i in 0..9 {
            state.proven_patterns.push(format!("[agency] pattern {i}"));
        }
        let candidates = generator.generate(&agency_context(), &state);
        assert!(candidates.contains(&"Metro Transit pattern 8".to_string()));
        assert!(!candidates.contains(&"Metro Transit pattern 0".to_string()));
    }

    #[test]
    fn vocabulary_expansion_respects_cap() {
        let (mut vocab, mut engine) = generator_parts();
        vocab.templates = vec!["transit [vehicle] report".to_string()];
        engine.vocab_expansion_cap = 2;
        let generator = CandidateGenerator::new(&vocab, &engine);
        let state = LearningState::new("global");
        let candidates = generator.generate(&QueryContext::default(), &state);
        assert_eq!(candidates.len(), 2);
    }
}
