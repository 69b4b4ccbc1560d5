use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wikiatlas_core::model::article::ArticleId;
use wikiatlas_core::search::semantic::{SemanticCandidate, SemanticResult};
use wikiatlas_core::{Article, MatchStage, SearchEngine, SemanticError, SemanticMatcher};

struct ScriptedMatcher {
    reply: SemanticResult<Vec<ArticleId>>,
    calls: AtomicUsize,
}

impl ScriptedMatcher {
    fn answering(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(ids.iter().map(|id| id.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(SemanticError::Api {
                status: 429,
                message: "quota".to_string(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SemanticMatcher for ScriptedMatcher {
    async fn match_ids(
        &self,
        _query: &str,
        _candidates: &[SemanticCandidate],
    ) -> SemanticResult<Vec<ArticleId>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

fn collection() -> Vec<Article> {
    vec![
        Article::new(
            "bobur",
            "Zahiriddin Muhammad Bobur Tavalludi",
            "1483 yil 14 fevralda Andijonda tug'ilgan.",
            "Tarix",
        ),
        Article::new(
            "kvant",
            "Kvant fizikasi",
            "Atom va subatom darajadagi hodisalar.",
            "Fan",
        ),
        Article::new(
            "navoiy",
            "Alisher Navoiy",
            "Xamsa muallifi, buyuk shoir.",
            "Adabiyot",
        ),
    ]
}

fn ids(articles: &[&Article]) -> Vec<String> {
    articles.iter().map(|a| a.id.clone()).collect()
}

#[tokio::test]
async fn bobur_query_returns_only_the_bobur_article() {
    let articles = collection();
    let matcher = ScriptedMatcher::answering(&["kvant"]);
    let engine = SearchEngine::with_matcher(matcher.clone());

    let outcome = engine.search("bobur", &articles).await;

    assert_eq!(ids(&outcome.hits), vec!["bobur"]);
    assert_eq!(outcome.stage, MatchStage::Lexical);
    assert_eq!(matcher.calls(), 0, "lexical hit must not consult the matcher");
}

#[tokio::test]
async fn unknown_query_without_fallback_is_empty_not_error() {
    let articles = collection();
    let outcome = SearchEngine::lexical_only()
        .search("xyz123nonexistent", &articles)
        .await;

    assert!(outcome.is_empty());
    assert_eq!(outcome.stage, MatchStage::NoMatch);
}

#[tokio::test]
async fn every_token_must_match_somewhere() {
    let articles = collection();
    let engine = SearchEngine::lexical_only();

    let both = engine.search("ANDIJON tarix", &articles).await;
    assert_eq!(ids(&both.hits), vec!["bobur"]);

    let mixed = engine.search("andijon shoir", &articles).await;
    assert!(mixed.is_empty());
}

#[tokio::test]
async fn semantic_fallback_keeps_collection_order_and_ignores_unknown_ids() {
    let articles = collection();
    let matcher = ScriptedMatcher::answering(&["navoiy", "ghost", "bobur"]);
    let engine = SearchEngine::with_matcher(matcher.clone());

    let outcome = engine.search("o'zbek mumtoz merosi", &articles).await;

    assert_eq!(outcome.stage, MatchStage::Semantic);
    assert_eq!(ids(&outcome.hits), vec!["bobur", "navoiy"]);
    assert_eq!(matcher.calls(), 1);
}

#[tokio::test]
async fn matcher_failure_degrades_to_empty() {
    let articles = collection();
    let engine = SearchEngine::with_matcher(ScriptedMatcher::failing());

    let outcome = engine.search("xyz123nonexistent", &articles).await;

    assert!(outcome.is_empty());
    assert_eq!(outcome.stage, MatchStage::NoMatch);
}

#[tokio::test]
async fn blank_query_never_reaches_the_matcher() {
    let articles = collection();
    let matcher = ScriptedMatcher::answering(&["bobur"]);
    let engine = SearchEngine::with_matcher(matcher.clone());

    assert!(engine.search("   ", &articles).await.is_empty());
    assert_eq!(matcher.calls(), 0);
}

#[tokio::test]
async fn single_character_tokens_match_everything() {
    let articles = collection();
    let outcome = SearchEngine::lexical_only().search("a b", &articles).await;
    assert_eq!(outcome.hits.len(), articles.len());
    assert_eq!(outcome.stage, MatchStage::Lexical);
}

#[tokio::test]
async fn every_hit_is_lexical_or_semantic() {
    let articles = collection();
    let matcher = ScriptedMatcher::answering(&["kvant"]);
    let engine = SearchEngine::with_matcher(matcher);

    for query in ["bobur", "fizika", "zzz qqq", "shoir xamsa"] {
        let outcome = engine.search(query, &articles).await;
        let tokens = wikiatlas_core::search::lexical::tokenize_query(query);
        for hit in &outcome.hits {
            let lexical = wikiatlas_core::search::lexical::matches_all_tokens(hit, &tokens);
            assert!(
                lexical || outcome.stage == MatchStage::Semantic,
                "{query}: {} has no justification",
                hit.id
            );
        }
    }
}
