//! Junk-article heuristic used by the administrative cleanup sweep.
//!
//! An article is junk when either
//! - its title is 10+ Latin letters/whitespace with no space character
//!   (keyboard mashing such as `asdfghjklqwe`), or
//! - its content is non-empty but shorter than 10 characters.

use crate::model::article::{Article, ArticleId};
use once_cell::sync::Lazy;
use regex::Regex;

static MASHED_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[asdfghjklqwertyuiopzxcvbnm\s]{10,}$").expect("valid mashed title regex")
});

const MIN_CONTENT_CHARS: usize = 10;

/// Returns whether `title` looks like keyboard mashing.
pub fn is_mashed_title(title: &str) -> bool {
    MASHED_TITLE_RE.is_match(title) && !title.contains(' ')
}

/// Returns whether `article` should be removed by the cleanup sweep.
pub fn is_garbage(article: &Article) -> bool {
    let content_chars = article.content.chars().count();
    is_mashed_title(&article.title) || (content_chars > 0 && content_chars < MIN_CONTENT_CHARS)
}

/// Collects ids of junk articles, preserving input order.
pub fn find_garbage(articles: &[Article]) -> Vec<ArticleId> {
    articles
        .iter()
        .filter(|article| is_garbage(article))
        .map(|article| article.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mashed_titles_are_detected() {
        assert!(is_mashed_title("asdfghjklqwe"));
        assert!(is_mashed_title("QWERTYUIOPAS"));
        assert!(!is_mashed_title("asdf"));
        assert!(!is_mashed_title("Kvant fizikasi asosi"));
        assert!(!is_mashed_title("asdfghjkl1234"));
    }

    #[test]
    fn short_non_empty_content_is_garbage() {
        assert!(is_garbage(&Article::new("a", "Tarix", "qisqa", "Tarix")));
        assert!(!is_garbage(&Article::new("b", "Tarix", "", "Tarix")));
        assert!(!is_garbage(&Article::new(
            "c",
            "Tarix",
            "Yetarlicha uzun matn",
            "Tarix"
        )));
    }

    #[test]
    fn find_garbage_keeps_input_order() {
        let articles = vec![
            Article::new("1", "zxcvbnmasdfg", "Yetarlicha uzun matn", "Fan"),
            Article::new("2", "Normal sarlavha", "Yetarlicha uzun matn", "Fan"),
            Article::new("3", "Normal", "x", "Fan"),
        ];
        assert_eq!(find_garbage(&articles), vec!["1".to_string(), "3".to_string()]);
    }
}
