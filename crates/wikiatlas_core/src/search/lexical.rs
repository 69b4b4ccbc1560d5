//! Token-AND substring matching over title, body and category.

use crate::model::article::Article;

/// Normalizes a query into lowercase tokens longer than one character.
pub fn tokenize_query(query: &str) -> Vec<String> {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Returns whether every token occurs in the title, body or category.
///
/// An empty token list matches everything.
pub fn matches_all_tokens(article: &Article, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let title = article.title.to_lowercase();
    let content = article.content.to_lowercase();
    let category = article.category.to_lowercase();
    tokens.iter().all(|token| {
        title.contains(token.as_str())
            || content.contains(token.as_str())
            || category.contains(token.as_str())
    })
}

/// Runs the lexical pass, preserving collection order.
pub fn lexical_matches<'a>(tokens: &[String], articles: &'a [Article]) -> Vec<&'a Article> {
    articles
        .iter()
        .filter(|article| matches_all_tokens(article, tokens))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_drops_single_chars() {
        assert_eq!(
            tokenize_query("  Amir   TEMUR a b "),
            vec!["amir".to_string(), "temur".to_string()]
        );
        assert!(tokenize_query("a b c").is_empty());
    }

    #[test]
    fn token_length_counts_characters_not_bytes() {
        assert_eq!(tokenize_query("ё ўз"), vec!["ўз".to_string()]);
    }

    #[test]
    fn every_token_must_match_some_field() {
        let article = Article::new("1", "Amir Temur", "Buyuk sarkarda", "Tarix");
        let tokens = tokenize_query("temur tarix");
        assert!(matches_all_tokens(&article, &tokens));

        let tokens = tokenize_query("temur fizika");
        assert!(!matches_all_tokens(&article, &tokens));
    }

    #[test]
    fn empty_fields_match_as_empty_strings() {
        let article = Article::new("1", "", "", "");
        assert!(!matches_all_tokens(&article, &tokenize_query("anything")));
    }
}
