//! Built-in article set served when neither backend nor archive has data.

use crate::model::article::{Article, ArticleStatus, Language, Visibility};

pub const BUILTIN_AUTHOR_ID: &str = "system";

const QUANTUM_CONTENT: &str = "Kvant fizikasi bu tabiatning eng kichik miqyosdagi (atom va \
subatom darajadagi) xatti-harakatlarini o'rganadigan fan sohasi. Klassik fizika qonunlari bu \
darajada o'z kuchini yo'qotadi. Masalan, elektron bir vaqtning o'zida ikki joyda bo'lishi \
(superpozitsiya) yoki masofadan turib bir-biriga ta'sir qilishi (kvant chigalligi) mumkin. \
Ushbu soha nafaqat nazariy, balki zamonaviy texnologiyalar, jumladan kvant kompyuterlari va \
lazerlarning asosi hisoblanadi.";

/// Returns the last-resort article list.
pub fn builtin_articles() -> Vec<Article> {
    let mut quantum = Article::new(
        "art-1",
        "Kvant fizikasi: Borliqning sirli asosi",
        QUANTUM_CONTENT,
        "Fan",
    );
    quantum.author_id = Some(BUILTIN_AUTHOR_ID.to_string());
    quantum.author_email = Some("olim@wikiatlas.uz".to_string());
    quantum.language = Language::Uz;
    quantum.status = ArticleStatus::Published;
    quantum.visibility = Visibility::Public;
    vec![quantum]
}

#[cfg(test)]
mod tests {
    use super::builtin_articles;
    use crate::filter::cleanup::find_garbage;

    #[test]
    fn builtin_set_is_clean_and_published() {
        let articles = builtin_articles();
        assert_eq!(articles[0].id, "art-1");
        assert!(find_garbage(&articles).is_empty());
        assert!(articles.iter().all(|a| a.reading_time >= 1));
    }
}
