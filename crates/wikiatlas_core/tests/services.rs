use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;
use wikiatlas_core::db::ArchiveLocation;
use wikiatlas_core::model::comment::ArticleComment;
use wikiatlas_core::model::community::{Community, CommunityDraft, CommunityValidationError};
use wikiatlas_core::model::profile::{Profile, ProfileUpdate};
use wikiatlas_core::model::record::ArticleRecord;
use wikiatlas_core::service::ListingOrigin;
use wikiatlas_core::{
    Article, ArticleDetail, ArticleDraft, ArticleGateway, ArticleService, ArticleServiceError,
    DirectoryGateway, DirectoryService, DirectoryServiceError, DraftValidationError,
    GatewayError, GatewayResult, Identity, SqliteArchiveRepository,
};

fn offline() -> GatewayError {
    GatewayError::Network {
        message: "offline".to_string(),
        cause: "connection refused".to_string(),
    }
}

/// In-memory backend; every call is logged by name.
struct FakeBackend {
    rows: Option<Vec<serde_json::Value>>,
    calls: Mutex<Vec<String>>,
    refuse_delete: Vec<&'static str>,
}

impl FakeBackend {
    fn with_rows(rows: Vec<serde_json::Value>) -> Self {
        Self {
            rows: Some(rows),
            calls: Mutex::new(Vec::new()),
            refuse_delete: Vec::new(),
        }
    }

    fn unreachable() -> Self {
        Self {
            rows: None,
            calls: Mutex::new(Vec::new()),
            refuse_delete: Vec::new(),
        }
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleGateway for FakeBackend {
    async fn list_articles(&self) -> GatewayResult<Vec<ArticleRecord>> {
        self.log("list".to_string());
        let rows = self.rows.clone().ok_or_else(offline)?;
        Ok(ArticleRecord::from_list_body(&serde_json::Value::Array(rows)))
    }

    async fn get_article(&self, id: &str) -> GatewayResult<ArticleDetail> {
        self.log(format!("get:{id}"));
        Err(GatewayError::NotFound("Maqola topilmadi.".to_string()))
    }

    async fn create_article(
        &self,
        author: &Identity,
        draft: &ArticleDraft,
    ) -> GatewayResult<Article> {
        self.log(format!("create:{}", author.id));
        let mut article = Article::new("new-1", &draft.title, &draft.content, &draft.category);
        article.author_id = Some(author.id.clone());
        Ok(article)
    }

    async fn update_article(
        &self,
        author: &Identity,
        id: &str,
        _draft: &ArticleDraft,
    ) -> GatewayResult<Article> {
        self.log(format!("update:{id}"));
        Err(GatewayError::Forbidden(format!(
            "{} cannot edit {id}",
            author.id
        )))
    }

    async fn delete_article(&self, id: &str) -> GatewayResult<()> {
        self.log(format!("delete:{id}"));
        if self.refuse_delete.contains(&id) {
            return Err(GatewayError::Forbidden("not yours".to_string()));
        }
        Ok(())
    }

    async fn post_comment(&self, article_id: &str, content: &str) -> GatewayResult<ArticleComment> {
        self.log(format!("comment:{article_id}"));
        Ok(ArticleComment {
            id: "c-1".to_string(),
            article_id: article_id.to_string(),
            author_id: "u-1".to_string(),
            author_name: "tarixchi".to_string(),
            content: content.to_string(),
            created_at: None,
            is_flagged: false,
        })
    }
}

#[async_trait]
impl DirectoryGateway for FakeBackend {
    async fn list_communities(&self) -> GatewayResult<Vec<Community>> {
        self.log("communities".to_string());
        Err(offline())
    }

    async fn create_community(&self, draft: &CommunityDraft) -> GatewayResult<Community> {
        self.log(format!("create_community:{}", draft.slug));
        Ok(serde_json::from_value(json!({
            "id": "k-1",
            "name": draft.name,
            "slug": draft.slug
        }))
        .unwrap())
    }

    async fn get_profile(&self, user_id: &str) -> GatewayResult<Profile> {
        self.log(format!("profile:{user_id}"));
        Err(offline())
    }

    async fn update_profile(&self, user_id: &str, _update: &ProfileUpdate) -> GatewayResult<()> {
        self.log(format!("update_profile:{user_id}"));
        Ok(())
    }
}

fn service(backend: FakeBackend) -> ArticleService<FakeBackend, SqliteArchiveRepository> {
    ArticleService::new(
        backend,
        SqliteArchiveRepository::open(&ArchiveLocation::Memory).unwrap(),
    )
}

fn row(id: &str, title: &str, content: &str, category: &str) -> serde_json::Value {
    json!({ "id": id, "title": title, "content": content, "category": category })
}

fn author() -> Identity {
    Identity::new("u-1", "tarixchi@atlas.uz")
}

#[tokio::test]
async fn duplicate_art_1_rows_collapse_to_first_seen() {
    let service = service(FakeBackend::with_rows(vec![
        row("art-1", "Birinchi", "asl matn", "Fan"),
        row("art-1", "Ikkinchi", "nusxa", "Fan"),
    ]));

    let listing = service.list_articles().await;

    assert_eq!(listing.origin, ListingOrigin::Backend);
    assert_eq!(listing.articles.len(), 1);
    assert_eq!(listing.articles[0].title, "Birinchi");
    assert_eq!(service.article_count().await, 1);
}

#[tokio::test]
async fn unreachable_backend_serves_builtin_article() {
    let service = service(FakeBackend::unreachable());

    let listing = service.list_articles().await;
    assert_eq!(listing.origin, ListingOrigin::Builtin);
    assert_eq!(listing.articles[0].id, "art-1");

    let hits = service.search("kvant").await;
    assert_eq!(hits.len(), 1);
    assert!(service.search("xyz123nonexistent").await.is_empty());
}

#[tokio::test]
async fn related_excludes_current_and_caps_at_three() {
    let service = service(FakeBackend::with_rows(vec![
        row("t1", "Temur", "matn", "Tarix"),
        row("t2", "Bobur", "matn", "Tarix"),
        row("f1", "Kvant", "matn", "Fan"),
        row("t3", "Ulug'bek", "matn", "Tarix"),
        row("t4", "Navoiy davri", "matn", "Tarix"),
        row("t5", "Xiva xonligi", "matn", "Tarix"),
    ]));

    let related = service.related_articles("Tarix", "t2").await;
    let ids = related.iter().map(|a| a.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["t1", "t3", "t4"]);

    let page = service.articles_page(1, Some(4)).await;
    let ids = page.iter().map(|a| a.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["t4", "t5"]);
}

#[tokio::test]
async fn invalid_drafts_never_reach_the_backend() {
    let service = service(FakeBackend::with_rows(Vec::new()));

    let err = service
        .save_article(&author(), None, &ArticleDraft::new("  ", "Matn"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ArticleServiceError::InvalidDraft(DraftValidationError::EmptyTitle)
    ));

    let err = service
        .save_article(&author(), Some("art-1"), &ArticleDraft::new("Sarlavha", " "))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ArticleServiceError::InvalidDraft(DraftValidationError::EmptyContent)
    ));

    let err = service.add_comment("art-1", " \n ").await.unwrap_err();
    assert!(matches!(err, ArticleServiceError::EmptyComment));

    assert!(service.gateway().calls().is_empty());
}

#[tokio::test]
async fn save_creates_without_id_and_surfaces_permission_errors() {
    let service = service(FakeBackend::with_rows(Vec::new()));
    let draft = ArticleDraft::new("Sarlavha", "Matn");

    let created = service.save_article(&author(), None, &draft).await.unwrap();
    assert_eq!(created.id, "new-1");

    let err = service
        .save_article(&author(), Some("art-9"), &draft)
        .await
        .unwrap_err();
    match err {
        ArticleServiceError::Gateway(gateway) => assert!(gateway.is_permission()),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.gateway().calls(), vec!["create:u-1", "update:art-9"]);
}

#[tokio::test]
async fn cleanup_sweep_respects_dry_run_and_collects_failures() {
    let rows = vec![
        row("ok", "Amir Temur", "Sohibqiron haqida batafsil maqola.", "Tarix"),
        row("mash", "asdfghjklqwe", "Yetarlicha uzun matn bu yerda.", "Fan"),
        row("short", "Qisqa", "ha", "Fan"),
        row("short", "Qisqa nusxa", "yo'q", "Fan"),
        row("locked", "qwertyuiopas", "Yetarlicha uzun matn bu yerda.", "Fan"),
    ];

    let dry = service(FakeBackend::with_rows(rows.clone()));
    let report = dry.cleanup_sweep(true).await.unwrap();
    assert!(report.dry_run);
    assert_eq!(report.matched, vec!["mash", "short", "locked"]);
    assert!(report.deleted.is_empty());
    assert!(!dry
        .gateway()
        .calls()
        .iter()
        .any(|call| call.starts_with("delete:")));

    let mut backend = FakeBackend::with_rows(rows);
    backend.refuse_delete = vec!["locked"];
    let live = service(backend);
    let report = live.cleanup_sweep(false).await.unwrap();
    assert_eq!(report.deleted, vec!["mash", "short"]);
    assert_eq!(report.failed, vec!["locked"]);
    let deletes = live
        .gateway()
        .calls()
        .into_iter()
        .filter(|call| call.starts_with("delete:"))
        .collect::<Vec<_>>();
    assert_eq!(deletes, vec!["delete:mash", "delete:short", "delete:locked"]);
}

#[tokio::test]
async fn cleanup_sweep_fails_when_list_is_unavailable() {
    let service = service(FakeBackend::unreachable());
    let err = service.cleanup_sweep(false).await.unwrap_err();
    assert!(matches!(err, ArticleServiceError::Gateway(ref e) if e.is_transport()));
}

#[tokio::test]
async fn directory_reads_degrade_and_writes_are_guarded() {
    let directory = DirectoryService::new(FakeBackend::with_rows(Vec::new()));

    assert!(directory.list_communities().await.is_empty());
    let profile = directory.get_profile("u-7").await;
    assert_eq!(profile.id, "u-7");
    assert_eq!(profile.username.as_deref(), Some("Anonymous"));

    let update = ProfileUpdate {
        username: Some("yangi".to_string()),
        ..ProfileUpdate::default()
    };
    let err = directory
        .update_profile(&author(), "u-7", &update)
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryServiceError::NotProfileOwner { .. }));
    directory
        .update_profile(&author(), "u-1", &update)
        .await
        .unwrap();

    let err = directory
        .create_community(&CommunityDraft::new("   ", ""))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DirectoryServiceError::InvalidCommunity(CommunityValidationError::EmptyName)
    ));

    let mut draft = CommunityDraft::new("Kvant Fizikasi", "Suhbatlar");
    draft.slug = "  Kvant  FIZIKASI!! ".to_string();
    let created = directory.create_community(&draft).await.unwrap();
    assert_eq!(created.slug, "kvant-fizikasi");

    let calls = directory_calls(&directory);
    assert_eq!(
        calls,
        vec![
            "communities",
            "profile:u-7",
            "update_profile:u-1",
            "create_community:kvant-fizikasi"
        ]
    );
}

fn directory_calls(directory: &DirectoryService<FakeBackend>) -> Vec<String> {
    directory.gateway().calls()
}
