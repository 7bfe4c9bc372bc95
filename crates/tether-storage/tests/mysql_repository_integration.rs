use std::sync::Arc;

use tether_core::ShortCode;
use tether_storage::{LinkRepository, MySqlRepository, NewLink, StorageError};
use tether_test_infra::mysql::{MySqlServer, MysqlConfig};

struct Fixture {
    mysql: MySqlServer,
    repo: MySqlRepository,
}

impl Fixture {
    async fn start() -> Self {
        let mysql = MySqlServer::new(MysqlConfig::builder().build())
            .await
            .expect("start mysql");
        let repo = mysql.repository().await.expect("mysql repository");

        Self { mysql, repo }
    }
}

fn code(value: &str) -> ShortCode {
    ShortCode::new_unchecked(value)
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn insert_and_find_record() {
    let fixture = Fixture::start().await;

    let inserted = fixture
        .repo
        .insert(NewLink::new(code("abc123"), "https://example.com"))
        .await
        .unwrap();

    let got = fixture
        .repo
        .find_by_code(&code("abc123"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got.id, inserted.id);
    assert_eq!(got.target, "https://example.com");
    assert_eq!(got.click_count, 0);
    assert!(!got.is_generated);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn insert_conflicts_when_code_already_exists() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(NewLink::new(code("abc123"), "https://one.example"))
        .await
        .unwrap();

    let err = fixture
        .repo
        .insert(NewLink::new(code("abc123"), "https://two.example"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn codes_are_case_sensitive() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(NewLink::new(ShortCode::generated("aBc123"), "https://one.example"))
        .await
        .unwrap();
    fixture
        .repo
        .insert(NewLink::new(ShortCode::generated("AbC123"), "https://two.example"))
        .await
        .unwrap();

    let got = fixture
        .repo
        .find_by_code(&code("AbC123"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got.target, "https://two.example");
    assert!(got.is_generated);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn increments_click_count() {
    let fixture = Fixture::start().await;

    let record = fixture
        .repo
        .insert(NewLink::new(code("clicky"), "https://example.com"))
        .await
        .unwrap();

    fixture.repo.increment_clicks(record.id).await.unwrap();
    fixture
        .repo
        .increment_clicks_by_code(&code("clicky"))
        .await
        .unwrap();

    let got = fixture
        .repo
        .find_by_code(&code("clicky"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got.click_count, 2);
    assert!(fixture.repo.increment_clicks(record.id + 1000).await.is_err());
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn racing_inserts_have_one_winner() {
    let fixture = Fixture::start().await;
    let repo = Arc::new(fixture.repo.clone());

    let mut handles = vec![];
    for i in 0..8 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.insert(NewLink::new(code("race"), format!("https://example{i}.com")))
                .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => assert!(matches!(err, StorageError::Conflict(_))),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn separate_pools_share_one_unique_key() {
    let fixture = Fixture::start().await;
    let other = fixture.mysql.repository().await.expect("second repository");

    fixture
        .repo
        .insert(NewLink::new(code("shared"), "https://one.example"))
        .await
        .unwrap();
    let err = other
        .insert(NewLink::new(code("shared"), "https://two.example"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict(_)));
    let got = other.find_by_code(&code("shared")).await.unwrap().unwrap();
    assert_eq!(got.target, "https://one.example");
}
