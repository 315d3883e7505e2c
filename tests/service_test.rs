//! Link service tests that need control over the clock or the database file

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use tempfile::NamedTempFile;

use shortlink::database::init_db;
use shortlink::error::AppError;
use shortlink::model::{ListParams, NewShortUrl};
use shortlink::service::LinkService;

fn setup_service() -> (LinkService, NamedTempFile) {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let db = init_db(temp_db.path().to_str().unwrap()).expect("Failed to initialize test database");
    (LinkService::new(Arc::new(db)), temp_db)
}

fn request(url: &str) -> NewShortUrl {
    NewShortUrl {
        url: url.to_string(),
        ..NewShortUrl::default()
    }
}

#[test]
fn test_expired_link_is_gone() {
    let (links, _temp_db) = setup_service();
    let created_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

    let record = links
        .create(
            NewShortUrl {
                expiration_in_days: Some(2),
                ..request("https://example.com/expiring")
            },
            created_at,
        )
        .unwrap();
    assert_eq!(record.expires_at, Some(created_at + Duration::days(2)));

    let resolved = links.resolve(&record.short_key, created_at + Duration::days(1)).unwrap();
    assert_eq!(resolved.click_count, 1);

    let err = links
        .resolve(&record.short_key, created_at + Duration::days(2))
        .unwrap_err();
    assert!(matches!(err, AppError::Gone(_)));

    // Expired lookups do not count
    let stored = links.find(&record.short_key).unwrap();
    assert_eq!(stored.click_count, 1);
}

#[test]
fn test_out_of_range_expiration_is_rejected() {
    let (links, _temp_db) = setup_service();

    let err = links
        .create(
            NewShortUrl {
                expiration_in_days: Some(u32::MAX),
                ..request("https://example.com/forever")
            },
            Utc::now(),
        )
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // The failed create did not consume an identifier
    let record = links.create(request("https://example.com/next"), Utc::now()).unwrap();
    assert_eq!(record.id, 1);
}

#[test]
fn test_empty_ref_id_means_no_owner() {
    let (links, _temp_db) = setup_service();

    let record = links
        .create(
            NewShortUrl {
                ref_id: Some(String::new()),
                ..request("https://example.com/anon")
            },
            Utc::now(),
        )
        .unwrap();
    assert_eq!(record.created_by, None);

    let err = links.delete(&record.short_key, Some("someone")).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[test]
fn test_sequence_survives_restart() {
    let temp_db = NamedTempFile::new().unwrap();
    let path = temp_db.path().to_str().unwrap().to_string();

    {
        let links = LinkService::new(Arc::new(init_db(&path).unwrap()));
        for i in 0..62 {
            links
                .create(request(&format!("https://example.com/{}", i)), Utc::now())
                .unwrap();
        }
    }

    let links = LinkService::new(Arc::new(init_db(&path).unwrap()));
    let record = links.create(request("https://example.com/after"), Utc::now()).unwrap();

    // 63 = 1 * 62 + 1
    assert_eq!(record.id, 63);
    assert_eq!(record.short_key, "bb");
    assert_eq!(links.find("bb").unwrap().original_url, "https://example.com/after");

    let page = links.list(&ListParams::default()).unwrap();
    assert_eq!(page.total_fetched, 10);
    assert_eq!(page.data[0].short_key, "b");
}

#[test]
fn test_owner_listing_excludes_owners_sharing_a_prefix() {
    let (links, _temp_db) = setup_service();

    for (owner, url) in [
        ("alice", "https://example.com/alice"),
        ("alice:x", "https://example.com/secret"),
        ("alice:", "https://example.com/colon"),
    ] {
        links
            .create(
                NewShortUrl {
                    ref_id: Some(owner.to_string()),
                    is_private: true,
                    ..request(url)
                },
                Utc::now(),
            )
            .unwrap();
    }

    for owner in ["alice", "alice:x", "alice:"] {
        let page = links
            .list(&ListParams {
                ref_id: Some(owner.to_string()),
                ..ListParams::default()
            })
            .unwrap();
        assert_eq!(page.total_fetched, 1, "listing for {owner}");
        assert_eq!(page.data[0].created_by.as_deref(), Some(owner));
    }
}
