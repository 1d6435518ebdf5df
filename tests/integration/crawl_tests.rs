//! Integration tests for the mirror run
//!
//! These tests use wiremock to serve a small pipermail archive and check
//! what a run writes to a temporary publish directory.

use crate::fixtures::{
    gzip_stub, index_page, message_page, mount_bytes, mount_month, mount_page, test_config,
    Options, LIST_PATH,
};
use mailman_mirror::{Coordinator, CrawlState, MirrorError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Messages = Vec<(&'static str, String)>;

/// Three messages sent in early January 2009
fn january() -> Messages {
    vec![
        (
            "000001.html",
            message_page(
                "Subject 1",
                "Mon Jan  5 10:00:00 GMT 2009",
                "Happy new year.\nMail me at ann@example.com",
            ),
        ),
        (
            "000002.html",
            message_page("Subject 2", "Tue Jan  6 10:00:00 GMT 2009", "Second."),
        ),
        (
            "000003.html",
            message_page(
                "Subject 3",
                "Wed Jan  7 10:00:00 GMT 2009",
                "Third.\n&gt;<i> quoted once\n</I>&gt;&gt;<i> quoted twice\n</I>",
            ),
        ),
    ]
}

/// Two messages sent in early February 2009
fn february() -> Messages {
    vec![
        (
            "000004.html",
            message_page("Subject 4", "Mon Feb  2 10:00:00 GMT 2009", "Fourth."),
        ),
        (
            "000005.html",
            message_page(
                "Subject 5",
                "Tue Feb  3 10:00:00 GMT 2009",
                "Fifth. Write to ann@example.com",
            ),
        ),
    ]
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative))
        .unwrap_or_else(|e| panic!("{} should have been mirrored: {}", relative, e))
}

#[tokio::test]
async fn test_two_month_archive_end_to_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        LIST_PATH,
        index_page(&["2009-February", "2009-January"]),
        Some(1),
    )
    .await;
    mount_month(&server, "2009-February", &february(), 1).await;
    mount_month(&server, "2009-January", &january(), 1).await;

    let config = test_config(
        &server,
        dir.path(),
        Options {
            items_for_rss: 4,
            ..Options::default()
        },
    );
    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.months_visited, 2);
    assert_eq!(report.messages_fetched, 5);
    assert_eq!(report.feed_items, 4);
    assert!(!report.stopped_early);
    assert_eq!(report.feed_path, Some(dir.path().join("feed.xml")));
    assert_eq!(coordinator.state(), CrawlState::Done);

    let root = dir.path();
    assert!(root.join("index.html").exists());

    for month in ["2009-February", "2009-January"] {
        for view in ["date", "thread", "subject", "author"] {
            assert!(
                root.join(month).join(format!("{}.html", view)).exists(),
                "{}/{}.html missing",
                month,
                view
            );
        }
        assert_eq!(
            fs::read(root.join(format!("{}.txt.gz", month))).unwrap(),
            gzip_stub(month)
        );
    }

    for (month, messages) in [("2009-February", february()), ("2009-January", january())] {
        for (file, _) in messages {
            assert!(root.join(month).join(file).exists(), "{}/{} missing", month, file);
        }
    }

    let feed = read(root, "feed.xml");
    assert_eq!(feed.matches("<item>").count(), 4);
    let positions: Vec<usize> = ["Subject 5", "Subject 4", "Subject 3", "Subject 2"]
        .iter()
        .map(|subject| feed.find(subject).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(!feed.contains("Subject 1"));
    assert!(feed.contains("https://www.example.com/members/2009-February/000005.html"));
}

#[tokio::test]
async fn test_mirrored_pages_are_filtered() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, LIST_PATH, index_page(&["2009-January"]), None).await;
    mount_month(&server, "2009-January", &january(), 1).await;

    let config = test_config(&server, dir.path(), Options::default());
    Coordinator::new(config).unwrap().run().await.unwrap();

    let first = read(dir.path(), "2009-January/000001.html");
    assert!(first.contains("<B>Ann Example</B>"));
    assert!(!first.contains("ann at example.com"));
    assert!(!first.contains("ann@example.com"));

    let third = read(dir.path(), "2009-January/000003.html");
    assert!(third.contains("quoted once"));
    assert!(!third.contains("quoted twice"));

    let feed = read(dir.path(), "feed.xml");
    assert!(feed.contains("From: Ann Example."));
    assert!(!feed.contains("ann@example.com"));
}

#[tokio::test]
async fn test_stops_once_feed_is_full_and_messages_are_old() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        LIST_PATH,
        index_page(&["2009-February", "2009-January"]),
        None,
    )
    .await;
    mount_month(&server, "2009-February", &february(), 1).await;

    // The older month must never be touched
    mount_page(
        &server,
        &format!("{}/2009-January/date.html", LIST_PATH),
        String::new(),
        Some(0),
    )
    .await;

    let config = test_config(
        &server,
        dir.path(),
        Options {
            items_for_rss: 1,
            hours_to_go_back: 24,
            ..Options::default()
        },
    );
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert!(report.stopped_early);
    assert_eq!(report.months_visited, 1);
    assert_eq!(report.messages_fetched, 2);
    assert_eq!(report.feed_items, 1);

    // The message that ended the run is still mirrored
    assert!(dir.path().join("2009-February/000004.html").exists());
    assert!(!dir.path().join("2009-January").exists());

    let feed = read(dir.path(), "feed.xml");
    assert!(feed.contains("Subject 5"));
    assert!(!feed.contains("Subject 4"));
}

#[tokio::test]
async fn test_single_message_month_refreshes_auxiliary_views_when_stopping() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let february_single: Messages = february().into_iter().take(1).collect();

    mount_page(
        &server,
        LIST_PATH,
        index_page(&["2009-February", "2009-January"]),
        None,
    )
    .await;
    mount_month(&server, "2009-February", &february_single, 1).await;
    mount_month(&server, "2009-January", &january(), 1).await;

    let config = test_config(
        &server,
        dir.path(),
        Options {
            feed: false,
            items_for_rss: 1,
            hours_to_go_back: 24,
            ..Options::default()
        },
    );
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert!(report.stopped_early);
    assert_eq!(report.months_visited, 2);
    assert_eq!(report.messages_fetched, 2);
    assert_eq!(report.feed_items, 0);
    assert_eq!(report.feed_path, None);

    let root = dir.path();
    assert!(root.join("2009-January/000003.html").exists());
    assert!(!root.join("2009-January/000002.html").exists());
    assert!(root.join("2009-January/thread.html").exists());
    assert!(root.join("2009-January.txt.gz").exists());
    assert!(!root.join("feed.xml").exists());
}

#[tokio::test]
async fn test_empty_month_gets_no_auxiliary_views() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        LIST_PATH,
        index_page(&["2009-February", "2009-January"]),
        None,
    )
    .await;
    mount_month(&server, "2009-February", &[], 0).await;
    mount_month(&server, "2009-January", &january()[..1], 1).await;

    let config = test_config(&server, dir.path(), Options::default());
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.months_visited, 2);
    assert_eq!(report.messages_fetched, 1);

    let root = dir.path();
    assert!(root.join("2009-February/date.html").exists());
    assert!(!root.join("2009-February/thread.html").exists());
    assert!(!root.join("2009-February.txt.gz").exists());
    assert!(root.join("2009-January/thread.html").exists());
}

// A page without the usual structure is mirrored but kept out of the feed
#[tokio::test]
async fn test_unreadable_message_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let broken = message_page("Broken", "Tue Feb  3 10:00:00 GMT 2009", "No preformatted body")
        .replace("<PRE>", "<DIV>")
        .replace("</PRE>", "</DIV>");
    let messages: Messages = vec![
        ("000004.html", february().remove(0).1),
        ("000005.html", broken),
    ];

    mount_page(&server, LIST_PATH, index_page(&["2009-February"]), None).await;
    mount_month(&server, "2009-February", &messages, 1).await;

    let config = test_config(&server, dir.path(), Options::default());
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.messages_fetched, 2);
    assert_eq!(report.feed_items, 1);
    assert!(dir.path().join("2009-February/000005.html").exists());

    let feed = read(dir.path(), "feed.xml");
    assert!(feed.contains("Subject 4"));
    assert!(!feed.contains("Broken"));
}

#[tokio::test]
async fn test_fetch_failure_aborts_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, LIST_PATH, index_page(&["2009-February"]), None).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/2009-February/date.html", LIST_PATH)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = test_config(&server, dir.path(), Options::default());
    let err = Coordinator::new(config).unwrap().run().await.unwrap_err();

    assert!(matches!(err, MirrorError::HttpStatus { status: 404, .. }));

    // Pages written before the failure stay on disk; no feed is written
    assert!(dir.path().join("index.html").exists());
    assert!(!dir.path().join("feed.xml").exists());
}

#[tokio::test]
async fn test_run_cannot_be_repeated() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, LIST_PATH, index_page(&[]), Some(1)).await;

    let config = test_config(&server, dir.path(), Options::default());
    let mut coordinator = Coordinator::new(config).unwrap();

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.months_visited, 0);
    assert_eq!(report.feed_items, 0);
    assert!(dir.path().join("feed.xml").exists());

    let err = coordinator.run().await.unwrap_err();
    assert!(matches!(
        err,
        MirrorError::InvalidTransition {
            from: CrawlState::Done,
            to: CrawlState::ListingIndex,
        }
    ));
}

#[tokio::test]
async fn test_text_only_downloads_month_archives() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        LIST_PATH,
        index_page(&["2009-February", "2009-January"]),
        Some(1),
    )
    .await;
    for month in ["2009-February", "2009-January"] {
        mount_bytes(
            &server,
            &format!("{}/{}.txt.gz", LIST_PATH, month),
            gzip_stub(month),
            Some(1),
        )
        .await;
    }

    let config = test_config(&server, dir.path(), Options::default());
    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run_text_archives().await.unwrap();

    assert_eq!(report.archives_saved, 2);
    assert_eq!(coordinator.state(), CrawlState::Done);
    for month in ["2009-February", "2009-January"] {
        assert_eq!(
            fs::read(dir.path().join("text").join(format!("{}.txt.gz", month))).unwrap(),
            gzip_stub(month)
        );
    }
    assert!(!dir.path().join("index.html").exists());
    assert!(!dir.path().join("feed.xml").exists());
}

// An unreadable page must not take one of the feed's slots
#[tokio::test]
async fn test_unreadable_message_does_not_end_run_early() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let broken = message_page("Broken", "Tue Feb  3 10:00:00 GMT 2009", "No preformatted body")
        .replace("<PRE>", "<DIV>")
        .replace("</PRE>", "</DIV>");
    let messages: Messages = vec![
        ("000004.html", february().remove(0).1),
        ("000005.html", broken),
    ];

    mount_page(
        &server,
        LIST_PATH,
        index_page(&["2009-February", "2009-January"]),
        None,
    )
    .await;
    mount_month(&server, "2009-February", &messages, 1).await;
    mount_month(&server, "2009-January", &january(), 1).await;

    let config = test_config(
        &server,
        dir.path(),
        Options {
            items_for_rss: 2,
            hours_to_go_back: 24,
            ..Options::default()
        },
    );
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert!(report.stopped_early);
    assert_eq!(report.feed_items, 2);
    assert_eq!(report.months_visited, 2);
    assert_eq!(report.messages_fetched, 4);

    let root = dir.path();
    assert!(root.join("2009-February/000005.html").exists());
    assert!(root.join("2009-January/000002.html").exists());
    assert!(!root.join("2009-January/000001.html").exists());

    let feed = read(root, "feed.xml");
    assert!(feed.contains("Subject 4"));
    assert!(feed.contains("Subject 3"));
    assert!(!feed.contains("Subject 2"));
}

/// "From ann at example.com\nhello archive\n", gzipped
const GZIPPED_ARCHIVE: [u8; 58] = [
    0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x03, 0x73, 0x2b, 0xca, 0xcf, 0x55,
    0x48, 0xcc, 0xcb, 0x53, 0x48, 0x2c, 0x51, 0x48, 0xad, 0x48, 0xcc, 0x2d, 0xc8, 0x49, 0xd5,
    0x4b, 0xce, 0xcf, 0xe5, 0xca, 0x48, 0xcd, 0xc9, 0xc9, 0x57, 0x48, 0x2c, 0x4a, 0xce, 0xc8,
    0x2c, 0x4b, 0xe5, 0x02, 0x00, 0x33, 0xb6, 0xfa, 0xca, 0x26, 0x00, 0x00, 0x00,
];

#[tokio::test]
async fn test_text_archive_saved_compressed_despite_content_encoding() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, LIST_PATH, index_page(&["2009-February"]), None).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/2009-February.txt.gz", LIST_PATH)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/x-gzip")
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(GZIPPED_ARCHIVE.to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, dir.path(), Options::default());
    let report = Coordinator::new(config)
        .unwrap()
        .run_text_archives()
        .await
        .unwrap();

    assert_eq!(report.archives_saved, 1);
    let saved = fs::read(dir.path().join("text/2009-February.txt.gz")).unwrap();
    assert_eq!(saved, GZIPPED_ARCHIVE);
}
