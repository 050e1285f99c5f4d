//! Integration tests for the harvester
//!
//! These tests use wiremock to serve board listings and post pages and run
//! the full resolve/traverse/flush cycle into a temporary JSONL store.

use async_trait::async_trait;
use board_harvest::config::ScrapeBounds;
use board_harvest::crawler::{harvest, EngineOptions, HarvestPlan, RunSummary};
use board_harvest::extract::{BoardClient, CommentSource};
use board_harvest::post::parse_date;
use board_harvest::storage::JsonlStore;
use board_harvest::{Board, BoardKind, Comment, FetchError, HarvestError, PostRecord};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOARD_ID: &str = "testboard";

/// Comment source that answers every post with one comment and one reply
#[derive(Default)]
struct StubComments {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CommentSource for StubComments {
    async fn fetch_comments(&self, _board: &Board, post_id: u64) -> Result<Vec<Comment>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Comment::new(format!("comment on {}", post_id), vec!["reply".to_string()])
            .into_iter()
            .collect())
    }
}

fn post_page(post_id: u64, date: &str) -> String {
    format!(
        r#"<html><body>
        <div class="view_content_wrap">
          <span class="title_headtext">[일반]</span>
          <span class="title_subject">Post {id}</span>
          <span class="gall_date" title="{date} 12:00:00">{date} 12:00:00</span>
          <span class="gall_count">조회 1,204</span>
          <div class="writing_view_box">
            <div class="write_div">Body of {id}
            - dc official App</div>
          </div>
          <p class="up_num" id="recommend_view_up_{id}">7</p>
          <p class="down_num" id="recommend_view_down_{id}">1</p>
        </div>
        </body></html>"#,
        id = post_id,
        date = date
    )
}

fn listing_page(rows: &[(u64, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(no, kind)| {
            format!(
                r#"<tr class="ub-content us-post" data-no="{}" data-type="{}"><td>{}</td></tr>"#,
                no, kind, no
            )
        })
        .collect();
    format!(
        "<html><body><table><tbody>{}</tbody></table></body></html>",
        rows
    )
}

async fn mount_listing(server: &MockServer, rows: &[(u64, &str)]) {
    Mock::given(method("GET"))
        .and(path("/board/lists/"))
        .and(query_param("id", BOARD_ID))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(rows))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_post(server: &MockServer, post_id: u64, date: &str) {
    Mock::given(method("GET"))
        .and(path("/board/view/"))
        .and(query_param("id", BOARD_ID))
        .and(query_param("no", post_id.to_string().as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(post_page(post_id, date))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn board_for(server: &MockServer) -> Board {
    let base = url::Url::parse(&server.uri()).expect("Failed to parse mock server URL");
    Board::new(BOARD_ID, BoardKind::Main, base)
}

fn id_bounds(start: u64, end: u64) -> ScrapeBounds {
    ScrapeBounds {
        start_id: Some(start),
        end_id: Some(end),
        ..ScrapeBounds::default()
    }
}

fn date_bounds(start: &str, end: &str) -> ScrapeBounds {
    ScrapeBounds {
        start_date: parse_date(start),
        end_date: parse_date(end),
        ..ScrapeBounds::default()
    }
}

async fn run(
    board: &Board,
    bounds: ScrapeBounds,
    store: &Path,
    crawl_comments: bool,
    comments: StubComments,
) -> Result<RunSummary, HarvestError> {
    let client = reqwest::Client::new();
    let source = BoardClient::new(client, comments);
    let plan = HarvestPlan {
        board,
        bounds,
        store_path: store,
        batch_size: 2,
        options: EngineOptions {
            crawl_comments,
            request_delay: Duration::ZERO,
        },
    };
    harvest(&plan, &source, JsonlStore::new(store), CancellationToken::new()).await
}

fn read_store(store: &Path) -> Vec<PostRecord> {
    std::fs::read_to_string(store)
        .expect("Failed to read store")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Store line is not a post"))
        .collect()
}

#[tokio::test]
async fn test_id_range_harvest_into_store() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(3, "icon_txt")]).await;
    mount_post(&server, 1, "2024.01.01").await;
    mount_post(&server, 3, "2024.01.02").await;

    let dir = TempDir::new().unwrap();
    let store = dir.path().join("nested").join("posts.jsonl");
    let board = board_for(&server);

    // Post 2 is not mounted, so it answers 404 like a deleted post
    let summary = run(&board, id_bounds(1, 3), &store, false, StubComments::default())
        .await
        .expect("Harvest should succeed");

    assert_eq!(summary.visited, 3);
    assert_eq!(summary.collected, 2);
    assert_eq!(summary.missing, 1);
    assert_eq!(summary.flushed, 2);
    assert!(!summary.interrupted);

    let posts = read_store(&store);
    assert_eq!(posts.iter().map(|p| p.post_id).collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(posts[0].title, "Post 1");
    assert_eq!(posts[0].view_count, 1204);
    assert_eq!(posts[0].recommend_count, 7);
    assert_eq!(posts[0].nonrecommend_count, 1);
    assert_eq!(posts[0].content, "Body of 1");
    assert!(posts[0].comments.is_empty());

    let line = std::fs::read_to_string(&store).unwrap();
    assert!(line.contains(r#""date":"2024.01.01""#));
    assert!(!line.contains("header"));
}

#[tokio::test]
async fn test_second_run_skips_stored_posts() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(3, "icon_txt")]).await;
    for id in 1..=3 {
        mount_post(&server, id, "2024.01.01").await;
    }

    let dir = TempDir::new().unwrap();
    let store = dir.path().join("posts.jsonl");
    let board = board_for(&server);

    let first = run(&board, id_bounds(1, 2), &store, false, StubComments::default())
        .await
        .unwrap();
    assert_eq!(first.collected, 2);

    let second = run(&board, id_bounds(1, 3), &store, false, StubComments::default())
        .await
        .unwrap();
    assert_eq!(second.duplicates, 2);
    assert_eq!(second.collected, 1);

    let ids: Vec<u64> = read_store(&store).iter().map(|p| p.post_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_missing_board() {
    let server = MockServer::start().await;
    // Nothing mounted: the listing answers 404

    let dir = TempDir::new().unwrap();
    let store = dir.path().join("posts.jsonl");
    let board = board_for(&server);

    let result = run(&board, id_bounds(1, 3), &store, false, StubComments::default()).await;
    assert!(matches!(result, Err(HarvestError::NotFound(_))));
    assert!(!store.exists());
}

#[tokio::test]
async fn test_server_error_counts_as_failure() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(2, "icon_txt")]).await;
    mount_post(&server, 2, "2024.01.01").await;
    Mock::given(method("GET"))
        .and(path("/board/view/"))
        .and(query_param("no", "1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = dir.path().join("posts.jsonl");
    let board = board_for(&server);

    let summary = run(&board, id_bounds(1, 2), &store, false, StubComments::default())
        .await
        .unwrap();
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.collected, 1);
    assert_eq!(read_store(&store)[0].post_id, 2);
}

#[tokio::test]
async fn test_date_window_harvest_walks_back_from_recent_post() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(900, "icon_notice"), (6, "icon_txt"), (5, "icon_txt")]).await;
    mount_post(&server, 6, "2024.01.10").await;
    mount_post(&server, 5, "2024.01.08").await;
    // Post 4 is deleted
    mount_post(&server, 3, "2024.01.05").await;
    mount_post(&server, 2, "2024.01.01").await;
    mount_post(&server, 1, "2023.12.31").await;

    let dir = TempDir::new().unwrap();
    let store = dir.path().join("posts.jsonl");
    let board = board_for(&server);
    let comments = StubComments::default();
    let comment_calls = Arc::clone(&comments.calls);

    let source = BoardClient::new(reqwest::Client::new(), comments);
    let plan = HarvestPlan {
        board: &board,
        bounds: date_bounds("2024.01.05", "2024.01.08"),
        store_path: &store,
        batch_size: 100,
        options: EngineOptions {
            crawl_comments: true,
            request_delay: Duration::ZERO,
        },
    };
    let summary = harvest(&plan, &source, JsonlStore::new(&store), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.out_of_window, 1);
    assert_eq!(summary.missing, 1);
    assert_eq!(summary.collected, 2);

    let posts = read_store(&store);
    assert_eq!(posts.iter().map(|p| p.post_id).collect::<Vec<_>>(), vec![5, 3]);
    assert_eq!(posts[0].comments.len(), 1);
    assert_eq!(posts[0].comments[0].text, "comment on 5");
    assert_eq!(posts[0].comments[0].replies, vec!["reply".to_string()]);

    // Only posts inside the window have their comments read
    assert_eq!(comment_calls.load(Ordering::SeqCst), 2);

    // The walk stops at post 2, which predates the window
    let requests = server.received_requests().await.unwrap();
    assert!(!requests
        .iter()
        .any(|r| r.url.query().is_some_and(|q| q.contains("no=1"))));
}

#[tokio::test]
async fn test_date_mode_without_regular_posts() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(900, "icon_notice")]).await;

    let dir = TempDir::new().unwrap();
    let store = dir.path().join("posts.jsonl");
    let board = board_for(&server);

    let result = run(
        &board,
        date_bounds("2024.01.01", "2024.01.31"),
        &store,
        false,
        StubComments::default(),
    )
    .await;
    assert!(matches!(result, Err(HarvestError::NotFound(_))));
}

#[tokio::test]
async fn test_ambiguous_bounds_fail_before_any_request() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(1, "icon_txt")]).await;

    let dir = TempDir::new().unwrap();
    let store = dir.path().join("posts.jsonl");
    let board = board_for(&server);

    let bounds = ScrapeBounds {
        start_id: Some(1),
        end_id: Some(2),
        start_date: parse_date("2024.01.01"),
        end_date: parse_date("2024.01.02"),
    };
    let result = run(&board, bounds, &store, false, StubComments::default()).await;
    assert!(matches!(result, Err(HarvestError::Config(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_utf8_line_in_store_does_not_cause_rewrites() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(3, "icon_txt")]).await;
    for id in 1..=3 {
        mount_post(&server, id, "2024.01.01").await;
    }

    let dir = TempDir::new().unwrap();
    let store = dir.path().join("posts.jsonl");
    let board = board_for(&server);

    run(&board, id_bounds(1, 1), &store, false, StubComments::default())
        .await
        .unwrap();
    {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new().append(true).open(&store).unwrap();
        file.write_all(b"{\"post_id\":9,\"title\":\"\xff\xfe\"}\n").unwrap();
    }
    run(&board, id_bounds(2, 2), &store, false, StubComments::default())
        .await
        .unwrap();

    let second = run(&board, id_bounds(1, 3), &store, false, StubComments::default())
        .await
        .unwrap();
    assert_eq!(second.duplicates, 2);
    assert_eq!(second.collected, 1);

    let ids: Vec<u64> = std::fs::read(&store)
        .unwrap()
        .split(|b| *b == b'\n')
        .filter_map(|line| serde_json::from_slice::<PostRecord>(line).ok())
        .map(|p| p.post_id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}
