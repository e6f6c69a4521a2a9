//! Integration tests for the catalog scraper
//!
//! These tests use wiremock to serve a small book store and run the full
//! pipeline end-to-end: discovery, pagination, extraction, id assignment
//! and storage.

use catalog_sweep::config::{load_config, parse_config, Config};
use catalog_sweep::crawler::{scrape_catalog, Coordinator};
use catalog_sweep::output::write_catalog_json;
use catalog_sweep::storage::{BookSink, SqliteStorage, Storage};
use catalog_sweep::{BookRecord, FetchError, HarvestError};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRAVEL: &str = "/catalogue/category/books/travel_2/index.html";
const MYSTERY: &str = "/catalogue/category/books/mystery_3/index.html";
const MYSTERY_PAGE_2: &str = "/catalogue/category/books/mystery_3/page-2.html";

/// Creates a config for the mock store
fn create_test_config(base_url: &str, extra: &str) -> Config {
    parse_config(&config_toml(base_url, extra)).expect("test config should be valid")
}

fn config_toml(base_url: &str, extra: &str) -> String {
    format!(
        r#"
[site]
base-url = "{base_url}/"

[user-agent]
crawler-name = "TestSweep"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
database-path = "./unused.db"

{extra}
"#
    )
}

fn root_page() -> String {
    format!(
        r#"<html><body>
        <div class="side_categories">
          <ul class="nav nav-list">
            <li>
              <a href="catalogue/category/books_1/index.html">Books</a>
              <ul>
                <li><a href="{}">
                    Travel
                </a></li>
                <li><a href="{}">
                    Mystery
                </a></li>
              </ul>
            </li>
          </ul>
        </div>
        </body></html>"#,
        TRAVEL.trim_start_matches('/'),
        MYSTERY.trim_start_matches('/')
    )
}

fn product(title: &str, price: &str, rating: &str, image: &str) -> String {
    format!(
        r#"<li class="col-xs-6 col-sm-4 col-md-3 col-lg-3">
          <article class="product_pod">
            <div class="image_container">
              <a href="../../../book_1/index.html"><img src="../../../../media/cache/{image}.jpg" alt="{title}" class="thumbnail"></a>
            </div>
            <p class="star-rating {rating}">
              <i class="icon-star"></i>
            </p>
            <h3><a href="../../../book_1/index.html" title="{title}">{title}</a></h3>
            <div class="product_price">
              <p class="price_color">{price}</p>
              <p class="instock availability">
                <i class="icon-ok"></i>
                In stock
              </p>
            </div>
          </article>
        </li>"#
    )
}

fn listing_page(products: &[String], next: Option<&str>) -> String {
    let pager = match next {
        Some(href) => format!(
            r#"<ul class="pager"><li class="current">Page 1</li><li class="next"><a href="{href}">next</a></li></ul>"#
        ),
        None => String::new(),
    };
    format!(
        r#"<html><body><section><ol class="row">{}</ol><div>{}</div></section></body></html>"#,
        products.concat(),
        pager
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Mounts the two-category store: Travel has one page with two books,
/// Mystery has two pages with two and one books.
async fn mount_store(server: &MockServer) {
    mount_page(server, "/", root_page()).await;
    mount_page(
        server,
        TRAVEL,
        listing_page(
            &[
                product("It's Only the Himalayas", "£45.17", "Two", "27/a5/himalayas"),
                product("Full Moon over Noah’s Ark", "£49.43", "Four", "57/77/full-moon"),
            ],
            None,
        ),
    )
    .await;
    mount_page(
        server,
        MYSTERY,
        listing_page(
            &[
                product("Sharp Objects", "£47.82", "Four", "32/51/sharp"),
                product("In a Dark, Dark Wood", "£19.63", "One", "5b/88/dark-wood"),
            ],
            Some("page-2.html"),
        ),
    )
    .await;
    mount_page(
        server,
        MYSTERY_PAGE_2,
        listing_page(&[product("The Past Never Ends", "£10", "Zero", "0b/bc/past")], None),
    )
    .await;
}

#[tokio::test]
async fn test_full_scrape_assigns_ids_in_traversal_order() {
    let server = MockServer::start().await;
    mount_store(&server).await;

    let config = create_test_config(&server.uri(), "");
    let coordinator = Coordinator::from_config(&config).expect("Failed to create coordinator");
    let run = coordinator.run().await.expect("Scrape failed");

    let summary: Vec<_> = run
        .books
        .iter()
        .map(|b| (b.id, b.category.as_str(), b.title.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "Travel", "It's Only the Himalayas"),
            (2, "Travel", "Full Moon over Noah’s Ark"),
            (3, "Mystery", "Sharp Objects"),
            (4, "Mystery", "In a Dark, Dark Wood"),
            (5, "Mystery", "The Past Never Ends"),
        ]
    );

    let first = &run.books[0];
    assert_eq!(first.price, 45.17);
    assert_eq!(first.rating, 2);
    assert_eq!(first.availability, "In stock");
    assert_eq!(
        first.image_url,
        format!("{}/media/cache/27/a5/himalayas.jpg", server.uri())
    );

    let last = &run.books[4];
    assert_eq!(last.price, 10.0);
    assert_eq!(last.rating, 0);

    assert_eq!(run.categories.names(), vec!["Travel", "Mystery"]);
    assert_eq!(run.pages_fetched, 4);
    assert!(run.skipped.is_empty());
}

#[tokio::test]
async fn test_repeated_scrapes_are_identical() {
    let server = MockServer::start().await;
    mount_store(&server).await;

    let config = create_test_config(&server.uri(), "");
    let first = scrape_catalog(&config).await.unwrap();
    let second = scrape_catalog(&config).await.unwrap();

    assert_eq!(first, second);
    let ids: Vec<u32> = second.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_pagination_stops_at_last_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/", root_page()).await;
    mount_page(&server, TRAVEL, listing_page(&[], None)).await;

    let mystery = "/catalogue/category/books/mystery_3/";
    mount_page(
        &server,
        MYSTERY,
        listing_page(&[product("p1", "£1", "One", "a")], Some("page-2.html")),
    )
    .await;
    mount_page(
        &server,
        &format!("{}page-2.html", mystery),
        listing_page(&[product("p2", "£2", "Two", "b")], Some("page-3.html")),
    )
    .await;
    mount_page(
        &server,
        &format!("{}page-3.html", mystery),
        listing_page(&[product("p3", "£3", "Three", "c")], None),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("{}page-4.html", mystery)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), "");
    let books = scrape_catalog(&config).await.unwrap();

    let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["p1", "p2", "p3"]);
    assert!(books.iter().all(|b| b.category == "Mystery"));
}

#[tokio::test]
async fn test_store_without_navigation_is_unknown_category() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        listing_page(
            &[product("Alone", "£3.00", "Five", "x"), product("Together", "£4.00", "Three", "y")],
            None,
        ),
    )
    .await;

    let config = create_test_config(&server.uri(), "");
    let books = scrape_catalog(&config).await.unwrap();

    assert_eq!(books.len(), 2);
    assert!(books.iter().all(|b| b.category == "Unknown"));
    assert_eq!(books[0].id, 1);
    assert_eq!(books[1].rating, 3);
}

#[tokio::test]
async fn test_missing_page_aborts_scrape() {
    let server = MockServer::start().await;
    mount_page(&server, "/", root_page()).await;
    mount_page(&server, TRAVEL, listing_page(&[product("t", "£1", "One", "t")], None)).await;
    Mock::given(method("GET"))
        .and(path(MYSTERY))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), "[fetcher]\nmax-retries = 3\nretry-delay-ms = 1");
    let err = scrape_catalog(&config).await.unwrap_err();

    match err {
        HarvestError::Fetch { url, source } => {
            assert!(url.ends_with(MYSTERY));
            assert!(matches!(source, FetchError::Status { status: 404 }));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/", listing_page(&[product("Patient", "£1", "One", "p")], None)).await;

    let config = create_test_config(&server.uri(), "[fetcher]\nmax-retries = 2\nretry-delay-ms = 1");
    let books = scrape_catalog(&config).await.unwrap();

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Patient");
}

#[tokio::test]
async fn test_server_error_without_retries_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), "");
    let err = scrape_catalog(&config).await.unwrap_err();

    assert!(matches!(
        err,
        HarvestError::Fetch {
            source: FetchError::Status { status: 503 },
            ..
        }
    ));
}

#[tokio::test]
async fn test_skip_policy_drops_malformed_cards() {
    let server = MockServer::start().await;
    let priceless = product("No Price", "£0", "One", "np")
        .replace(r#"<p class="price_color">£0</p>"#, "");
    mount_page(
        &server,
        "/",
        listing_page(
            &[
                product("Before", "£1", "One", "b"),
                priceless,
                product("After", "£2", "Two", "a"),
            ],
            None,
        ),
    )
    .await;

    let strict = create_test_config(&server.uri(), "");
    assert!(matches!(
        scrape_catalog(&strict).await,
        Err(HarvestError::Extraction { .. })
    ));

    let lenient = create_test_config(&server.uri(), "[extraction]\nmalformed-card = \"skip\"");
    let run = Coordinator::from_config(&lenient).unwrap().run().await.unwrap();

    let kept: Vec<_> = run.books.iter().map(|b| (b.id, b.title.as_str())).collect();
    assert_eq!(kept, vec![(1, "Before"), (2, "After")]);
    assert_eq!(run.skipped.len(), 1);
    assert_eq!(run.skipped[0].reason, "missing price");
}

#[tokio::test]
async fn test_scrape_and_store_ignores_duplicate_ids() {
    let server = MockServer::start().await;
    mount_store(&server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("books.db");
    let config = create_test_config(&server.uri(), "");

    let books = scrape_catalog(&config).await.unwrap();

    let mut storage = SqliteStorage::new(&db_path).expect("Failed to open database");
    let run_id = storage.create_run("integration").unwrap();
    let report = storage.store(&books).unwrap();
    storage.complete_run(run_id, books.len() as u32).unwrap();

    assert_eq!(report.saved.len(), 5);
    assert!(report.failures.is_empty());

    // A second run reproduces the same ids; nothing new is inserted
    let again = scrape_catalog(&config).await.unwrap();
    let report = storage.store(&again).unwrap();
    assert!(report.failures.is_empty());
    assert_eq!(storage.count_books().unwrap(), 5);

    let stored: Vec<BookRecord> = storage.list_books().unwrap();
    assert_eq!(stored, books);
    assert_eq!(
        storage.category_counts().unwrap(),
        vec![("Mystery".to_string(), 3), ("Travel".to_string(), 2)]
    );

    let latest = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(latest.books_scraped, Some(5));
}

#[tokio::test]
async fn test_config_file_to_json_export() {
    let server = MockServer::start().await;
    mount_store(&server).await;

    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("catalog.json");

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_toml(&server.uri(), "").as_bytes()).unwrap();
    let config = load_config(file.path()).unwrap();

    let books = scrape_catalog(&config).await.unwrap();
    write_catalog_json(&books, &json_path).unwrap();

    let exported: Vec<BookRecord> =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(exported, books);
    assert_eq!(exported[2].title, "Sharp Objects");
}
