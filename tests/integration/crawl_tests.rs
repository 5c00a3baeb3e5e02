//! Integration tests for the crawler
//!
//! These tests use wiremock to serve listing, answer, image, login and
//! category pages and run the page loop end-to-end against an in-memory
//! store.

use quiz_harvest::config::parse_config;
use quiz_harvest::crawler::{
    crawl_category, CrawlPlan, Harvester, Politeness, Session, StopPoint,
};
use quiz_harvest::site::{PageBound, PageRange, SiteUrls};
use quiz_harvest::storage::{
    resolve_or_create, CountedTable, NewQuestion, RecordStore, ReferenceKey, RunStatus,
    SqliteStorage,
};
use quiz_harvest::HarvestError;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One listing row with optional tags and extra markup inside the question block
fn row(number: i64, tags: &[&str], extra: &str) -> String {
    let tag_links: String = tags
        .iter()
        .enumerate()
        .map(|(i, tag)| format!(r#"<a id="tag_{}" href="tags/{}">{}</a> "#, i, tag, tag))
        .collect();
    format!(
        r#"<div id="vragenrij_{n}">
             <div class="vragenrij"><span>{tags}</span>Vraag nummer {n}?{extra}</div>
           </div>"#,
        n = number,
        tags = tag_links,
        extra = extra
    )
}

fn listing_page(rows: &[String]) -> String {
    format!("<html><body>{}</body></html>", rows.concat())
}

fn plain_listing(numbers: &[i64]) -> String {
    listing_page(&numbers.iter().map(|&n| row(n, &[], "")).collect::<Vec<_>>())
}

fn category_index(categories: &[(&str, u32)]) -> String {
    let entries: String = categories
        .iter()
        .map(|(slug, count)| {
            format!(
                r#"<div style="padding:8px;float:left;"><a href="categorie/{slug}"><big>{slug}</big></a> ({count})</div>"#,
                slug = slug,
                count = count
            )
        })
        .collect();
    format!(r#"<html><body><div class="col-lg-8">{}</div></body></html>"#, entries)
}

async fn mount_listing(server: &MockServer, category: &str, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/categorie/{}/{}/20/1/0", category, page)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_answers(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/beantwoordevragen.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<div><b>Eddy Merckx</b></div>"))
        .mount(server)
        .await;
}

fn session(server: &MockServer) -> Session {
    Session::new(SiteUrls::new(&server.uri(), 20).expect("valid base url"))
        .expect("http client")
}

fn plan(category: &str, pages: PageRange, stop_at_first_known: bool, image_dir: &Path) -> CrawlPlan {
    CrawlPlan {
        category: category.to_string(),
        pages,
        stop_at_first_known,
        image_dir: image_dir.join(category),
    }
}

fn store_question(store: &mut SqliteStorage, category: &str, number: i64, text: &str) {
    let category_id = resolve_or_create(store, &ReferenceKey::Category(category)).unwrap();
    store
        .insert_question(&NewQuestion {
            number,
            text,
            answer: "oud antwoord",
            category_id,
            quiz_id: None,
            quiz_round: None,
        })
        .unwrap();
}

fn test_config(base_url: &str, extra_site: &str, to_page: &str, category: &str, dir: &Path) -> String {
    format!(
        r#"
[site]
base-url = "{base}"
{extra_site}

[crawler]
category = "{category}"
from-page = 1
to-page = {to_page}
sleep-time = 0
min-sleep-time = 0
only-new = false

[output]
database-path = "{dir}/quiz.sqlite"
image-dir = "{dir}/images"
export-dir = "{dir}/export"
log-file = "{dir}/quiz.log"
"#,
        base = base_url,
        extra_site = extra_site,
        category = category,
        to_page = to_page,
        dir = dir.display()
    )
}

fn harvester(toml: &str) -> Harvester {
    let config = parse_config(toml).expect("valid config");
    let mut harvester = Harvester::with_storage(
        config,
        "test-hash".to_string(),
        SqliteStorage::open_in_memory().unwrap(),
    )
    .expect("harvester");
    harvester.set_politeness(Politeness::none());
    harvester
}

#[tokio::test]
async fn test_new_questions_are_stored_with_answers() {
    let server = MockServer::start().await;
    let images = tempfile::tempdir().unwrap();
    mount_listing(&server, "sport", 1, plain_listing(&[30, 29])).await;
    mount_answers(&server).await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    let report = crawl_category(
        &session(&server),
        &mut store,
        &Politeness::none(),
        &plan("sport", PageRange::resolve(1, PageBound::All, 1), false, images.path()),
    )
    .await
    .unwrap();

    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.questions_stored, 2);
    assert_eq!(report.questions_skipped, 0);
    assert!(report.stopped_at.is_none());

    let question = store.get_question(30).unwrap().expect("question 30 stored");
    assert_eq!(question.text, "Vraag nummer 30?");
    assert_eq!(question.answer, "Eddy Merckx");
    assert_eq!(store.count_rows(CountedTable::Category).unwrap(), 1);
}

#[tokio::test]
async fn test_rescrape_neither_duplicates_nor_updates() {
    let server = MockServer::start().await;
    let images = tempfile::tempdir().unwrap();
    mount_listing(&server, "sport", 1, plain_listing(&[30, 29])).await;
    mount_answers(&server).await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    store_question(&mut store, "sport", 29, "originele tekst");

    let report = crawl_category(
        &session(&server),
        &mut store,
        &Politeness::none(),
        &plan("sport", PageRange::resolve(1, PageBound::All, 1), false, images.path()),
    )
    .await
    .unwrap();

    assert_eq!(report.questions_stored, 1);
    assert_eq!(report.questions_skipped, 1);
    assert_eq!(store.count_rows(CountedTable::Question).unwrap(), 2);

    let kept = store.get_question(29).unwrap().unwrap();
    assert_eq!(kept.text, "originele tekst");
    assert_eq!(kept.answer, "oud antwoord");

    // A second pass over the same page stores nothing new
    let again = crawl_category(
        &session(&server),
        &mut store,
        &Politeness::none(),
        &plan("sport", PageRange::resolve(1, PageBound::All, 1), false, images.path()),
    )
    .await
    .unwrap();
    assert_eq!(again.questions_stored, 0);
    assert_eq!(again.questions_skipped, 2);
    assert_eq!(store.count_rows(CountedTable::Question).unwrap(), 2);
}

#[tokio::test]
async fn test_stop_at_first_known_aborts_rest_of_page_and_later_pages() {
    let server = MockServer::start().await;
    let images = tempfile::tempdir().unwrap();
    mount_listing(&server, "sport", 1, plain_listing(&[30, 29, 28])).await;

    Mock::given(method("GET"))
        .and(path("/categorie/sport/2/20/1/0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_listing(&[27])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/beantwoordevragen.php"))
        .and(query_param("vraagid", "28"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<b>nooit</b>"))
        .expect(0)
        .mount(&server)
        .await;
    mount_answers(&server).await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    store_question(&mut store, "sport", 29, "al gekend");

    let report = crawl_category(
        &session(&server),
        &mut store,
        &Politeness::none(),
        &plan("sport", PageRange::resolve(1, PageBound::All, 2), true, images.path()),
    )
    .await
    .unwrap();

    assert_eq!(
        report.stopped_at,
        Some(StopPoint {
            page: 1,
            row: 1,
            number: 29
        })
    );
    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.questions_stored, 1);
    assert!(store.question_exists(30).unwrap());
    assert!(!store.question_exists(28).unwrap());
    assert!(!store.question_exists(27).unwrap());
}

#[tokio::test]
async fn test_tags_reuse_existing_rows() {
    let server = MockServer::start().await;
    let images = tempfile::tempdir().unwrap();
    mount_listing(
        &server,
        "sport",
        1,
        listing_page(&[row(81790, &["cycling", "sporty"], "")]),
    )
    .await;
    mount_answers(&server).await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    resolve_or_create(&mut store, &ReferenceKey::Tag("history")).unwrap();
    resolve_or_create(&mut store, &ReferenceKey::Tag("music")).unwrap();
    let cycling = resolve_or_create(&mut store, &ReferenceKey::Tag("cycling")).unwrap();
    assert_eq!(cycling, 3);

    crawl_category(
        &session(&server),
        &mut store,
        &Politeness::none(),
        &plan("sport", PageRange::resolve(1, PageBound::All, 1), false, images.path()),
    )
    .await
    .unwrap();

    assert_eq!(store.count_rows(CountedTable::Tag).unwrap(), 4);
    assert_eq!(store.count_rows(CountedTable::QuestionTag).unwrap(), 2);
    assert_eq!(
        store.find_reference(&ReferenceKey::Tag("cycling")).unwrap(),
        Some(3)
    );

    let question = store.get_question(81790).unwrap().unwrap();
    assert_eq!(
        store.tags_for_question(question.id).unwrap(),
        vec!["cycling".to_string(), "sporty".to_string()]
    );
}

#[tokio::test]
async fn test_malformed_row_halts_only_its_page() {
    let server = MockServer::start().await;
    let images = tempfile::tempdir().unwrap();
    let broken = r#"<div id="vragenrij_x"><div class="vragenrij">kapot</div></div>"#.to_string();
    mount_listing(
        &server,
        "sport",
        1,
        listing_page(&[row(30, &[], ""), broken, row(28, &[], "")]),
    )
    .await;
    mount_listing(&server, "sport", 2, plain_listing(&[27])).await;
    mount_answers(&server).await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    let report = crawl_category(
        &session(&server),
        &mut store,
        &Politeness::none(),
        &plan("sport", PageRange::resolve(1, PageBound::All, 2), false, images.path()),
    )
    .await
    .unwrap();

    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.pages_abandoned, 1);
    assert!(store.question_exists(30).unwrap());
    assert!(!store.question_exists(28).unwrap());
    assert!(store.question_exists(27).unwrap());
}

#[tokio::test]
async fn test_non_200_listing_is_parsed_anyway() {
    let server = MockServer::start().await;
    let images = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/categorie/sport/1/20/1/0"))
        .respond_with(ResponseTemplate::new(500).set_body_string(plain_listing(&[12])))
        .mount(&server)
        .await;
    mount_answers(&server).await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    let report = crawl_category(
        &session(&server),
        &mut store,
        &Politeness::none(),
        &plan("sport", PageRange::resolve(1, PageBound::All, 1), false, images.path()),
    )
    .await
    .unwrap();

    assert_eq!(report.questions_stored, 1);
    assert!(store.question_exists(12).unwrap());
}

#[tokio::test]
async fn test_image_is_downloaded_and_recorded() {
    let server = MockServer::start().await;
    let images = tempfile::tempdir().unwrap();
    mount_listing(
        &server,
        "sport",
        1,
        listing_page(&[
            row(30, &[], r#"<center><img src="prodgfx/vragen/q/abc_30.jpg"></center>"#),
            row(29, &[], r#"<center><img src="prodgfx/vragen/q/missing_29.png"></center>"#),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/prodgfx/vragen/q/abc_30.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prodgfx/vragen/q/missing_29.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_answers(&server).await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    crawl_category(
        &session(&server),
        &mut store,
        &Politeness::none(),
        &plan("sport", PageRange::resolve(1, PageBound::All, 1), false, images.path()),
    )
    .await
    .unwrap();

    let saved = images.path().join("sport").join("30.jpg");
    assert_eq!(std::fs::read(&saved).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xE0]);
    assert!(!images.path().join("sport").join("29.png").exists());

    // The failed download still stores the question, without an image row
    assert!(store.question_exists(29).unwrap());
    assert_eq!(store.count_rows(CountedTable::Image).unwrap(), 1);
}

#[tokio::test]
async fn test_video_reference_is_recorded() {
    let server = MockServer::start().await;
    let images = tempfile::tempdir().unwrap();
    mount_listing(
        &server,
        "muziek",
        1,
        listing_page(&[row(
            44,
            &[],
            r#"<center><iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ"></iframe></center>"#,
        )]),
    )
    .await;
    mount_answers(&server).await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    crawl_category(
        &session(&server),
        &mut store,
        &Politeness::none(),
        &plan("muziek", PageRange::resolve(1, PageBound::All, 1), false, images.path()),
    )
    .await
    .unwrap();

    assert_eq!(store.count_rows(CountedTable::VideoFragment).unwrap(), 1);
    assert_eq!(store.count_rows(CountedTable::Image).unwrap(), 0);
}

#[tokio::test]
async fn test_all_pages_includes_last_page() {
    // 25 questions at 20 per page: two pages, both visited
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/categorie/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(category_index(&[("sport", 25)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categorie/sport/1/20/1/0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_listing(&[30])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categorie/sport/2/20/1/0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_listing(&[5])))
        .expect(1)
        .mount(&server)
        .await;
    mount_answers(&server).await;

    let mut harvester = harvester(&test_config(&server.uri(), "", "\"ALL\"", "sport", dir.path()));
    let reports = harvester.run().await.unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].pages_visited, 2);
    assert_eq!(reports[0].questions_stored, 2);

    let run = harvester.storage().get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.category, "sport");
    assert_eq!(run.questions_stored, 2);
    assert_eq!(run.config_hash, "test-hash");
}

#[tokio::test]
async fn test_explicit_to_page_is_exclusive() {
    // Same category, `to-page = 2` only visits page 1
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/categorie/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(category_index(&[("sport", 25)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categorie/sport/1/20/1/0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_listing(&[30])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categorie/sport/2/20/1/0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_listing(&[5])))
        .expect(0)
        .mount(&server)
        .await;
    mount_answers(&server).await;

    let mut harvester = harvester(&test_config(&server.uri(), "", "2", "sport", dir.path()));
    let reports = harvester.run().await.unwrap();

    assert_eq!(reports[0].pages_visited, 1);
    assert!(harvester.storage().question_exists(30).unwrap());
    assert!(!harvester.storage().question_exists(5).unwrap());
}

#[tokio::test]
async fn test_all_categories_get_one_run_each() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/categorie/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(category_index(&[("sport", 1), ("film", 1)])),
        )
        .mount(&server)
        .await;
    mount_listing(&server, "sport", 1, plain_listing(&[30])).await;
    mount_listing(&server, "film", 1, plain_listing(&[31])).await;
    mount_answers(&server).await;

    let mut harvester = harvester(&test_config(&server.uri(), "", "\"ALL\"", "ALL", dir.path()));
    let reports = harvester.run().await.unwrap();

    let categories: Vec<&str> = reports.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(categories, vec!["sport", "film"]);
    assert_eq!(harvester.storage().count_rows(CountedTable::Run).unwrap(), 2);
    assert_eq!(
        harvester.storage().count_questions_by_category().unwrap(),
        vec![("film".to_string(), 1), ("sport".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_unknown_category_is_rejected() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/categorie/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(category_index(&[("sport", 25)])))
        .mount(&server)
        .await;

    let mut harvester = harvester(&test_config(&server.uri(), "", "\"ALL\"", "muziek", dir.path()));
    let result = harvester.run().await;

    assert!(matches!(result, Err(HarvestError::UnknownCategory(slug)) if slug == "muziek"));
}

#[tokio::test]
async fn test_rejected_login_aborts_when_configured() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/login.php"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categorie/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(category_index(&[("sport", 1)])))
        .expect(0)
        .mount(&server)
        .await;

    let site = "username = \"quizzer\"\npassword = \"geheim\"\nabort-on-login-failure = true";
    let mut harvester = harvester(&test_config(&server.uri(), site, "\"ALL\"", "sport", dir.path()));
    let result = harvester.run().await;

    assert!(matches!(result, Err(HarvestError::LoginRejected { status: 403 })));
}

#[tokio::test]
async fn test_rejected_login_continues_by_default() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/login.php"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categorie/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(category_index(&[("sport", 1)])))
        .mount(&server)
        .await;
    mount_listing(&server, "sport", 1, plain_listing(&[30])).await;
    mount_answers(&server).await;

    let site = "username = \"quizzer\"\npassword = \"geheim\"";
    let mut harvester = harvester(&test_config(&server.uri(), site, "\"ALL\"", "sport", dir.path()));
    let reports = harvester.run().await.unwrap();

    assert_eq!(reports[0].questions_stored, 1);
}

#[tokio::test]
async fn test_stopped_run_is_recorded() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/categorie/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(category_index(&[("sport", 3)])))
        .mount(&server)
        .await;
    mount_listing(&server, "sport", 1, plain_listing(&[30, 29, 28])).await;
    mount_answers(&server).await;

    let toml = test_config(&server.uri(), "", "\"ALL\"", "sport", dir.path())
        .replace("only-new = false", "only-new = true");
    let config = parse_config(&toml).unwrap();
    let mut store = SqliteStorage::open_in_memory().unwrap();
    store_question(&mut store, "sport", 29, "al gekend");

    let mut harvester = Harvester::with_storage(config, "test-hash".to_string(), store).unwrap();
    harvester.set_politeness(Politeness::none());
    let reports = harvester.run().await.unwrap();

    assert!(reports[0].stopped_early());
    let run = harvester.storage().get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Stopped);
    assert_eq!(run.questions_stored, 1);
}

/// The quiz source block a row carries when the question came from a quiz
fn quiz_source(number: i64, quiz: &str, round: &str) -> String {
    format!(
        r#"<div id="toonbron_{n}"><div><span>
             Uit: <a href="quiz/{quiz}"><strong>Quiz {quiz}</strong> (2016)</a>,
             <a href="quiz/{quiz}/1"><strong>{round}</strong></a>,
             door <a href="quizteam/pepeq"><strong>PépéQ</strong></a>
           </span></div></div>"#,
        n = number,
        quiz = quiz,
        round = round
    )
}

#[tokio::test]
async fn test_failed_answer_request_stores_empty_answer() {
    let server = MockServer::start().await;
    let images = tempfile::tempdir().unwrap();
    mount_listing(&server, "sport", 1, plain_listing(&[30])).await;
    Mock::given(method("GET"))
        .and(path("/beantwoordevragen.php"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>Interne fout</html>"))
        .mount(&server)
        .await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    let report = crawl_category(
        &session(&server),
        &mut store,
        &Politeness::none(),
        &plan("sport", PageRange::resolve(1, PageBound::All, 1), false, images.path()),
    )
    .await
    .unwrap();

    assert_eq!(report.questions_stored, 1);
    let question = store.get_question(30).unwrap().expect("question 30 stored");
    assert_eq!(question.text, "Vraag nummer 30?");
    assert_eq!(question.answer, "");
}

#[tokio::test]
async fn test_questions_from_one_quiz_share_its_row() {
    let server = MockServer::start().await;
    let images = tempfile::tempdir().unwrap();
    let rows = vec![
        row(30, &[], &quiz_source(30, "fothemaquiz-34-2016", "ronde 1, vraag 11")),
        row(29, &[], &quiz_source(29, "fothemaquiz-34-2016", "ronde 2, vraag 3")),
        row(28, &[], ""),
    ];
    mount_listing(&server, "sport", 1, listing_page(&rows)).await;
    mount_answers(&server).await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    crawl_category(
        &session(&server),
        &mut store,
        &Politeness::none(),
        &plan("sport", PageRange::resolve(1, PageBound::All, 1), false, images.path()),
    )
    .await
    .unwrap();

    assert_eq!(store.count_rows(CountedTable::Quiz).unwrap(), 1);

    let first = store.get_question(30).unwrap().unwrap();
    let second = store.get_question(29).unwrap().unwrap();
    assert!(first.quiz_id.is_some());
    assert_eq!(first.quiz_id, second.quiz_id);
    assert_eq!(first.quiz_round.as_deref(), Some("ronde 1, vraag 11"));
    assert_eq!(second.quiz_round.as_deref(), Some("ronde 2, vraag 3"));
    assert_eq!(first.text, "Vraag nummer 30?");

    let unsourced = store.get_question(28).unwrap().unwrap();
    assert_eq!(unsourced.quiz_id, None);
    assert_eq!(unsourced.quiz_round, None);
}

#[tokio::test]
async fn test_failed_run_keeps_questions_stored_before_error() {
    // 40 questions: page 1 stores one, page 2 cannot be decoded
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/categorie/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(category_index(&[("sport", 40)])))
        .mount(&server)
        .await;
    mount_listing(&server, "sport", 1, plain_listing(&[50])).await;
    Mock::given(method("GET"))
        .and(path("/categorie/sport/2/20/1/0"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(b"dit is geen gzip".to_vec()),
        )
        .mount(&server)
        .await;
    mount_answers(&server).await;

    let mut harvester = harvester(&test_config(&server.uri(), "", "\"ALL\"", "sport", dir.path()));
    let result = harvester.run().await;

    assert!(matches!(result, Err(HarvestError::Http { .. })), "{:?}", result);

    let run = harvester.storage().get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.questions_stored, 1);
    assert!(harvester.storage().question_exists(50).unwrap());
}
