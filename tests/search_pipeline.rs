use quotes_rs::{
    normalize, search, InvalidQuery, NetworkFailure, ParseFailure, Search, SearchError, Settings,
};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESULTS: &str = include_str!("fixtures/search_total.html");
const EMPTY: &str = include_str!("fixtures/search_empty.html");
const UNEXPECTED: &str = include_str!("fixtures/unexpected_page.html");
const CAPTCHA: &str = include_str!("fixtures/captcha.html");

fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.source.base_url = server.uri();
    settings.outgoing.request_timeout = 2.0;
    settings
}

async fn serving(query: &str, template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recherche/ajax"))
        .and(query_param("query", query))
        .and(query_param("searchId", ""))
        .respond_with(template)
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[test]
fn isin_with_padding_is_trimmed() {
    let query = normalize("  FR0000120271  ").unwrap();
    assert_eq!(query.as_str(), "FR0000120271");
}

#[test]
fn empty_input_is_rejected() {
    assert_eq!(normalize("").unwrap_err(), InvalidQuery::Empty);
    assert_eq!(normalize(" \t\u{0} ").unwrap_err(), InvalidQuery::Empty);
}

#[tokio::test]
async fn malformed_record_is_dropped_and_order_kept() {
    let server = serving("Total", ResponseTemplate::new(200).set_body_string(RESULTS)).await;
    let search = Search::from_settings(&settings_for(&server)).unwrap();

    let query = normalize("Total").unwrap();
    let result = search.execute(&query).await.unwrap();

    assert_eq!(result.len(), 2);
    let rows: Vec<_> = result.iter().map(|a| a.fields()).collect();
    assert_eq!(
        rows,
        vec![
            ["1rPTTE", "TOTALENERGIES", "Euronext Paris", "56,32 EUR"],
            ["TTE", "TotalEnergies SE ADR", "NYSE", "61.05 USD"],
        ]
    );
}

#[tokio::test]
async fn empty_container_is_an_empty_result() {
    let server = serving(
        "doesnotexist123",
        ResponseTemplate::new(200).set_body_string(EMPTY),
    )
    .await;
    let search = Search::from_settings(&settings_for(&server)).unwrap();

    let query = normalize("doesnotexist123").unwrap();
    let result = search.execute(&query).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn refused_connection_is_a_network_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut settings = Settings::default();
    settings.source.base_url = format!("http://{}", addr);
    let search = Search::from_settings(&settings).unwrap();

    let query = normalize("Total").unwrap();
    let err = search.execute(&query).await.unwrap_err();
    assert!(matches!(err, SearchError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn unexpected_body_is_a_parse_failure() {
    let server = serving("Total", ResponseTemplate::new(200).set_body_string(UNEXPECTED)).await;
    let search = Search::from_settings(&settings_for(&server)).unwrap();

    let query = normalize("Total").unwrap();
    let err = search.execute(&query).await.unwrap_err();
    assert!(matches!(
        err,
        SearchError::Parse(ParseFailure::MissingContainer { .. })
    ));
}

#[tokio::test]
async fn challenge_page_is_reported_as_blocked() {
    let server = serving("Total", ResponseTemplate::new(200).set_body_string(CAPTCHA)).await;
    let search = Search::from_settings(&settings_for(&server)).unwrap();

    let query = normalize("Total").unwrap();
    let err = search.execute(&query).await.unwrap_err();
    assert_eq!(err, SearchError::Parse(ParseFailure::Blocked));
}

#[tokio::test]
async fn slow_source_times_out_within_bound() {
    let server = serving(
        "Total",
        ResponseTemplate::new(200)
            .set_body_string(RESULTS)
            .set_delay(Duration::from_secs(10)),
    )
    .await;

    let mut settings = settings_for(&server);
    settings.outgoing.request_timeout = 0.5;
    let search = Search::from_settings(&settings).unwrap();

    let start = Instant::now();
    let query = normalize("Total").unwrap();
    let err = search.execute(&query).await.unwrap_err();

    assert_eq!(err, SearchError::Network(NetworkFailure::Timeout));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn search_uses_the_given_settings() {
    let server = serving("Total", ResponseTemplate::new(200).set_body_string(RESULTS)).await;

    let query = normalize("Total").unwrap();
    let result = search(&query, &settings_for(&server)).await.unwrap();
    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn search_failure_can_be_downcast() {
    let server = serving("Total", ResponseTemplate::new(503)).await;

    let query = normalize("Total").unwrap();
    let err = search(&query, &settings_for(&server)).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<SearchError>(),
        Some(&SearchError::Network(NetworkFailure::HttpStatus(503)))
    );
}

#[tokio::test]
async fn unusable_timeout_is_a_settings_error() {
    for timeout in [f64::INFINITY, 1e20, -1.0] {
        let mut settings = Settings::default();
        settings.source.base_url = "http://127.0.0.1:9".to_string();
        settings.outgoing.request_timeout = timeout;
        settings.outgoing.max_request_timeout = None;

        assert!(settings.validate().is_err());

        let query = normalize("Total").unwrap();
        let err = search(&query, &settings).await.unwrap_err();
        assert!(err.downcast_ref::<SearchError>().is_none(), "got {:?}", err);
    }
}

#[tokio::test]
async fn concurrent_searches_are_independent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("query", "Total"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("query", "nothing"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY))
        .mount(&server)
        .await;

    let search = std::sync::Arc::new(Search::from_settings(&settings_for(&server)).unwrap());

    let handles: Vec<_> = ["Total", "nothing", "Total", "nothing"]
        .into_iter()
        .map(|q| {
            let search = search.clone();
            tokio::spawn(async move {
                let query = normalize(q).unwrap();
                search.execute(&query).await.map(|r| r.len())
            })
        })
        .collect();

    let mut counts = Vec::new();
    for handle in handles {
        counts.push(handle.await.unwrap().unwrap());
    }
    assert_eq!(counts, vec![2, 0, 2, 0]);
}
