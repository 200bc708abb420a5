use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use composer_core::domain::LinkStatus;
use composer_links::{CompetitorBlocklist, LinkValidator, ValidatorConfig};

async fn server_with_pages() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    server
}

fn validator() -> LinkValidator {
    LinkValidator::new(ValidatorConfig::default()).unwrap()
}

#[tokio::test]
async fn status_codes_decide_validity() {
    let server = server_with_pages().await;
    let validator = validator();

    let ok = validator.check_url(&format!("{}/ok", server.uri())).await;
    assert!(ok.is_valid);
    assert_eq!(ok.status, 200);

    let missing = validator.check_url(&format!("{}/missing", server.uri())).await;
    assert!(!missing.is_valid);
    assert_eq!(missing.status, 404);

    let broken = validator.check_url(&format!("{}/broken", server.uri())).await;
    assert_eq!(broken.link_status(), LinkStatus::Invalid);
}

#[tokio::test]
async fn competitor_wins_and_skips_the_probe() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let host = url::Url::parse(&server.uri()).unwrap();
    let mut blocklist = CompetitorBlocklist::empty();
    blocklist.add_domain(host.host_str().unwrap());
    let validator = validator().with_blocklist(blocklist);

    let result = validator.check_url(&format!("{}/jobs", server.uri())).await;

    assert!(result.is_competitor);
    assert_eq!(result.link_status(), LinkStatus::Competitor);
}

#[tokio::test]
async fn every_url_lands_in_exactly_one_bucket() {
    let server = server_with_pages().await;
    let urls = vec![
        format!("{}/ok", server.uri()),
        "https://www.indeed.com/jobs?q=healthcare+ai".to_string(),
        format!("{}/missing", server.uri()),
        "not a url".to_string(),
        format!("{}/ok", server.uri()),
    ];

    let report = validator().validate(&urls).await;

    assert_eq!(report.len(), urls.len());
    assert_eq!(report.valid_links, vec![urls[0].clone(), urls[4].clone()]);
    assert_eq!(report.competitor_links, vec![urls[1].clone()]);
    assert_eq!(report.invalid_links, vec![urls[2].clone(), urls[3].clone()]);
}

#[tokio::test]
async fn progress_is_reported_before_each_check_and_at_the_end() {
    let urls = vec![
        "https://a.example/".to_string(),
        "https://b.example/".to_string(),
        "https://c.example/".to_string(),
    ];
    let validator = LinkValidator::new(ValidatorConfig::offline()).unwrap();
    let mut events: Vec<(u8, String)> = Vec::new();

    validator
        .validate_with_progress(&urls, |percent, current| {
            events.push((percent, current.to_string()))
        })
        .await;

    assert_eq!(
        events,
        vec![
            (0, "https://a.example/".to_string()),
            (33, "https://b.example/".to_string()),
            (67, "https://c.example/".to_string()),
            (100, "Complete".to_string()),
        ]
    );
}

#[tokio::test]
async fn head_refusal_falls_back_to_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = validator().check_url(&format!("{}/no-head", server.uri())).await;

    assert!(result.is_valid);
}

#[tokio::test]
async fn probes_go_through_the_relay() {
    let relay = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/raw"))
        .and(query_param("url", "https://www.nature.com/articles/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&relay)
        .await;
    let validator = LinkValidator::new(ValidatorConfig {
        cors_relay_url: Some(format!("{}/raw?url=", relay.uri())),
        ..ValidatorConfig::default()
    })
    .unwrap();

    let result = validator.check_url("https://www.nature.com/articles/1").await;

    assert!(result.is_valid);
}

#[tokio::test]
async fn slow_links_time_out_as_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;
    let validator = LinkValidator::new(ValidatorConfig {
        probe_timeout: Duration::from_millis(50),
        ..ValidatorConfig::default()
    })
    .unwrap();

    let result = validator.check_url(&format!("{}/slow", server.uri())).await;

    assert!(!result.is_valid);
    assert_eq!(result.status, 0);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn request_delay_spaces_out_probes() {
    let validator = LinkValidator::new(ValidatorConfig {
        request_delay: Duration::from_millis(30),
        ..ValidatorConfig::offline()
    })
    .unwrap();
    let urls = ["https://a.example/", "https://b.example/", "https://c.example/"];
    let started = Instant::now();

    let report = validator.validate(&urls).await;

    assert_eq!(report.valid_links.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(60));
}
