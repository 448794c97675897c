//! Drives `JiraClient` against a local HTTP stub.
//!
//! The stub answers every request from a closure keyed on the request path
//! and records what the client sent, so paging, auth and error mapping are
//! checked at the wire level.

use serde_json::{json, Value};
use serial_test::serial;
use sf_cli_core::contract::{IssueTracker, QaError};
use sf_cli_core::jira::{JiraClient, JiraCredentials};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

/// Basic auth for `qa@acme.io:secret`.
const EXPECTED_AUTH: &str = "Basic cWFAYWNtZS5pbzpzZWNyZXQ=";

#[derive(Debug, Clone)]
struct Recorded {
    target: String,
    authorization: Option<String>,
}

impl Recorded {
    fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    fn param(&self, name: &str) -> Option<String> {
        let query = self.target.split_once('?')?.1;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_owned())
    }
}

struct JiraStub {
    base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl JiraStub {
    fn start<F>(respond: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, Value) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let mut stream = match stream {
                    Ok(stream) => stream,
                    Err(_) => continue,
                };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let target = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or_default()
                    .to_owned();

                let mut authorization = None;
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap() == 0 || line.trim().is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("authorization") {
                            authorization = Some(value.trim().to_owned());
                        }
                    }
                }

                let recorded = Recorded {
                    target,
                    authorization,
                };
                let (status, body) = respond(&recorded);
                seen.lock().unwrap().push(recorded);

                let body = body.to_string();
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
        });

        Self { base_url, requests }
    }

    fn client(&self) -> JiraClient {
        // reqwest picks up proxy settings when the client is built.
        for key in ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"] {
            std::env::remove_var(key);
        }
        let credentials = JiraCredentials::from_parts(
            Some(format!("{}/", self.base_url)),
            Some("qa@acme.io".into()),
            Some("secret".into()),
        )
        .expect("credentials");
        JiraClient::new(credentials)
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

fn issues(range: std::ops::Range<usize>) -> Vec<Value> {
    range
        .map(|n| json!({"key": format!("CXP-{n}"), "fields": {"summary": "s"}}))
        .collect()
}

/// Three pages of 100, 100 and 50 issues linked by page tokens.
fn three_pages(request: &Recorded) -> (u16, Value) {
    let body = match request.param("nextPageToken").as_deref() {
        None => json!({"issues": issues(0..100), "nextPageToken": "p2", "isLast": false}),
        Some("p2") => json!({"issues": issues(100..200), "nextPageToken": "p3", "isLast": false}),
        Some("p3") => json!({"issues": issues(200..250), "nextPageToken": "p4", "isLast": true}),
        Some(other) => panic!("unexpected page token {other}"),
    };
    (200, body)
}

fn fields() -> Vec<String> {
    vec!["key".to_owned(), "summary".to_owned()]
}

#[tokio::test]
#[serial]
async fn search_follows_page_tokens_until_last_page() {
    let stub = JiraStub::start(three_pages);
    let found = stub
        .client()
        .search_issues(r#"project = "CXP""#, &fields(), 1000)
        .await
        .expect("search succeeds");

    assert_eq!(found.len(), 250);
    assert_eq!(found[249]["key"], "CXP-249");

    let requests = stub.requests();
    assert_eq!(requests.len(), 3, "stops once the page is marked last");
    for request in &requests {
        assert_eq!(request.path(), "/rest/api/3/search/jql");
        assert_eq!(request.param("maxResults").as_deref(), Some("100"));
        assert!(request.param("jql").is_some());
    }
    let tokens: Vec<Option<String>> = requests.iter().map(|r| r.param("nextPageToken")).collect();
    assert_eq!(tokens, vec![None, Some("p2".into()), Some("p3".into())]);
}

#[tokio::test]
#[serial]
async fn search_stops_at_max_results() {
    let stub = JiraStub::start(three_pages);
    let found = stub
        .client()
        .search_issues(r#"project = "CXP""#, &fields(), 150)
        .await
        .expect("search succeeds");

    assert_eq!(found.len(), 150);
    let page_sizes: Vec<Option<String>> =
        stub.requests().iter().map(|r| r.param("maxResults")).collect();
    assert_eq!(page_sizes, vec![Some("100".into()), Some("50".into())]);
}

#[tokio::test]
#[serial]
async fn search_stops_when_no_token_is_returned() {
    let stub = JiraStub::start(|_| (200, json!({"issues": issues(0..3)})));
    let found = stub
        .client()
        .search_issues(r#"project = "CXP""#, &fields(), 1000)
        .await
        .expect("search succeeds");

    assert_eq!(found.len(), 3);
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
#[serial]
async fn unauthorised_response_maps_to_unexpected_status() {
    let stub = JiraStub::start(|_| {
        (
            401,
            json!({"errorMessages": ["Client must be authenticated to access this resource."]}),
        )
    });
    let err = stub
        .client()
        .search_issues(r#"project = "CXP""#, &fields(), 10)
        .await
        .unwrap_err();

    match err {
        QaError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("must be authenticated"), "body was: {body}");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn projects_are_fetched_with_basic_auth() {
    let stub = JiraStub::start(|_| {
        (
            200,
            json!([
                {"id": "10000", "key": "CXP", "name": "Customer Experience", "projectTypeKey": "software"},
                {"id": "10001", "key": "OPS", "name": "Operations"}
            ]),
        )
    });
    let projects = stub.client().projects().await.expect("projects");

    let keys: Vec<&str> = projects.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["CXP", "OPS"]);
    assert_eq!(projects[0].name, "Customer Experience");

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path(), "/rest/api/3/project");
    assert_eq!(requests[0].authorization.as_deref(), Some(EXPECTED_AUTH));
}

#[tokio::test]
#[serial]
async fn malformed_search_body_is_a_parse_error() {
    let stub = JiraStub::start(|_| (200, json!({"issues": "not a list"})));
    let err = stub
        .client()
        .search_issues(r#"project = "CXP""#, &fields(), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, QaError::Parse(_)));
}
