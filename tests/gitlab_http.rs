// tests/gitlab_http.rs

//! Exercises `GitLabClient` against a tiny local HTTP/1.1 stub.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use pipeline_queue::config::GitLabSettings;
use pipeline_queue::errors::PipelineQueueError;
use pipeline_queue::ordering::is_first;
use pipeline_queue::pipeline::PipelineStatus;
use pipeline_queue::source::{DetailedSource, GitLabApi, GitLabClient, PipelineSource};
use pipeline_queue::types::TokenKind;
use pipeline_queue_test_utils::init_tracing;

#[derive(Debug, Clone)]
struct Recorded {
    target: String,
    headers: Vec<(String, String)>,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Reply {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: String,
}

impl Reply {
    fn json(body: &str) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: r#"{"message":"nope"}"#.to_string(),
        }
    }

    fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

type Router = Arc<dyn Fn(&str) -> Option<Reply> + Send + Sync>;

struct Stub {
    base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    async fn start(router: impl Fn(&str) -> Option<Reply> + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let router: Router = Arc::new(router);

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let router = Arc::clone(&router);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move { serve(stream, router, recorded).await });
            }
        });

        Self { base, requests }
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn settings(&self) -> GitLabSettings {
        let mut settings = GitLabSettings::new(self.base.clone());
        settings.token = "secret".to_string();
        settings.request_timeout = Duration::from_secs(5);
        settings
    }
}

async fn serve(mut stream: TcpStream, router: Router, recorded: Arc<Mutex<Vec<Recorded>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let text = String::from_utf8_lossy(&buf).to_string();
    let mut lines = text.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let target = request_line.split(' ').nth(1).unwrap_or_default().to_string();
    let headers = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    recorded.lock().unwrap().push(Recorded {
        target: target.clone(),
        headers,
    });

    // No reply: leave the connection hanging.
    let Some(reply) = router(&target) else {
        tokio::time::sleep(Duration::from_secs(60)).await;
        return;
    };

    let mut response = format!(
        "HTTP/1.1 {} STUB\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    for (name, value) in &reply.headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("\r\n");
    response.push_str(&reply.body);

    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

#[tokio::test]
async fn listing_sends_filters_and_follows_pages() {
    init_tracing();

    let stub = Stub::start(|target| {
        if target.ends_with("&page=1") {
            Some(
                Reply::json(r#"[{"id": 1, "status": "running"}, {"id": 2, "status": "running"}]"#)
                    .header("x-next-page", "2"),
            )
        } else {
            Some(Reply::json(r#"[{"id": 3, "status": "running"}]"#).header("x-next-page", ""))
        }
    })
    .await;
    let client = GitLabClient::new(&stub.settings()).unwrap();

    let listed = client.list_running("42").await.unwrap();

    let ids: Vec<u64> = listed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(listed.iter().all(|p| p.status == PipelineStatus::Running));
    assert!(listed.iter().all(|p| p.updated_at.is_none()));

    let requests = stub.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].target,
        "/api/v4/projects/42/pipelines?scope=running&status=running&order_by=id&sort=asc&per_page=100&page=1"
    );
    assert!(requests[1].target.ends_with("&page=2"));
    assert_eq!(requests[0].header("private-token"), Some("secret"));
}

#[tokio::test]
async fn detailed_source_over_http_picks_oldest_update() {
    init_tracing();

    let stub = Stub::start(|target| {
        let path = target.split('?').next().unwrap_or_default();
        match path {
            "/api/v4/projects/987/pipelines" => Some(Reply::json(
                r#"[{"id": 1234, "status": "running"}, {"id": 1027, "status": "running"}]"#,
            )),
            "/api/v4/projects/987/pipelines/1027" => Some(Reply::json(
                r#"{"id": 1027, "status": "running", "updated_at": "2018-08-08T22:27:23.801Z"}"#,
            )),
            "/api/v4/projects/987/pipelines/1234" => Some(Reply::json(
                r#"{"id": 1234, "status": "running", "updated_at": "2018-08-08T22:59:23.801Z"}"#,
            )),
            _ => Some(Reply::status(404)),
        }
    })
    .await;
    let source = DetailedSource::new(GitLabClient::new(&stub.settings()).unwrap());

    let snapshot = source.fetch_running("987").await.unwrap();

    assert_eq!(snapshot.ids(), vec![1234, 1027]);
    assert!(is_first(&snapshot, "987", 1027).unwrap());
    assert_eq!(stub.requests().len(), 3);
}

#[tokio::test]
async fn non_success_status_is_reported_with_url() {
    init_tracing();

    let stub = Stub::start(|_| Some(Reply::status(401))).await;
    let client = GitLabClient::new(&stub.settings()).unwrap();

    match client.list_running("42").await {
        Err(PipelineQueueError::UnexpectedStatus { status, url }) => {
            assert_eq!(status, 401);
            assert!(url.contains("/api/v4/projects/42/pipelines"));
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    init_tracing();

    let stub = Stub::start(|_| Some(Reply::json(r#"{"id": "not-a-number"}"#))).await;
    let client = GitLabClient::new(&stub.settings()).unwrap();

    assert!(matches!(
        client.pipeline("42", 7).await,
        Err(PipelineQueueError::Decode { .. })
    ));
}

#[tokio::test]
async fn job_token_and_anonymous_headers() {
    init_tracing();

    let stub = Stub::start(|_| Some(Reply::json("[]"))).await;

    let mut job = stub.settings();
    job.token_kind = TokenKind::Job;
    GitLabClient::new(&job).unwrap().list_running("1").await.unwrap();

    let mut anonymous = stub.settings();
    anonymous.token = String::new();
    GitLabClient::new(&anonymous)
        .unwrap()
        .list_running("1")
        .await
        .unwrap();

    let requests = stub.requests();
    assert_eq!(requests[0].header("job-token"), Some("secret"));
    assert_eq!(requests[0].header("private-token"), None);
    assert_eq!(requests[1].header("job-token"), None);
    assert_eq!(requests[1].header("private-token"), None);
}

#[tokio::test]
async fn stalled_request_hits_the_request_timeout() {
    init_tracing();

    let stub = Stub::start(|_| None).await;
    let mut settings = stub.settings();
    settings.request_timeout = Duration::from_millis(200);
    let client = GitLabClient::new(&settings).unwrap();

    match client.list_running("42").await {
        Err(PipelineQueueError::Transport(e)) => assert!(e.is_timeout(), "unexpected: {e}"),
        other => panic!("expected Transport timeout, got {other:?}"),
    }
}
