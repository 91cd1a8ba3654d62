// src/pipeline.rs

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{get_bytes, get_text, parse_csv, Source, SourceKind};
use crate::store::{write_raw, write_table};
use crate::table::locate_weekly;

/// What a successful source produced.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub id: String,
    pub path: PathBuf,
    pub rows: usize,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub id: String,
    pub error: String,
}

/// Outcome of a whole run. Failures are recorded, never propagated.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub succeeded: Vec<SourceReport>,
    pub failed: Vec<SourceFailure>,
}

impl RunSummary {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetch one source and write its file under `config.raw_dir`.
///
/// HTML sources are reshaped into the weekly table. CSV sources are parsed
/// to reject malformed bodies, then the bytes as received are written out.
#[instrument(level = "info", skip_all, fields(source = %source.id))]
pub fn fetch_source(client: &Client, config: &Config, source: &Source) -> Result<SourceReport> {
    let referer = source.referer.as_ref();
    let path = source.output_path(&config.raw_dir);

    let rows = match source.kind {
        SourceKind::HtmlWeeklyTable => {
            let body = get_text(client, &source.url, referer)?;
            let table = locate_weekly(&body)?;
            write_table(&path, &table)?;
            table.rows.len()
        }
        SourceKind::Csv => {
            let body = get_bytes(client, &source.url, referer)?;
            let table = parse_csv(&body)?;
            write_raw(&path, &body)?;
            table.rows.len()
        }
    };

    Ok(SourceReport {
        id: source.id.clone(),
        path,
        rows,
        fetched_at: Utc::now(),
    })
}

/// Fetch every source in order. A failing source is logged and skipped.
pub fn run(client: &Client, config: &Config, sources: &[Source]) -> RunSummary {
    let mut summary = RunSummary::default();

    for source in sources {
        info!(source = %source.id, url = %source.url, "downloading");
        match fetch_source(client, config, source) {
            Ok(report) => {
                info!(
                    source = %report.id,
                    rows = report.rows,
                    path = %report.path.display(),
                    "saved"
                );
                summary.succeeded.push(report);
            }
            Err(err) => {
                error!(source = %source.id, error = %err, "failed");
                summary.failed.push(SourceFailure {
                    id: source.id.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::http::client_builder;
    use crate::table::WEEKLY_COLUMNS;
    use std::{
        collections::HashMap,
        fs,
        io::{BufRead, BufReader, Write},
        net::TcpListener,
        sync::{Arc, Mutex},
        thread,
        time::Duration,
    };
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    use url::Url;

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,eiascraper=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    struct Route {
        path: &'static str,
        status: u16,
        content_type: &'static str,
        body: Vec<u8>,
    }

    fn route(path: &'static str, status: u16, body: impl AsRef<[u8]>) -> Route {
        typed_route(path, status, "text/plain", body)
    }

    fn typed_route(
        path: &'static str,
        status: u16,
        content_type: &'static str,
        body: impl AsRef<[u8]>,
    ) -> Route {
        Route {
            path,
            status,
            content_type,
            body: body.as_ref().to_vec(),
        }
    }

    /// Canned HTTP/1.1 responses keyed by request path (query included).
    /// Records the request headers seen for each path.
    struct StubServer {
        base: Url,
        seen: Arc<Mutex<HashMap<String, Vec<String>>>>,
    }

    impl StubServer {
        fn start(routes: Vec<Route>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
            let seen = Arc::new(Mutex::new(HashMap::new()));
            let seen_c = Arc::clone(&seen);

            thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { continue };
                    let mut reader = BufReader::new(stream.try_clone().unwrap());

                    let mut request_line = String::new();
                    reader.read_line(&mut request_line).unwrap();
                    let path = request_line
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or("/")
                        .to_string();

                    let mut headers = Vec::new();
                    loop {
                        let mut line = String::new();
                        if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                            break;
                        }
                        headers.push(line.trim_end().to_ascii_lowercase());
                    }
                    seen_c.lock().unwrap().insert(path.clone(), headers);

                    let (status, content_type, body) = routes
                        .iter()
                        .find(|r| r.path == path)
                        .map(|r| (r.status, r.content_type, r.body.as_slice()))
                        .unwrap_or((404, "text/plain", b"not found".as_slice()));
                    let head = format!(
                        "HTTP/1.1 {} STUB\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status,
                        content_type,
                        body.len()
                    );
                    let _ = stream.write_all(head.as_bytes());
                    let _ = stream.write_all(body);
                }
            });

            Self { base, seen }
        }

        fn url(&self, path: &str) -> Url {
            self.base.join(path).unwrap()
        }

        fn headers_for(&self, path: &str) -> Vec<String> {
            self.seen.lock().unwrap().get(path).cloned().unwrap_or_default()
        }
    }

    const WEEKLY_HTML: &str = r#"
        <html><body>
          <table><tr><td>Natural Gas Spot Price</td></tr></table>
          <table>
            <tr><td colspan="6">Henry Hub</td></tr>
            <tr><th>Week Of</th><th>Mon</th><th>Tue</th><th>Wed</th><th>Thu</th><th>Fri</th></tr>
            <tr><td>2024-01-01</td><td>2.10</td><td>2.15</td><td>2.20</td><td>2.05</td><td>2.00</td></tr>
          </table>
        </body></html>"#;

    // The stub lives on loopback; keep any proxy settings in the environment out of the way.
    fn local_client(config: &Config) -> Client {
        client_builder(config).unwrap().no_proxy().build().unwrap()
    }

    fn test_config(raw_dir: &std::path::Path) -> Config {
        Config::new(raw_dir).with_timeout(Duration::from_secs(5))
    }

    #[test]
    fn html_source_writes_weekly_csv() {
        init_test_logging();
        let server = StubServer::start(vec![route("/weekly.htm", 200, WEEKLY_HTML)]);
        let tmp = tempdir().unwrap();
        let config = test_config(&tmp.path().join("data").join("raw"));
        let client = local_client(&config);

        let source = Source::henry_hub_weekly().with_url(server.url("weekly.htm"));
        let report = fetch_source(&client, &config, &source).unwrap();

        assert_eq!(report.rows, 1);
        assert_eq!(
            fs::read_to_string(&report.path).unwrap(),
            "week_of,mon,tue,wed,thu,fri\n2024-01-01,2.10,2.15,2.20,2.05,2.00\n"
        );
        assert_eq!(
            crate::store::read_table(&report.path).unwrap().headers,
            WEEKLY_COLUMNS
        );
        assert!(server
            .headers_for("/weekly.htm")
            .contains(&"user-agent: mozilla/5.0".to_string()));
    }

    #[test]
    fn csv_source_is_written_verbatim_with_referer() {
        init_test_logging();
        let server = StubServer::start(vec![route("/csv.php?tbl=T01.11", 200, "A,B\n1,2\n")]);
        let tmp = tempdir().unwrap();
        let config = test_config(tmp.path());
        let client = local_client(&config);

        let source = Source::eia_table("T01.11", "hdd.csv").with_url(server.url("csv.php?tbl=T01.11"));
        let report = fetch_source(&client, &config, &source).unwrap();

        assert_eq!(fs::read(&report.path).unwrap(), b"A,B\n1,2\n");
        assert_eq!(report.rows, 1);
        let headers = server.headers_for("/csv.php?tbl=T01.11");
        assert!(headers.contains(
            &"referer: https://www.eia.gov/totalenergy/data/browser/index.php?tbl=t01.11"
                .to_string()
        ));
    }

    #[test]
    fn csv_source_keeps_non_utf8_bytes() {
        init_test_logging();
        let latin1: &[u8] = b"Unit,B\n\xb0F,2\n";
        let server = StubServer::start(vec![
            typed_route("/plain.csv", 200, "text/csv", latin1),
            typed_route("/latin1.csv", 200, "text/csv; charset=iso-8859-1", latin1),
        ]);
        let tmp = tempdir().unwrap();
        let config = test_config(tmp.path());
        let client = local_client(&config);

        for name in ["plain.csv", "latin1.csv"] {
            let source = Source::eia_table("T01.12", name).with_url(server.url(name));
            let report = fetch_source(&client, &config, &source).unwrap();
            assert_eq!(fs::read(&report.path).unwrap(), latin1, "{name}");
            assert_eq!(report.rows, 1);
        }
    }

    #[test]
    fn failing_sources_do_not_stop_the_run() {
        init_test_logging();
        let server = StubServer::start(vec![
            route("/down.csv", 503, "busy"),
            route("/nomarker.htm", 200, "<table><tr><td>nothing</td></tr></table>"),
            route("/ragged.csv", 200, "A,B\n1,2,3\n"),
            route("/ok.csv", 200, "X,Y\n3,4\n"),
        ]);
        let tmp = tempdir().unwrap();
        let config = test_config(tmp.path());
        let client = local_client(&config);

        let sources = vec![
            Source::eia_table("DOWN", "down.csv").with_url(server.url("down.csv")),
            Source::henry_hub_weekly().with_url(server.url("nomarker.htm")),
            Source::eia_table("RAGGED", "ragged.csv").with_url(server.url("ragged.csv")),
            Source::eia_table("OK", "ok.csv").with_url(server.url("ok.csv")),
        ];
        let summary = run(&client, &config, &sources);

        assert!(!summary.all_ok());
        let failed: Vec<_> = summary.failed.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(failed, vec!["DOWN", "henry_hub_weekly", "RAGGED"]);
        assert!(summary.failed[0].error.contains("503"));
        assert!(summary.failed[1].error.contains("Week Of"));

        assert_eq!(summary.succeeded.len(), 1);
        assert_eq!(fs::read(tmp.path().join("ok.csv")).unwrap(), b"X,Y\n3,4\n");
        assert!(!tmp.path().join("down.csv").exists());
        assert!(!tmp.path().join("ragged.csv").exists());
    }

    #[test]
    fn status_errors_are_http_errors() {
        let server = StubServer::start(vec![route("/gone", 404, "gone")]);
        let tmp = tempdir().unwrap();
        let config = test_config(tmp.path());
        let client = local_client(&config);

        let err = get_text(&client, &server.url("gone"), None).unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 404));
    }

    #[test]
    fn summary_serializes_to_json() {
        let summary = RunSummary {
            succeeded: vec![],
            failed: vec![SourceFailure {
                id: "T04.01".to_string(),
                error: "GET x returned 500".to_string(),
            }],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["failed"][0]["id"], "T04.01");
        assert!(json["succeeded"].as_array().unwrap().is_empty());
    }
}
