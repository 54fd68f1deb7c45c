use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Router};
use janus_sparql::core::{Cell, Value};
use janus_sparql::execution::{FetchMode, Statement};
use janus_sparql::{ClientConfig, Params, SimpleConnection, SparqlError, StandardConnection};
use serde::Deserialize;
use tokio::runtime::Runtime;

#[derive(Deserialize)]
struct QueryForm {
    query: String,
}

/// Echoes the received query back as a single literal binding.
async fn sparql(headers: HeaderMap, Form(form): Form<QueryForm>) -> Response {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()).unwrap_or_default();
    if accept != Statement::accept_header() {
        return (StatusCode::NOT_ACCEPTABLE, "unexpected accept header").into_response();
    }
    let query = form.query;
    if query == "wrongQuery" {
        return (StatusCode::BAD_REQUEST, "syntax error").into_response();
    }
    if query.starts_with("ASK") {
        let body = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#"><head/><boolean>true</boolean></sparql>"#;
        return ([(header::CONTENT_TYPE, "application/sparql-results+xml; charset=utf-8")], body)
            .into_response();
    }
    if query.contains("FORMAT csv") {
        return ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], "a,b\r\n1,2\r\n3,4\r\n")
            .into_response();
    }
    let body = serde_json::json!({
        "head": {"vars": ["q"]},
        "results": {"bindings": [{"q": {"type": "literal", "value": query}}]}
    });
    ([(header::CONTENT_TYPE, "application/sparql-results+json")], body.to_string()).into_response()
}

/// Starts the endpoint on an ephemeral port. The runtime must outlive the test.
fn start_endpoint() -> (Runtime, String) {
    let runtime = Runtime::new().unwrap();
    let listener = runtime.block_on(tokio::net::TcpListener::bind("127.0.0.1:0")).unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/query", post(sparql));
    runtime.spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (runtime, format!("http://{}/query", addr))
}

fn echoed(statement: Statement) -> String {
    let rows: Vec<_> = statement.map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    rows[0].get("q").map(Value::lexical).unwrap()
}

#[test]
fn test_select_query_is_form_encoded() {
    let (_runtime, endpoint) = start_endpoint();
    let connection = StandardConnection::new(endpoint).unwrap();
    let query = "SELECT * WHERE { ?s ?p \"a & b = c\" }";
    assert_eq!(echoed(connection.query(query).unwrap()), query);
}

#[test]
fn test_ask_query() {
    let (_runtime, endpoint) = start_endpoint();
    let connection = StandardConnection::new(endpoint).unwrap();
    assert!(connection.ask_query("ASK { ?s ?p ?o }").unwrap());
}

#[test]
fn test_ask_query_on_select_response() {
    let (_runtime, endpoint) = start_endpoint();
    let connection = StandardConnection::new(endpoint).unwrap();
    let err = connection.ask_query("SELECT * WHERE { ?s ?p ?o }").unwrap_err();
    assert!(matches!(err, SparqlError::MalformedResponse(ref msg) if msg == "Not an ASK query response"));
}

#[test]
fn test_http_error_status() {
    let (_runtime, endpoint) = start_endpoint();
    let connection = StandardConnection::new(endpoint).unwrap();

    let err = connection.query("wrongQuery").unwrap_err();
    assert!(matches!(err, SparqlError::Protocol { status: 400, ref reason } if reason == "Bad Request"));
    assert!(err.to_string().starts_with("Query execution failed with HTTP"));

    let err = connection.ask_query("wrongQuery").unwrap_err();
    assert!(matches!(err, SparqlError::Protocol { status: 400, .. }));
}

#[test]
fn test_csv_response() {
    let (_runtime, endpoint) = start_endpoint();
    let connection = StandardConnection::new(endpoint).unwrap();
    let mut statement = connection.query("SELECT * WHERE { ?a ?b ?c } # FORMAT csv").unwrap();
    let rows = statement.fetch_all(FetchMode::Num).unwrap();
    assert_eq!(rows.len(), 2);
    let first = rows[0].clone().into_values().unwrap();
    assert_eq!(first, vec![Value::Text("1".to_string()), Value::Text("2".to_string())]);
}

#[test]
fn test_prepared_statement_over_http() {
    let (_runtime, endpoint) = start_endpoint();
    let connection = StandardConnection::new(endpoint).unwrap();
    let mut prepared = connection.prepare("SELECT * WHERE { ? :p ?o }").unwrap();
    prepared
        .execute(
            Params::new()
                .push(Cell::uri("http://example.org/s"))
                .named("p", Cell::uri("http://example.org/p")),
        )
        .unwrap();
    let value = prepared.fetch_column().unwrap().flatten().unwrap();
    assert_eq!(value.lexical(), "SELECT * WHERE { <http://example.org/s> <http://example.org/p> ?o }");

    let mut ask = connection.prepare_ask("ASK { ? ?p ?o }").unwrap();
    ask.execute(vec![Cell::uri("http://example.org/s")]).unwrap();
    assert_eq!(ask.fetch_column().unwrap(), Some(Some(Value::Boolean(true))));
}

#[test]
fn test_connection_from_config_file() {
    let (_runtime, endpoint) = start_endpoint();
    let path = std::env::temp_dir().join(format!("janus-sparql-config-{}.json", std::process::id()));
    std::fs::write(&path, format!(r#"{{"endpoint":"{}","timeout_secs":5,"read_chunk_size":16}}"#, endpoint))
        .unwrap();

    let config = ClientConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.read_chunk_size, 16);
    assert_eq!(config.accept, Statement::accept_header());

    let connection = StandardConnection::with_config(config).unwrap();
    assert_eq!(echoed(connection.query("SELECT ?x {}").unwrap()), "SELECT ?x {}");
}

#[test]
fn test_unreachable_endpoint() {
    let connection = StandardConnection::new("http://127.0.0.1:9/query").unwrap();
    assert!(matches!(connection.query("SELECT * {}"), Err(SparqlError::HttpError(_))));
}
