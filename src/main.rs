//! Janus SPARQL - command line client for SPARQL endpoints.
//!
//! Usage:
//!   janus-sparql --endpoint http://localhost:7878/query --query 'SELECT * WHERE { ?s ?p ?o } LIMIT 10'
//!   janus-sparql --file query.rq --mode assoc --uri 0=http://example.org/s --literal name=Alice
//!   janus-sparql --config client.json --ask --query 'ASK { ?s ?p ?o }'

use clap::Parser;
use janus_sparql::execution::{FetchMode, Fetched};
use janus_sparql::querying::ParamKey;
use janus_sparql::{Cell, ClientConfig, Params, SimpleConnection, SparqlError, StandardConnection};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "janus-sparql")]
#[command(about = "Run SPARQL queries and stream the results")]
struct Args {
    /// SPARQL endpoint URL (overrides the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// JSON client configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Query text
    #[arg(short, long, conflicts_with = "file")]
    query: Option<String>,

    /// File holding the query text
    #[arg(short, long)]
    file: Option<String>,

    /// Run as an ASK query and print the answer
    #[arg(long)]
    ask: bool,

    /// Fetch mode: obj, assoc, num, both or column
    #[arg(short, long, default_value = "obj")]
    mode: String,

    /// IRI parameter as KEY=IRI (numeric KEY binds a positional placeholder)
    #[arg(long = "uri", value_name = "KEY=IRI")]
    uris: Vec<String>,

    /// Literal parameter as KEY=TEXT (numeric KEY binds a positional placeholder)
    #[arg(long = "literal", value_name = "KEY=TEXT")]
    literals: Vec<String>,
}

fn parse_binding(raw: &str) -> Result<(ParamKey, &str), SparqlError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| SparqlError::ConfigError(format!("expected KEY=VALUE, got '{}'", raw)))?;
    let key = match key.parse::<usize>() {
        Ok(position) => ParamKey::Position(position),
        Err(_) => ParamKey::from(key),
    };
    Ok((key, value))
}

fn print_fetched(fetched: &Fetched) {
    match fetched {
        Fetched::Object(row) => {
            let cells: Vec<String> = row.iter().map(|(name, value)| format!("{}={}", name, value)).collect();
            println!("{}", cells.join("\t"));
        }
        Fetched::Assoc(map) => {
            let mut cells: Vec<String> = map.iter().map(|(name, value)| format!("{}={}", name, value)).collect();
            cells.sort();
            println!("{}", cells.join("\t"));
        }
        Fetched::Num(values) => {
            let cells: Vec<String> = values.iter().map(ToString::to_string).collect();
            println!("{}", cells.join("\t"));
        }
        Fetched::Both(combined) => {
            let cells: Vec<String> = (0..)
                .map_while(|i| combined.get_index(i))
                .map(ToString::to_string)
                .collect();
            println!("{}", cells.join("\t"));
        }
        Fetched::Column(value) => println!("{}", value.as_ref().map(ToString::to_string).unwrap_or_default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    let query = match (args.query, args.file) {
        (Some(query), _) => query,
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err("either --query or --file is required".into()),
    };
    let mode: FetchMode = args.mode.parse()?;

    let mut params = Params::new();
    for raw in &args.uris {
        let (key, iri) = parse_binding(raw)?;
        params.insert(key, Cell::uri(iri));
    }
    for raw in &args.literals {
        let (key, text) = parse_binding(raw)?;
        params.insert(key, Cell::simple_literal(text));
    }

    let connection = StandardConnection::with_config(config)?;

    if args.ask {
        let answer = if params.is_empty() {
            connection.ask_query(&query)?
        } else {
            let mut prepared = connection.prepare_ask(&query)?;
            prepared.execute(params)?;
            prepared.fetch_column()?.flatten().and_then(|v| v.as_bool()).unwrap_or(false)
        };
        println!("{}", answer);
        return Ok(());
    }

    let mut statement = if params.is_empty() {
        connection.query(&query)?
    } else {
        let mut prepared = connection.prepare(&query)?;
        prepared.execute(params)?;
        prepared.into_statement()?
    };

    let mut count = 0usize;
    while let Some(fetched) = statement.fetch(mode)? {
        print_fetched(&fetched);
        count += 1;
    }
    tracing::info!(rows = count, "query finished");

    Ok(())
}
