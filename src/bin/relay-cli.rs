use clap::Parser;
use serde_json::Value;
use url::Url;

use graphql_relay::client::{ClientError, GraphQlRequest, InterceptRules, RelayClient};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Send a GraphQL query through the relay", long_about = None)]
struct Cli {
    /// Relay endpoint.
    #[arg(short, long, default_value = "http://localhost:8080/api/graphql-proxy")]
    relay: String,

    /// GraphQL server the query is meant for.
    #[arg(short, long)]
    target: String,

    /// GraphQL query document.
    #[arg(short, long)]
    query: String,

    /// Variables as a JSON object.
    #[arg(long)]
    variables: Option<String>,

    #[arg(long)]
    operation_name: Option<String>,

    /// Host fragments routed through the relay. Defaults to the target's host.
    #[arg(short, long = "domain")]
    domains: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let relay = Url::parse(&cli.relay)?;
    let domains = if cli.domains.is_empty() {
        Url::parse(&cli.target)?
            .host_str()
            .map(|h| vec![h.to_string()])
            .unwrap_or_default()
    } else {
        cli.domains
    };
    let client = RelayClient::new(relay, InterceptRules::new(domains));

    let mut request = GraphQlRequest::new(cli.query);
    if let Some(raw) = cli.variables {
        request = request.with_variables(serde_json::from_str::<Value>(&raw)?);
    }
    if let Some(name) = cli.operation_name {
        request = request.with_operation_name(name);
    }

    match client.query(&cli.target, &request).await {
        Ok(json) => {
            println!("{}", serde_json::to_string_pretty(&json)?);
            Ok(())
        }
        Err(ClientError::Status { status, body }) => {
            eprintln!("Error: relay returned status {}", status);
            eprintln!("Response: {}", body);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
