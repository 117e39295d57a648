use clap::{Parser, Subcommand};
use jmc_core::generator::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use jmc_core::{OpenAiClient, QueryResult, Session, infer, parse_document, run_query};
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "jmescraft",
    version,
    about = "Generate and run JMESPath queries against JSON documents"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "OPENAI_API_KEY",
        hide_env_values = true,
        help = "API key for the chat-completion service"
    )]
    api_key: Option<String>,
    #[arg(
        long,
        global = true,
        env = "OPENAI_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        help = "Base URL of an OpenAI-compatible API"
    )]
    base_url: String,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_MODEL,
        help = "Chat model used for query generation"
    )]
    model: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a JMESPath query against a JSON document
    Query {
        query: String,
        /// Input JSON file (reads from stdin if omitted)
        file: Option<String>,
    },
    /// Print the inferred shape of a JSON document
    Schema { file: Option<String> },
    /// Check that the API key is accepted
    Verify,
    /// Generate a query from a natural-language prompt and run it
    Ask {
        prompt: String,
        file: Option<String>,
    },
}

/// Read the document the way an upload is read: raw bytes decoded as UTF-8.
fn read_input(file: Option<&str>) -> Result<String, String> {
    let bytes = match file {
        Some(path) => fs::read(path).map_err(|e| format!("error reading file '{path}': {e}"))?,
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|e| format!("error reading stdin: {e}"))?;
            buffer
        }
    };
    Ok(jmc_core::decode_upload(&bytes))
}

fn client(cli: &Cli) -> OpenAiClient {
    OpenAiClient::new()
        .with_base_url(cli.base_url.as_str())
        .with_model(cli.model.as_str())
}

fn api_key(cli: &Cli) -> Result<String, String> {
    cli.api_key
        .clone()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| "missing API key: pass --api-key or set OPENAI_API_KEY".to_string())
}

async fn run(cli: Cli) -> Result<(), String> {
    match &cli.command {
        Commands::Query { query, file } => {
            let input = read_input(file.as_deref())?;
            let json = parse_document(&input).map_err(|e| e.to_string())?;
            match run_query(query, &json) {
                QueryResult::Output(text) => {
                    println!("{text}");
                    Ok(())
                }
                QueryResult::Failure(message) => Err(message),
            }
        }
        Commands::Schema { file } => {
            let input = read_input(file.as_deref())?;
            let json = parse_document(&input).map_err(|e| e.to_string())?;
            println!("{}", jmc_core::pretty(&infer(&json).to_value()));
            Ok(())
        }
        Commands::Verify => {
            let mut session = Session::new(client(&cli));
            session.set_credential(api_key(&cli)?);
            session.verify_credential().await.map_err(|e| e.to_string())?;
            println!("API key verified");
            Ok(())
        }
        Commands::Ask { prompt, file } => {
            let key = api_key(&cli)?;
            let input = read_input(file.as_deref())?;

            let mut session = Session::new(client(&cli));
            session.set_credential(key);
            session.set_json_input(input);
            if let Some(message) = session.json_error() {
                return Err(message.to_string());
            }
            session.set_prompt(prompt.as_str());

            let outcome = session.generate().await;
            if let Some(query) = session.generated_query() {
                eprintln!("query: {query}");
            }
            let output = outcome.map_err(|e| e.to_string())?;
            println!("{output}");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("jmescraft: {e}");
            ExitCode::FAILURE
        }
    }
}
