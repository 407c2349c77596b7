use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use clap::ArgMatches;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod command_parser;

use libris::{
    auth::StaticTokens,
    config::Config,
    error::ResolveError,
    export::Export,
    resolver::Resolver,
    server::{self, AppState},
    source::OpenLibrary,
    store::{RecordStore, SqliteStore},
};

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolver(config: &Config) -> Result<Resolver> {
    let source = OpenLibrary::new(&config.upstream)?;
    Ok(Resolver::new(Arc::new(source), &config.upstream))
}

async fn connect_to_db(config: &Config) -> Result<SqliteStore> {
    SqliteStore::connect(&config.database_path()?).await
}

async fn with_timeout<T>(
    config: &Config,
    call: impl Future<Output = Result<T, ResolveError>>,
) -> Result<T, ResolveError> {
    match config.upstream.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), call)
            .await
            .map_err(|_| ResolveError::UpstreamUnavailable(format!("no answer within {secs}s")))?,
        None => call.await,
    }
}

async fn handle_command(matches: ArgMatches, config: Config) -> Result<()> {
    match matches.subcommand() {
        Some(("search", matches)) => {
            let query = matches
                .get_many::<String>("query")
                .map(|x| x.cloned().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            let resolver = resolver(&config)?;
            let results = with_timeout(&config, resolver.search(&query)).await?;
            debug!(total = ?results.total, "Search finished");
            if matches.get_flag("json") {
                let records = results.collect::<Vec<_>>();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in results {
                    println!("{record}");
                }
            }
        }
        Some(("resolve", matches)) => {
            let identifier = matches
                .get_one::<String>("identifier")
                .ok_or(anyhow!("Identifier missing"))?;
            let resolver = resolver(&config)?;
            let record = with_timeout(&config, resolver.resolve(identifier)).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Some(("import", matches)) => {
            let identifier = matches
                .get_one::<String>("identifier")
                .ok_or(anyhow!("Identifier missing"))?;
            let resolver = resolver(&config)?;
            let record = with_timeout(&config, resolver.resolve(identifier)).await?;
            let store = connect_to_db(&config).await?;
            let id = store.save(&record).await?;
            println!("Stored {record} as #{id}");
        }
        Some(("serve", _)) => {
            let state = AppState {
                resolver: resolver(&config)?,
                store:    Arc::new(connect_to_db(&config).await?),
                auth:     Arc::new(StaticTokens::new(&config.tokens)),
                timeout:  config.upstream.timeout_secs.map(Duration::from_secs),
            };
            server::start(&config, state).await?;
        }
        Some(("export", _)) => {
            let store = connect_to_db(&config).await?;
            Export::export(Export::new(&store).await?, std::io::stdout())?;
        }
        Some(("config", _)) => {
            println!("{}", Config::default_as_string()?);
        }
        Some((name, _matches)) => unimplemented!("{}", name),
        None => unreachable!("subcommand required"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = command_parser::arg_parser().get_matches();
    let config = Config::read_config()?;
    init_tracing(&config);
    handle_command(matches, config).await
}
