use clap::Parser;
use embedstore::cli::commands::{Cli, Commands, StoreArgs};
use embedstore::domain::error::DomainError;
use embedstore::domain::values::config::{StoreConfig, StoreOptions};
use embedstore::EmbedStore;

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let store = match open_store(&cli.store).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error initializing store: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(store, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(std::env::var("EMBEDSTORE_LOG").unwrap_or_else(|_| "warn".into()))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults < config file < environment < command-line flags.
async fn open_store(args: &StoreArgs) -> Result<EmbedStore, DomainError> {
    let mut options = StoreOptions {
        name: Some("default".into()),
        ..StoreOptions::default()
    };
    if let Some(path) = &args.config {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::InvalidConfiguration(format!("Cannot read {}: {e}", path.display())))?;
        options = options.merge(StoreOptions::from_json(&raw)?);
    }
    options = options.merge(StoreOptions::from_env()?);
    options = options.merge(StoreOptions {
        name: args.name.clone(),
        dimension: args.dimension,
        directory: args.dir.clone(),
        ..StoreOptions::default()
    });

    EmbedStore::from_env(StoreConfig::from_options(options)?).await
}

async fn run_command(store: EmbedStore, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Add { text, id } => {
            let id = store.add_document(&text, id.as_deref()).await?;
            println!("{}", serde_json::json!({ "id": id }));
        }
        Commands::AddBatch { json } => {
            let items = parse_batch(&json)?;
            let ids = store.add_documents_with_ids(items).await?;
            println!("{}", serde_json::to_string_pretty(&ids)?);
        }
        Commands::Search {
            query,
            threshold,
            limit,
        } => {
            let hits = store.search(&query, threshold, limit).await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Similar { id, threshold, limit } => {
            let record = store.get_document(&id).await?;
            let hits = store.search_by_vector(&record.vector, threshold, limit).await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Get { id } => {
            let record = store.get_document(&id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Delete { id } => {
            store.delete_document(&id).await?;
            println!("Deleted {id}");
        }
        Commands::List => {
            let ids = store.list_ids().await;
            println!("{}", serde_json::to_string_pretty(&ids)?);
        }
        Commands::Count => {
            println!("{}", store.len().await);
        }
        Commands::Reset => {
            store.reset().await?;
            println!("Collection '{}' reset", store.config().name());
        }
    }
    Ok(())
}

fn parse_batch(json: &str) -> Result<Vec<(String, Option<String>)>, String> {
    let data: serde_json::Value = serde_json::from_str(json).map_err(|e| format!("Invalid JSON: {e}"))?;
    let items = data.as_array().ok_or("Expected a JSON array")?;
    items.iter().map(parse_batch_item).collect()
}

fn parse_batch_item(item: &serde_json::Value) -> Result<(String, Option<String>), String> {
    match item {
        serde_json::Value::String(text) => Ok((text.clone(), None)),
        serde_json::Value::Object(obj) => {
            let text = obj
                .get("text")
                .and_then(|t| t.as_str())
                .ok_or("Missing required field: text")?
                .to_string();
            let id = obj.get("id").and_then(|i| i.as_str()).map(String::from);
            Ok((text, id))
        }
        _ => Err("Batch items must be strings or objects".to_string()),
    }
}
