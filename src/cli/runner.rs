//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::TapConfig;
use crate::engine::{OrderCheck, SyncConfig, SyncEngine};
use crate::error::{Error, Result, ResultExt};
use crate::http::HttpClient;
use crate::loader::{load_provider, ProviderDefinition};
use crate::providers;
use crate::sink::SingerWriter;
use crate::state::{BookmarkStore, FileStateSink, State};
use crate::stream::StreamDescriptor;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, info_span};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, returning the process exit status
    pub async fn run(&self) -> Result<i32> {
        match &self.cli.command {
            Commands::Sync {
                fail_fast,
                reject_unordered,
                ..
            } => {
                let order_check = if *reject_unordered {
                    OrderCheck::Reject
                } else {
                    OrderCheck::Warn
                };
                let config = SyncConfig::new()
                    .with_fail_fast(*fail_fast)
                    .with_order_check(order_check);
                self.sync(config).await
            }
            Commands::Discover => self.discover().map(|()| 0),
            Commands::List => self.list_providers().map(|()| 0),
            Commands::Validate => self.validate().map(|()| 0),
        }
    }

    fn load_provider(&self) -> Result<ProviderDefinition> {
        let path = self
            .cli
            .provider
            .as_ref()
            .ok_or_else(|| Error::config("Provider not specified (use -p flag)"))?;
        load_provider(path)
    }

    /// Load the tap config, checking the keys the provider needs
    fn load_config(&self, provider: &ProviderDefinition) -> Result<TapConfig> {
        let required = provider.required_keys();

        // Inline config takes precedence
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json(json_str, &required);
        }
        match &self.cli.config {
            Some(path) => TapConfig::from_file(path, &required),
            None => Err(Error::config("Config not specified (use -C or --config-json)")),
        }
    }

    fn load_state(&self) -> Result<State> {
        match &self.cli.state {
            Some(path) => State::from_file(path)
                .with_context(|| format!("Failed to load state from {}", path.display())),
            None => Ok(State::new()),
        }
    }

    async fn sync(&self, sync_config: SyncConfig) -> Result<i32> {
        let provider = self.load_provider()?;
        let config = self.load_config(&provider)?;
        let selection = self.cli.command.stream_selection();
        let streams: Vec<&StreamDescriptor> = provider.select(&selection)?;

        let client = HttpClient::with_config(provider.http_client_config(&config)?)?;

        let writer = Arc::new(SingerWriter::stdout());
        let mut store = BookmarkStore::new(self.load_state()?);
        if let Some(path) = &self.cli.state {
            store = store.with_sink(Arc::new(FileStateSink::new(path)));
        }
        let store = store.with_sink(writer.clone());

        let span = info_span!("sync", provider = %provider.name);
        info!(
            parent: &span,
            streams = ?streams.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            "Starting sync"
        );

        let mut engine = SyncEngine::new(client, store, writer, config)
            .with_config(sync_config)
            .with_headers(provider.headers.clone())
            .with_params(provider.params.clone())
            .with_span(span);

        let report = engine.sync(&streams).await?;
        for stream in &report.streams {
            for failed in stream.failures() {
                tracing::warn!(
                    stream = %stream.stream,
                    partition = %failed.partition,
                    "Partition did not complete"
                );
            }
        }
        Ok(report.exit_code())
    }

    fn discover(&self) -> Result<()> {
        let provider = self.load_provider()?;
        let streams: Vec<Value> = provider.streams.iter().map(catalog_entry).collect();

        self.output_message(&json!({ "streams": streams }));
        Ok(())
    }

    fn list_providers(&self) -> Result<()> {
        let mut entries = Vec::new();
        for name in providers::list_builtin() {
            let Some(yaml) = providers::get_builtin(name) else {
                continue;
            };
            let def = crate::loader::load_provider_from_str(yaml)?;
            entries.push(json!({
                "name": def.name,
                "version": def.version,
                "base_url": def.base_url,
                "required_config": def.required_keys(),
                "streams": def.streams.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            }));
        }

        self.output_message(&json!({ "providers": entries }));
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let provider = self.load_provider()?;

        let config_checked = if self.cli.config.is_some() || self.cli.config_json.is_some() {
            let config = self.load_config(&provider)?;
            for stream in &provider.streams {
                stream.partitions.partitions(&config)?;
            }
            provider.http_client_config(&config)?;
            true
        } else {
            false
        };

        self.output_message(&json!({
            "provider": provider.name,
            "version": provider.version,
            "streams": provider.streams.len(),
            "config_checked": config_checked,
            "valid": true
        }));
        Ok(())
    }

    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Singer catalog entry of one stream
pub(crate) fn catalog_entry(stream: &StreamDescriptor) -> Value {
    let mode = stream.mode().as_catalog_str();
    let replication_keys: Vec<&str> = stream.replication_key().into_iter().collect();

    json!({
        "tap_stream_id": stream.name,
        "stream": stream.name,
        "schema": stream.schema,
        "key_properties": stream.key_properties,
        "replication_method": mode,
        "replication_key": stream.replication_key(),
        "metadata": [{
            "breadcrumb": [],
            "metadata": {
                "selected": stream.selected_by_default,
                "inclusion": "available",
                "table-key-properties": stream.key_properties,
                "forced-replication-method": mode,
                "valid-replication-keys": replication_keys,
            }
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_provider_from_str;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_sync_args() {
        let cli = Cli::parse_from([
            "rest-tap",
            "--provider",
            "abc_financial",
            "-C",
            "config.json",
            "sync",
            "--streams",
            "members, checkins,",
            "--fail-fast",
        ]);

        assert_eq!(
            cli.command.stream_selection(),
            vec!["members".to_string(), "checkins".to_string()]
        );
        assert!(matches!(
            cli.command,
            Commands::Sync {
                fail_fast: true,
                reject_unordered: false,
                ..
            }
        ));
    }

    #[test]
    fn test_definition_alias() {
        let cli = Cli::parse_from(["rest-tap", "discover", "--definition", "./p.yaml"]);
        assert_eq!(cli.provider.unwrap().to_string_lossy(), "./p.yaml");
    }

    #[test]
    fn test_catalog_entry() {
        let def = load_provider_from_str(providers::get_builtin("abc_financial").unwrap()).unwrap();

        let checkins = catalog_entry(def.stream("checkins").unwrap());
        assert_eq!(checkins["replication_method"], "INCREMENTAL");
        assert_eq!(checkins["replication_key"], "timestamp");
        assert_eq!(checkins["key_properties"], json!(["checkInId"]));
        assert_eq!(
            checkins["metadata"][0]["metadata"]["valid-replication-keys"],
            json!(["timestamp"])
        );

        let clubs = catalog_entry(def.stream("clubs").unwrap());
        assert_eq!(clubs["replication_method"], "FULL_TABLE");
        assert_eq!(clubs["replication_key"], Value::Null);
    }

    #[tokio::test]
    async fn test_sync_without_config_fails() {
        let cli = Cli::parse_from(["rest-tap", "-p", "contentful", "sync"]);
        let err = Runner::new(cli).run().await.unwrap_err();
        assert!(err.to_string().contains("Config not specified"));
    }
}
