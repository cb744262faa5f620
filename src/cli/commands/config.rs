//! Config commands

use crate::clients::storage::build_blob_store;
use crate::config::{Config, StorageBackend};

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("✓ Config file created. Edit config.toml and run again.");
    } else {
        println!("config.toml already exists, leaving it untouched.");
    }
    Ok(())
}

pub fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    config.validate()?;

    let store = build_blob_store(reqwest::Client::new(), &config.storage);
    let backend = match config.storage.backend {
        StorageBackend::Gcs => "gcs",
        StorageBackend::Local => "local",
    };

    println!("Configuration OK");
    println!("{:-<50}", "");
    println!("Database:      {}", config.general.database_path);
    println!("Port:          {}", config.server.port);
    println!("Storage:       {} (bucket {})", backend, config.storage.bucket);
    println!("Photo URLs:    {}", store.public_url("<object>"));
    println!("Chat model:    {} @ {}", config.ai.model, config.ai.base_url);
    println!(
        "Chat API key:  {}",
        if config.ai.api_key.is_some() { "set" } else { "missing" }
    );
    println!(
        "Tokens:        {} (ttl {} min)",
        if config.security.require_token { "required" } else { "disabled" },
        config.security.token_ttl_minutes
    );

    Ok(())
}
