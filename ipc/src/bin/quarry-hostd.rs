//! Out-of-process Quarry host backed by an in-memory state.

use std::collections::BTreeMap;
use std::fs;
use std::net::{SocketAddr, TcpListener};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use quarry_hostapi::{AccountContractUpdater, MemHost, MemHostConfig, StorageCommitter};
use quarry_ipc::{HostServer, ServerConfig, DEFAULT_MAX_MESSAGE_SIZE};
use quarry_primitives::{Address, UFix64};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Quarry host daemon
///
/// Serves the host environment contract from an in-memory state to
/// programs running in another process.
#[derive(Debug, Parser)]
struct Settings {
    /// Unix socket to listen on
    #[arg(long, value_name = "PATH", conflicts_with = "listen")]
    socket: Option<PathBuf>,

    /// TCP address to listen on
    #[arg(long, value_name = "ADDRESS")]
    listen: Option<SocketAddr>,

    /// JSON file with host settings and funded accounts
    #[arg(long, value_name = "FILE")]
    genesis: Option<PathBuf>,

    /// Largest accepted frame in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    max_message_size: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Genesis {
    config: MemHostConfig,
    accounts: Vec<GenesisAccount>,
}

#[derive(Debug, Deserialize)]
struct GenesisAccount {
    address: Address,
    #[serde(default)]
    balance: UFix64,
    /// Contract name to source code.
    #[serde(default)]
    contracts: BTreeMap<String, String>,
}

fn load_genesis(path: &Path) -> anyhow::Result<Genesis> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading genesis file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing genesis file {}", path.display()))
}

fn build_host(genesis: Genesis) -> anyhow::Result<MemHost> {
    let host = MemHost::new(genesis.config);
    for account in genesis.accounts {
        host.insert_account(account.address, account.balance);
        for (name, code) in &account.contracts {
            host.update_account_contract_code(account.address, name, code.as_bytes())
                .with_context(|| format!("deploying {} to {}", name, account.address))?;
        }
        info!(
            address = %account.address,
            balance = %account.balance,
            contracts = account.contracts.len(),
            "genesis account"
        );
    }
    host.commit_storage(true)?;
    Ok(host)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = Settings::parse();
    info!("startup settings: {settings:?}");

    let genesis = match &settings.genesis {
        Some(path) => load_genesis(path)?,
        None => Genesis::default(),
    };
    let server = HostServer::new(
        build_host(genesis)?,
        ServerConfig {
            max_message_size: settings.max_message_size,
        },
    );

    match (settings.socket, settings.listen) {
        (Some(path), None) => serve_unix(&server, &path),
        (None, Some(addr)) => {
            let listener =
                TcpListener::bind(addr).with_context(|| format!("binding {}", addr))?;
            info!(%addr, "serving host over tcp");
            server.serve_listener(listener.incoming())?;
            Ok(())
        }
        _ => bail!("exactly one of --socket or --listen is required"),
    }
}

#[cfg(unix)]
fn serve_unix(server: &HostServer<MemHost>, path: &Path) -> anyhow::Result<()> {
    use std::os::unix::net::UnixListener;

    // A previous run leaves its socket file behind.
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("removing stale socket {}", path.display()))?;
    }
    let listener =
        UnixListener::bind(path).with_context(|| format!("binding {}", path.display()))?;
    info!(path = %path.display(), "serving host over unix socket");
    server.serve_listener(listener.incoming())?;
    Ok(())
}

#[cfg(not(unix))]
fn serve_unix(_server: &HostServer<MemHost>, _path: &Path) -> anyhow::Result<()> {
    bail!("unix sockets are not supported on this platform")
}
