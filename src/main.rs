//! `buddyevents` command-line entry point.
//!
//! Agents and humans use it to manage the wallet that pays for tickets:
//! create a key, check balances, send MON or USDC, and request testnet funds.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use buddyevents::blockchain::client::BlockchainClient;
use buddyevents::blockchain::types::BlockchainError;
use buddyevents::blockchain::{erc20, faucet, units};
use buddyevents::config::{self, CliConfig};
use buddyevents::observability;
use buddyevents::{send_transfer, TransferIntent, Wallet};

/// Fractional digits shown for balances.
const DISPLAY_PRECISION: u8 = 6;

#[derive(Parser)]
#[command(name = "buddyevents")]
#[command(about = "BuddyEvents: agent-native event ticketing on Monad", long_about = None)]
struct Cli {
    /// Config file (default: ~/.buddyevents/config.toml)
    #[arg(long, global = true, env = "BUDDYEVENTS_CONFIG")]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint (overrides config)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wallet management (setup, balance, send, fund)
    #[command(subcommand)]
    Wallet(WalletCommand),
}

#[derive(Subcommand)]
enum WalletCommand {
    /// Generate a new wallet for this agent
    Setup {
        /// Replace an existing wallet
        #[arg(long)]
        force: bool,
    },
    /// Print the configured wallet address
    Address,
    /// Check wallet balances (native + token)
    Balance,
    /// Send the native asset or the token from the configured wallet
    Send {
        /// Recipient wallet address
        #[arg(long)]
        to: String,
        /// Amount to send, in whole units
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// Token to send: mon|usdc
        #[arg(long, default_value = "mon")]
        token: String,
    },
    /// Request testnet funds from the faucet
    Fund,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match cli.config {
        Some(path) => path,
        None => config::loader::default_config_path()?,
    };

    let mut config = config::load_or_default(&config_path)?;
    if let Some(rpc_url) = cli.rpc_url {
        config.blockchain.rpc_url = rpc_url;
        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
    }
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }

    // A subscriber may already be installed when embedded; logging is best effort.
    let _ = observability::init_logging(&config.observability);

    tracing::debug!(path = %config_path.display(), rpc_url = %config.blockchain.rpc_url, "Configuration loaded");

    match cli.command {
        Commands::Wallet(command) => match command {
            WalletCommand::Setup { force } => setup(config, &config_path, force),
            WalletCommand::Address => {
                println!("{}", config.wallet_address()?);
                Ok(())
            }
            WalletCommand::Balance => balance(&config).await,
            WalletCommand::Send { to, amount, token } => {
                let wallet = config.credential()?;
                let intent = TransferIntent {
                    recipient: to,
                    amount,
                    token,
                };
                let tx_hash = send_transfer(&intent, &wallet, &config).await?;
                println!(
                    "Sent {} {} to {}",
                    amount,
                    intent.token.to_uppercase(),
                    intent.recipient
                );
                println!("Tx: {}", tx_hash);
                Ok(())
            }
            WalletCommand::Fund => fund(&config).await,
        },
    }
}

fn setup(mut config: CliConfig, path: &std::path::Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_wallet() && !force {
        return Err(format!(
            "a wallet is already configured in {}; pass --force to replace it",
            path.display()
        )
        .into());
    }

    let wallet = Wallet::generate();
    config.wallet.private_key = wallet.private_key_hex();
    config.wallet.address = wallet.address().to_string();
    config::save_config(&config, path)?;

    println!("Wallet created!");
    println!("Address: {}", wallet.address());
    println!("\nSaved to {}", path.display());
    println!("\nNext: Fund your wallet with testnet {} and {}:", config.blockchain.native_symbol, config.token.symbol);
    println!("  buddyevents wallet fund");
    println!("  {}: https://faucet.circle.com (select Monad Testnet)", config.token.symbol);
    Ok(())
}

async fn balance(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let address = config.wallet_address()?;
    let client = BlockchainClient::from_config(&config.blockchain).map_err(BlockchainError::Endpoint)?;

    println!("Wallet: {}\n", address);

    let native = &config.blockchain.native_symbol;
    match client.get_balance(address).await {
        Ok(wei) => println!(
            "{}: {}",
            native,
            units::format_units(wei, config.blockchain.native_decimals, DISPLAY_PRECISION)
        ),
        Err(e) => println!("{}: error: {}", native, BlockchainError::BalanceQuery(e)),
    }

    let token = &config.token;
    let balance = match erc20::parse_address(&token.address) {
        Ok(contract) => client
            .get_token_balance(contract, address)
            .await
            .map_err(BlockchainError::BalanceQuery),
        Err(e) => Err(e.into()),
    };
    match balance {
        Ok(raw) => println!(
            "{}: {}",
            token.symbol,
            units::format_units(raw, token.decimals, DISPLAY_PRECISION)
        ),
        Err(e) => println!("{}: error: {}", token.symbol, e),
    }

    Ok(())
}

async fn fund(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let address = config.wallet_address()?;
    println!("Requesting testnet {} for {}...", config.blockchain.native_symbol, address);

    let timeout = Duration::from_secs(config.blockchain.rpc_timeout_secs);
    let tx_hash = faucet::request_funds(&config.faucet, address, timeout).await?;

    println!("Funded! Tx: {}", tx_hash);
    println!(
        "\nFor {}, visit: https://faucet.circle.com (select Monad Testnet)",
        config.token.symbol
    );
    Ok(())
}
