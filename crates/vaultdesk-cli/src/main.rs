// Vaultdesk CLI — drive a pool position from the terminal.
//
//   vaultdesk resolve                  show the (chain, asset) pool config
//   vaultdesk show                     read balances and print the pool card
//   vaultdesk approve|deposit|withdraw <AMOUNT> [--wait]
//   vaultdesk settle <TX_HASH>... [--wait]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use vaultdesk::atoms::constants::{ENV_ACCOUNT, ENV_CONFIG_PATH, ENV_RPC_URL};
use vaultdesk::engine::pool::amount::format_units;
use vaultdesk::engine::pool::ledger::ReceiptStatus;
use vaultdesk::{
    Action, Address, ChainId, EngineError, EngineResult, LedgerTransport, MarketStats, NetworkTable,
    PositionController, RpcLedger, SubmitOutcome, WriteStatus,
};

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const POLL_ATTEMPTS: u32 = 90;

#[derive(Parser, Debug)]
#[command(name = "vaultdesk", author, version, about = "Deposit into and withdraw from share-based liquidity pools", long_about = None)]
struct Cli {
    /// JSON-RPC endpoint of the node (or wallet bridge) that signs writes
    #[arg(long, global = true, env = ENV_RPC_URL, default_value = "http://127.0.0.1:8545")]
    rpc_url: String,

    /// Network table override (TOML)
    #[arg(long, global = true, env = ENV_CONFIG_PATH)]
    config: Option<PathBuf>,

    /// Sending account; defaults to the node's first managed account
    #[arg(long, global = true, env = ENV_ACCOUNT)]
    account: Option<Address>,

    /// Asset symbol, e.g. USDC
    #[arg(long, global = true, default_value = "USDC")]
    asset: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved pool config without contacting the node
    Resolve {
        /// Chain id; unknown or omitted ids use the table's default chain
        #[arg(long)]
        chain: Option<ChainId>,
        #[arg(long)]
        json: bool,
    },
    /// Read the account's position and print the pool card
    Show(StatsArgs),
    /// Approve the pool to spend the underlying token
    Approve(WriteArgs),
    /// Approve the pool to burn pool shares (chains with that policy only)
    ApproveShares(WriteArgs),
    /// Deposit the underlying token into the pool
    Deposit(WriteArgs),
    /// Withdraw the underlying token from the pool
    Withdraw(WriteArgs),
    /// Check receipts of submitted transactions
    Settle {
        #[arg(required = true)]
        tx_hashes: Vec<String>,
        /// Keep polling until every transaction is mined
        #[arg(long)]
        wait: bool,
    },
}

#[derive(Args, Debug)]
struct WriteArgs {
    /// Amount in display units, e.g. 10.5
    amount: String,
    /// Wait for the receipt before exiting
    #[arg(long)]
    wait: bool,
}

/// Pool-level figures are not read from chain; pass them in to show them.
#[derive(Args, Debug)]
struct StatsArgs {
    #[arg(long, default_value_t = 0.0)]
    apy: f64,
    #[arg(long, default_value_t = 0.0)]
    utilization: f64,
    #[arg(long, default_value_t = 0.0)]
    total_deposit: f64,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> EngineResult<()> {
    let table = Arc::new(NetworkTable::discover(cli.config.as_deref())?);

    match &cli.command {
        Command::Resolve { chain, json } => resolve(&table, *chain, &cli.asset, *json),
        Command::Show(stats) => {
            let ledger = RpcLedger::new(&cli.rpc_url);
            show(&cli, table, &ledger, stats).await
        }
        Command::Approve(args) => write(&cli, table, Action::Approve, args).await,
        Command::ApproveShares(args) => write(&cli, table, Action::ApproveShares, args).await,
        Command::Deposit(args) => write(&cli, table, Action::Deposit, args).await,
        Command::Withdraw(args) => write(&cli, table, Action::Withdraw, args).await,
        Command::Settle { tx_hashes, wait } => settle(&RpcLedger::new(&cli.rpc_url), tx_hashes, *wait).await,
    }
}

fn resolve(table: &NetworkTable, chain: Option<ChainId>, asset: &str, json: bool) -> EngineResult<()> {
    let active = table.active_chain(chain);
    let chain_label = table.chain(chain).map(|c| c.name.clone()).unwrap_or_else(|| "unconfigured".into());
    let cfg = table.resolve(chain, asset);

    if json {
        let out = serde_json::json!({
            "chain_id": active,
            "chain": chain_label,
            "asset": asset,
            "configured": cfg.is_some(),
            "decimals": cfg.map(|c| c.decimals),
            "token": cfg.and_then(|c| c.token).map(|a| a.to_string()),
            "pool": cfg.and_then(|c| c.pool).map(|a| a.to_string()),
            "withdraw_approval": table.withdraw_approval(chain),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Chain     {} ({})", chain_label, active);
    let Some(cfg) = cfg else {
        println!("Asset     {} is not configured on this chain", asset);
        let symbols = table.symbols(chain);
        if !symbols.is_empty() {
            println!("Known     {}", symbols.join(", "));
        }
        return Ok(());
    };
    let missing = || "(not configured)".to_string();
    println!("Asset     {}", asset);
    println!("Decimals  {}", cfg.decimals);
    println!("Token     {}", cfg.token.map(|a| a.to_string()).unwrap_or_else(missing));
    println!("Pool      {}", cfg.pool.map(|a| a.to_string()).unwrap_or_else(missing));
    println!("Withdraw  approval: {:?}", table.withdraw_approval(chain));
    Ok(())
}

async fn connect(cli: &Cli, table: Arc<NetworkTable>, ledger: &RpcLedger) -> EngineResult<PositionController> {
    let session = ledger.session(cli.account).await?;
    log::info!(
        "[cli] {} via {} as {}",
        table.chain(session.chain_id).map(|c| c.name.as_str()).unwrap_or("unconfigured chain"),
        ledger.url(),
        session.wallet().map(|a| a.to_string()).unwrap_or_else(|| "no account".into())
    );
    Ok(PositionController::new(table, cli.asset.clone(), session))
}

async fn show(cli: &Cli, table: Arc<NetworkTable>, ledger: &RpcLedger, stats: &StatsArgs) -> EngineResult<()> {
    let mut controller = connect(cli, table, ledger).await?;
    if !controller.refresh(ledger).await {
        log::warn!("[cli] Balances not read: no account or no pool address for {}", cli.asset);
    }

    let card = controller.card(MarketStats {
        apy: stats.apy,
        utilization_rate: stats.utilization,
        total_deposit: stats.total_deposit,
    });
    println!("{}", card);

    if let (Some(shares), Some(decimals)) = (controller.snapshot().share_balance, controller.decimals()) {
        println!("  Pool shares       {}", format_units(shares, decimals));
    }
    Ok(())
}

async fn write(cli: &Cli, table: Arc<NetworkTable>, action: Action, args: &WriteArgs) -> EngineResult<()> {
    let ledger = RpcLedger::new(&cli.rpc_url);
    let mut controller = connect(cli, table, &ledger).await?;

    if !controller.on_amount_input(&args.amount) {
        return Err(EngineError::Other(format!("'{}' is not a valid amount", args.amount)));
    }

    let tx_hash = match controller.submit(action, &ledger).await {
        SubmitOutcome::Submitted { tx_hash } => tx_hash,
        SubmitOutcome::NotPrepared => {
            return Err(EngineError::Other(format!(
                "{} is not available for {} on chain {}: pool, token or account missing",
                action,
                cli.asset,
                controller.active_chain()
            )))
        }
        SubmitOutcome::Rejected => return Err(EngineError::Other(format!("{} was rejected by the node", action))),
    };
    println!("{} submitted: {}", action, controller.explorer_link(&tx_hash));

    if !args.wait {
        return Ok(());
    }
    for _ in 0..POLL_ATTEMPTS {
        tokio::time::sleep(POLL_INTERVAL).await;
        controller.settle_writes(&ledger).await;
        match controller.write_state(action).status {
            WriteStatus::Loading => continue,
            WriteStatus::Success => {
                println!("{} confirmed", action);
                return Ok(());
            }
            WriteStatus::Failed | WriteStatus::Idle => {
                return Err(EngineError::Other(format!("{} reverted: {}", action, tx_hash)));
            }
        }
    }
    Err(EngineError::Other(format!("{} still pending after {} checks: {}", action, POLL_ATTEMPTS, tx_hash)))
}

async fn settle<L: LedgerTransport>(ledger: &L, tx_hashes: &[String], wait: bool) -> EngineResult<()> {
    let mut pending: Vec<&str> = tx_hashes.iter().map(String::as_str).collect();
    let mut reverted = 0usize;
    let mut attempts = 0u32;

    loop {
        let mut still_pending = Vec::new();
        for hash in pending {
            match ledger.receipt(hash).await? {
                ReceiptStatus::Pending => still_pending.push(hash),
                ReceiptStatus::Success => println!("{}  success", hash),
                ReceiptStatus::Reverted => {
                    println!("{}  reverted", hash);
                    reverted += 1;
                }
            }
        }
        pending = still_pending;
        attempts += 1;
        if pending.is_empty() || !wait || attempts >= POLL_ATTEMPTS {
            break;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    for hash in &pending {
        println!("{}  pending", hash);
    }
    if reverted > 0 {
        return Err(EngineError::Other(format!("{} transaction(s) reverted", reverted)));
    }
    Ok(())
}
