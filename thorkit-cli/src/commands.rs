//! Account overview, balance and transfer commands.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Args;
use thorkit::prelude::*;
use thorkit::rpc;
use tracing::{info, warn};

/// Symbol of the native coin.
const NATIVE_SYMBOL: &str = "VET";

/// Session flags standing in for a connected wallet.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Connected wallet address
    #[arg(long, value_name = "ADDRESS")]
    pub wallet: String,

    /// Smart account controlled by the wallet
    #[arg(long, value_name = "ADDRESS")]
    pub smart_account: Option<String>,

    /// The smart account contract is already deployed
    #[arg(long, requires = "smart_account")]
    pub deployed: bool,

    /// The wallet was obtained through social login
    #[arg(long)]
    pub social: bool,
}

impl SessionArgs {
    /// Build the session these flags describe.
    ///
    /// # Errors
    ///
    /// Fails if an address flag is malformed.
    pub fn session(&self) -> anyhow::Result<StaticSession> {
        let wallet = address_arg("--wallet", &self.wallet)?;
        let source = if self.social {
            ConnectionSource::SocialLogin
        } else {
            ConnectionSource::Wallet
        };
        let mut session = StaticSession::connected(wallet).with_source(source);
        if let Some(smart) = &self.smart_account {
            session = session.with_smart_account(address_arg("--smart-account", smart)?, self.deployed);
        }
        Ok(session)
    }
}

/// Asset selection flags.
#[derive(Args, Debug, Clone, Default)]
pub struct AssetArgs {
    /// Token contract (defaults to the configured token)
    #[arg(long, value_name = "ADDRESS", conflicts_with = "native")]
    pub token: Option<String>,

    /// Use the native coin instead of a token
    #[arg(long)]
    pub native: bool,
}

impl AssetArgs {
    /// Asset and display symbol selected by these flags.
    fn resolve(&self, config: &KitConfig) -> anyhow::Result<(AssetKind, String)> {
        if self.native {
            return Ok((AssetKind::Native, NATIVE_SYMBOL.into()));
        }
        match &self.token {
            Some(token) => Ok((AssetKind::Token(address_arg("--token", token)?), "tokens".into())),
            None => Ok((AssetKind::Token(config.token_address), config.token_symbol.clone())),
        }
    }
}

/// Print the account overview of the session described by `args`.
///
/// # Errors
///
/// Fails on malformed flags or an unreachable endpoint.
pub async fn overview(config: &KitConfig, args: &SessionArgs) -> anyhow::Result<()> {
    let session = args.session()?;
    let balances = balance_query(config).await?;
    let overview = AccountOverview::load(
        &session,
        &balances,
        config.smart_account_policy,
        config.token_address,
        &config.token_symbol,
    )
    .await;
    print!("{overview}");
    Ok(())
}

/// Print the balance of `address`.
///
/// A transport failure prints `unknown` rather than failing the command.
///
/// # Errors
///
/// Fails on malformed flags, an unreachable endpoint or undecodable data.
pub async fn balance(config: &KitConfig, address: &str, asset: &AssetArgs) -> anyhow::Result<()> {
    let address = address_arg("ADDRESS", address)?;
    let (asset, symbol) = asset.resolve(config)?;
    let balances = balance_query(config).await?;

    match balances.balance(address, asset).await {
        Ok(value) => println!("{} {symbol}", format_amount(value)),
        Err(BalanceError::Transport(e)) => {
            warn!(error = %e, "balance unavailable");
            println!("unknown");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Build a transfer and, unless `dry_run`, submit it and stream its status.
///
/// # Errors
///
/// Fails when the form is not ready, when no signer can be selected, or
/// when the transaction does not succeed.
pub async fn transfer(
    config: &KitConfig,
    session: &SessionArgs,
    to: &str,
    amount: &str,
    asset: &AssetArgs,
    dry_run: bool,
) -> anyhow::Result<()> {
    let (asset, symbol) = asset.resolve(config)?;
    let mut form = TransferForm::new(asset, symbol).with_recipient(to);
    form.set_amount(amount);

    if form.recipient_is_invalid() {
        bail!("invalid recipient address '{to}'");
    }
    let parsed = form.parsed_amount().context("invalid amount")?;
    let clauses = form.clauses();
    if clauses.is_empty() {
        bail!("nothing to transfer: amount parses to {}", format_amount(parsed));
    }

    for (i, clause) in clauses.iter().enumerate() {
        let kind = if clause.is_contract_call() {
            "contract call"
        } else {
            "value transfer"
        };
        println!("clause {i} ({kind})");
        println!("  to:    {}", clause.to);
        println!("  value: {}", clause.value);
        if let Some(data) = &clause.data {
            println!("  data:  {data}");
        }
        if let Some(comment) = &clause.comment {
            println!("  note:  {comment}");
        }
    }
    if dry_run {
        return Ok(());
    }

    let session = session.session()?;
    let from = select_signer(&session, config.smart_account_policy)
        .context("no account available to sign")?;
    info!(from = %from, policy = ?config.smart_account_policy, "signer selected");

    let provider = rpc::connect(&config.rpc_url).await?;
    let tracker = TransactionTracker::new(Arc::new(RpcSubmitter::new(provider, from, config)));

    let mut updates = tracker.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let status = updates.borrow_and_update().clone();
            println!("status: {status}");
        }
    });

    let hints = form.hints();
    let last = tracker.submit(&clauses, &hints).await?;
    drop(tracker);
    printer.await?;

    match last {
        TransactionStatus::Success { .. } => Ok(()),
        status => bail!("transfer did not succeed: {status}"),
    }
}

async fn balance_query(config: &KitConfig) -> anyhow::Result<BalanceQuery> {
    let provider = rpc::connect(&config.rpc_url).await?;
    Ok(BalanceQuery::new(Arc::new(RpcChainReader::new(provider))))
}

fn address_arg(flag: &str, value: &str) -> anyhow::Result<Address> {
    parse_address(value).with_context(|| format!("{flag}: invalid address '{value}'"))
}
