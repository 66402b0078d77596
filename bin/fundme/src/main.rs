//! fundme is the operator CLI for the FundMe contract: deploy it with the
//! right price feed for the target network, fund it, and withdraw from it.

mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use fundme_deploy::{Deployer, FundMe, NetworkRegistry, eth_to_wei, rpc};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let rpc_url = cli.effective_rpc_url();
    let outdata = PathBuf::from(cli.effective_outdata());

    match &cli.command {
        Command::Deploy(args) => {
            let client = rpc::create_client()?;
            let chain_id = rpc::chain_id(&client, &rpc_url)
                .await
                .context("Failed to query the chain id - is the node reachable?")?;

            let deployer = Deployer {
                rpc_url,
                network_name: cli.network.registry_name().to_string(),
                chain_id,
                outdata,
                artifacts: PathBuf::from(&args.artifacts),
                confirmations: args.confirmations,
                etherscan_api_key: args.etherscan_api_key.clone(),
            };

            tracing::info!(
                network = %cli.network,
                chain_id,
                outdata = %deployer.outdata.display(),
                "Starting deployment..."
            );

            let record = deployer
                .deploy(&NetworkRegistry::default(), args.redeploy)
                .await
                .context("Deployment failed")?;

            tracing::info!(address = %record.address, "Done");
        }
        Command::Fund(args) => {
            let fund_me = FundMe::from_record(&outdata, &rpc_url)
                .await
                .context("Failed to resolve the deployed contract")?;

            tracing::info!(address = %fund_me.address, amount_eth = args.amount_eth, "Funding contract...");
            fund_me
                .fund(eth_to_wei(args.amount_eth))
                .await
                .context("Funding failed")?;

            tracing::info!("Successfully funded!");
        }
        Command::Withdraw => {
            let fund_me = FundMe::from_record(&outdata, &rpc_url)
                .await
                .context("Failed to resolve the deployed contract")?;

            tracing::info!(address = %fund_me.address, "Withdrawing from contract...");
            fund_me.withdraw().await.context("Withdrawal failed")?;

            tracing::info!("Successfully withdrawn!");
        }
    }

    Ok(())
}
