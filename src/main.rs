use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arcade_tx::chain::codec;
use arcade_tx::{ArcadeMsg, BroadcastResult, ChainGateway, Config, LocalWallet, RestGateway, TxPipeline};

#[derive(Parser)]
#[command(name = "arcade-tx")]
#[command(about = "Sign and broadcast arcade module transactions", version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    /// Wallet mnemonic
    #[arg(long, env = "ARCADE_MNEMONIC", hide_env_values = true, global = true)]
    mnemonic: Option<String>,

    /// Transaction memo
    #[arg(long, global = true, default_value = "")]
    memo: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "config.toml")]
        output: String,
    },

    /// Show the wallet address and its on-chain account state
    Account,

    /// Buy play credits for a game
    InsertCoin {
        game_id: String,
        #[arg(default_value = "1")]
        credits: u64,
    },

    /// Start a session and wait for its id
    StartSession { game_id: String },

    SubmitScore {
        session_id: u64,
        score: u64,
        #[arg(long, default_value = "1")]
        level: u64,
    },

    UsePowerUp { session_id: u64, power_up: String },

    RegisterGame {
        game_id: String,
        name: String,
        #[arg(long, default_value = "1")]
        credits_per_play: u64,
    },

    ClaimAchievement {
        game_id: String,
        achievement_id: String,
    },

    /// Set the 1-3 character initials shown next to a high score
    SetInitials { game_id: String, initials: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arcade_tx=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Commands::Init { output } = &cli.command {
        Config::default().save(output)?;
        info!("Configuration file created at: {}", output);
        return Ok(());
    }

    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load config from {} (run `arcade-tx init`)", cli.config))?;
    let mnemonic = cli
        .mnemonic
        .as_deref()
        .ok_or_else(|| anyhow!("no mnemonic given; set ARCADE_MNEMONIC or pass --mnemonic"))?;

    let wallet = Arc::new(LocalWallet::from_mnemonic(
        mnemonic,
        &config.chain.bech32_prefix,
        &config.chain.chain_id,
    )?);
    let address = wallet.address().to_string();
    let gateway = Arc::new(RestGateway::new(&config.chain)?);

    if let Commands::Account = cli.command {
        let info = codec::decode_account_response(gateway.account(&address).await?)?;
        info!("Address: {}", address);
        info!("Account number: {}", info.account_number);
        info!("Sequence: {}", info.sequence);
        return Ok(());
    }

    let pipeline = TxPipeline::new(&config, gateway, wallet)?;
    let memo = cli.memo.as_str();

    let msg = match cli.command {
        Commands::InsertCoin { game_id, credits } => {
            ArcadeMsg::insert_coin(&address, &game_id, credits)
        }
        Commands::StartSession { game_id } => {
            let result = pipeline
                .submit(&[ArcadeMsg::start_session(&address, &game_id)], memo)
                .await?;
            report(&result);
            let session_id = pipeline.resolve_session_id(&game_id).await?;
            info!("Session id: {}", session_id);
            return Ok(());
        }
        Commands::SubmitScore {
            session_id,
            score,
            level,
        } => ArcadeMsg::submit_score(&address, session_id, score, level),
        Commands::UsePowerUp {
            session_id,
            power_up,
        } => ArcadeMsg::use_power_up(&address, session_id, &power_up),
        Commands::RegisterGame {
            game_id,
            name,
            credits_per_play,
        } => ArcadeMsg::register_game(&address, &game_id, &name, credits_per_play),
        Commands::ClaimAchievement {
            game_id,
            achievement_id,
        } => ArcadeMsg::claim_achievement(&address, &game_id, &achievement_id),
        Commands::SetInitials { game_id, initials } => {
            ArcadeMsg::set_high_score_initials(&address, &game_id, &initials)
        }
        Commands::Init { .. } | Commands::Account => unreachable!("handled above"),
    };

    let result = pipeline.submit(&[msg], memo).await?;
    report(&result);
    Ok(())
}

fn report(result: &BroadcastResult) {
    info!("Transaction accepted: {}", result.tx_hash);
}
