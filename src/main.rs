//! `handroyal` command line client.

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures_util::StreamExt;
use serde::Serialize;
use std::path::PathBuf;

use handroyal_client::account::AccountCreator;
use handroyal_client::actions::{parse_address, Action, CreateSessionParams};
use handroyal_client::config::{load_config, ClientConfig};
use handroyal_client::graphql::queries::subscriptions;
use handroyal_client::graphql::types::SessionState;
use handroyal_client::graphql::Tip;
use handroyal_client::observability::logging;
use handroyal_client::transaction::TxId;
use handroyal_client::{HandRoyalClient, Performed};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "handroyal")]
#[command(about = "Command line client for HandRoyal", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session storage file, used when the config sets none
    #[arg(short, long, default_value = "handroyal-session.json")]
    storage: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the local account
    #[command(subcommand)]
    Account(AccountCommand),
    /// Browse, create and join sessions
    #[command(subcommand)]
    Session(SessionCommand),
    /// Play a round
    #[command(subcommand)]
    Move(MoveCommand),
    /// Follow the chain tip
    #[command(subcommand)]
    Tip(TipCommand),
    /// Inspect transactions
    #[command(subcommand)]
    Tx(TxCommand),
}

#[derive(Subcommand)]
enum AccountCommand {
    /// Create a raw-key account, importing a key if given
    Create {
        #[arg(long)]
        private_key: Option<String>,
    },
    /// Restore the stored account
    Restore,
    /// Show the stored account and its user record
    Show,
    /// Forget the stored account
    Disconnect,
}

#[derive(Subcommand)]
enum SessionCommand {
    /// List sessions
    List {
        #[arg(long, value_enum)]
        state: Option<StateArg>,
    },
    /// Show one session
    Show { session_id: String },
    /// Create a session with a fresh id
    Create(CreateArgs),
    /// Join a session with the given gloves
    Join {
        session_id: String,
        #[arg(long = "glove", required = true)]
        gloves: Vec<String>,
    },
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    prize: Option<String>,
    #[arg(long, default_value_t = 8)]
    maximum_user: u32,
    #[arg(long, default_value_t = 2)]
    minimum_user: u32,
    #[arg(long, default_value_t = 1)]
    remaining_user: u32,
    #[arg(long, default_value_t = 100)]
    start_after: u64,
    #[arg(long, default_value_t = 5)]
    max_rounds: u32,
    #[arg(long, default_value_t = 10)]
    round_length: u64,
    #[arg(long, default_value_t = 5)]
    round_interval: u64,
    #[arg(long, default_value_t = 100)]
    initial_health_point: u32,
    #[arg(long, default_value_t = 5)]
    number_of_gloves: u32,
    /// Invite only these users
    #[arg(long = "user")]
    users: Vec<String>,
}

#[derive(Subcommand)]
enum MoveCommand {
    /// Submit the glove to play this round
    Submit { session_id: String, glove_index: u32 },
}

#[derive(Subcommand)]
enum TipCommand {
    /// Print tip changes as they are pushed
    Watch {
        /// Stop after this many tips
        #[arg(long)]
        count: Option<usize>,
    },
}

#[derive(Subcommand)]
enum TxCommand {
    /// Wait for a staged transaction to finish
    Wait { tx_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum StateArg {
    None,
    Ready,
    Active,
    Break,
    Ended,
}

impl From<StateArg> for SessionState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::None => SessionState::None,
            StateArg::Ready => SessionState::Ready,
            StateArg::Active => SessionState::Active,
            StateArg::Break => SessionState::Break,
            StateArg::Ended => SessionState::Ended,
        }
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if config.storage.path.is_none() {
        config.storage.path = Some(cli.storage.clone());
    }
    logging::init(&config.observability.log_level);

    let client = HandRoyalClient::new(config)?;

    match cli.command {
        Commands::Account(command) => account(&client, command).await?,
        Commands::Session(command) => session(&client, command).await?,
        Commands::Move(MoveCommand::Submit {
            session_id,
            glove_index,
        }) => {
            client.restore().await?;
            let action = Action::SubmitMove {
                session_id: parse_address(&session_id)?,
                glove_index,
            };
            perform(&client, action).await?;
        }
        Commands::Tip(TipCommand::Watch { count }) => {
            let channel = client.subscriptions().await?;
            let tips = channel.subscribe::<Tip>(subscriptions::on_tip_changed(), subscriptions::ON_TIP_CHANGED)?;
            let mut tips = tips.take(count.unwrap_or(usize::MAX));
            while let Some(tip) = tips.next().await {
                let tip = tip?;
                println!("{} {}", tip.height, tip.hash);
            }
        }
        Commands::Tx(TxCommand::Wait { tx_id }) => {
            let result = client.wait_for_transaction(&TxId::new(tx_id)).await?;
            println!("{} (block {:?})", result.status.as_str(), result.block_index);
        }
    }

    Ok(())
}

async fn account(client: &HandRoyalClient, command: AccountCommand) -> CliResult<()> {
    match command {
        AccountCommand::Create { private_key } => {
            let account = client.creators().raw_key.create(private_key).await?;
            println!("{}", account.address()?);
        }
        AccountCommand::Restore => {
            let account = client.restore().await?;
            println!("{} {}", account.kind(), account.address()?);
        }
        AccountCommand::Show => {
            let account = client.restore().await?;
            println!("kind:    {}", account.kind());
            println!("address: {}", account.address()?);
            match client.me().await? {
                Some(user) => print_json(&user)?,
                None => println!("user:    not registered"),
            }
        }
        AccountCommand::Disconnect => {
            if let Err(e) = client.restore().await {
                eprintln!("Warning: could not restore the stored account: {}", e);
                client.store().forget_accounts()?;
            }
            client.logout().await?;
            println!("disconnected");
        }
    }
    Ok(())
}

async fn session(client: &HandRoyalClient, command: SessionCommand) -> CliResult<()> {
    match command {
        SessionCommand::List { state } => {
            let sessions = client.sessions(state.map(Into::into)).await?;
            print_json(&sessions)?;
        }
        SessionCommand::Show { session_id } => match client.session(parse_address(&session_id)?).await? {
            Some(session) => print_json(&session)?,
            None => eprintln!("Error: session {} not found", session_id),
        },
        SessionCommand::Create(args) => {
            client.restore().await?;
            let params = CreateSessionParams {
                prize: match &args.prize {
                    Some(prize) => parse_address(prize)?,
                    None => Address::ZERO,
                },
                maximum_user: args.maximum_user,
                minimum_user: args.minimum_user,
                remaining_user: args.remaining_user,
                start_after: args.start_after,
                max_rounds: args.max_rounds,
                round_length: args.round_length,
                round_interval: args.round_interval,
                initial_health_point: args.initial_health_point,
                number_of_gloves: args.number_of_gloves,
                users: args
                    .users
                    .iter()
                    .map(|u| parse_address(u))
                    .collect::<Result<_, _>>()?,
                // Replaced by a fresh id once the parameters check out.
                ..CreateSessionParams::open(Address::ZERO)
            };
            let (session_id, performed) = client.create_session(params).await?;
            println!("session: {}", session_id);
            report(&performed)?;
        }
        SessionCommand::Join { session_id, gloves } => {
            client.restore().await?;
            let action = Action::JoinSession {
                session_id: parse_address(&session_id)?,
                gloves: gloves
                    .iter()
                    .map(|g| parse_address(g))
                    .collect::<Result<_, _>>()?,
            };
            perform(client, action).await?;
        }
    }
    Ok(())
}

async fn perform(client: &HandRoyalClient, action: Action) -> CliResult<()> {
    let performed = client.perform(action).await?;
    report(&performed)
}

fn report(performed: &Performed) -> CliResult<()> {
    match (&performed.outcome.tx_id, &performed.result) {
        (Some(tx_id), Some(result)) => {
            println!("tx:      {}", tx_id);
            println!("status:  {}", result.status.as_str());
        }
        _ => print_json(&performed.outcome.data)?,
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
