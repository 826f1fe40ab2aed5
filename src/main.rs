use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use uuid::Uuid;

use soteria_cli::api::{
    AccessType, Account, Credential, RuleSpec, SoteriaClient, UserType,
};
use soteria_cli::config::Profile;
use soteria_cli::{duration, utils};

#[derive(Parser)]
#[command(name = "soteria", version, about = "Account administration for the soteria auth service")]
struct AppCli {
    /// Service base URL, e.g. https://soteria.example.com
    #[arg(short, long, global = true, env = "SOTERIA_BASE")]
    base: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "SOTERIA_TIMEOUT")]
    timeout: Option<u64>,

    /// JSON profile holding the base URL and timeout
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Account credentials, shared by every authenticated subcommand.
#[derive(Args)]
struct Login {
    /// Account username, e.g. driver
    #[arg(short, long)]
    username: String,

    /// Account password
    #[arg(short, long)]
    password: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Access {
    Sub,
    Pub,
    Pubsub,
}

impl From<Access> for AccessType {
    fn from(value: Access) -> Self {
        match value {
            Access::Sub => AccessType::Sub,
            Access::Pub => AccessType::Pub,
            Access::Pubsub => AccessType::PubSub,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Herald,
    Emq,
    Staff,
}

impl From<Kind> for UserType {
    fn from(value: Kind) -> Self {
        match value {
            Kind::Herald => UserType::Herald,
            Kind::Emq => UserType::Emq,
            Kind::Staff => UserType::Staff,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print an account
    Show {
        #[command(flatten)]
        login: Login,
    },
    /// Create an account
    New {
        #[command(flatten)]
        login: Login,
        /// Account class
        #[arg(short = 't', long = "user-type", value_enum)]
        user_type: Kind,
    },
    /// Delete an account
    Remove {
        #[command(flatten)]
        login: Login,
    },
    /// Replace the secret used for token minting
    SetSecret {
        #[command(flatten)]
        login: Login,
        /// New secret, distinct from the password
        #[arg(short, long)]
        secret: String,
    },
    /// Set the token expiration, e.g. 1h30m
    SetExpire {
        #[command(flatten)]
        login: Login,
        /// Lifetime of minted tokens
        #[arg(short, long)]
        expire: String,
    },
    /// Change the account password
    SetPassword {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        new_password: String,
    },
    /// Manage pub/sub ACL rules
    Rule {
        #[command(subcommand)]
        action: RuleCommands,
    },
    /// Mint an access token from an account secret
    Token {
        /// Client id (the account username)
        #[arg(short, long)]
        username: String,
        /// Account secret
        #[arg(short, long)]
        secret: String,
        #[arg(short, long, value_enum)]
        grant_type: Access,
    },
    /// Probe the auth endpoint with a token or a username/password pair
    Auth {
        #[arg(long, conflicts_with_all = ["username", "password"])]
        token: Option<String>,
        #[arg(short, long, requires = "password")]
        username: Option<String>,
        #[arg(short, long, requires = "username")]
        password: Option<String>,
    },
    /// Probe the acl endpoint with a raw broker topic
    Acl {
        #[arg(long)]
        token: String,
        #[arg(short, long, value_enum)]
        access: Access,
        /// Raw topic, e.g. snapp/driver/1234/location
        #[arg(short, long)]
        topic: String,
    },
    /// Broker credential store
    Emq {
        #[command(subcommand)]
        action: EmqCommands,
    },
}

#[derive(Subcommand)]
enum RuleCommands {
    /// Add a rule to an account
    Add {
        #[command(flatten)]
        login: Login,
        /// Named topic class defined by the service, e.g. driver_location
        #[arg(short, long)]
        topic: String,
        #[arg(short, long, value_enum)]
        access: Access,
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Show a single rule
    Show {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        uuid: Uuid,
    },
    /// Replace a rule's topic, access type and endpoint
    Update {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        uuid: Uuid,
        #[arg(short, long)]
        topic: String,
        #[arg(short, long, value_enum)]
        access: Access,
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Delete a rule
    Remove {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        uuid: Uuid,
    },
}

#[derive(Subcommand)]
enum EmqCommands {
    /// Store a broker user
    New {
        #[command(flatten)]
        login: Login,
        /// Credential lifetime in seconds
        #[arg(short, long)]
        duration: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::logging::init();

    let args = AppCli::parse();

    let profile = match &args.profile {
        Some(path) => Profile::from_file(path)?,
        None => Profile::default(),
    };
    let base = args
        .base
        .or(profile.base)
        .context("no base URL; pass --base, set SOTERIA_BASE, or use a profile")?;
    let timeout = args.timeout.or(profile.timeout_secs).unwrap_or(10);

    let client = SoteriaClient::with_timeout(&base, Duration::from_secs(timeout))?;
    run(args.command, &client).await
}

async fn run(command: Commands, client: &SoteriaClient) -> Result<()> {
    match command {
        Commands::Show { login } => {
            let account = client.account(&login.username, &login.password).await?;
            println!("{}", serde_json::to_string_pretty(&display_account(&account)?)?);
        }
        Commands::New { login, user_type } => {
            client
                .create_account(&login.username, &login.password, user_type.into())
                .await?;
            println!("ok");
        }
        Commands::Remove { login } => {
            client
                .delete_account(&login.username, &login.password)
                .await?;
            println!("ok");
        }
        Commands::SetSecret { login, secret } => {
            client
                .set_secret(&login.username, &login.password, &secret)
                .await?;
            println!("ok");
        }
        Commands::SetExpire { login, expire } => {
            let nanos = duration::parse(&expire)
                .with_context(|| format!("invalid expiration {expire:?}"))?;
            client
                .set_token_expiration(&login.username, &login.password, nanos)
                .await?;
            println!("ok");
        }
        Commands::SetPassword {
            login,
            new_password,
        } => {
            client
                .set_password(&login.username, &login.password, &new_password)
                .await?;
            println!("ok");
        }
        Commands::Rule { action } => run_rule(action, client).await?,
        Commands::Token {
            username,
            secret,
            grant_type,
        } => {
            let token = client.token(&username, &secret, grant_type.into()).await?;
            println!("{token}");
        }
        Commands::Auth {
            token,
            username,
            password,
        } => {
            let credential = match (token, username, password) {
                (Some(token), _, _) => Credential::Token(token),
                (None, Some(username), Some(password)) => {
                    Credential::Login { username, password }
                }
                _ => anyhow::bail!("pass --token or both --username and --password"),
            };
            client.check_auth(&credential).await?;
            println!("ok");
        }
        Commands::Acl {
            token,
            access,
            topic,
        } => {
            client.check_acl(&token, access.into(), &topic).await?;
            println!("ok");
        }
        Commands::Emq { action } => match action {
            EmqCommands::New { login, duration } => {
                client
                    .store_emq_user(&login.username, &login.password, duration)
                    .await?;
                println!("ok");
            }
        },
    }

    Ok(())
}

async fn run_rule(action: RuleCommands, client: &SoteriaClient) -> Result<()> {
    match action {
        RuleCommands::Add {
            login,
            topic,
            access,
            endpoint,
        } => {
            let spec = RuleSpec {
                endpoint,
                topic,
                access_type: access.into(),
            };
            let rule = client
                .create_rule(&login.username, &login.password, &spec)
                .await?;
            println!("{}", serde_json::to_string_pretty(&rule)?);
        }
        RuleCommands::Show { login, uuid } => {
            let rule = client.rule(&login.username, &login.password, uuid).await?;
            println!("{}", serde_json::to_string_pretty(&rule)?);
        }
        RuleCommands::Update {
            login,
            uuid,
            topic,
            access,
            endpoint,
        } => {
            let spec = RuleSpec {
                endpoint,
                topic,
                access_type: access.into(),
            };
            client
                .update_rule(&login.username, &login.password, uuid, &spec)
                .await?;
            println!("ok");
        }
        RuleCommands::Remove { login, uuid } => {
            client
                .delete_rule(&login.username, &login.password, uuid)
                .await?;
            println!("ok");
        }
    }
    Ok(())
}

/// Account as printed: expiration humanized instead of raw nanoseconds.
fn display_account(account: &Account) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(account)?;
    let expire = account.token_expiration_duration;
    value["token_expiration_duration"] = if expire == 0 {
        json!("default")
    } else {
        json!(duration::format(expire))
    };
    Ok(value)
}
