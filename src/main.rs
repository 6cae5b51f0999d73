//! Moneta main entry point

mod terminal;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use moneta_client::HttpGateway;
use moneta_config::Config;
use moneta_core::{
    Category, GatewayRef, LoginForm, Notifier, ProfileForm, RegisterForm, SessionApp, TransactionController,
    TransactionForm, TypeForm,
};
use moneta_utils::CurrencyMask;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::runtime::Runtime;

use terminal::{Section, TerminalRenderer};

#[derive(Parser, Debug)]
#[command(name = "moneta")]
#[command(version = "0.1.0")]
#[command(about = "Terminal client for a personal finance tracker", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Log in and keep the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in with it
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the session token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show balance totals
    Dashboard,
    /// List transactions
    List {
        /// income or expense
        #[arg(long)]
        category: Option<Category>,
        /// Only this transaction type (wins over --category)
        #[arg(long)]
        type_id: Option<i64>,
        /// Number of pages to show
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Record a transaction
    Add {
        #[arg(long)]
        type_id: i64,
        /// Amount as typed in the app, digits read as cents (e.g. 1.234,56)
        #[arg(long)]
        value: String,
    },
    /// Change a transaction
    Edit {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        type_id: Option<i64>,
        #[arg(long)]
        value: Option<String>,
    },
    /// Delete a transaction
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Manage transaction types
    Types {
        #[command(subcommand)]
        action: TypesAction,
    },
    /// Update name, email or password
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        confirm: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TypesAction {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: Category,
    },
    Edit {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<Category>,
    },
    Delete {
        #[arg(long)]
        id: i64,
    },
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    if let Command::InitConfig { force } = args.command {
        init_logging("info");
        if args.config.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", args.config.display());
        }
        std::fs::write(&args.config, Config::generate_default())
            .with_context(|| format!("Failed to write {}", args.config.display()))?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load_or_default(&args.config)
        .map_err(|e| anyhow::anyhow!("{}", e.to_details()))
        .context("Failed to load configuration")?;
    init_logging(&config.logging.level);
    log::info!("Config loaded: backend at {}", config.api.base_url);

    let runtime = Runtime::new()?;
    let ok = runtime.block_on(run(args.command, config))?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

type App = SessionApp<TerminalRenderer>;

const NOTHING: &[Section] = &[];
const USER: &[Section] = &[Section::User];
const DASHBOARD: &[Section] = &[Section::Dashboard];
const SESSION: &[Section] = &[Section::User, Section::Dashboard];
const LIST: &[Section] = &[Section::Dashboard, Section::Transactions];
const TYPES: &[Section] = &[Section::Types];

async fn run(command: Command, config: Config) -> anyhow::Result<bool> {
    let gateway: GatewayRef = Arc::new(HttpGateway::from_config(&config)?);
    let controller = TransactionController::new(gateway, config.pagination.page_size);
    let format = config.currency.money_format();
    let mask = CurrencyMask::new(format.clone());
    let mut app = SessionApp::new(
        controller,
        TerminalRenderer::default(),
        Notifier::new(config.notifications.clone()),
        format,
    );

    let (ok, sections) = match command {
        Command::Login { email, password } => (app.login(&LoginForm { email, password }).await, SESSION),
        Command::Register { name, email, password } => {
            (app.register(&RegisterForm { name, email, password }).await, SESSION)
        }
        Command::Logout => {
            app.logout();
            (true, NOTHING)
        }
        other => {
            start(&mut app).await?;
            session_command(&mut app, &mask, other).await?
        }
    };

    app.renderer().print(sections);
    Ok(ok)
}

/// Restore the stored session or stop
async fn start(app: &mut App) -> anyhow::Result<()> {
    app.start().await;
    if app.renderer().login_required() || app.controller().user().is_none() {
        bail!("Not logged in. Run `moneta login` first.");
    }
    Ok(())
}

fn parse_amount(mask: &CurrencyMask, raw: &str) -> rust_decimal::Decimal {
    log::debug!("Amount {:?} read as {}", raw, mask.format_currency_input(raw));
    mask.parse_currency_input(raw)
}

async fn session_command(
    app: &mut App,
    mask: &CurrencyMask,
    command: Command,
) -> anyhow::Result<(bool, &'static [Section])> {
    Ok(match command {
        Command::Whoami => (true, USER),
        Command::Dashboard => (true, DASHBOARD),
        Command::List {
            category,
            type_id,
            pages,
        } => {
            if category.is_some() {
                app.set_category(category);
            }
            if type_id.is_some() {
                app.set_transaction_type(type_id);
            }
            for _ in 1..pages {
                if app.load_more() == 0 {
                    break;
                }
            }
            (true, LIST)
        }
        Command::Add { type_id, value } => {
            let form = TransactionForm {
                id: None,
                transaction_type_id: Some(type_id),
                value: parse_amount(mask, &value),
            };
            (app.save_transaction(&form).await, LIST)
        }
        Command::Edit { id, type_id, value } => {
            let current = app.controller().get_transaction(id).await?;
            let value = match value {
                Some(raw) => parse_amount(mask, &raw),
                None => current.value,
            };
            println!("Editing #{}: {} -> {}", id, mask.input_from_value(current.value), mask.format().format_currency(value));
            let form = TransactionForm {
                id: Some(id),
                transaction_type_id: Some(type_id.unwrap_or(current.transaction_type_id)),
                value,
            };
            (app.save_transaction(&form).await, LIST)
        }
        Command::Delete { id } => (app.delete_transaction(id).await, LIST),
        Command::Types { action } => {
            let ok = match action {
                TypesAction::List => true,
                TypesAction::Add { name, category } => {
                    let form = TypeForm {
                        id: None,
                        name,
                        category: Some(category),
                    };
                    app.save_type(&form).await
                }
                TypesAction::Edit { id, name, category } => {
                    let current = app.controller().get_transaction_type(id).await?;
                    let form = TypeForm {
                        id: Some(id),
                        name: name.unwrap_or(current.name),
                        category: Some(category.unwrap_or(current.category)),
                    };
                    app.save_type(&form).await
                }
                TypesAction::Delete { id } => app.delete_type(id).await,
            };
            (ok, TYPES)
        }
        Command::Profile {
            name,
            email,
            password,
            confirm,
        } => {
            let user = app.controller().user().cloned().context("No user loaded")?;
            let form = ProfileForm {
                name: name.unwrap_or(user.name),
                email: email.unwrap_or(user.email),
                password: password.unwrap_or_default(),
                confirm_password: confirm.unwrap_or_default(),
            };
            (app.update_profile(&form).await, USER)
        }
        Command::InitConfig { .. } | Command::Login { .. } | Command::Register { .. } | Command::Logout => {
            bail!("command does not need a session")
        }
    })
}
