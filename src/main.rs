//! Pantry client - manage pantries and follow proactive meal suggestions.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pantry_client::api::MealWindow;
use pantry_client::commands::{self, AddItemArgs, CommandError, Context, LoginArgs, RegisterArgs};
use pantry_client::display;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WindowArg {
    Breakfast,
    Lunch,
    EveningSnack,
    Dinner,
}

impl From<WindowArg> for MealWindow {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Breakfast => MealWindow::Breakfast,
            WindowArg::Lunch => MealWindow::Lunch,
            WindowArg::EveningSnack => MealWindow::EveningSnack,
            WindowArg::Dinner => MealWindow::Dinner,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "pantry",
    about = "Manage pantries and follow proactive meal suggestions",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a config file (defaults to .pantry-client.toml, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the bearer token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Token to store if the service does not issue one.
        #[arg(long)]
        token: Option<String>,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored token.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// List pantries.
    Pantries,
    /// Create a pantry.
    CreatePantry {
        /// Nickname of the new pantry.
        nickname: String,
    },
    /// List the items in a pantry.
    Items {
        pantry_id: i64,
    },
    /// Add an item to a pantry.
    AddItem {
        pantry_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long, default_value_t = 1.0)]
        quantity: f64,
        #[arg(long)]
        unit: Option<String>,
        /// Purchase date (YYYY-MM-DD), today by default.
        #[arg(long)]
        purchased: Option<NaiveDate>,
    },
    /// Suggest recipes built around the given pantry item ids.
    Suggest {
        #[arg(required = true)]
        item_ids: Vec<i64>,
        /// Confirm the recipe at this position (1-based).
        #[arg(long)]
        pick: Option<usize>,
    },
    /// Show proactive meal suggestions.
    Meals {
        /// Only fetch the latest suggestions for this window.
        #[arg(long, value_enum)]
        window: Option<WindowArg>,
        /// Show ingredients and steps.
        #[arg(long)]
        detailed: bool,
    },
    /// Confirm a proactive suggestion.
    Cook {
        #[arg(long, value_enum)]
        window: WindowArg,
        /// Position of the recipe within the window (1-based).
        #[arg(long, default_value_t = 1)]
        index: usize,
    },
    /// Follow proactive suggestions live until interrupted.
    Watch {
        /// Show ingredients and steps.
        #[arg(long)]
        detailed: bool,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(ctx: &Context, command: Commands) -> Result<(), CommandError> {
    match command {
        Commands::Login {
            email,
            password,
            token,
        } => {
            commands::login(
                ctx,
                LoginArgs {
                    email,
                    password,
                    token,
                },
            )
            .await?;
        }
        Commands::Register {
            email,
            first_name,
            last_name,
            password,
        } => {
            commands::register(
                ctx,
                RegisterArgs {
                    email,
                    first_name,
                    last_name,
                    password,
                },
            )
            .await?;
        }
        Commands::Logout => commands::logout(ctx)?,
        Commands::Whoami => {
            commands::whoami(ctx).await?;
        }
        Commands::Pantries => {
            commands::pantries(ctx).await?;
        }
        Commands::CreatePantry { nickname } => {
            commands::create_pantry(ctx, &nickname).await?;
        }
        Commands::Items { pantry_id } => {
            commands::items(ctx, pantry_id).await?;
        }
        Commands::AddItem {
            pantry_id,
            name,
            brand,
            quantity,
            unit,
            purchased,
        } => {
            commands::add_item(
                ctx,
                AddItemArgs {
                    pantry_id,
                    name,
                    brand,
                    quantity,
                    unit,
                    purchased,
                },
            )
            .await?;
        }
        Commands::Suggest { item_ids, pick } => {
            commands::suggest(ctx, item_ids, pick).await?;
        }
        Commands::Meals { window, detailed } => {
            commands::meals(ctx, window.map(MealWindow::from), detailed).await?;
        }
        Commands::Cook { window, index } => {
            commands::cook(ctx, window.into(), index).await?;
        }
        Commands::Watch { detailed } => {
            let shutdown = CancellationToken::new();
            let trigger = shutdown.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("Interrupted, closing push channel");
                        trigger.cancel();
                    }
                    Err(e) => tracing::warn!(error = %e, "Cannot listen for Ctrl-C"),
                }
            });
            commands::watch(ctx, detailed, shutdown).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = match Context::load(cli.config, cli.api_url) {
        Ok(ctx) => ctx,
        Err(e) => {
            display::print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(api = %ctx.config.api_base_url, "Loaded configuration");

    match run(&ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
