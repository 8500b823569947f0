use clap::{Parser, Subcommand};
use morningrise::auth::SignUpForm;
use morningrise::models::{InterfaceMode, NotificationKind, SleepInput, TaskKey, ThemeColor};
use morningrise::{App, ClientConfig, ClientError, ui};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "morningrise", version, about = "MorningRise habit tracker client")]
struct Cli {
    /// Backend base URL; overrides MORNINGRISE_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session file; overrides MORNINGRISE_SESSION_PATH.
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session
    Signin {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show today's checklist, mood, intention and sleep
    #[command(alias = "d")]
    Dashboard,
    /// Flip one checklist task (hydrate, meditate, stretch_move)
    Toggle { task: TaskKey },
    /// Record today's mood, 1 (great) to 5 (awful)
    Mood {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        value: u8,
    },
    Intention { text: String },
    /// Log last night's sleep in hours
    Sleep {
        #[arg(long)]
        total: String,
        #[arg(long)]
        deep: Option<String>,
        #[arg(long)]
        rem: Option<String>,
    },
    /// Show the weekly review
    #[command(alias = "w")]
    Weekly,
    /// Ask the server to generate this week's report
    Report,
    Settings,
    /// Turn a notification on or off
    Notify {
        kind: NotificationKind,
        #[arg(value_parser = parse_switch, action = clap::ArgAction::Set)]
        enabled: bool,
    },
    Theme { color: ThemeColor },
    Mode { mode: InterfaceMode },
    /// Update profile name and/or phone
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url);
    }
    if let Some(path) = cli.session.clone() {
        config = config.with_session_path(path);
    }

    let app = App::open(&config).await;
    if let Err(err) = run(&app, cli.command).await {
        error!(route = %app.route(), "command failed: {err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(app: &App, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Signin { email, password } => {
            let session = app.auth().sign_in(&email, &password).await?;
            println!("Signed in as {}", session.user.name);
        }
        Command::Signup {
            name,
            email,
            phone,
            password,
        } => {
            let form = SignUpForm {
                name,
                email,
                phone,
                password,
            };
            let session = app.auth().sign_up(form).await?;
            println!("Welcome, {}!", session.user.name);
        }
        Command::Logout => {
            app.auth().logout().await?;
            println!("Signed out");
        }
        Command::Dashboard => {
            app.dashboard().refresh().await?;
            print_dashboard(app).await;
        }
        Command::Toggle { task } => {
            let dashboard = app.dashboard();
            dashboard.refresh().await?;
            dashboard.toggle_task(task).await?;
            print_dashboard(app).await;
        }
        Command::Mood { value } => {
            let dashboard = app.dashboard();
            dashboard.refresh().await?;
            dashboard.select_mood(value - 1).await?;
            print_dashboard(app).await;
        }
        Command::Intention { text } => {
            let dashboard = app.dashboard();
            dashboard.set_intention(text).await;
            dashboard.save_intention().await?;
            println!("Intention saved");
        }
        Command::Sleep { total, deep, rem } => {
            let input = SleepInput::from_fields(
                &total,
                deep.as_deref().unwrap_or_default(),
                rem.as_deref().unwrap_or_default(),
            )?;
            let saved = app.dashboard().save_sleep(input).await?;
            println!("Sleep saved: {:.1}h", saved.total_hours);
        }
        Command::Weekly => {
            let weekly = app.weekly();
            weekly.refresh().await?;
            print!("{}", ui::render_weekly(&weekly.view().await));
        }
        Command::Report => {
            let message = app.weekly().generate_report().await?;
            println!("{message}");
        }
        Command::Settings => {
            let settings = app.settings();
            settings.refresh().await?;
            print!("{}", ui::render_settings(&settings.state().await));
        }
        Command::Notify { kind, enabled } => {
            let settings = app.settings();
            settings.refresh().await?;
            settings.set_notification(kind, enabled).await?;
            print!("{}", ui::render_settings(&settings.state().await));
        }
        Command::Theme { color } => {
            let settings = app.settings();
            settings.refresh().await?;
            settings.change_theme(color).await?;
            print!("{}", ui::render_settings(&settings.state().await));
        }
        Command::Mode { mode } => {
            let settings = app.settings();
            settings.refresh().await?;
            settings.change_interface_mode(mode).await?;
            print!("{}", ui::render_settings(&settings.state().await));
        }
        Command::Profile { name, phone } => {
            let settings = app.settings();
            settings.refresh().await?;
            if let Some(name) = name {
                settings.edit_name(name).await;
            }
            if let Some(phone) = phone {
                settings.edit_phone(phone).await;
            }
            settings.save_profile().await?;
            print!("{}", ui::render_settings(&settings.state().await));
        }
    }
    Ok(())
}

async fn print_dashboard(app: &App) {
    let user = app.context().session.current().map(|session| session.user);
    let view = app.dashboard().view().await;
    print!("{}", ui::render_dashboard(user.as_ref(), &view));
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(format!("expected on or off, got '{other}'")),
    }
}
