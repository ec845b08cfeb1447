use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use lunch_ledger::{
    api::{self, AppState},
    client::{
        Client,
        batch::pay_all,
        dashboard::{load_employee_snapshot, load_snapshot},
    },
    config::{
        AppConfig,
        database::{create_connection, create_tables},
        load_app_configuration,
        menu::seed_menu,
    },
    core::{
        format::{format_display_date, format_vnd},
        report::{Summary, SummaryOptions},
    },
};
use std::error::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type CliResult = std::result::Result<(), Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "lunch-ledger")]
#[command(about = "Lunch expense ledger: API server and dashboard tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (the default)
    Serve,
    /// Print the dashboard of a running server
    Summary(SummaryArgs),
    /// Mark every open charge of one employee as paid
    PayAll(PayAllArgs),
}

#[derive(Args, Debug)]
struct Remote {
    /// Base URL of the API
    #[arg(long, env = "LUNCH_API_URL", default_value = "http://127.0.0.1:3000")]
    url: String,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[command(flatten)]
    remote: Remote,
    /// Length of the top debtors / collectors lists
    #[arg(long)]
    top: Option<usize>,
}

#[derive(Args, Debug)]
struct PayAllArgs {
    #[command(flatten)]
    remote: Remote,
    /// Employee whose charges are settled
    employee_id: String,
}

#[tokio::main]
async fn main() -> CliResult {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load the main application configuration
    let app_config = load_app_configuration()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(app_config).await,
        Command::Summary(args) => print_summary(&app_config, args).await,
        Command::PayAll(args) => settle(args).await,
    }
}

async fn serve(app_config: AppConfig) -> CliResult {
    let db = create_connection(&app_config.database.url)
        .await
        .inspect(|_| info!("Database connected"))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db).await?;
    seed_menu(&db, &app_config.menu).await?;

    api::run(AppState::new(db, app_config)).await?;
    Ok(())
}

async fn print_summary(app_config: &AppConfig, args: SummaryArgs) -> CliResult {
    let client = Client::new(&args.remote.url)?;
    let options = SummaryOptions {
        top_n: args.top.unwrap_or(app_config.report.top_n),
        offset: app_config.report.offset()?,
    };
    let summary = load_snapshot(&client).await.summary(&options);
    render_summary(&summary);
    Ok(())
}

fn render_summary(summary: &Summary) {
    println!(
        "Total {}  received {}  debt {}  ({} transactions)",
        format_vnd(summary.total_amount),
        format_vnd(summary.total_received),
        format_vnd(summary.total_debt),
        summary.transaction_count,
    );

    println!("\nTop debtors");
    for stat in &summary.top_debtors {
        println!("  {:<24} {:>14}", stat.name, format_vnd(stat.debt));
    }

    println!("\nTop collectors");
    for stat in &summary.top_collectors {
        println!("  {:<24} {:>14}", stat.name, format_vnd(stat.received));
    }

    println!("\nDaily totals");
    for day in &summary.daily_totals {
        println!(
            "  {}   {:>14}",
            format_display_date(day.date),
            format_vnd(day.total)
        );
    }
}

async fn settle(args: PayAllArgs) -> CliResult {
    let client = Client::new(&args.remote.url)?;
    let snapshot = load_employee_snapshot(&client, &args.employee_id).await;
    let report = pay_all(&client, &args.employee_id, &snapshot.transactions).await;

    println!("Settled {} charge(s)", report.succeeded.len());
    for (id, err) in &report.failed {
        println!("  {id}: {err}");
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(format!("{} update(s) failed", report.failed.len()).into())
    }
}
