use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use studio_cms::{
    error::AppError,
    models::ROLE_SUPERADMIN,
    repository::{PostgresRepository, Repository},
    seed::{self, SeedReport},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "studio-seed", author, version, about = "Provisions the studio CMS database.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct AdminArgs {
    #[arg(long, env = "SEED_ADMIN_USERNAME", default_value = "AdminN0lder")]
    username: String,
    #[arg(long, env = "SEED_ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// `admin` or `superadmin`.
    #[arg(long, env = "SEED_ADMIN_ROLE", default_value = ROLE_SUPERADMIN)]
    role: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or refresh the admin account.
    Admin(AdminArgs),
    /// Default divisions.
    Divisions,
    /// Default film genres.
    Genres,
    /// Default article categories.
    Categories,
    /// One sample row per public section, owned by an existing admin.
    Samples {
        #[arg(long, env = "SEED_ADMIN_USERNAME", default_value = "AdminN0lder")]
        username: String,
    },
    /// Admin, reference data and samples.
    All(AdminArgs),
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_cms=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_url = std::env::var("DATABASE_URL").expect("FATAL: DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Database migrations failed.");

    let repo = PostgresRepository::new(pool);

    if let Err(e) = run(&repo, cli.command).await {
        eprintln!("Seeding failed: {e}");
        std::process::exit(1);
    }
}

async fn run(repo: &dyn Repository, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Admin(args) => {
            provision_admin(repo, &args).await?;
        }
        Commands::Divisions => print_report(&seed::seed_divisions(repo).await?),
        Commands::Genres => print_report(&seed::seed_genres(repo).await?),
        Commands::Categories => print_report(&seed::seed_categories(repo).await?),
        Commands::Samples { username } => {
            let admin = repo.find_admin_by_username(&username).await?.ok_or_else(|| {
                AppError::NotFound(format!(
                    "Admin '{username}' not found; run `studio-seed admin` first"
                ))
            })?;
            print_report(&seed::seed_samples(repo, admin.id).await?);
        }
        Commands::All(args) => {
            let admin_id = provision_admin(repo, &args).await?;
            print_report(&seed::seed_all(repo, admin_id).await?);
        }
    }
    Ok(())
}

async fn provision_admin(repo: &dyn Repository, args: &AdminArgs) -> Result<uuid::Uuid, AppError> {
    let password = args.password.as_deref().ok_or_else(|| {
        AppError::Validation("--password (or SEED_ADMIN_PASSWORD) is required".to_string())
    })?;
    let admin = seed::seed_admin(repo, &args.username, password, &args.role).await?;
    println!("Admin '{}' ready ({})", admin.username, admin.role);
    Ok(admin.id)
}

fn print_report(report: &SeedReport) {
    for item in &report.created {
        println!("  created  {item}");
    }
    for item in &report.skipped {
        println!("  skipped  {item}");
    }
    println!(
        "{} created, {} already present",
        report.created.len(),
        report.skipped.len()
    );
}
