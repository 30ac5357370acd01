use anyhow::Result;
use clap::{Parser, Subcommand};
use intranet_backend::db::{QueryBuilder, UserCreate};
use intranet_backend::types::DepartmentSlug;
use intranet_backend::{
    AppState, AuthConfig, DatabaseConfig, Role, SessionAuthenticator, UserStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "intranet-backend")]
#[command(about = "Intranet backend: session auth, announcements, courses, directory")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST server
    Server {
        /// Bind address for the HTTP API
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, default_value = "memory")]
        db_url: String,
        /// HS256 secret used to sign session tokens
        #[arg(long, env = "INTRANET_SIGNING_SECRET")]
        signing_secret: String,
        /// Session token lifetime in minutes
        #[arg(long, default_value_t = 60)]
        token_ttl_minutes: u64,
        /// Argon2 iteration count for password hashing
        #[arg(long, default_value_t = 2)]
        hash_time_cost: u32,
    },
    /// Initialize the database schema
    Init {
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
    /// Create a user account
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// employee, manager or admin
        #[arg(long, default_value = "employee")]
        role: Role,
        /// Department slug, e.g. "fiscal"
        #[arg(long)]
        department: Option<String>,
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("intranet_backend=info".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server {
            bind,
            db_url,
            signing_secret,
            token_ttl_minutes,
            hash_time_cost,
        } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url: {}", db_config.url);

            let db = intranet_backend::create_connection(db_config).await?;
            intranet_backend::ensure_schema(&db).await?;

            let auth_config = AuthConfig {
                signing_secret,
                token_ttl: Duration::from_secs(token_ttl_minutes * 60),
                hash_time_cost,
            };
            let auth = SessionAuthenticator::new(&auth_config, UserStore::new(db.clone()));

            let app = intranet_backend::create_router(AppState {
                db,
                auth: Arc::new(auth),
            });

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("Server listening on http://{}", bind);
            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = intranet_backend::create_connection(db_config).await?;
            intranet_backend::ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::CreateUser {
            email,
            password,
            first_name,
            last_name,
            role,
            department,
            db_url,
        } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = intranet_backend::create_connection(db_config).await?;
            intranet_backend::ensure_schema(&db).await?;

            let hasher = intranet_backend::PasswordHasher::new();
            let password_hash = hasher.hash(&password)?;

            let created = QueryBuilder::create_user(
                &db,
                &UserCreate {
                    first_name,
                    last_name,
                    email,
                    password_hash: Some(password_hash),
                    role,
                    department: department.map(DepartmentSlug::new),
                    avatar_url: None,
                    bio: None,
                },
            )
            .await?;

            println!("User created successfully!");
            println!();
            println!("  Id:    {}", created.id);
            println!("  Email: {}", created.email);
            println!("  Role:  {}", created.role);
        }
    }

    Ok(())
}
