//! CLI entry point for lambda-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lambda-blog")]
#[command(version)]
#[command(about = "A blog about functional programming, served from bundled and hosted posts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the blog server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// List posts or tags
    List {
        /// Type of content to list (post, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Print a post by slug or identifier
    Show {
        key: String,

        /// Print rendered HTML instead of markdown
        #[arg(long)]
        html: bool,
    },

    /// Sign in to the hosted backend
    Login {
        email: String,

        #[arg(long, env = "LAMBDA_BLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out of the hosted backend
    Logout,

    /// Publish a markdown file as a new post
    Publish {
        /// Title of the new post
        #[arg(short, long)]
        title: String,

        /// Markdown file holding the post body
        file: PathBuf,

        /// Featured image to upload
        #[arg(short, long)]
        image: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "lambda_blog=debug,tower_http=debug,info"
    } else {
        "lambda_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve { port, ip, open } => {
            let blog = lambda_blog::Blog::new(&base_dir).await?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            lambda_blog::server::start(&blog, &ip, port, open).await?;
        }

        Commands::List { r#type } => {
            let blog = lambda_blog::Blog::new(&base_dir).await?;
            lambda_blog::commands::list::run(&blog, &r#type).await?;
        }

        Commands::Show { key, html } => {
            let blog = lambda_blog::Blog::new(&base_dir).await?;
            lambda_blog::commands::show::run(&blog, &key, html).await?;
        }

        Commands::Login { email, password } => {
            let blog = lambda_blog::Blog::new(&base_dir).await?;
            lambda_blog::commands::session::login(&blog, &email, &password).await?;
        }

        Commands::Logout => {
            let blog = lambda_blog::Blog::new(&base_dir).await?;
            lambda_blog::commands::session::logout(&blog).await?;
        }

        Commands::Publish { title, file, image } => {
            let blog = lambda_blog::Blog::new(&base_dir).await?;
            tracing::info!("Publishing {:?}", file);
            lambda_blog::commands::publish::run(&blog, &title, &file, image.as_deref()).await?;
        }

        Commands::Version => {
            println!("lambda-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
