#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use activity_board::{api, config, page, timer};

    use anyhow::{Context, Result};
    use clap::{Parser, Subcommand};
    use tracing::info;

    use chrono::Local;
    use std::fs;
    use std::rc::Rc;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    use api::ActivitiesClient;
    use config::BoardConfig;
    use page::{Headless, PageController};
    use timer::ManualScheduler;

    #[derive(Parser)]
    #[command(name = "activity_board")]
    #[command(about = "Headless driver for the activities signup page", long_about = None)]
    struct Cli {
        #[command(subcommand)]
        command: Commands,

        /// Path to config file
        #[arg(short, long, value_name = "FILE", global = true)]
        config: Option<String>,

        /// Server base URL, overrides the config file
        #[arg(long, value_name = "URL", global = true)]
        base_url: Option<String>,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Create a config template
        CreateConfig {
            #[arg(short, long, default_value = "config.json")]
            output: String,
        },
        /// Sync once and print the rendered page
        Render,
        /// Submit the signup form
        Signup {
            #[arg(short, long)]
            activity: String,
            #[arg(short, long)]
            email: String,
        },
        /// Click a participant's unregister control
        Unregister {
            #[arg(short, long)]
            activity: String,
            #[arg(short, long)]
            email: String,
        },
    }

    fn init_tracing(config: &BoardConfig) -> Result<()> {
        let log_dir = std::path::PathBuf::from(&config.logs.path);
        fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log dir: {}", log_dir.display()))?;

        let log_file = log_dir.join(format!(
            "activity_board_{}.log",
            Local::now().format("%Y%m%d")
        ));

        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // Console goes to stderr so rendered HTML on stdout stays clean
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact();

        let file_layer = fmt::layer()
            .with_writer(std::sync::Arc::new(file))
            .with_target(true)
            .with_ansi(false)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        Ok(())
    }

    fn load_config(path: Option<&str>, base_url: Option<String>) -> Result<BoardConfig> {
        let mut config = match path {
            Some(path) => BoardConfig::load(path)?,
            None => BoardConfig::default(),
        };
        if let Some(base_url) = base_url {
            config.server.base_url = base_url;
        }
        Ok(config)
    }

    pub async fn run() -> Result<()> {
        let cli = Cli::parse();

        let command = match cli.command {
            Commands::CreateConfig { output } => {
                config::create_config_template(&output)?;
                println!("Config template created at {}", output);
                return Ok(());
            }
            command => command,
        };

        let config = load_config(cli.config.as_deref(), cli.base_url)?;
        init_tracing(&config)?;

        info!("Using server {}", config.server.base_url);
        let client = ActivitiesClient::new(&config.server.base_url)
            .with_context(|| format!("Invalid base URL: {}", config.server.base_url))?;

        let scheduler = Rc::new(ManualScheduler::new());
        let controller = PageController::new(
            client,
            Rc::new(Headless),
            scheduler.clone(),
            config.message.hide_after(),
        );

        controller.sync().await;

        match command {
            Commands::CreateConfig { .. } | Commands::Render => {}
            Commands::Signup { activity, email } => {
                controller.fill_form(&activity, &email);
                controller.submit().await;
            }
            Commands::Unregister { activity, email } => {
                controller.unregister(&activity, &email).await;
            }
        }

        {
            let document = controller.document();
            if document.message.is_visible() {
                eprintln!("{}", document.message.text());
            }
            println!("{}", document.to_html());
        }

        // Let pending banner timers run so the log shows the full lifecycle
        scheduler.run_all();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
