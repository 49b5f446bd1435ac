use anyhow::Context;
use clap::{Parser, Subcommand};
use rss_classifier::render::{render_articles, OutputFormat};
use rss_classifier::{
    default_sources, ArticleStore, FetchConfig, HttpFeedSource, LinearTextClassifier,
    LiveSourceSpec, RssClassifier, SqliteArticleStore, TitleClassifier,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rss-classifier", version, about = "Pull news feeds, label headlines, store and show them")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://articles.db", global = true)]
    database_url: String,

    #[arg(long, env = "RSS_VECTORIZER_PATH", default_value = "artifacts/vectorizer.json", global = true)]
    vectorizer: PathBuf,

    #[arg(long, env = "RSS_MODEL_PATH", default_value = "artifacts/model.json", global = true)]
    model: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pull every feed, store new articles, then show everything stored
    Refresh {
        /// Feed URL to pull; repeat for several. Defaults to the built-in list.
        #[arg(long = "feed")]
        feeds: Vec<String>,

        #[arg(long, default_value_t = 30)]
        timeout_seconds: u64,

        /// Extra attempts per feed after a failed fetch
        #[arg(long, default_value_t = 0)]
        max_retries: u32,
    },
    /// Show stored articles without fetching
    List,
    /// Print the label for a single headline
    Classify { title: String },
}

fn load_classifier(cli: &Cli) -> anyhow::Result<Arc<LinearTextClassifier>> {
    let classifier = LinearTextClassifier::load(&cli.vectorizer, &cli.model).with_context(|| {
        format!(
            "loading classifier artifacts {} and {}",
            cli.vectorizer.display(),
            cli.model.display()
        )
    })?;
    Ok(Arc::new(classifier))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Command::Classify { title } => {
            let classifier = load_classifier(&cli)?;
            writeln!(stdout, "{}", classifier.classify(title)?)?;
        }
        Command::List => {
            let store = SqliteArticleStore::new(&cli.database_url)
                .await
                .context("opening article store")?;
            let articles = store.list_all().await?;
            render_articles(&mut stdout, &articles, cli.format)?;
        }
        Command::Refresh {
            feeds,
            timeout_seconds,
            max_retries,
        } => {
            let classifier = load_classifier(&cli).map_err(|e| {
                error!("Classifier could not be loaded; refusing to run: {:#}", e);
                e
            })?;

            let store = SqliteArticleStore::new(&cli.database_url)
                .await
                .context("opening article store")?;

            let fetch_config = FetchConfig {
                timeout_seconds: *timeout_seconds,
                max_retries: *max_retries,
                ..FetchConfig::default()
            };
            let source = HttpFeedSource::new(fetch_config).context("building HTTP client")?;

            let sources: Vec<LiveSourceSpec> = if feeds.is_empty() {
                default_sources()
            } else {
                feeds.iter().map(LiveSourceSpec::new).collect()
            };

            info!("Refreshing {} feeds", sources.len());
            let app = RssClassifier::new(Box::new(source), classifier, Arc::new(store));
            let report = app.refresh(&sources).await?;

            render_articles(&mut stdout, &report.articles, cli.format)?;
        }
    }

    Ok(())
}
