use anyhow::Context;
use clap::{Parser, Subcommand};
use pricetarget_core::domain::model::ClusterModel;
use pricetarget_core::ingest::feed::HttpFeedClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod feed;
mod score;

#[derive(Debug, Parser)]
#[command(name = "pricetarget_worker")]
struct Args {
    /// Model location (file path or http(s) URL). Defaults to CENTROIDS_PATH.
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate the cluster model.
    CheckModel,
    /// Score a stock record stored as JSON.
    Score {
        #[arg(long)]
        record: PathBuf,
        /// Pin "now" (RFC 3339) instead of reading the wall clock.
        #[arg(long)]
        now: Option<String>,
    },
    /// Score a stock from the database (first row when no id is given).
    ScoreDb {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        now: Option<String>,
    },
    /// Download every page of the price-target feed into a JSON file.
    FetchFeed {
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        max_pages: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = pricetarget_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(&settings, args).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "worker run failed");
    }
    result
}

async fn load_model(
    settings: &pricetarget_core::config::Settings,
    location: Option<&str>,
) -> anyhow::Result<Arc<ClusterModel>> {
    let source = match location {
        Some(location) => pricetarget_core::model::source_from_location(location)?,
        None => pricetarget_core::model::source_from_settings(settings)?,
    };
    Ok(Arc::new(pricetarget_core::model::load_model(source.as_ref()).await?))
}

async fn run(settings: &pricetarget_core::config::Settings, args: Args) -> anyhow::Result<()> {
    let location = args.model.as_deref();

    match args.command {
        Command::FetchFeed { out, max_pages } => {
            let client = HttpFeedClient::from_settings(settings)?;
            let n = feed::fetch_feed_to_file(&client, &out, max_pages).await?;
            tracing::info!(records = n, out = %out.display(), "feed written");
        }
        Command::CheckModel => {
            let model = load_model(settings, location).await?;
            for (idx, centroid) in model.centroids().iter().enumerate() {
                let outcome = model.avg_outcomes().and_then(|o| o.get(idx)).copied();
                tracing::info!(cluster = idx, ?centroid, ?outcome, "centroid");
            }
            tracing::info!(
                k = model.k(),
                means = ?model.means(),
                stds = ?model.stds(),
                "cluster model ok"
            );
        }
        Command::Score { record, now } => {
            let model = load_model(settings, location).await?;
            let stock = score::read_record(&record)?;
            let clock = score::clock_for(now.as_deref())?;
            let rec = score::score_record(model, clock, &stock)?;
            println!("{}", serde_json::to_string_pretty(&score::render(&stock, &rec))?);
        }
        Command::ScoreDb { id, now } => {
            let model = load_model(settings, location).await?;
            let clock = score::clock_for(now.as_deref())?;
            let db_url = settings.require_database_url()?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(1)
                .connect(db_url)
                .await
                .context("connect DATABASE_URL failed")?;

            let stock = match id.as_deref() {
                Some(id) => pricetarget_core::storage::stocks::fetch_stock_by_id(&pool, id).await?,
                None => pricetarget_core::storage::stocks::fetch_first_stock(&pool).await?,
            }
            .context("no matching stock found")?;

            let rec = score::score_record(model, clock, &stock)?;
            tracing::info!(
                ticker = %stock.ticker,
                cluster = rec.cluster,
                predicted_target_delta = ?rec.predicted_target_delta,
                "scored stock"
            );
            println!("{}", serde_json::to_string_pretty(&score::render(&stock, &rec))?);
        }
    }

    Ok(())
}

fn init_sentry(settings: &pricetarget_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
