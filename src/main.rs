use clap::builder::BoolishValueParser;
use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use hwmon_exporter::{
    hostname, Error, MetricConfig, MetricsConfig, Scraper, ScraperConfig, DEFAULT_ROOT,
};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use warp::http::StatusCode;
use warp::reply::{with_status, Reply, Response};
use warp::{Filter, Rejection};

/// Export hwmon temperature, humidity and fan sensors as prometheus metrics
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 80)]
    port: u16,
    /// Address to listen on
    #[arg(long, env = "BIND", default_value = "0.0.0.0")]
    bind: IpAddr,
    /// Root of the hwmon tree
    #[arg(long, env = "HWMON_ROOT", default_value = DEFAULT_ROOT)]
    root: PathBuf,
    #[arg(long, env = "DISABLE_TEMPERATURE", value_parser = BoolishValueParser::new())]
    disable_temperature: bool,
    #[arg(long, env = "DISABLE_HUMIDITY", value_parser = BoolishValueParser::new())]
    disable_humidity: bool,
    #[arg(long, env = "DISABLE_FAN_SPEED", value_parser = BoolishValueParser::new())]
    disable_fan_speed: bool,
}

impl Args {
    fn config(&self) -> ScraperConfig {
        ScraperConfig {
            root: self.root.clone(),
            metrics: MetricsConfig {
                temperature: MetricConfig {
                    enabled: !self.disable_temperature,
                },
                humidity: MetricConfig {
                    enabled: !self.disable_humidity,
                },
                fan_speed: MetricConfig {
                    enabled: !self.disable_fan_speed,
                },
            },
        }
    }
}

struct Exporter {
    hostname: String,
    scraper: Mutex<Scraper>,
}

impl Exporter {
    fn metrics(&self) -> hwmon_exporter::Result<String> {
        let mut scraper = self
            .scraper
            .lock()
            .map_err(|_| Error::Other("scraper lock poisoned".into()))?;
        let metrics = scraper.scrape()?;

        let mut result = String::with_capacity(256);
        metrics.write(&mut result, &self.hostname);
        Ok(result)
    }
}

async fn serve_metrics(exporter: Arc<Exporter>) -> Result<Response, Rejection> {
    match tokio::task::spawn_blocking(move || exporter.metrics()).await {
        Ok(Ok(metrics)) => Ok(metrics.into_response()),
        Ok(Err(e)) => {
            warn!("error while scraping sensors: {e:#}");
            Ok(with_status(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response())
        }
        Err(e) => {
            warn!("scrape task failed: {e:#}");
            Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    ctrlc::set_handler(move || {
        std::process::exit(0);
    })
    .wrap_err("Error setting Ctrl-C handler")?;

    let mut scraper = Scraper::new(args.config());
    scraper.start(None);

    let exporter = Arc::new(Exporter {
        hostname: hostname()?,
        scraper: Mutex::new(scraper),
    });
    let exporter = warp::any().map(move || exporter.clone());

    let metrics = warp::path!("metrics")
        .and(warp::get())
        .and(exporter)
        .and_then(serve_metrics);

    info!(bind = %args.bind, port = args.port, "serving metrics");
    warp::serve(metrics).run((args.bind, args.port)).await;
    Ok(())
}
