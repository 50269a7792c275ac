//! market-insight CLI
//!
//! Fetches market data, computes the indicator snapshot and prints an
//! LLM-written commentary. Logs go to stderr; stdout carries only the result.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use market_analysis::config::parse_utc_offset;
use market_analysis::{
    AnalysisConfig, AnalysisError, AnalysisResult, MockMarketData, NarrativeGenerator, Pipeline,
};
use narrative_core::{GenerationOptions, LlmProvider};
use narrative_runtime::{OpenAiConfig, OpenAiProvider};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProviderKind {
    /// OpenAI-compatible chat completions API
    Openai,
    /// Local Ollama daemon (requires the `ollama` feature)
    Ollama,
}

#[derive(Debug, Parser)]
#[command(name = "market-insight", version)]
#[command(about = "Crypto market indicators with a short AI-written commentary", long_about = None)]
struct Cli {
    /// Quote currency (e.g., usd, eur)
    #[arg(long)]
    currency: Option<String>,

    /// Language of the commentary
    #[arg(long)]
    language: Option<String>,

    /// Asset id as known to CoinGecko (e.g., bitcoin, ethereum)
    #[arg(long)]
    asset: Option<String>,

    /// Completion model
    #[arg(long)]
    model: Option<String>,

    /// Commentary backend
    #[arg(long, value_enum, default_value = "openai")]
    provider: ProviderKind,

    /// API key for the OpenAI-compatible backend
    #[arg(long, visible_alias = "gpt-token", env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Offset defining day boundaries (UTC, +02:00, -0500)
    #[arg(long)]
    utc_offset: Option<String>,

    /// Use deterministic synthetic market data instead of the live APIs
    #[arg(long)]
    offline: bool,

    /// Skip the commentary and only compute indicators
    #[arg(long)]
    no_narrative: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Environment configuration overridden by command-line flags
    fn analysis_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = AnalysisConfig::from_env()?;
        if let Some(asset) = &self.asset {
            config = config.with_asset(asset.clone());
        }
        if let Some(currency) = &self.currency {
            config.currency.clone_from(currency);
        }
        if let Some(language) = &self.language {
            config.language.clone_from(language);
        }
        if let Some(model) = &self.model {
            config.model.clone_from(model);
        }
        if let Some(offset) = &self.utc_offset {
            config.utc_offset = parse_utc_offset(offset)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reference time: start of `--as-of` in the configured offset, else now
    fn as_of(&self, config: &AnalysisConfig) -> anyhow::Result<DateTime<Utc>> {
        let Some(date) = self.as_of else {
            return Ok(Utc::now());
        };
        config
            .utc_offset
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .single()
            .map(|start| start.with_timezone(&Utc))
            .with_context(|| format!("no start of day for {date}"))
    }

    fn provider(&self) -> anyhow::Result<Arc<dyn LlmProvider>> {
        match self.provider {
            ProviderKind::Openai => {
                // The key may come from --api-key alone; base URL and timeout still come from env
                let openai = OpenAiConfig::with_env_key(self.api_key.clone().unwrap_or_default());
                let provider = OpenAiProvider::from_config(openai)
                    .context("set --api-key (or OPENAI_API_KEY), or pass --no-narrative")?;
                Ok(Arc::new(provider))
            }
            #[cfg(feature = "ollama")]
            ProviderKind::Ollama => Ok(Arc::new(narrative_runtime::OllamaProvider::from_env())),
            #[cfg(not(feature = "ollama"))]
            ProviderKind::Ollama => {
                anyhow::bail!("this binary was built without the `ollama` feature")
            }
        }
    }
}

/// Log the full error, surface the friendly one
fn failed(err: AnalysisError) -> anyhow::Error {
    tracing::error!(error = %err, retryable = err.is_retryable(), "run failed");
    anyhow::anyhow!(err.user_message())
}

fn print_summary(result: &AnalysisResult, currency: &str) {
    let currency = currency.to_uppercase();
    println!("Price            {:.2} {currency}", result.current_price);
    println!(
        "2y MA            {:.2} {currency} ({:+.2}%)",
        result.ma_2y, result.diff_ma_2y_percent
    );
    println!(
        "2y MA x5         {:.2} {currency} ({:+.2}%)",
        result.ma_2y_multiplier, result.diff_ma_2y_multiplier_percent
    );
    println!(
        "Volume           {:+.2}% vs 30-day mean, {:+.2}% vs previous day",
        result.diff_volume_percent_last_30_days, result.diff_volume_percent_last_24_h
    );
    println!(
        "Fear & Greed     {} ({})",
        result.fear_and_greed_index, result.fear_and_greed_classification
    );
    println!(
        "Pivot / R1 / R2  {:.2} / {:.2} / {:.2} {currency}",
        result.pivot_point, result.r1, result.r2
    );
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.analysis_config()?;
    let as_of = cli.as_of(&config)?;

    let pipeline = if cli.offline {
        tracing::info!("offline mode: using synthetic market data");
        let mock = Arc::new(MockMarketData::new(as_of));
        Pipeline::new(config.clone(), mock.clone(), mock)
    } else {
        Pipeline::from_config(config.clone())?
    };

    if cli.no_narrative {
        let analysis = pipeline.analyze(as_of).await.map_err(failed)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        } else {
            print_summary(&analysis, &config.currency);
        }
        return Ok(());
    }

    let generator = NarrativeGenerator::new(
        cli.provider()?,
        GenerationOptions::default().with_model(config.model.clone()),
    )
    .with_timeout(config.llm_timeout);
    tracing::info!(provider = generator.provider_name(), "commentary backend ready");

    let report = pipeline.run(as_of, &generator).await.map_err(failed)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.commentary.trim());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment before clap reads env-backed flags
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "market-insight",
            "--asset",
            "ethereum",
            "--currency",
            "eur",
            "--language",
            "spanish",
            "--utc-offset",
            "+02:00",
            "--offline",
            "--no-narrative",
        ])
        .unwrap();

        let config = cli.analysis_config().unwrap();
        assert_eq!(config.asset_id, "ethereum");
        assert_eq!(config.asset_name, "Ethereum");
        assert_eq!(config.currency, "eur");
        assert_eq!(config.language, "spanish");
        assert_eq!(config.utc_offset.local_minus_utc(), 7200);
        assert!(cli.offline && cli.no_narrative && !cli.json);
    }

    #[test]
    fn test_gpt_token_alias() {
        let cli = Cli::try_parse_from(["market-insight", "--gpt-token", "sk-test"]).unwrap();
        assert_eq!(cli.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cli.provider, ProviderKind::Openai);
    }

    #[test]
    fn test_as_of_is_start_of_local_day() {
        let cli = Cli::try_parse_from([
            "market-insight",
            "--as-of",
            "2024-06-10",
            "--utc-offset",
            "+02:00",
        ])
        .unwrap();
        let config = cli.analysis_config().unwrap();

        assert_eq!(
            cli.as_of(&config).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 9, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Cli::try_parse_from(["market-insight", "--as-of", "10/06/2024"]).is_err());
    }
}
