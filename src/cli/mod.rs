use crate::{
    config::{parse_model_list, GuideConfig},
    CompletionRequester, GuideError, GuideSession, TripRequest,
};
use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn command() -> Command {
    Command::new("travel-guide")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate a day-by-day travel itinerary and export it as PDF")
        .arg(
            Arg::new("destination")
                .short('d')
                .long("destination")
                .value_name("PLACE")
                .help("Destination to travel, e.g. \"Paris, France\""),
        )
        .arg(
            Arg::new("days")
                .short('n')
                .long("days")
                .value_name("DAYS")
                .help("Number of days, e.g. \"5\" or \"7 days\""),
        )
        .arg(
            Arg::new("interests")
                .short('i')
                .long("interests")
                .value_name("TEXT")
                .help("Special interests: museums, food, nightlife, nature...")
                .default_value(""),
        )
        .arg(
            Arg::new("guardrails")
                .short('g')
                .long("guardrails")
                .value_name("TEXT")
                .help("Constraints such as \"wheelchair accessible only\"")
                .default_value(""),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .action(ArgAction::Append)
                .help("Model to try, in priority order; repeat or comma-separate to set fallbacks"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("OpenAI API key (or set OPENAI_API_KEY env var)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("OpenAI-compatible base URL (or set OPENAI_BASE_URL env var)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(u64))
                .help("Per-model request timeout in seconds"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Where to write the PDF (defaults to travel_guide_<destination>.pdf)"),
        )
        .arg(
            Arg::new("no-pdf")
                .long("no-pdf")
                .action(ArgAction::SetTrue)
                .help("Print the plan without writing a PDF"),
        )
        .arg(
            Arg::new("self-test")
                .long("self-test")
                .action(ArgAction::SetTrue)
                .help("Send a one-word request to the first model and report the raw result"),
        )
}

fn resolve_config(matches: &ArgMatches) -> anyhow::Result<GuideConfig> {
    let mut config = match matches.get_one::<String>("api-key") {
        Some(key) => {
            let key = key.clone();
            GuideConfig::from_lookup(|name| {
                if name == "OPENAI_API_KEY" {
                    Some(key.clone())
                } else {
                    std::env::var(name).ok()
                }
            })?
        }
        None => GuideConfig::from_env().context(
            "OpenAI API key is required. Set OPENAI_API_KEY environment variable or use --api-key",
        )?,
    };

    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = base_url.clone();
    }

    if let Some(models) = matches.get_many::<String>("model") {
        let models: Vec<String> = models.flat_map(|raw| parse_model_list(raw)).collect();
        if !models.is_empty() {
            config.models = models;
        }
    }

    if let Some(seconds) = matches.get_one::<u64>("timeout") {
        config.timeout = Duration::from_secs(*seconds);
    }

    Ok(config)
}

fn trip_from_matches(matches: &ArgMatches) -> TripRequest {
    let field = |name: &str| matches.get_one::<String>(name).cloned().unwrap_or_default();

    TripRequest::new(field("destination"), field("days"))
        .with_special_interests(field("interests"))
        .with_guardrails(field("guardrails"))
}

async fn run_self_test(requester: &CompletionRequester) -> anyhow::Result<()> {
    match requester.self_test().await {
        Ok(reply) => {
            println!("Self-test response:\n{}", reply);
            Ok(())
        }
        Err(err) => {
            error!("Self-test failed: {}", err);
            Err(err.into())
        }
    }
}

/// CLI entry point for the travel-guide tool
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = command().get_matches();
    let config = resolve_config(&matches)?;
    let requester = CompletionRequester::from_config(&config);

    info!("Models: {}", requester.models().join(", "));
    info!("Base URL: {}", config.base_url);

    if matches.get_flag("self-test") {
        return run_self_test(&requester).await;
    }

    let trip = trip_from_matches(&matches);
    if let Err(err) = trip.validate() {
        warn!("{}", err);
        bail!("Please provide at least --destination and --days.");
    }

    let mut session = GuideSession::new();
    info!("Creating your personalized travel plan for {}", trip.destination);

    let outcome = match session.generate(&requester, trip.clone()).await {
        Ok(outcome) => outcome,
        Err(err @ GuideError::AllModelsExhausted { .. }) => {
            error!("The model returned an empty response: {}", err);
            for attempt in err.attempts() {
                error!("  {}", attempt.describe());
            }
            bail!("Try again, or verify your API key/model access with --self-test.");
        }
        Err(err) => return Err(err.into()),
    };

    println!("# Your Travel Plan for {}\n", trip.destination);
    println!("{}", outcome.itinerary.text);

    eprintln!("\nModel: {}", outcome.itinerary.model_used);
    if let Some(usage) = &outcome.itinerary.usage {
        eprintln!("Usage: {}", usage);
    }
    if outcome.itinerary.used_fallback() {
        info!("{}", outcome.itinerary.replay());
    }

    if matches.get_flag("no-pdf") {
        return Ok(());
    }

    let saved = match outcome.document() {
        Some(document) => {
            let path = matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(&document.filename));
            document
                .save(&path)
                .map(|_| path)
                .map_err(|err| err.to_string())
        }
        None => Err(outcome
            .document_error()
            .map(|err| err.to_string())
            .unwrap_or_default()),
    };

    match saved {
        Ok(path) => eprintln!("PDF saved to {}", path.display()),
        Err(message) => {
            error!("PDF generation error: {}", message);
            eprintln!("You can still copy the plan above while PDF export is sorted out.");
        }
    }

    Ok(())
}
