use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use brand_assist::config::AppConfig;
use brand_assist::generator::LlmGenerator;
use brand_assist::identity::{Identity, IdentityProvider, StaticIdentityProvider};
use brand_assist::llm::{LlmBackend, LlmConfig, create_provider};
use brand_assist::session::{AppStep, Workflow};
use brand_assist::store::{KeyValueStore, LibSqlStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Read API key from environment
    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: GEMINI_API_KEY not set");
        eprintln!("  export GEMINI_API_KEY=...");
        std::process::exit(1);
    });

    let defaults = AppConfig::default();
    let config = AppConfig {
        model: std::env::var("BRAND_ASSIST_MODEL").unwrap_or(defaults.model),
        request_timeout: std::env::var("BRAND_ASSIST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout),
        store_path: std::env::var("BRAND_ASSIST_DB_PATH").unwrap_or(defaults.store_path),
        name: defaults.name,
    };

    eprintln!("Brand Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Database: {}", config.store_path);
    eprintln!("   Type 'help' for commands.\n");

    let llm_config = LlmConfig {
        backend: LlmBackend::Gemini,
        api_key: secrecy::SecretString::from(api_key),
        model: config.model.clone(),
        timeout: config.request_timeout,
    };
    let llm = create_provider(&llm_config)?;
    let generator = Arc::new(LlmGenerator::new(llm));

    let store: Arc<dyn KeyValueStore> = Arc::new(
        LibSqlStore::new_local(std::path::Path::new(&config.store_path))
            .await
            .unwrap_or_else(|e| {
                eprintln!("Error: Failed to open database at {}: {}", config.store_path, e);
                std::process::exit(1);
            }),
    );

    let workflow = Workflow::new(store, generator);
    let step = workflow.resume().await?;
    print_step(&workflow, step).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        let result = match command {
            "help" => {
                print_help();
                Ok(())
            }
            "quit" | "exit" => break,
            "signin" => match rest.split_once(' ') {
                Some((email, name)) => {
                    // The CLI stands in for the real OAuth flow with a
                    // static provider.
                    let provider = StaticIdentityProvider::new(Identity::new(email, name));
                    match provider.sign_in().await {
                        Ok(identity) => {
                            step_result(&workflow, workflow.sign_in(identity).await).await
                        }
                        Err(e) => Err(e.into()),
                    }
                }
                None => {
                    eprintln!("usage: signin <email> <name>");
                    Ok(())
                }
            },
            "guest" => step_result(&workflow, workflow.continue_as_guest().await).await,
            "text" => step_result(&workflow, workflow.submit_profile_text(rest).await).await,
            "review" => {
                // Accept the AI-suggested defaults as submitted
                let suggestions = workflow.state().await.suggestions;
                match suggestions {
                    Some(input) => step_result(&workflow, workflow.submit_review(input).await).await,
                    None => {
                        eprintln!("No suggestions to review yet");
                        Ok(())
                    }
                }
            }
            "ideas" => match workflow.regenerate_ideas().await {
                Ok(ideas) => {
                    for idea in ideas {
                        println!("- {}: {}", idea.title, idea.description);
                    }
                    Ok(())
                }
                Err(e) => Err(e),
            },
            "regen" => {
                let input = workflow.state().await.aggregate.map(|a| a.onboarding_data);
                match input {
                    Some(input) => {
                        workflow.regenerate_strategy(input).await.map(|s| {
                            println!("{}", s.summary);
                        })
                    }
                    None => {
                        eprintln!("No strategy loaded");
                        Ok(())
                    }
                }
            }
            "times" => workflow.posting_time_suggestions().await.map(|suggestions| {
                for s in suggestions {
                    println!("- {} {}", s.day, s.time);
                }
            }),
            "next" => workflow.next_post_suggestion().await.map(|pick| match pick {
                Some(s) => println!("{}: {}", s.post_title, s.reason),
                None => println!("No suggestion"),
            }),
            "trends" => workflow.fetch_trends().await.map(|result| {
                for trend in result.trends {
                    println!("## {}\n{}\n", trend.title, trend.summary);
                }
                for source in result.sources {
                    println!("[{}] {}", source.title, source.uri);
                }
            }),
            "startover" => step_result(&workflow, workflow.start_over(true).await).await,
            "logout" => step_result(&workflow, workflow.logout().await).await,
            _ => {
                eprintln!("Unknown command: {} (try 'help')", command);
                Ok(())
            }
        };
        if let Err(e) = result {
            eprintln!("Error: {}", e);
        }
        if !matches!(command, "help" | "signin" | "guest") {
            print_step(&workflow, workflow.step().await).await;
        }
    }

    Ok(())
}

async fn step_result(
    workflow: &Workflow,
    result: brand_assist::error::Result<AppStep>,
) -> brand_assist::error::Result<()> {
    let step = result?;
    print_step(workflow, step).await;
    Ok(())
}

async fn print_step(workflow: &Workflow, step: AppStep) {
    let state = workflow.state().await;
    match step {
        AppStep::Unauthenticated => println!("[{}] signin <email> <name>, or guest", step),
        AppStep::ProfileInput => println!("[{}] text <about text>", step),
        AppStep::ReviewSuggestions => {
            if let Some(s) = &state.suggestions {
                println!(
                    "[{}] industry: {} | goal: {} | topics: {} | tone: {} | audience: {}",
                    step, s.industry, s.goal, s.topics, s.tone, s.target_audience
                );
                println!("Type 'review' to accept");
            }
        }
        AppStep::Dashboard => {
            if let Some(aggregate) = &state.aggregate {
                println!("[{}] {}", step, aggregate.strategy.summary);
            }
        }
        _ => println!("[{}]", step),
    }
    if let Some(error) = &state.error {
        eprintln!("  ({})", error);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  signin <email> <name>  sign in");
    println!("  guest                  continue as guest");
    println!("  text <about>           analyze profile text");
    println!("  review                 accept the suggested onboarding input");
    println!("  ideas                  regenerate post ideas");
    println!("  regen                  regenerate the whole strategy");
    println!("  times                  posting time suggestions");
    println!("  next                   next-post suggestion");
    println!("  trends                 industry trends");
    println!("  startover              wipe strategy and restart onboarding");
    println!("  logout                 end the session");
    println!("  quit                   exit");
}
