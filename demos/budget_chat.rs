use dotenv::dotenv;
use postal_budget_analyst::{load_or_empty, AnalyticsContext, AssistantConfig, BudgetAssistant, GroqClient, ReportFilter};
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let config = AssistantConfig::from_env()?;
    let api_key = std::env::var("GROQ_API_KEY").unwrap_or_default();
    let client = if api_key.trim().is_empty() {
        println!("⚠️ GROQ_API_KEY is not set, questions will not be answered.");
        None
    } else {
        Some(GroqClient::with_timeout(
            api_key,
            Duration::from_secs(config.request_timeout_secs),
        )?)
    };

    let path = std::env::var("BUDGET_CSV_PATH").unwrap_or_else(|_| "budget_data.csv".to_string());
    let analytics = Arc::new(AnalyticsContext::new(load_or_empty(&path)));
    println!("✅ Loaded {} records from {}.\n", analytics.dataset().len(), path);

    let mut assistant = BudgetAssistant::new(analytics, client, config);

    println!("🤖 Ready! Ask questions about the budget (type 'rapport', 'historique' or 'quit').");
    println!("------------------------------------------------------------------");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let prompt = input.trim();

        if prompt.eq_ignore_ascii_case("quit") || prompt.eq_ignore_ascii_case("exit") {
            break;
        }

        if prompt.is_empty() {
            continue;
        }

        if prompt.eq_ignore_ascii_case("rapport") {
            match assistant.report(&ReportFilter::default()) {
                Some(report) => println!("\n{}\n", report),
                None => println!("Aucune donnée pour le rapport."),
            }
            continue;
        }

        if prompt.eq_ignore_ascii_case("historique") {
            match assistant.conversation_summary() {
                Some(summary) => println!("\n{}\n", summary),
                None => println!("Aucune conversation enregistrée."),
            }
            continue;
        }

        println!("\nThinking...");
        let result = assistant.process_query(prompt).await;

        println!("\n{}\n", result.response);
        if !result.alerts.is_empty() {
            println!("🚨 Alertes:");
            for alert in &result.alerts {
                println!("   {}", alert);
            }
        }
        if !result.suggestions.is_empty() {
            println!("💡 Suggestions:");
            for suggestion in &result.suggestions {
                println!("   {}", suggestion);
            }
        }
        if let Some(stats) = &result.stats {
            println!("📊 {}", serde_json::to_string_pretty(stats)?);
        }
        println!("------------------------------------------------------------------");
    }

    Ok(())
}
