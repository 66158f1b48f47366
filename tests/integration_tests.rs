use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use postal_budget_analyst::alerts::{budget_anomalies, detect_alerts};
use postal_budget_analyst::llm::prompts::template;
use postal_budget_analyst::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Answers every request with a fixed text and counts how often it was called.
#[derive(Clone)]
struct CountingService {
    calls: Arc<AtomicUsize>,
    reply: String,
}

impl CountingService {
    fn new(reply: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            reply: reply.to_string(),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for CountingService {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Keeps every request it receives and answers with a fixed text.
#[derive(Clone, Default)]
struct RecordingService {
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    reply: String,
}

impl RecordingService {
    fn last_request(&self) -> CompletionRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl CompletionService for RecordingService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.reply.clone())
    }
}

struct FailingService;

#[async_trait]
impl CompletionService for FailingService {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        Err(BudgetChatError::ServiceError("quota exceeded".to_string()))
    }
}

struct HangingService;

#[async_trait]
impl CompletionService for HangingService {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        std::future::pending::<()>().await;
        Ok(String::new())
    }
}

fn jan_2024() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn north_south() -> Arc<AnalyticsContext> {
    Arc::new(AnalyticsContext::new(BudgetDataset::new(vec![
        BudgetRecord::new(jan_2024(), "NORTH", 1_000_000.0, false),
        BudgetRecord::new(jan_2024(), "SOUTH", 500_000.0, false),
    ])))
}

const FRENCH_ANSWER: &str = "Le budget total des régions est stable et la répartition reste équilibrée entre le nord et le sud.";

#[test]
fn test_north_south_scenario() {
    let analytics = north_south();
    let insights = analytics.insights();
    assert!((insights.total_budget - 1_500_000.0).abs() < 1e-6);

    let entity_sum: f64 = insights.budget_by_entity.values().sum();
    assert!((entity_sum - insights.total_budget).abs() < 1e-6);

    let context = select_context("budget par entité", analytics.dataset(), insights);
    assert!(context.contains("NORTH | 1000000.00 | 1000000.00 | 1"));
    assert!(context.contains("SOUTH | 500000.00 | 500000.00 | 1"));
}

#[test]
fn test_context_is_deterministic() {
    let analytics = north_south();
    for question in ["budget par entité", "Bilan global ?", "CAPEX 2024 ramadan"] {
        let a = select_context(question, analytics.dataset(), analytics.insights());
        let b = select_context(question, analytics.dataset(), analytics.insights());
        assert_eq!(a, b);
    }
}

#[test]
fn test_trend_series_length() {
    let records: Vec<BudgetRecord> = (1..=6)
        .map(|m| BudgetRecord::new(NaiveDate::from_ymd_opt(2024, m, 1).unwrap(), "NORD", 100.0 * m as f64, false))
        .collect();
    let analytics = AnalyticsContext::new(BudgetDataset::new(records));
    let trends = &analytics.insights().trends;
    assert_eq!(trends.growth_series().len(), 5);
    assert!(trends.avg_growth.is_some());
    assert!(trends.volatility.is_some());
}

#[test]
fn test_alerts_cap_keeps_rejection_alert() {
    let base = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    let mut records: Vec<BudgetRecord> = (0..100u64)
        .map(|i| {
            let record = BudgetRecord::new(base + Days::new(i * 3), "POSTE_TN_REGION_NORD", 1000.0 + i as f64, false);
            if i % 5 < 2 {
                record.with_status(ApprovalStatus::Rejected)
            } else {
                record
            }
        })
        .collect();
    let last = records.iter().map(|r| r.date).max().unwrap();
    for i in 0..5u64 {
        records.push(BudgetRecord::new(
            last + Days::new(i + 1),
            "POSTE_TN_REGION_SUD",
            1_000_000.0,
            false,
        ));
    }
    let analytics = AnalyticsContext::new(BudgetDataset::new(records));
    let thresholds = Thresholds::default();

    assert_eq!(budget_anomalies(&analytics, &thresholds).len(), 5);

    let detected = detect_alerts(&analytics, &thresholds, "", "");
    assert!(detected.len() <= 3);
    assert!(detected.contains(&Alert::HighRejection));

    let rendered = alerts::alerts(&analytics, &thresholds, "", "");
    assert!(rendered.contains(&"⚠️ Taux de rejet des budgets élevé (>30%)".to_string()));
}

#[test]
fn test_loader_to_context() {
    let csv = "\
Date,Entité,Budget,is_forecast,catégorie_compte,Statut_budget,Ramadan
2024-01-15,POSTE_TN_REGION_NORD,1000000,0,REVENUE,Approuvé,0
2024-01-15,POSTE_TN_REGION_SUD,500000,0,OPEX,Rejeté,0
2026-03-01,POSTE_TN_REGION_SUD,700000,1,REVENUE,En attente,1
bad-date,POSTE_TN_REGION_SUD,1,0,REVENUE,Approuvé,0
";
    let dataset = BudgetDataset::from_reader(csv.as_bytes()).unwrap();
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.forecast().count(), 1);

    let analytics = AnalyticsContext::new(dataset);
    let context = select_context("Quelles prévisions pour 2026 ?", analytics.dataset(), analytics.insights());
    assert!(context.contains("2026-03"));

    let stats = QuickStats::compute(&analytics).unwrap();
    assert_eq!(stats.top_entity, "SUD");
}

#[test]
fn test_missing_columns_fall_back_to_no_data() {
    let err = BudgetDataset::from_reader("Date,Budget\n2024-01-01,10\n".as_bytes()).unwrap_err();
    assert!(matches!(err, BudgetChatError::MissingColumns(ref cols) if cols.len() == 2));

    let dataset = load_or_empty("does/not/exist.csv");
    let analytics = AnalyticsContext::new(dataset);
    assert!(analytics.is_empty());
    assert!(select_context("budget", analytics.dataset(), analytics.insights()).is_empty());
    assert!(alerts::alerts(&analytics, &Thresholds::default(), "baisse", "prévision").is_empty());
    assert!(suggestions::suggestions(&analytics, &Thresholds::default(), "", "budget").is_empty());
    assert!(QuickStats::compute(&analytics).is_none());
}

#[test]
fn test_schema_generation() {
    let schema = schemars::schema_for!(BudgetRecord);
    let schema_json = serde_json::to_string_pretty(&schema).unwrap();

    assert!(schema_json.contains("profit_center"));
    assert!(schema_json.contains("approval_status"));
    assert!(schema_json.contains("AccountCategory"));
}

#[tokio::test]
async fn test_greetings_skip_the_service() {
    let service = CountingService::new(FRENCH_ANSWER);
    let mut assistant = BudgetAssistant::new(north_south(), Some(service.clone()), AssistantConfig::default());

    for greeting in ["Bonjour", "Hi", "hello there"] {
        let result = assistant.process_query(greeting).await;
        let canned = [Language::French, Language::English, Language::Arabic]
            .iter()
            .any(|l| template(*l).greeting == result.response);
        assert!(canned, "unexpected reply to {}: {}", greeting, result.response);
    }
    assert_eq!(service.calls(), 0);
    assert!(assistant.history().is_empty());

    let result = assistant.process_query("Bonjour, quel est le budget de 2026?").await;
    assert_eq!(service.calls(), 1);
    assert_eq!(result.response, FRENCH_ANSWER);
    assert_eq!(assistant.history().len(), 1);
}

#[tokio::test]
async fn test_history_evicts_oldest_after_26_queries() {
    let service = CountingService::new(FRENCH_ANSWER);
    let mut assistant = BudgetAssistant::new(north_south(), Some(service.clone()), AssistantConfig::default());

    for i in 0..26 {
        assistant
            .answer(&format!("Quel est le budget de la région nord, question {} ?", i))
            .await;
    }

    assert_eq!(service.calls(), 26);
    assert_eq!(assistant.history().len(), 25);
    let oldest = assistant.history().turns().next().unwrap();
    assert!(oldest.question.contains("question 1 ?"));
}

#[tokio::test]
async fn test_query_result_shape() {
    let service = CountingService::new(FRENCH_ANSWER);
    let mut assistant = BudgetAssistant::new(north_south(), Some(service), AssistantConfig::default());

    let plain = assistant.process_query("Quel est le budget par région ?").await;
    assert_eq!(plain.response, FRENCH_ANSWER);
    assert!(plain.stats.is_none());
    assert!(plain.suggestions.len() <= 3);
    assert!(plain.alerts.len() <= 3);
    assert!(plain
        .suggestions
        .contains(&"Quelle est la répartition du budget entre REVENUE, CAPEX et OPEX ?".to_string()));

    let with_stats = assistant.process_query("Donne-moi un résumé statistique du budget").await;
    let stats = with_stats.stats.unwrap();
    assert_eq!(stats.total_records, 2);
    assert_eq!(stats.top_entity, "NORTH");

    let summary = assistant.conversation_summary().unwrap();
    assert_eq!(summary.total_questions, 2);
}

#[tokio::test]
async fn test_missing_service_returns_localized_message() {
    let mut assistant = BudgetAssistant::<CountingService>::new(north_south(), None, AssistantConfig::default());
    let question = "Quel est le budget total de la région nord cette année ?";
    let result = assistant.process_query(question).await;

    assert_eq!(result.response, template(detect_language(question)).not_configured);
    assert!(assistant.history().is_empty());
}

#[tokio::test]
async fn test_service_error_is_rendered_in_band() {
    let mut assistant = BudgetAssistant::new(north_south(), Some(FailingService), AssistantConfig::default());
    let question = "Quel est le budget total de la région nord cette année ?";
    let response = assistant.answer(question).await;

    assert!(response.starts_with(template(detect_language(question)).service_error));
    assert!(response.contains("quota exceeded"));
    assert!(assistant.history().is_empty());
}

#[tokio::test]
async fn test_timeout_leaves_history_untouched() {
    let mut assistant = BudgetAssistant::new(north_south(), Some(HangingService), AssistantConfig::default());

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        assistant.process_query("Quel est le budget par entité ?"),
    )
    .await;

    assert!(outcome.is_err());
    assert!(assistant.history().is_empty());
}

#[test]
fn test_report_over_shared_context() {
    let analytics = north_south();
    let report = BudgetReport::build(&analytics, &ReportFilter::default(), &Thresholds::default()).unwrap();
    assert_eq!(report.record_count, 2);
    assert!((report.total_budget - 1_500_000.0).abs() < 1e-6);
    assert_eq!(report.top_profit_centers[0].name, "NORTH");

    let sheets = ExportSheets::build(analytics.dataset().records());
    assert_eq!(sheets.monthly.len(), 1);
    assert_eq!(sheets.monthly[0].budget, 1_500_000.0);
}

#[tokio::test]
async fn test_request_carries_context_history_and_settings() {
    let service = RecordingService {
        reply: "x".repeat(400),
        ..RecordingService::default()
    };
    let config = AssistantConfig {
        model: "llama-3.1-8b-instant".to_string(),
        temperature: 0.5,
        max_tokens: 512,
        ..AssistantConfig::default()
    };
    let mut assistant = BudgetAssistant::new(north_south(), Some(service.clone()), config);

    for i in 0..6 {
        assistant
            .answer(&format!("Quel est le budget de la région nord, tour {} ?", i))
            .await;
    }

    let question = "Quel est le budget par entité ?";
    assistant.answer(question).await;

    let request = service.last_request();
    let t = template(detect_language(question));
    assert_eq!(request.user, question);
    assert_eq!(request.model, "llama-3.1-8b-instant");
    assert_eq!(request.temperature, 0.5);
    assert_eq!(request.max_tokens, 512);

    assert!(request.system.contains("Résumé par entité régionale:"));
    assert!(request.system.contains("NORTH | 1000000.00 | 1000000.00 | 1"));
    assert!(request.system.contains(&format!("{}:", t.history_label)));

    assert!(!request.system.contains("tour 0 ?"));
    for i in 1..6 {
        assert!(request.system.contains(&format!("tour {} ?", i)));
    }
    assert!(request.system.contains(&format!("{}: {}...", t.answer_label, "x".repeat(250))));
    assert!(!request.system.contains(&"x".repeat(251)));
}

#[tokio::test]
async fn test_english_answer_gets_english_alerts_and_suggestions() {
    let reply = "The northern region budget shows a steady decline compared with the previous quarter and needs a review.";
    let service = CountingService::new(reply);
    let mut assistant = BudgetAssistant::new(north_south(), Some(service), AssistantConfig::default());

    let result = assistant.process_query("What is the budget forecast for next year?").await;
    assert_eq!(
        result.alerts,
        vec![
            "⚠️ Negative trend detected in the data".to_string(),
            "⚠️ Attention: Data after March 2025 are forecasts".to_string(),
        ]
    );
    assert_eq!(
        result.suggestions,
        vec![
            "💡 Consider budget rebalancing between SOUTH and NORTH".to_string(),
            "💡 Analyze gaps between forecasts and actual results".to_string(),
            "What is the budget distribution between REVENUE, CAPEX and OPEX?".to_string(),
        ]
    );
}

#[test]
fn test_arabic_answer_gets_arabic_alerts_and_suggestions() {
    let analytics = north_south();
    let answer = "تشهد ميزانية المنطقة الشمالية انخفاضا مستمرا مقارنة بالربع السابق وتحتاج إلى مراجعة دقيقة";
    let question = "كيف حال المنطقة الشمالية؟";

    let rendered = alerts::alerts(&analytics, &Thresholds::default(), answer, question);
    assert_eq!(rendered, vec!["⚠️ اتجاه سلبي مكتشف في البيانات".to_string()]);

    let suggested = suggestions::suggestions(&analytics, &Thresholds::default(), answer, question);
    assert_eq!(suggested.len(), 3);
    assert_eq!(suggested[0], "💡 النظر في إعادة توازن الميزانية بين SOUTH و NORTH");
    assert_eq!(suggested[1], "ما هي الاتجاهات العامة في القطاع البريدي في تونس؟");
}

#[tokio::test]
async fn test_arabic_greeting_gets_arabic_reply() {
    let service = CountingService::new(FRENCH_ANSWER);
    let mut assistant = BudgetAssistant::new(north_south(), Some(service.clone()), AssistantConfig::default());

    for greeting in ["سلام", "مرحبًا"] {
        let result = assistant.process_query(greeting).await;
        assert_eq!(result.response, template(Language::Arabic).greeting);
    }
    assert_eq!(service.calls(), 0);
}
