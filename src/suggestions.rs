use crate::config::Thresholds;
use crate::insights::group_by;
use crate::language::detect_language;
use crate::schema::{AccountCategory, Language};
use crate::AnalyticsContext;
use serde::Serialize;

/// Question topic used to pick follow-up questions. Routing is first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionTopic {
    Budget,
    Entity,
    Service,
    Client,
    Forecast,
    Seasonal,
    General,
}

const TOPIC_ROUTES: &[(SuggestionTopic, &[&str])] = &[
    (SuggestionTopic::Budget, &["budget", "montant", "amount"]),
    (SuggestionTopic::Entity, &["entité", "région", "entity"]),
    (SuggestionTopic::Service, &["service", "express", "international", "standard"]),
    (
        SuggestionTopic::Client,
        &["client", "segment", "particulier", "institution", "entreprise"],
    ),
    (SuggestionTopic::Forecast, &["prévision", "forecast", "futur"]),
    (SuggestionTopic::Seasonal, &["ramadan", "décembre", "septembre", "saisonnier"]),
];

const FORECAST_ANALYSIS_KEYWORDS: &[&str] = &["futur", "prévision", "forecast", "prédiction"];

impl SuggestionTopic {
    pub fn route(question: &str) -> Self {
        let lowered = question.to_lowercase();
        TOPIC_ROUTES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(topic, _)| *topic)
            .unwrap_or(SuggestionTopic::General)
    }

    pub fn questions(&self, language: Language) -> [&'static str; 3] {
        use Language::*;
        use SuggestionTopic::*;
        match (self, language) {
            (Budget, French) => [
                "Quelle est la répartition du budget entre REVENUE, CAPEX et OPEX ?",
                "Quelles sont les tendances budgétaires par région ?",
                "Comment évolue le budget moyen par type de service ?",
            ],
            (Budget, English) => [
                "What is the budget distribution between REVENUE, CAPEX and OPEX?",
                "What are the budget trends by region?",
                "How does the average budget evolve by service type?",
            ],
            (Budget, Arabic) => [
                "ما هو توزيع الميزانية بين الإيرادات والاستثمارات والتشغيل؟",
                "ما هي اتجاهات الميزانية حسب المنطقة؟",
                "كيف تتطور متوسط الميزانية حسب نوع الخدمة؟",
            ],
            (Entity, French) => [
                "Quelle région génère le plus de revenus ?",
                "Comment se compare la performance des régions Nord, Centre et Sud ?",
                "Quels sont les centres de profit les plus performants par région ?",
            ],
            (Entity, English) => [
                "Which region generates the most revenue?",
                "How do the North, Centre and South regions compare in performance?",
                "What are the best performing profit centers by region?",
            ],
            (Entity, Arabic) => [
                "أي منطقة تحقق أكبر قدر من الإيرادات؟",
                "كيف تتقارن أداء مناطق الشمال والوسط والجنوب؟",
                "ما هي مراكز الربح الأكثر أداءً حسب المنطقة؟",
            ],
            (Service, French) => [
                "Quel type de service postal est le plus rentable ?",
                "Comment évolue la demande pour les services Express vs Standard ?",
                "Quelle est la contribution des services internationaux au budget total ?",
            ],
            (Service, English) => [
                "Which type of postal service is the most profitable?",
                "How is demand evolving for Express vs Standard services?",
                "What is the contribution of international services to the total budget?",
            ],
            (Service, Arabic) => [
                "أي نوع من الخدمات البريدية هو الأكثر ربحية؟",
                "كيف يتطور الطلب على الخدمات السريعة مقابل العادية؟",
                "ما هي مساهمة الخدمات الدولية في إجمالي الميزانية؟",
            ],
            (Client, French) => [
                "Quel segment client contribue le plus au chiffre d'affaires ?",
                "Comment évolue la part des entreprises vs particuliers ?",
                "Quelles sont les opportunités avec le segment institutionnel ?",
            ],
            (Client, English) => [
                "Which client segment contributes most to revenue?",
                "How is the share of enterprises vs individuals evolving?",
                "What are the opportunities with the institutional segment?",
            ],
            (Client, Arabic) => [
                "أي شريحة من العملاء تساهم أكثر في الإيرادات؟",
                "كيف تتطور حصة الشركات مقابل الأفراد؟",
                "ما هي الفرص مع الشريحة المؤسسية؟",
            ],
            (Forecast, French) => [
                "Quelles sont les prévisions budgétaires pour 2026-2027 ?",
                "Comment les prévisions se comparent-elles aux données historiques ?",
                "Quels facteurs influencent les projections futures ?",
            ],
            (Forecast, English) => [
                "What are the budget forecasts for 2026-2027?",
                "How do forecasts compare to historical data?",
                "What factors influence future projections?",
            ],
            (Forecast, Arabic) => [
                "ما هي التوقعات المالية لعامي 2026-2027؟",
                "كيف تتقارن التوقعات مع البيانات التاريخية؟",
                "ما هي العوامل التي تؤثر على الإسقاطات المستقبلية؟",
            ],
            (Seasonal, French) => [
                "Quel est l'impact de Ramadan sur les revenus postaux ?",
                "Comment les fêtes de fin d'année affectent-elles l'activité ?",
                "Y a-t-il des pics saisonniers à anticiper ?",
            ],
            (Seasonal, English) => [
                "What is Ramadan's impact on postal revenues?",
                "How do year-end holidays affect activity?",
                "Are there seasonal peaks to anticipate?",
            ],
            (Seasonal, Arabic) => [
                "ما هو تأثير رمضان على الإيرادات البريدية؟",
                "كيف تؤثر عطلات نهاية السنة على النشاط؟",
                "هل هناك ذروات موسمية يجب توقعها؟",
            ],
            (General, French) => [
                "Quelles sont les tendances générales du secteur postal en Tunisie ?",
                "Comment optimiser la rentabilité des services postaux ?",
                "Quels sont les défis et opportunités pour La Poste Tunisienne ?",
            ],
            (General, English) => [
                "What are the general trends in Tunisia's postal sector?",
                "How to optimize postal service profitability?",
                "What are the challenges and opportunities for Tunisia Post?",
            ],
            (General, Arabic) => [
                "ما هي الاتجاهات العامة في القطاع البريدي في تونس؟",
                "كيفية تحسين ربحية الخدمات البريدية؟",
                "ما هي التحديات والفرص للبريد التونسي؟",
            ],
        }
    }
}

/// Recommendation derived from the aggregates rather than from the question topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    RebalanceEntities { worst: String, best: String },
    IncreaseRevenue,
    LeverageRamadan,
    ForecastAnalysis,
}

impl Insight {
    pub fn render(&self, language: Language) -> String {
        match (self, language) {
            (Self::RebalanceEntities { worst, best }, Language::French) => {
                format!("💡 Envisager un rééquilibrage budgétaire entre {} et {}", worst, best)
            }
            (Self::RebalanceEntities { worst, best }, Language::English) => {
                format!("💡 Consider budget rebalancing between {} and {}", worst, best)
            }
            (Self::RebalanceEntities { worst, best }, Language::Arabic) => {
                format!("💡 النظر في إعادة توازن الميزانية بين {} و {}", worst, best)
            }
            (Self::IncreaseRevenue, Language::French) => {
                "💡 Augmenter la part des revenus dans le budget global".to_string()
            }
            (Self::IncreaseRevenue, Language::English) => "💡 Increase revenue share in the overall budget".to_string(),
            (Self::IncreaseRevenue, Language::Arabic) => "💡 زيادة حصة الإيرادات في الميزانية الإجمالية".to_string(),
            (Self::LeverageRamadan, Language::French) => {
                "💡 Optimiser les investissements pendant la période de Ramadan".to_string()
            }
            (Self::LeverageRamadan, Language::English) => "💡 Optimize investments during Ramadan period".to_string(),
            (Self::LeverageRamadan, Language::Arabic) => "💡 تحسين الاستثمارات خلال فترة رمضان".to_string(),
            (Self::ForecastAnalysis, Language::French) => {
                "💡 Analyser les écarts entre prévisions et réalisations".to_string()
            }
            (Self::ForecastAnalysis, Language::English) => {
                "💡 Analyze gaps between forecasts and actual results".to_string()
            }
            (Self::ForecastAnalysis, Language::Arabic) => "💡 تحليل الفجوات بين التوقعات والنتائج الفعلية".to_string(),
        }
    }
}

/// Entity with the lowest and highest mean budget. Ties keep the first name in
/// ascending order.
fn entity_extremes(analytics: &AnalyticsContext) -> Option<((String, f64), (String, f64))> {
    let means = group_by(analytics.dataset().records(), |r| r.entity.clone());
    let mut iter = means.into_iter().map(|(name, stats)| (name, stats.mean));
    let first = iter.next()?;
    let (mut worst, mut best) = (first.clone(), first);
    for (name, mean) in iter {
        if mean < worst.1 {
            worst = (name.clone(), mean);
        }
        if mean > best.1 {
            best = (name, mean);
        }
    }
    Some((worst, best))
}

pub fn revenue_share(analytics: &AnalyticsContext) -> Option<f64> {
    let total = analytics.insights().total_budget;
    if total == 0.0 {
        return None;
    }
    let revenue: f64 = analytics
        .dataset()
        .records()
        .iter()
        .filter(|r| r.category == AccountCategory::Revenue)
        .map(|r| r.budget)
        .sum();
    Some(revenue / total)
}

pub fn detect_insights(analytics: &AnalyticsContext, thresholds: &Thresholds, question: &str) -> Vec<Insight> {
    if analytics.dataset().is_empty() {
        return Vec::new();
    }

    let mut insights = Vec::new();

    if let Some(((worst, min), (best, max))) = entity_extremes(analytics) {
        if max > min * thresholds.imbalance_ratio {
            insights.push(Insight::RebalanceEntities { worst, best });
        }
    }

    if revenue_share(analytics).is_some_and(|share| share < thresholds.min_revenue_share) {
        insights.push(Insight::IncreaseRevenue);
    }

    let lowered = question.to_lowercase();
    if lowered.contains("ramadan") && analytics.insights().ramadan_impact > 0.0 {
        insights.push(Insight::LeverageRamadan);
    }

    if FORECAST_ANALYSIS_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        insights.push(Insight::ForecastAnalysis);
    }

    insights
}

/// The three follow-up questions for the question's topic.
pub fn topic_suggestions(analytics: &AnalyticsContext, answer: &str, question: &str) -> Vec<String> {
    if analytics.dataset().is_empty() {
        return Vec::new();
    }
    let language = detect_language(answer);
    SuggestionTopic::route(question)
        .questions(language)
        .iter()
        .map(|q| q.to_string())
        .collect()
}

pub fn insight_suggestions(
    analytics: &AnalyticsContext,
    thresholds: &Thresholds,
    answer: &str,
    question: &str,
) -> Vec<String> {
    let language = detect_language(answer);
    let mut out: Vec<String> = detect_insights(analytics, thresholds, question)
        .iter()
        .map(|insight| insight.render(language))
        .collect();
    out.truncate(thresholds.max_suggestions);
    out
}

/// Insight-driven suggestions first, topic follow-ups fill the remaining slots.
pub fn suggestions(analytics: &AnalyticsContext, thresholds: &Thresholds, answer: &str, question: &str) -> Vec<String> {
    let mut out = insight_suggestions(analytics, thresholds, answer, question);
    for candidate in topic_suggestions(analytics, answer, question) {
        if out.len() >= thresholds.max_suggestions {
            break;
        }
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}
