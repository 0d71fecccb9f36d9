use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::dashboard::suggestion::CandidateTable;
use crate::guard::InFlightRegistry;
use crate::llm::{GeminiModel, NutritionModel};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub model: Arc<dyn NutritionModel>,
    pub in_flight: Arc<InFlightRegistry>,
    pub suggestions: Arc<CandidateTable>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = crate::db::connect(&config.database_url).await?;

        if config.gemini.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; model calls will fail");
        }
        let model = Arc::new(GeminiModel::new(&config.gemini)?) as Arc<dyn NutritionModel>;

        Ok(Self::from_parts(db, config, model))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>, model: Arc<dyn NutritionModel>) -> Self {
        Self {
            db,
            config,
            model,
            in_flight: Arc::new(InFlightRegistry::default()),
            suggestions: Arc::new(CandidateTable::default()),
        }
    }

    /// Lazy pool that never connects, test config and a model that always
    /// answers with a clean apple estimate.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::llm::fake::ScriptedModel;

        Self::fake_with_model(Arc::new(ScriptedModel::answering(
            r#"{"foodName":"Apple","calories":95,"macronutrients":{"protein":0.3,"carbs":25.2,"fats":0.2},"healthinessRating":8,"healthierAlternative":null}"#,
        )))
    }

    #[cfg(test)]
    pub fn fake_with_model(model: Arc<dyn NutritionModel>) -> Self {
        let config = AppConfig::for_tests();
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool ok");
        Self::from_parts(db, Arc::new(config), model)
    }
}
