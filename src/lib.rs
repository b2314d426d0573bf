pub mod assistant;
pub mod config;
pub mod error;
pub mod execution;
pub mod intent;
pub mod lexicon;
pub mod narration;
pub mod query_plan;
pub mod region;
pub mod response;
pub mod security;

pub use assistant::AnalyticsAssistant;
pub use config::{AppConfig, DataSource};
pub use error::{AnalyticsError, Result};
pub use execution::{CsvEngine, PostgresEngine, QueryExecutor, ResultRow};
pub use intent::{IntentCategory, IntentClassifier, QueryDescriptor, QueryExtractor};
pub use query_plan::{QueryPlan, QueryPlanBuilder};
pub use region::{RegionCode, RegionDirectory};
pub use response::{AnalyticsResponse, ChartType};
pub use security::{authorize, AuthorizationScope, Unauthorized};
