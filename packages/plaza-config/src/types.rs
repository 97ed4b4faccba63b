use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub feed: Feed,
	#[serde(default)]
	pub ranking: Ranking,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feed {
	pub default_limit: u32,
	pub max_limit: u32,
	/// Per-source over-fetch multiplier applied to `offset + limit`.
	pub buffer_factor: u32,
	pub buffer_cap: u32,
	/// Maximum run of a single content kind in the assembled feed.
	pub max_seq: u32,
	pub source_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ranking {
	pub explicit: LevelWeights,
	pub personalized: LevelWeights,
	pub text_weight: f32,
	pub city_weight: f32,
	pub country_weight: f32,
	pub attribute_weight: f32,
	pub recency_weight: f32,
	pub recency_window_days: f32,
	/// Small bonus from the viewer's interests in explicit-filter mode, so
	/// personalization breaks ties without overriding the filter.
	pub tie_breaker_weight: f32,
	/// Below this many independently matched factors the raw score is scaled down.
	pub min_factors: u32,
	pub min_factor_floor: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelWeights {
	pub category: f32,
	pub subcategory: f32,
	pub subsubcategory: f32,
	pub identity: f32,
}

impl Default for Feed {
	fn default() -> Self {
		Self {
			default_limit: 20,
			max_limit: 100,
			buffer_factor: 3,
			buffer_cap: 300,
			max_seq: 1,
			source_timeout_ms: 2_000,
		}
	}
}

impl Default for Ranking {
	fn default() -> Self {
		Self {
			explicit: LevelWeights { category: 25.0, subcategory: 25.0, subsubcategory: 20.0, identity: 15.0 },
			personalized: LevelWeights {
				category: 15.0,
				subcategory: 25.0,
				subsubcategory: 30.0,
				identity: 10.0,
			},
			text_weight: 10.0,
			city_weight: 10.0,
			country_weight: 5.0,
			attribute_weight: 5.0,
			recency_weight: 10.0,
			recency_window_days: 14.0,
			tie_breaker_weight: 1.0,
			min_factors: 3,
			min_factor_floor: 0.25,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}
