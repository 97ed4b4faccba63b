mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Feed, LevelWeights, Postgres, Ranking, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.feed.max_limit == 0 {
		return Err(Error::Validation {
			message: "feed.max_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.feed.default_limit == 0 || cfg.feed.default_limit > cfg.feed.max_limit {
		return Err(Error::Validation {
			message: "feed.default_limit must be between 1 and feed.max_limit.".to_string(),
		});
	}
	if cfg.feed.buffer_factor == 0 {
		return Err(Error::Validation {
			message: "feed.buffer_factor must be greater than zero.".to_string(),
		});
	}
	if cfg.feed.buffer_cap < cfg.feed.max_limit {
		return Err(Error::Validation {
			message: "feed.buffer_cap must be at least feed.max_limit.".to_string(),
		});
	}
	if cfg.feed.max_seq == 0 {
		return Err(Error::Validation {
			message: "feed.max_seq must be greater than zero.".to_string(),
		});
	}
	if cfg.feed.source_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "feed.source_timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (label, weights) in
		[("ranking.explicit", &cfg.ranking.explicit), ("ranking.personalized", &cfg.ranking.personalized)]
	{
		for (field, value) in [
			("category", weights.category),
			("subcategory", weights.subcategory),
			("subsubcategory", weights.subsubcategory),
			("identity", weights.identity),
		] {
			if !value.is_finite() || value < 0.0 {
				return Err(Error::Validation {
					message: format!("{label}.{field} must be a non-negative finite number."),
				});
			}
		}
	}

	for (label, value) in [
		("ranking.text_weight", cfg.ranking.text_weight),
		("ranking.city_weight", cfg.ranking.city_weight),
		("ranking.country_weight", cfg.ranking.country_weight),
		("ranking.attribute_weight", cfg.ranking.attribute_weight),
		("ranking.recency_weight", cfg.ranking.recency_weight),
		("ranking.tie_breaker_weight", cfg.ranking.tie_breaker_weight),
	] {
		if !value.is_finite() || value < 0.0 {
			return Err(Error::Validation {
				message: format!("{label} must be a non-negative finite number."),
			});
		}
	}

	if !cfg.ranking.recency_window_days.is_finite() || cfg.ranking.recency_window_days <= 0.0 {
		return Err(Error::Validation {
			message: "ranking.recency_window_days must be greater than zero.".to_string(),
		});
	}
	if cfg.ranking.min_factors == 0 {
		return Err(Error::Validation {
			message: "ranking.min_factors must be greater than zero.".to_string(),
		});
	}
	if !cfg.ranking.min_factor_floor.is_finite()
		|| !(0.0..=1.0).contains(&cfg.ranking.min_factor_floor)
	{
		return Err(Error::Validation {
			message: "ranking.min_factor_floor must be in the range 0.0-1.0.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let level = cfg.service.log_level.trim();

	cfg.service.log_level =
		if level.is_empty() { "info".to_string() } else { level.to_string() };
}
