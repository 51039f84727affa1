use chrono::TimeDelta;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

/// Environment variable and config key for each upstream credential.
const CREDENTIAL_VARS: [(&str, &str); 4] = [
    ("FRED_API_KEY", "credentials.fred_api_key"),
    ("EIA_API_KEY", "credentials.eia_api_key"),
    ("OPENWEATHER_API_KEY", "credentials.openweather_api_key"),
    ("ANTHROPIC_API_KEY", "credentials.anthropic_api_key"),
];

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub economic: EconomicSettings,
    pub energy: EnergySettings,
    pub weather: WeatherSettings,
    pub insight: InsightSettings,
    pub cache: CacheSettings,
    pub credentials: Credentials,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EconomicSettings {
    pub base_url: String,
    pub series_id: String,
    pub timeout_secs: u64,
}

impl Default for EconomicSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.stlouisfed.org/fred".to_string(),
            series_id: "INDPRO".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EnergySettings {
    pub base_url: String,
    pub state: String,
    pub sector: String,
    pub timeout_secs: u64,
}

impl Default for EnergySettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.eia.gov/v2".to_string(),
            state: "TX".to_string(),
            sector: "RES".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeatherSettings {
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timeout_secs: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/3.0".to_string(),
            latitude: 29.7604,
            longitude: -95.3698,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InsightSettings {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com/v1".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            max_tokens: 300,
            temperature: 0.2,
            timeout_secs: 20,
        }
    }
}

/// Cache lifetimes, in seconds.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheSettings {
    pub production_ttl_secs: u64,
    pub energy_ttl_secs: u64,
    pub weather_ttl_secs: u64,
    pub insight_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            production_ttl_secs: 60 * 60,
            energy_ttl_secs: 10 * 60,
            weather_ttl_secs: 15 * 60,
            insight_ttl_secs: 30 * 60,
        }
    }
}

impl CacheSettings {
    pub fn production_ttl(&self) -> TimeDelta {
        seconds(self.production_ttl_secs)
    }

    pub fn energy_ttl(&self) -> TimeDelta {
        seconds(self.energy_ttl_secs)
    }

    pub fn weather_ttl(&self) -> TimeDelta {
        seconds(self.weather_ttl_secs)
    }

    pub fn insight_ttl(&self) -> TimeDelta {
        seconds(self.insight_ttl_secs)
    }
}

fn seconds(secs: u64) -> TimeDelta {
    TimeDelta::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1_000))
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Credentials {
    pub fred_api_key: Option<String>,
    pub eia_api_key: Option<String>,
    pub openweather_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl Credentials {
    /// Names of the environment variables that were not provided
    pub fn missing(&self) -> Vec<&'static str> {
        let keys = [
            &self.fred_api_key,
            &self.eia_api_key,
            &self.openweather_api_key,
            &self.anthropic_api_key,
        ];
        CREDENTIAL_VARS
            .iter()
            .zip(keys)
            .filter(|(_, key)| key.is_none())
            .map(|((var, _), _)| *var)
            .collect()
    }
}

/// Defaults, then `config/dashboard.toml` if present, then `PULSE__SECTION__KEY`
/// overrides, then the credential variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("PULSE")
                .separator("__")
                .try_parsing(true),
        );

    build_app_config(builder, |var| std::env::var(var).ok())
}

fn build_app_config(
    mut builder: ConfigBuilder<DefaultState>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<AppConfig> {
    for (var, key) in CREDENTIAL_VARS {
        let value = env(var).filter(|v| !v.trim().is_empty());
        builder = builder.set_override_option(key, value)?;
    }

    let settings = builder.build()?;
    Ok(settings.try_deserialize()?)
}
