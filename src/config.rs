use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_ROOM: &str = "daily_standup";
const DEFAULT_DOMAIN: &str = "meet.example.org";
const DEFAULT_NAME: &str = "name";
const DEFAULT_LIVEKIT_ENDPOINT: &str = "wss://{domain}";
const DEFAULT_LIVEKIT_TOKEN_ENDPOINT: &str = "https://{domain}/livekit/join-token";
const DEFAULT_JOIN_TIMEOUT_SECS: u64 = 30;

/// What the connect form submits: where to connect and who we are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinParams {
    pub domain: String,
    pub room: String,
    pub name: String,
}

impl Default for JoinParams {
    fn default() -> Self {
        JoinParams {
            domain: DEFAULT_DOMAIN.to_string(),
            room: DEFAULT_ROOM.to_string(),
            name: DEFAULT_NAME.to_string(),
        }
    }
}

/// Parameters read once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupParams {
    pub join: JoinParams,
    pub auto_join: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub startup: StartupParams,
    // Both endpoints are templates, `{domain}` is replaced by the join domain.
    pub livekit_endpoint: String,
    pub livekit_token_endpoint: String,
    pub join_timeout: Option<Duration>,
    pub log_file: Option<PathBuf>,
    pub disable_local_audio_capture: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            startup: StartupParams::default(),
            livekit_endpoint: DEFAULT_LIVEKIT_ENDPOINT.to_string(),
            livekit_token_endpoint: DEFAULT_LIVEKIT_TOKEN_ENDPOINT.to_string(),
            join_timeout: Some(Duration::from_secs(DEFAULT_JOIN_TIMEOUT_SECS)),
            log_file: None,
            disable_local_audio_capture: false,
        }
    }
}

impl Config {
    pub fn from_env_variables() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = JoinParams::default();

        let startup = StartupParams {
            join: JoinParams {
                domain: lookup("SEATS_DOMAIN").unwrap_or(defaults.domain),
                room: lookup("SEATS_ROOM").unwrap_or(defaults.room),
                name: lookup("SEATS_NAME").unwrap_or(defaults.name),
            },
            // Any value turns auto-join on, an empty one included.
            auto_join: lookup("SEATS_AUTOJOIN").is_some(),
        };

        let join_timeout = match lookup("SEATS_JOIN_TIMEOUT_SECS") {
            None => Some(Duration::from_secs(DEFAULT_JOIN_TIMEOUT_SECS)),
            Some(value) => match value.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    return Err(ConfigError::InvalidSeconds {
                        var: "SEATS_JOIN_TIMEOUT_SECS",
                        value,
                    })
                }
            },
        };

        let disable_local_audio_capture = match lookup("DISABLE_LOCAL_AUDIO_CAPTURE") {
            None => false,
            Some(value) => parse_flag("DISABLE_LOCAL_AUDIO_CAPTURE", value)?,
        };

        Ok(Config {
            startup,
            livekit_endpoint: lookup("LIVEKIT_ENDPOINT")
                .unwrap_or(DEFAULT_LIVEKIT_ENDPOINT.to_string()),
            livekit_token_endpoint: lookup("LIVEKIT_TOKEN_ENDPOINT")
                .unwrap_or(DEFAULT_LIVEKIT_TOKEN_ENDPOINT.to_string()),
            join_timeout,
            log_file: lookup("SEATS_LOG_FILE").map(PathBuf::from),
            disable_local_audio_capture,
        })
    }

    pub fn livekit_url(&self, domain: &str) -> String {
        self.livekit_endpoint.replace("{domain}", domain)
    }

    pub fn livekit_token_url(&self, domain: &str) -> String {
        self.livekit_token_endpoint.replace("{domain}", domain)
    }
}

fn parse_flag(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.startup.join.room, "daily_standup");
        assert_eq!(config.startup.join.domain, "meet.example.org");
        assert_eq!(config.startup.join.name, "name");
        assert!(!config.startup.auto_join);
        assert_eq!(config.join_timeout, Some(Duration::from_secs(30)));
        assert!(!config.disable_local_audio_capture);
    }

    #[test]
    fn empty_autojoin_value_still_joins() {
        let config = config_from(&[("SEATS_AUTOJOIN", "")]).unwrap();
        assert!(config.startup.auto_join);
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = config_from(&[("SEATS_JOIN_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.join_timeout, None);
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = config_from(&[("SEATS_JOIN_TIMEOUT_SECS", "soon")]).err();
        assert!(matches!(err, Some(ConfigError::InvalidSeconds { .. })));
    }

    #[test]
    fn bad_flag_is_rejected() {
        let err = config_from(&[("DISABLE_LOCAL_AUDIO_CAPTURE", "maybe")]).err();
        assert!(matches!(err, Some(ConfigError::InvalidFlag { .. })));
    }

    #[test]
    fn endpoint_templates_take_the_domain() {
        let config = config_from(&[("LIVEKIT_ENDPOINT", "ws://{domain}:7880")]).unwrap();

        assert_eq!(config.livekit_url("localhost"), "ws://localhost:7880");
        assert_eq!(
            config.livekit_token_url("meet.example.org"),
            "https://meet.example.org/livekit/join-token"
        );
    }
}
