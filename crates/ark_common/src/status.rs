//! Daemon health snapshot shared between arkd and arkctl.

use serde::{Deserialize, Serialize};

/// Point-in-time view of the generation backend circuit breaker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResilienceSnapshot {
    /// Whether the most recent call (or short-circuit) succeeded.
    pub last_ok: bool,
    /// Consecutive failures since the last success.
    pub fail_count: u32,
    /// Epoch seconds until which calls are suppressed; 0 = not disabled.
    pub disabled_until: u64,
}

/// Backend identity plus its resilience state, as exposed by `/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaHealth {
    pub url: String,
    pub model: String,
    #[serde(flatten)]
    pub resilience: ResilienceSnapshot,
}

/// Response body for an authorized `/health` query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub pid: u32,
    pub uptime_sec: u64,
    pub ollama: OllamaHealth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_flattens_resilience() {
        let response = HealthResponse {
            ok: true,
            pid: 123,
            uptime_sec: 60,
            ollama: OllamaHealth {
                url: "http://localhost:11434/api/generate".to_string(),
                model: "llama3.1:8b".to_string(),
                resilience: ResilienceSnapshot {
                    last_ok: true,
                    fail_count: 0,
                    disabled_until: 0,
                },
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ollama"]["last_ok"], true);
        assert_eq!(json["ollama"]["fail_count"], 0);
        assert_eq!(json["ollama"]["model"], "llama3.1:8b");

        let back: HealthResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back.ollama.resilience.fail_count, 0);
    }
}
