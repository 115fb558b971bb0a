//! Built-in parameter sweeps.
//!
//! Each [`Sweep`] starts from a template [`GameParameters`] and overrides a
//! single field per [`Variant`].

use serde_json::{Value, json};

use crate::agent::prompt::{
    GUESSING_INSTRUCTIONS_V1, GUESSING_INSTRUCTIONS_V2, HOST_INSTRUCTIONS_V1, HOST_INSTRUCTIONS_V2,
};
use crate::game::GameParameters;

/// Temperatures tried by the temperature sweeps.
pub const TEMPERATURES: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

/// Topics tried by the topic sweep.
pub const TOPICS: [&str; 5] = ["penguin", "polar bear", "apple", "strawberry", "notebook"];

/// One point of a sweep: which field was varied, to what, and the full
/// parameters to play with.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub parameter: String,
    pub value: Value,
    pub params: GameParameters,
}

impl Variant {
    pub fn new(parameter: impl Into<String>, value: Value, params: GameParameters) -> Self {
        Self {
            parameter: parameter.into(),
            value,
            params,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Sweep {
    /// Vary the guesser's sampling temperature.
    GuessingTemperature,
    /// Vary the host's sampling temperature.
    HostTemperature,
    /// Compare guesser prompt versions.
    GuessingPrompt,
    /// Compare host prompt versions.
    HostPrompt,
    /// Vary the secret topic.
    Topic,
}

impl Sweep {
    pub const ALL: [Sweep; 5] = [
        Sweep::GuessingTemperature,
        Sweep::HostTemperature,
        Sweep::GuessingPrompt,
        Sweep::HostPrompt,
        Sweep::Topic,
    ];

    /// Parameters every variant of this sweep starts from.
    pub fn template(self) -> GameParameters {
        let topic = match self {
            Sweep::GuessingPrompt | Sweep::HostPrompt => "penguin",
            _ => "pear",
        };
        GameParameters::new(topic)
            .with_guessing_instructions(GUESSING_INSTRUCTIONS_V1)
            .with_host_instructions(HOST_INSTRUCTIONS_V1)
    }

    pub fn variants(self) -> Vec<Variant> {
        let template = self.template();
        match self {
            Sweep::GuessingTemperature => TEMPERATURES
                .iter()
                .map(|&t| {
                    Variant::new(
                        "guessing_agent_temperature",
                        json!(t),
                        template.clone().with_guessing_temperature(t as f32),
                    )
                })
                .collect(),
            Sweep::HostTemperature => TEMPERATURES
                .iter()
                .map(|&t| {
                    Variant::new(
                        "host_agent_temperature",
                        json!(t),
                        template.clone().with_host_temperature(t as f32),
                    )
                })
                .collect(),
            Sweep::GuessingPrompt => [GUESSING_INSTRUCTIONS_V1, GUESSING_INSTRUCTIONS_V2]
                .iter()
                .zip(1..)
                .map(|(&fragment, version)| {
                    Variant::new(
                        "guessing_agent_additional_instructions_version",
                        json!(version),
                        template.clone().with_guessing_instructions(fragment),
                    )
                })
                .collect(),
            Sweep::HostPrompt => [HOST_INSTRUCTIONS_V1, HOST_INSTRUCTIONS_V2]
                .iter()
                .zip(1..)
                .map(|(&fragment, version)| {
                    Variant::new(
                        "host_agent_additional_instructions_version",
                        json!(version),
                        template.clone().with_host_instructions(fragment),
                    )
                })
                .collect(),
            Sweep::Topic => TOPICS
                .iter()
                .map(|&topic| {
                    Variant::new("topic", json!(topic), template.clone().with_topic(topic))
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_sweeps_cover_six_points() {
        let variants = Sweep::GuessingTemperature.variants();
        assert_eq!(variants.len(), 6);
        assert_eq!(variants[1].params.guessing_agent_temperature, 0.2);
        assert_eq!(variants[1].params.host_agent_temperature, 0.8);

        let host = Sweep::HostTemperature.variants();
        assert_eq!(host[0].params.host_agent_temperature, 0.0);
        assert_eq!(host[0].parameter, "host_agent_temperature");
        assert_eq!(host[1].value, json!(0.2));
    }

    #[test]
    fn prompt_sweeps_use_penguin_and_version_numbers() {
        for sweep in [Sweep::GuessingPrompt, Sweep::HostPrompt] {
            let variants = sweep.variants();
            assert_eq!(variants.len(), 2);
            assert!(variants.iter().all(|v| v.params.topic == "penguin"));
            assert_eq!(variants[0].value, json!(1));
            assert_eq!(variants[1].value, json!(2));
            assert_ne!(variants[0].params, variants[1].params);
        }
    }

    #[test]
    fn topic_sweep_overrides_topic_only() {
        let variants = Sweep::Topic.variants();
        let topics: Vec<_> = variants.iter().map(|v| v.params.topic.as_str()).collect();
        assert_eq!(topics, TOPICS);
        assert!(
            variants
                .iter()
                .all(|v| v.params.host_agent_additional_instructions == HOST_INSTRUCTIONS_V1)
        );
    }

    #[test]
    fn every_variant_is_playable() {
        for sweep in Sweep::ALL {
            for variant in sweep.variants() {
                assert!(variant.params.validate().is_ok());
            }
        }
    }
}
