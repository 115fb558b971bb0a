//! Role prompts for the host and the guesser.
//!
//! Each agent's instructions are a fixed preamble followed by a
//! caller-supplied fragment. The host fragment may mention the secret topic
//! through the [`TOPIC_PLACEHOLDER`]; it is substituted once, when the agent
//! is built, never at call time.

/// Placeholder in host fragments that is replaced by the secret topic.
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// First line of every host prompt.
pub const HOST_PREAMBLE: &str = "You are playing a game of 20 questions as the host agent.";

/// First line of every guesser prompt.
pub const GUESSER_PREAMBLE: &str = "You are playing a game of 20 questions as the guessing agent.";

/// Guesser fragment used by the baseline configuration (prompt version 1).
pub const GUESSING_INSTRUCTIONS_V1: &str = "\
Your goal is to guess what the user is thinking of in fewest questions possible.
You must only ask questions that are binary yes/no questions to the best of your ability.
You must only play the game, and not ask any questions outside of the game.";

/// Guesser fragment that also describes what a good question is (version 2).
pub const GUESSING_INSTRUCTIONS_V2: &str = "\
Your goal is to guess what the user is thinking of in fewest questions possible.
You must only ask questions that are binary yes/no questions to the best of your ability.
A good question is one that can cut down the number of possible options as much as possible.
You must only play the game, and not ask any questions outside of the game.";

/// Host fragment used by the baseline configuration (prompt version 1).
pub const HOST_INSTRUCTIONS_V1: &str = "\
The secret topic is {topic} and the user is trying to guess it.
You must answer the user's questions with yes or no truthfully.
You must not reveal the secret topic {topic} to the user.
You must only play the game, and not answer or ask any questions outside of the game.";

/// Host fragment that also forbids changing the topic mid-game (version 2).
pub const HOST_INSTRUCTIONS_V2: &str = "\
The secret topic is {topic} and the user is trying to guess it.
You must answer the user's questions with yes or no truthfully.
You must not change the topic in any way during the game.
You must not reveal the secret topic {topic} to the user.
You must only play the game, and not answer or ask any questions outside of the game.";

/// Baseline guesser fragment.
pub fn default_guessing_instructions() -> String {
    GUESSING_INSTRUCTIONS_V1.to_string()
}

/// Baseline host fragment.
pub fn default_host_instructions() -> String {
    HOST_INSTRUCTIONS_V1.to_string()
}

/// Replace every [`TOPIC_PLACEHOLDER`] in `template` with `topic`.
pub fn render_topic(template: &str, topic: &str) -> String {
    template.replace(TOPIC_PLACEHOLDER, topic)
}

/// Full host system prompt with the topic interpolated.
pub fn host_instructions(topic: &str, fragment: &str) -> String {
    join_preamble(HOST_PREAMBLE, &render_topic(fragment, topic))
}

/// Full guesser system prompt. The fragment is used verbatim.
pub fn guesser_instructions(fragment: &str) -> String {
    join_preamble(GUESSER_PREAMBLE, fragment)
}

fn join_preamble(preamble: &str, fragment: &str) -> String {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        preamble.to_string()
    } else {
        format!("{preamble}\n{fragment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_prompt_interpolates_every_placeholder() {
        let prompt = host_instructions("penguin", HOST_INSTRUCTIONS_V1);
        assert!(prompt.starts_with(HOST_PREAMBLE));
        assert_eq!(prompt.matches("penguin").count(), 2);
        assert!(!prompt.contains(TOPIC_PLACEHOLDER));
    }

    #[test]
    fn guesser_prompt_is_verbatim() {
        let fragment = "Mention {topic} literally.";
        let prompt = guesser_instructions(fragment);
        assert!(prompt.starts_with(GUESSER_PREAMBLE));
        assert!(prompt.ends_with(fragment));
    }

    #[test]
    fn empty_fragment_leaves_preamble_only() {
        assert_eq!(guesser_instructions("  "), GUESSER_PREAMBLE);
        assert_eq!(host_instructions("pear", ""), HOST_PREAMBLE);
    }

    #[test]
    fn prompt_versions_differ() {
        assert_ne!(GUESSING_INSTRUCTIONS_V1, GUESSING_INSTRUCTIONS_V2);
        assert!(HOST_INSTRUCTIONS_V2.contains("must not change the topic"));
    }
}
