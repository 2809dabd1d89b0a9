//! Dot-separated topic patterns with `*` (one token) and `#` (zero or more tokens).

const TOKEN_SEPARATOR: char = '.';
const SINGLE_WORD: &str = "*";
const MULTI_WORD: &str = "#";

#[derive(Clone, Debug, Eq, PartialEq)]
enum PatternToken {
    Literal(String),
    SingleWord,
    MultiWord,
}

/// A binding pattern compiled once at bind time and matched on every publish.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TopicPattern {
    tokens: Vec<PatternToken>,
    has_wildcards: bool,
    source: String,
}

impl TopicPattern {
    pub(crate) fn compile(pattern: &str) -> Self {
        let mut tokens: Vec<PatternToken> = Vec::new();
        for token in pattern.split(TOKEN_SEPARATOR) {
            let token = match token {
                SINGLE_WORD => PatternToken::SingleWord,
                MULTI_WORD => PatternToken::MultiWord,
                literal => PatternToken::Literal(literal.to_string()),
            };
            // `#.#` matches exactly what `#` matches
            if token == PatternToken::MultiWord && tokens.last() == Some(&PatternToken::MultiWord) {
                continue;
            }
            tokens.push(token);
        }

        let has_wildcards = tokens
            .iter()
            .any(|token| !matches!(token, PatternToken::Literal(_)));

        Self {
            tokens,
            has_wildcards,
            source: pattern.to_string(),
        }
    }

    pub(crate) fn matches(&self, routing_key: &str) -> bool {
        if !self.has_wildcards {
            return self.source == routing_key;
        }

        let key: Vec<&str> = routing_key.split(TOKEN_SEPARATOR).collect();
        let key_len = key.len();

        // tail[j] holds whether the remaining pattern tokens match key[j..]
        let mut tail = vec![false; key_len + 1];
        tail[key_len] = true;

        for token in self.tokens.iter().rev() {
            let mut current = vec![false; key_len + 1];
            for j in (0..=key_len).rev() {
                current[j] = match token {
                    PatternToken::MultiWord => tail[j] || (j < key_len && current[j + 1]),
                    PatternToken::SingleWord => j < key_len && tail[j + 1],
                    PatternToken::Literal(literal) => {
                        j < key_len && key[j] == literal && tail[j + 1]
                    }
                };
            }
            tail = current;
        }

        tail[0]
    }
}
