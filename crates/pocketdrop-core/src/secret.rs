//! Shared secret generation
//!
//! Secrets look like `4821-amber-falcon-river`: four digits followed by
//! three words, easy to read aloud to the person on the other end.

/// Number of words in a generated secret
pub const SECRET_WORDS: usize = 3;

const WORDS: [&str; 128] = [
    "acid", "actor", "agent", "alarm", "album", "alpha", "amber", "angle",
    "apple", "arena", "arrow", "atlas", "badge", "basil", "beach", "berry",
    "bison", "blade", "blaze", "bloom", "board", "bonus", "brave", "brick",
    "cabin", "camel", "candy", "canoe", "cargo", "cedar", "chalk", "chess",
    "cider", "cloud", "cobra", "comet", "coral", "crane", "crisp", "cube",
    "delta", "denim", "disco", "dome", "dove", "drift", "eagle", "ember",
    "epoch", "fable", "falcon", "fern", "fiber", "flame", "flute", "forge",
    "fox", "frost", "gecko", "giant", "glade", "globe", "grape", "gravel",
    "harbor", "hazel", "heron", "honey", "igloo", "index", "iris", "ivory",
    "jade", "jazz", "jelly", "jolly", "karma", "kayak", "kiwi", "koala",
    "lemon", "lilac", "linen", "lotus", "lunar", "mango", "maple", "marble",
    "meadow", "melon", "mint", "mocha", "nectar", "noble", "north", "nova",
    "oasis", "olive", "onyx", "opal", "orbit", "otter", "panda", "pearl",
    "pepper", "pilot", "pixel", "plaza", "polar", "quartz", "quill", "radar",
    "raven", "reef", "river", "robin", "saddle", "salsa", "sierra", "solar",
    "spruce", "tango", "tiger", "topaz", "tulip", "velvet", "violet", "zebra",
];

/// Generate a random human-readable secret (e.g., "4821-amber-falcon-river")
///
/// # Panics
/// Panics if the system random number generator fails (extremely rare).
/// Use `try_generate_secret` if you need to handle this case.
pub fn generate_secret() -> String {
    try_generate_secret().expect("RNG failed - system entropy source unavailable")
}

/// Try to generate a random secret, returning an error if RNG fails
pub fn try_generate_secret() -> Result<String, getrandom::Error> {
    let mut bytes = [0u8; 2 + SECRET_WORDS];
    getrandom::fill(&mut bytes)?;

    let number = u16::from_le_bytes([bytes[0], bytes[1]]) % 10_000;
    let mut secret = format!("{:04}", number);
    for b in &bytes[2..] {
        secret.push('-');
        secret.push_str(WORDS[(*b as usize) % WORDS.len()]);
    }

    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_shape() {
        let secret = generate_secret();
        let parts: Vec<&str> = secret.split('-').collect();
        assert_eq!(parts.len(), 1 + SECRET_WORDS);
        assert_eq!(parts[0].len(), 4);
        assert!(parts[0].bytes().all(|b| b.is_ascii_digit()));
        for word in &parts[1..] {
            assert!(WORDS.contains(word), "unexpected word {}", word);
        }
    }

    #[test]
    fn test_secrets_differ() {
        // ~2^34 possibilities, a collision here means the RNG is broken
        let a = generate_secret();
        let b = generate_secret();
        assert_ne!(a, b);
    }

    #[test]
    fn test_word_list_has_no_separators() {
        assert!(WORDS.iter().all(|w| !w.is_empty() && !w.contains('-')));
    }
}
