/// Characters that survive sanitization besides ASCII letters and digits.
const ALLOWED_PUNCTUATION: [char; 4] = [' ', '-', '_', '.'];

/// Strips every character that is not an ASCII letter, ASCII digit, space,
/// `-`, `_` or `.`. Dropped characters are not replaced, so distinct inputs can
/// collapse to the same output and the result may be empty.
pub fn sanitize(candidate: &str) -> String {
    candidate.chars().filter(|c| is_allowed(*c)).collect()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(&c)
}
