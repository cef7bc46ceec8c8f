use serde_json;

/// Renders `text` as a double-quoted, escaped string for error messages.
pub fn quote(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

/// Converts a string to PascalCase.
/// - If the string contains underscores, it splits on underscores and
///   capitalizes the first letter of each word.
/// - Otherwise it only makes sure the first letter is uppercase, so
///   `SensorData` stays as it is.
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect::<String>()
}

/// Converts a string to snake_case.
/// This implementation avoids inserting underscores between consecutive uppercase letters,
/// so that acronyms remain intact (e.g. "sessionID" becomes "session_id").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                // Insert an underscore if the previous character is not uppercase,
                // or if the next character exists and is lowercase.
                if (!prev.is_uppercase() && prev != '_')
                    || (i + 1 < chars.len() && chars[i + 1].is_lowercase() && prev != '_')
                {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}
