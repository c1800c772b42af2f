//! Confidence extraction from free-form model output.
//!
//! Hypothesis prompts ask the model to finish with a confidence line. These
//! functions pull that self-reported score back out. Pure text handling, no I/O.
//!
//! # Supported Formats
//!
//! | Format | Example | Parsed |
//! |--------|---------|--------|
//! | Decimal | `Confidence: 0.8` | 0.8 |
//! | Percentage | `Confidence: 80%` | 0.8 |
//! | Fraction | `Confidence: 8/10` | 0.8 |
//! | JSON | `{"confidence": 0.8}` | 0.8 |

/// Parse a confidence value into `[0, 1]`.
///
/// Values above 1 without a `%` are read as percentages.
///
/// ```
/// use superposition_domain::hypothesis::parsing::parse_confidence_value;
///
/// assert_eq!(parse_confidence_value("0.75"), Some(0.75));
/// assert_eq!(parse_confidence_value("75%"), Some(0.75));
/// assert_eq!(parse_confidence_value("3/4"), Some(0.75));
/// assert_eq!(parse_confidence_value("high"), None);
/// ```
pub fn parse_confidence_value(raw: &str) -> Option<f64> {
    let raw = raw
        .trim()
        .trim_end_matches(|c: char| c == '.' || c == ',' || c == '*')
        .trim_start_matches('*')
        .trim();

    if let Some(pct) = raw.strip_suffix('%') {
        let value: f64 = pct.trim().parse().ok()?;
        return Some((value / 100.0).clamp(0.0, 1.0));
    }

    if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den <= 0.0 {
            return None;
        }
        return Some((num / den).clamp(0.0, 1.0));
    }

    let value: f64 = raw.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    if value > 1.0 {
        Some((value / 100.0).clamp(0.0, 1.0))
    } else {
        Some(value.max(0.0))
    }
}

/// Parse a single line as a confidence marker.
fn parse_marker_line(line: &str) -> Option<f64> {
    let trimmed = line.trim().trim_start_matches(['*', '_', '-', ' ']);

    if trimmed.starts_with('{')
        && let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed)
    {
        return value.get("confidence").and_then(|v| match v {
            serde_json::Value::Number(n) => n.as_f64().and_then(|f| parse_confidence_value(&f.to_string())),
            serde_json::Value::String(s) => parse_confidence_value(s),
            _ => None,
        });
    }

    let lower = trimmed.to_lowercase();
    let rest = lower.strip_prefix("confidence")?;
    let rest = rest.trim_start_matches(['*', '_', ' ']);
    let rest = rest.strip_prefix(':').or_else(|| rest.strip_prefix('='))?;
    parse_confidence_value(rest)
}

/// Split model output into the answer body and its self-reported confidence.
///
/// A trailing confidence line is removed from the answer. A confidence line
/// elsewhere in the text is still parsed but left in place.
///
/// ```
/// use superposition_domain::hypothesis::parsing::split_confidence;
///
/// let (answer, confidence) = split_confidence("Paris.\n\nConfidence: 0.9");
/// assert_eq!(answer, "Paris.");
/// assert_eq!(confidence, Some(0.9));
/// ```
pub fn split_confidence(output: &str) -> (String, Option<f64>) {
    let lines: Vec<&str> = output.lines().collect();

    if let Some(last) = lines.iter().rposition(|l| !l.trim().is_empty())
        && let Some(confidence) = parse_marker_line(lines[last])
    {
        let answer = lines[..last].join("\n").trim_end().to_string();
        return (answer, Some(confidence));
    }

    let confidence = lines.iter().find_map(|l| parse_marker_line(l));
    (output.trim_end().to_string(), confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_formats() {
        assert_eq!(parse_confidence_value("0.6"), Some(0.6));
        assert_eq!(parse_confidence_value("60%"), Some(0.6));
        assert_eq!(parse_confidence_value("6/10"), Some(0.6));
        assert_eq!(parse_confidence_value("60"), Some(0.6));
        assert_eq!(parse_confidence_value("**0.6**"), Some(0.6));
    }

    #[test]
    fn test_value_clamped() {
        assert_eq!(parse_confidence_value("150%"), Some(1.0));
        assert_eq!(parse_confidence_value("-0.5"), Some(0.0));
        assert_eq!(parse_confidence_value("12/10"), Some(1.0));
        assert_eq!(parse_confidence_value("1/0"), None);
    }

    #[test]
    fn test_trailing_marker_stripped() {
        let (answer, confidence) = split_confidence("The answer is 42.\nConfidence: 85%\n\n");
        assert_eq!(answer, "The answer is 42.");
        assert_eq!(confidence, Some(0.85));
    }

    #[test]
    fn test_markdown_marker() {
        let (answer, confidence) = split_confidence("Use a mutex.\n\n**Confidence:** 0.7");
        assert_eq!(answer, "Use a mutex.");
        assert_eq!(confidence, Some(0.7));
    }

    #[test]
    fn test_json_marker() {
        let (answer, confidence) = split_confidence("Blue.\n{\"confidence\": 0.4}");
        assert_eq!(answer, "Blue.");
        assert_eq!(confidence, Some(0.4));
    }

    #[test]
    fn test_inline_marker_kept() {
        let text = "Confidence: 0.5\nThen the long explanation.";
        let (answer, confidence) = split_confidence(text);
        assert_eq!(answer, text);
        assert_eq!(confidence, Some(0.5));
    }

    #[test]
    fn test_no_marker() {
        let (answer, confidence) = split_confidence("Just an answer.");
        assert_eq!(answer, "Just an answer.");
        assert_eq!(confidence, None);
    }

    #[test]
    fn test_word_starting_with_confidence_is_not_a_marker() {
        let (_, confidence) = split_confidence("Confidently wrong: 0.3");
        assert_eq!(confidence, None);
    }
}
