//! Instruction prompt built from source text and cognitive knobs.
//!
//! The template text is parsed back by downstream consumers. Keep it byte-stable.

use crate::knobs::models::CognitiveKnob;

pub const SOURCE_TEXT_HEADER: &str = "SOURCE TEXT:";
pub const PARAMETERS_HEADER: &str = "COGNITIVE PARAMETERS:";
pub const CLOSING_INSTRUCTION: &str = "Transform the source text according to these cognitive parameters. \
    Apply all parameters simultaneously to produce a modified version.";

/// Builds the user prompt. With no knobs the source text passes through untouched.
pub fn build_prompt(source_text: &str, cognitive_knobs: &[CognitiveKnob], system_prompt: &str) -> String {
    if cognitive_knobs.is_empty() {
        return source_text.to_string();
    }

    let knob_lines = cognitive_knobs
        .iter()
        .map(knob_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{system_prompt}\n\n{SOURCE_TEXT_HEADER}\n{source_text}\n\n{PARAMETERS_HEADER}\n{knob_lines}\n\n{CLOSING_INSTRUCTION}"
    )
}

fn knob_line(knob: &CognitiveKnob) -> String {
    format!("- {}: {}/100 ({})", knob.name, knob.value, knob.description)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knob(name: &str, value: f64, description: &str) -> CognitiveKnob {
        CognitiveKnob {
            id: name.to_lowercase(),
            name: name.to_string(),
            description: description.to_string(),
            value,
            low_label: None,
            high_label: None,
        }
    }

    #[test]
    fn test_single_knob_matches_template_exactly() {
        let prompt = build_prompt(
            "The cat sat.",
            &[knob("Abstraction", 80.0, "...")],
            "Transform this.",
        );
        assert_eq!(
            prompt,
            "Transform this.\n\nSOURCE TEXT:\nThe cat sat.\n\nCOGNITIVE PARAMETERS:\n- Abstraction: 80/100 (...)\n\nTransform the source text according to these cognitive parameters. Apply all parameters simultaneously to produce a modified version."
        );
    }

    #[test]
    fn test_empty_knobs_pass_source_through() {
        let source = "  keep\nexactly as is  ";
        assert_eq!(build_prompt(source, &[], "ignored system prompt"), source);
    }

    #[test]
    fn test_knobs_listed_once_in_input_order() {
        let knobs = vec![
            knob("Zeta", 10.0, "last letter"),
            knob("Alpha", 95.0, "first letter"),
            knob("Mid", 42.5, "somewhere between"),
        ];
        let prompt = build_prompt("text", &knobs, "sys");

        let positions: Vec<usize> = [
            "- Zeta: 10/100 (last letter)",
            "- Alpha: 95/100 (first letter)",
            "- Mid: 42.5/100 (somewhere between)",
        ]
        .iter()
        .map(|line| {
            assert_eq!(prompt.matches(line).count(), 1, "{line} should appear once");
            prompt.find(line).unwrap()
        })
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_source_text_is_verbatim() {
        let source = "Line one.\n\nLine three with {braces} and 100%.";
        let prompt = build_prompt(source, &[knob("Tone", 0.0, "flat")], "sys");
        assert!(prompt.contains(&format!("SOURCE TEXT:\n{source}\n\nCOGNITIVE PARAMETERS:")));
        assert!(prompt.starts_with("sys\n\n"));
        assert!(prompt.ends_with(CLOSING_INSTRUCTION));
    }
}
