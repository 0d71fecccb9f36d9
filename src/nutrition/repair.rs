//! Best-effort repair of near-JSON model output.
//!
//! The rules run in the order of [`RULES`]; each later rule assumes the earlier
//! ones already ran. The chain stops as soon as the text parses as a JSON object,
//! so an object that is already valid comes back untouched. Other JSON values
//! (an array wrapping the object, a bare string) still go through the rules.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref CODE_FENCE_RE: Regex = Regex::new(r"```[A-Za-z0-9_+\-]*").unwrap();
    static ref ADJACENT_OBJECTS_RE: Regex = Regex::new(r"\}\s*\{").unwrap();
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",[\s,]*\}").unwrap();
    static ref BARE_KEY_RE: Regex =
        Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)(\s*):").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairRule {
    StripCodeFences,
    TrimToOuterBraces,
    JoinAdjacentObjects,
    DropTrailingCommas,
    QuoteBareKeys,
}

pub const RULES: [RepairRule; 5] = [
    RepairRule::StripCodeFences,
    RepairRule::TrimToOuterBraces,
    RepairRule::JoinAdjacentObjects,
    RepairRule::DropTrailingCommas,
    RepairRule::QuoteBareKeys,
];

impl RepairRule {
    pub fn name(self) -> &'static str {
        match self {
            RepairRule::StripCodeFences => "strip_code_fences",
            RepairRule::TrimToOuterBraces => "trim_to_outer_braces",
            RepairRule::JoinAdjacentObjects => "join_adjacent_objects",
            RepairRule::DropTrailingCommas => "drop_trailing_commas",
            RepairRule::QuoteBareKeys => "quote_bare_keys",
        }
    }

    pub fn apply(self, text: &str) -> String {
        match self {
            RepairRule::StripCodeFences => strip_code_fences(text),
            RepairRule::TrimToOuterBraces => trim_to_outer_braces(text),
            RepairRule::JoinAdjacentObjects => ADJACENT_OBJECTS_RE
                .replace_all(text, "},{")
                .into_owned(),
            RepairRule::DropTrailingCommas => TRAILING_COMMA_RE.replace_all(text, "}").into_owned(),
            RepairRule::QuoteBareKeys => BARE_KEY_RE
                .replace_all(text, "$1\"$2\"$3:")
                .into_owned(),
        }
    }
}

/// Runs every rule in order. Never fails; text that cannot be rescued is
/// returned in whatever shape the rules left it and fails to parse later.
pub fn repair(text: &str) -> String {
    let mut out = text.to_string();
    for rule in RULES {
        if parses_as_object(&out) {
            break;
        }
        let next = rule.apply(&out);
        if next != out {
            debug!(rule = rule.name(), "repair rule rewrote model output");
            out = next;
        }
    }
    out
}

fn parses_as_object(text: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(text),
        Ok(serde_json::Value::Object(_))
    )
}

// Removing one fence can glue stray backticks into a new one, so run to a fixpoint.
fn strip_code_fences(text: &str) -> String {
    let mut out = text.to_string();
    while CODE_FENCE_RE.is_match(&out) {
        out = CODE_FENCE_RE.replace_all(&out, "").into_owned();
    }
    out
}

fn trim_to_outer_braces(text: &str) -> String {
    let Some(start) = text.find('{') else {
        return String::new();
    };
    let body = &text[start..];
    match body.rfind('}') {
        Some(end) => body[..=end].to_string(),
        None => body.trim_end().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        r#"{"foodName":"Apple","calories":95}"#,
        "```json\n{\"foodName\":\"Apple\",\"calories\":95}\n```",
        "```\n{foodName: \"Rice\", calories: 200,}\n```",
        "Sure! Here is the estimate: {calories: 10, macronutrients: {protein: 1, carbs: 2, fats: 3,},} Hope it helps.",
        r#"{"a":1}{"b":2}"#,
        "{a:1}\n\n{b:2,}",
        "no braces at all",
        "",
        "{ unterminated: 1,",
        "``````json{x:1}``` ```",
        "{\"note\": \"eat less, salt: bad\"}",
        "[1, 2, 3]",
        "{foodName:\"Soup\" calories:120}",
    ];

    #[test]
    fn valid_json_passes_through_unchanged() {
        let inputs = [
            r#"{"foodName":"Apple","calories":95,"macronutrients":{"protein":0.3,"carbs":25.2,"fats":0.2},"healthinessRating":8,"healthierAlternative":null}"#,
            "  {\n  \"note\": \"eat less, salt: bad\",\n  \"x\": [1, 2]\n}\n",
            r#"{"code":"```json"}"#,
        ];
        for input in inputs {
            assert_eq!(repair(input), input);
        }
    }

    #[test]
    fn repair_is_idempotent() {
        for sample in SAMPLES {
            let once = repair(sample);
            assert_eq!(repair(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn each_rule_is_idempotent_on_its_own_output() {
        for rule in RULES {
            for sample in SAMPLES {
                let once = rule.apply(sample);
                assert_eq!(rule.apply(&once), once, "{} on {sample:?}", rule.name());
            }
        }
    }

    #[test]
    fn strips_fences_with_and_without_language_tag() {
        assert_eq!(
            RepairRule::StripCodeFences.apply("```json\n{}\n```"),
            "\n{}\n"
        );
        assert_eq!(RepairRule::StripCodeFences.apply("```\n{}```"), "\n{}");
    }

    #[test]
    fn trims_prose_around_the_object() {
        assert_eq!(
            RepairRule::TrimToOuterBraces.apply("Here you go: {\"a\": {\"b\": 1}} thanks!"),
            "{\"a\": {\"b\": 1}}"
        );
        assert_eq!(RepairRule::TrimToOuterBraces.apply("nothing here"), "");
    }

    #[test]
    fn joins_adjacent_objects() {
        assert_eq!(
            RepairRule::JoinAdjacentObjects.apply("{\"a\":1}  \n{\"b\":2}"),
            "{\"a\":1},{\"b\":2}"
        );
    }

    #[test]
    fn drops_trailing_commas_before_closing_brace() {
        assert_eq!(
            RepairRule::DropTrailingCommas.apply("{\"a\": {\"b\": 1,\n}, }"),
            "{\"a\": {\"b\": 1}}"
        );
    }

    #[test]
    fn quotes_bare_keys_only_in_key_position() {
        assert_eq!(
            RepairRule::QuoteBareKeys.apply("{foodName: \"Rice\", calories : 200}"),
            "{\"foodName\": \"Rice\", \"calories\" : 200}"
        );
        assert_eq!(
            RepairRule::QuoteBareKeys.apply("{\"time\": \"12:30\"}"),
            "{\"time\": \"12:30\"}"
        );
    }

    #[test]
    fn full_chain_rescues_typical_model_output() {
        let raw = "```json\nHere is the data:\n{foodName: \"Apple\", calories: 95, macronutrients: {protein: 0.3, carbs: 25, fats: 0.2,}, healthinessRating: 8,}\n```";
        let repaired = repair(raw);
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["foodName"], "Apple");
        assert_eq!(value["macronutrients"]["carbs"], 25);
        assert_eq!(value["healthinessRating"], 8);
    }

    #[test]
    fn array_wrapped_object_is_unwrapped() {
        assert_eq!(
            repair(r#"[{"foodName":"Apple","calories":95}]"#),
            r#"{"foodName":"Apple","calories":95}"#
        );
        assert_eq!(repair("[1, 2, 3]"), "");
    }

    #[test]
    fn text_without_braces_does_not_parse() {
        let repaired = repair("I could not identify that food.");
        assert!(serde_json::from_str::<serde_json::Value>(&repaired).is_err());
    }
}
