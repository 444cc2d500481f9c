//! Block JSON -> IR conversion.

use em_ir::{Block, Channel, Composition, Hand, Instruction, Params, SyncPoint, Timing};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::BmlError;

/// Parse a JSON block description into a [`Block`].
///
/// Unknown channel keys are skipped (forward compatibility); instructions
/// that cannot be built are skipped with a warning, leaving the rest of
/// the block intact.
pub fn parse_block(json: &str) -> Result<Block, BmlError> {
    let value: Value = serde_json::from_str(json)?;
    let obj = value.as_object().ok_or(BmlError::NotAnObject)?;

    let mut block = Block::new();
    if let Some(id) = obj.get("id").and_then(Value::as_str) {
        block = block.with_id(id);
    }
    if let Some(mode) = obj.get("composition").and_then(Value::as_str) {
        block = block.composed(Composition::from_name(mode));
    }
    if let Some(start) = obj.get("start").and_then(Value::as_f64) {
        block = block.starting_at(start);
    }

    for (key, entry) in obj {
        if matches!(key.as_str(), "id" | "composition" | "start") {
            continue;
        }
        let Some(channel) = Channel::from_name(key) else {
            debug!(key = key.as_str(), "skipping unknown channel key");
            continue;
        };
        // One instruction object, or an array of simultaneous ones.
        let entries: Vec<&Map<String, Value>> = match entry {
            Value::Object(m) => vec![m],
            Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
            _ => {
                warn!(channel = channel.name(), "channel entry is neither object nor array");
                continue;
            }
        };
        for fields in entries {
            match parse_instruction(channel, fields) {
                Ok(instruction) => block = block.push(instruction),
                Err(err) => warn!(channel = channel.name(), %err, "skipping instruction"),
            }
        }
    }

    Ok(block)
}

/// Build one instruction from its JSON fields.
fn parse_instruction(
    channel: Channel,
    fields: &Map<String, Value>,
) -> Result<Instruction, BmlError> {
    let mut timing = Timing::new();
    for point in SyncPoint::ALL {
        if let Some(v) = fields.get(point.name()) {
            match v.as_f64() {
                Some(seconds) => timing.set(point, seconds),
                // Non-numeric sync values are treated as missing; the
                // resolver's default table fills the gap.
                None => debug!(
                    channel = channel.name(),
                    point = point.name(),
                    "ignoring non-numeric sync point"
                ),
            }
        }
    }

    let f = |key: &str, default: f32| {
        fields.get(key).and_then(Value::as_f64).map(|v| v as f32).unwrap_or(default)
    };

    let params = match channel {
        Channel::Blink => Params::Blink { amount: f("amount", 1.0) },
        Channel::Gaze => Params::Gaze {
            target: vec2_field(fields, "target").unwrap_or([0.0, 0.0]),
            influence: f("influence", 1.0),
        },
        Channel::Head => Params::Head {
            rotation: vec3_field(fields, "rotation").unwrap_or([0.0, 0.0, 0.0]),
        },
        Channel::Face => {
            let lexeme = str_field(fields, "lexeme").ok_or(BmlError::BadInstruction {
                channel: channel.name(),
                reason: "missing lexeme",
            })?;
            return Ok(Instruction::face(timing, lexeme, f("amount", 1.0)));
        }
        Channel::Gesture => {
            let lexeme = str_field(fields, "lexeme").ok_or(BmlError::BadInstruction {
                channel: channel.name(),
                reason: "missing lexeme",
            })?;
            return Ok(Instruction::gesture(
                timing,
                lexeme,
                f("amount", 1.0),
                Hand::from_name(str_field(fields, "hand").unwrap_or("right")),
            ));
        }
        Channel::Posture => Params::Posture { lean: f("lean", 0.0) },
        Channel::Speech => {
            let text = str_field(fields, "text").ok_or(BmlError::BadInstruction {
                channel: channel.name(),
                reason: "missing text",
            })?;
            Params::Speech { text: text.to_owned(), rate: f("rate", 1.0) }
        }
    };
    Ok(Instruction::new(timing, params))
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

fn vec2_field(fields: &Map<String, Value>, key: &str) -> Option<[f32; 2]> {
    let arr = fields.get(key)?.as_array()?;
    match arr.as_slice() {
        [a, b] => Some([a.as_f64()? as f32, b.as_f64()? as f32]),
        _ => None,
    }
}

fn vec3_field(fields: &Map<String, Value>, key: &str) -> Option<[f32; 3]> {
    let arr = fields.get(key)?.as_array()?;
    match arr.as_slice() {
        [a, b, c] => Some([a.as_f64()? as f32, b.as_f64()? as f32, c.as_f64()? as f32]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_face_instruction() {
        let b = parse_block(
            r#"{"face": {"start": 0, "end": 1, "lexeme": "BROW_RAISER", "amount": 0.3},
                "composition": "MERGE"}"#,
        )
        .unwrap();
        assert_eq!(b.composition, Composition::Merge);
        assert_eq!(b.instructions.len(), 1);
        let i = &b.instructions[0];
        assert_eq!(i.channel, Channel::Face);
        assert_eq!(i.timing.start, Some(0.0));
        assert_eq!(i.timing.end, Some(1.0));
        match &i.params {
            Params::Face { lexeme, amount } => {
                assert_eq!(lexeme.as_str(), "BROW_RAISER");
                assert!((amount - 0.3).abs() < 1e-6);
            }
            other => panic!("unexpected params: {other:?}"),
        }
    }

    #[test]
    fn composition_is_case_insensitive_with_merge_default() {
        let b = parse_block(r#"{"composition": "replace"}"#).unwrap();
        assert_eq!(b.composition, Composition::Replace);
        let b = parse_block(r#"{}"#).unwrap();
        assert_eq!(b.composition, Composition::Merge);
    }

    #[test]
    fn unknown_channel_key_is_skipped() {
        let b = parse_block(
            r#"{"lipsync": {"start": 0, "end": 1},
                "blink": {"start": 0, "end": 0.2}}"#,
        )
        .unwrap();
        assert_eq!(b.instructions.len(), 1);
        assert_eq!(b.instructions[0].channel, Channel::Blink);
    }

    #[test]
    fn array_entry_yields_simultaneous_instructions() {
        let b = parse_block(
            r#"{"face": [
                {"start": 0, "end": 1, "lexeme": "BROW_RAISER"},
                {"start": 0, "end": 1, "lexeme": "JAW_DROP", "amount": 0.5}
            ]}"#,
        )
        .unwrap();
        assert_eq!(b.for_channel(Channel::Face).count(), 2);
    }

    #[test]
    fn face_without_lexeme_is_skipped_rest_survives() {
        let b = parse_block(
            r#"{"face": {"start": 0, "end": 1},
                "posture": {"start": 0, "end": 2, "lean": 0.4}}"#,
        )
        .unwrap();
        assert_eq!(b.instructions.len(), 1);
        assert_eq!(b.instructions[0].channel, Channel::Posture);
    }

    #[test]
    fn non_numeric_sync_point_is_treated_as_missing() {
        let b = parse_block(r#"{"blink": {"start": "soon", "end": 0.2}}"#).unwrap();
        let i = &b.instructions[0];
        assert_eq!(i.timing.start, None);
        assert_eq!(i.timing.end, Some(0.2));
    }

    #[test]
    fn sync_point_names_are_camel_case() {
        let b = parse_block(
            r#"{"gesture": {"start": 0, "attackPeak": 0.4, "strokeEnd": 0.8,
                            "end": 1.2, "lexeme": "BEAT", "hand": "left"}}"#,
        )
        .unwrap();
        let i = &b.instructions[0];
        assert_eq!(i.timing.attack_peak, Some(0.4));
        assert_eq!(i.timing.stroke_end, Some(0.8));
        match &i.params {
            Params::Gesture { hand, .. } => assert_eq!(*hand, Hand::Left),
            other => panic!("unexpected params: {other:?}"),
        }
    }

    #[test]
    fn structural_errors_propagate() {
        assert!(matches!(parse_block("not json"), Err(BmlError::Json(_))));
        assert!(matches!(parse_block("[1, 2]"), Err(BmlError::NotAnObject)));
    }

    #[test]
    fn block_start_and_id_parsed() {
        let b = parse_block(r#"{"id": "greet", "start": 0.5}"#).unwrap();
        assert_eq!(b.id.as_deref(), Some("greet"));
        assert_eq!(b.start, 0.5);
    }
}
