use crate::state::RunState;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Canonical JSON of the hashable subset of a run. Object keys come out
/// lexicographically sorted (serde_json maps are ordered), arrays keep their
/// order, and the transient decision state (the parked prompt and the
/// interpreter queue) is stripped: replays re-derive both from the log.
pub fn canonical_state_json(state: &RunState) -> String {
    let mut value = serde_json::to_value(state).expect("run state serializes to JSON");
    if let Value::Object(map) = &mut value {
        map.remove("pending_prompt");
        map.remove("effect_queue");
    }
    serde_json::to_string(&value).expect("canonical value prints")
}

/// SHA-256 of the canonical state, hex lowercase. The parity anchor: equal
/// states hash equal on every platform and implementation.
pub fn hash_state(state: &RunState) -> String {
    let digest = Sha256::digest(canonical_state_json(state).as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_64_hex_chars() {
        // Shape check against a fixed input, independent of RunState.
        let digest = Sha256::digest(b"gambit");
        let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
