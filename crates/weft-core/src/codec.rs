//! ChainCodec - ChainDefinition とバイト列の相互変換
//!
//! # フォーマット
//! JSON のエンベロープにバージョンを付けて保存します。
//!
//! ```text
//! {"version":1,"chain":{"id":"...","steps":[[{"kind":"a"}],[{"kind":"b"},{"kind":"c"}]]}}
//! ```
//!
//! decode 時に以下を検証し、満たさないものは壊れた定義として扱います。
//! - 未知のバージョン
//! - ステップが 0 個のチェーン
//! - 空のステップ（`Step` の deserialize で拒否）

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ChainDefinition;

pub const CODEC_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("chain encode: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("chain decode: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("unsupported chain codec version {0}")]
    UnsupportedVersion(u32),

    #[error("chain has no steps")]
    EmptyChain,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    chain: &'a ChainDefinition,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    chain: serde_json::Value,
}

pub struct ChainCodec;

impl ChainCodec {
    pub fn encode(chain: &ChainDefinition) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(&EnvelopeRef {
            version: CODEC_VERSION,
            chain,
        })
        .map_err(CodecError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<ChainDefinition, CodecError> {
        let envelope: Envelope = serde_json::from_slice(bytes).map_err(CodecError::Decode)?;
        if envelope.version != CODEC_VERSION {
            return Err(CodecError::UnsupportedVersion(envelope.version));
        }
        let chain: ChainDefinition =
            serde_json::from_value(envelope.chain).map_err(CodecError::Decode)?;
        if chain.steps().is_empty() {
            return Err(CodecError::EmptyChain);
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChainId, Constraints, NetworkType, Step, TaskSpec};
    use rstest::rstest;
    use std::time::Duration;

    fn chain_of(kinds: &[&[&str]]) -> ChainDefinition {
        let steps = kinds
            .iter()
            .map(|step| Step::parallel(step.iter().map(|k| TaskSpec::new(*k))).unwrap())
            .collect();
        ChainDefinition::new(ChainId::new("chain-1"), steps).unwrap()
    }

    #[rstest]
    #[case::single_task(chain_of(&[&["a"]]))]
    #[case::parallel_groups(chain_of(&[&["a"], &["b", "c", "d"], &["e", "f"]]))]
    #[case::special_characters(chain_of(&[&["ünï/cødé \"kind\"\n\t", "with spaces & {braces}"]]))]
    #[case::many_steps(chain_of(&[&["1"], &["2"], &["3"], &["4"], &["5"], &["6"], &["7", "8"]]))]
    fn roundtrip_preserves_definition(#[case] chain: ChainDefinition) {
        let bytes = ChainCodec::encode(&chain).unwrap();
        let back = ChainCodec::decode(&bytes).unwrap();
        assert_eq!(back, chain);
    }

    #[test]
    fn roundtrip_keeps_payloads_and_constraints() {
        let chain = ChainDefinition::new(
            ChainId::new("chain-2"),
            vec![
                Step::single(TaskSpec::new("empty").with_payload(Vec::new())),
                Step::parallel([
                    TaskSpec::new("binary").with_payload(vec![0u8, 255, 10, 13]),
                    TaskSpec::new("constrained").with_constraints(
                        Constraints::default()
                            .with_network(NetworkType::Unmetered)
                            .requiring_device_idle()
                            .with_max_run(Duration::from_secs(3)),
                    ),
                ])
                .unwrap(),
            ],
        )
        .unwrap();

        let back = ChainCodec::decode(&ChainCodec::encode(&chain).unwrap()).unwrap();
        assert_eq!(back, chain);
        assert_eq!(back.steps()[0].tasks()[0].payload, Some(Vec::new()));
    }

    #[rstest]
    #[case::not_json(b"garbage".as_slice())]
    #[case::wrong_shape(br#"{"version":1,"chain":{"id":"x"}}"#.as_slice())]
    #[case::empty_step(br#"{"version":1,"chain":{"id":"x","steps":[[]]}}"#.as_slice())]
    fn malformed_bytes_fail_to_decode(#[case] bytes: &[u8]) {
        assert!(matches!(
            ChainCodec::decode(bytes),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn empty_chain_fails_to_decode() {
        let bytes = br#"{"version":1,"chain":{"id":"x","steps":[]}}"#;
        assert!(matches!(
            ChainCodec::decode(bytes),
            Err(CodecError::EmptyChain)
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let bytes = br#"{"version":7,"chain":{"id":"x","steps":[[{"kind":"a"}]]}}"#;
        assert!(matches!(
            ChainCodec::decode(bytes),
            Err(CodecError::UnsupportedVersion(7))
        ));
    }
}
