use serde::{Deserialize, Serialize};

/// Separates consecutive messages on the wire. Guaranteed by the server
/// never to occur inside an encoded message payload.
pub const DELIMITER: &str = ";;;";

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationInfo {
    pub name: String,
    pub abbr: String,
    #[serde(default)]
    pub description: String,
    pub run_count_default: i32,
    pub minimum_colors: u32,
    pub unlimited_colors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationToRunParams {
    pub animation: String,
    pub colors: Vec<u32>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub section: String,
    pub run_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientParams {
    #[serde(default)]
    pub send_defined_animation_info_on_connect: bool,
    #[serde(default)]
    pub send_section_info_on_connect: bool,
    #[serde(default)]
    pub send_strip_info_on_connect: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentStripColor {
    pub color: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndAnimation {
    pub id: String,
}

/// Free-text notice from the server. Wire tag "Message".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningAnimationParams {
    pub animation_name: String,
    pub colors: Vec<u32>,
    pub id: String,
    #[serde(default)]
    pub section: String,
    pub run_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    pub start_pixel: u32,
    pub end_pixel: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripInfo {
    pub num_leds: u32,
    #[serde(default)]
    pub pin: Option<u32>,
    pub render_delay: u64,
    #[serde(default)]
    pub is_render_logging_enabled: bool,
}

/// The closed set of message kinds exchanged with the server. Each frame
/// on the wire is one of these, tagged with a `type` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    AnimationInfo(AnimationInfo),
    AnimationToRunParams(AnimationToRunParams),
    ClientParams(ClientParams),
    Command(Command),
    CurrentStripColor(CurrentStripColor),
    EndAnimation(EndAnimation),
    #[serde(rename = "Message")]
    Notice(Notice),
    RunningAnimationParams(RunningAnimationParams),
    Section(Section),
    StripInfo(StripInfo),
}

impl Message {
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(frame)?)
    }

    /// Encodes a single message payload. Does not append [`DELIMITER`];
    /// the transport is responsible for terminating the frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_tagged_message() {
        let frame = r#"{"type":"EndAnimation","id":"anim-1"}"#;
        match Message::decode(frame).unwrap() {
            Message::EndAnimation(end) => assert_eq!(end.id, "anim-1"),
            other => panic!("decoded wrong kind: {:?}", other),
        }
    }

    #[test]
    fn notice_uses_message_tag() {
        let frame = r#"{"type":"Message","message":"strip cleared"}"#;
        match Message::decode(frame).unwrap() {
            Message::Notice(notice) => assert_eq!(notice.message, "strip cleared"),
            other => panic!("decoded wrong kind: {:?}", other),
        }

        let encoded = Message::Notice(Notice {
            message: "hi".into(),
        })
        .encode()
        .unwrap();
        assert!(encoded.contains(r#""type":"Message""#));
    }

    #[test]
    fn unknown_tag_is_an_error() {
        assert!(Message::decode(r#"{"type":"Blink","id":"x"}"#).is_err());
        assert!(Message::decode("not json at all").is_err());
    }

    #[test]
    fn running_animation_params_round_trip() {
        let params = RunningAnimationParams {
            animation_name: "Sparkle".into(),
            colors: vec![0xff0000, 0x00ff00],
            id: "anim-1".into(),
            section: String::new(),
            run_count: -1,
        };
        let encoded = Message::RunningAnimationParams(params).encode().unwrap();
        assert!(encoded.contains(r#""animationName":"Sparkle""#));
        match Message::decode(&encoded).unwrap() {
            Message::RunningAnimationParams(decoded) => {
                assert_eq!(decoded.id, "anim-1");
                assert_eq!(decoded.run_count, -1);
            }
            other => panic!("decoded wrong kind: {:?}", other),
        }
    }
}
