//! PlantUML-style diagram encoding and best-effort rendering.
//!
//! The token format is a raw DEFLATE stream transcoded through a 6-bit
//! alphabet so it can sit directly in a URL path segment with no padding.
//! Rendering is a single blocking GET with a short timeout; any failure
//! degrades to an embedded text view instead of failing the docs build.
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::Write;
use std::time::Duration;
use ureq::Agent;

pub const DEFAULT_RENDER_ENDPOINT: &str = "https://www.plantuml.com/plantuml/svg";
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Digits, then upper case, then lower case, then `-` and `_`. Not base64:
/// the character order differs and no padding is ever emitted.
const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Encode diagram source into a deterministic URL-safe token.
pub fn encode(source: &str) -> String {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(source.as_bytes())
        .and_then(|()| encoder.finish())
        .map(|compressed| transcode(&compressed))
        // Writing into a Vec cannot fail; keep the signature infallible.
        .unwrap_or_default()
}

/// Transcode 3 bytes at a time into 4 alphabet characters.
///
/// A trailing partial group is padded with zero bits but emits only as many
/// characters as there were source bytes: two for one byte, three for two.
fn transcode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for chunk in bytes.chunks(3) {
        let b1 = chunk[0];
        let b2 = chunk.get(1).copied().unwrap_or(0);
        let b3 = chunk.get(2).copied().unwrap_or(0);

        out.push(ALPHABET[usize::from(b1 >> 2)] as char);
        out.push(ALPHABET[usize::from(((b1 & 0x03) << 4) | (b2 >> 4))] as char);
        if chunk.len() > 1 {
            out.push(ALPHABET[usize::from(((b2 & 0x0F) << 2) | (b3 >> 6))] as char);
        }
        if chunk.len() > 2 {
            out.push(ALPHABET[usize::from(b3 & 0x3F)] as char);
        }
    }
    out
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders diagrams against an external endpoint, degrading to text on any
/// failure. No retries: one request per diagram per build.
#[derive(Debug, Clone)]
pub struct DiagramRenderer {
    endpoint: String,
    timeout: Duration,
}

impl DiagramRenderer {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        DiagramRenderer {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Render diagram source to an SVG fragment, or a fallback text view.
    pub fn render_svg(&self, source: &str) -> String {
        if source.trim().is_empty() {
            tracing::warn!("diagram source is empty, using text fallback");
            return fallback_html(source, "Diagram source is empty.");
        }
        if !source.contains("@startuml") || !source.contains("@enduml") {
            tracing::warn!("diagram source missing @startuml/@enduml markers");
        }

        let url = format!("{}/{}", self.endpoint, encode(source));
        match self.fetch(&url) {
            Ok(body) if body.contains("<svg") => body,
            Ok(_) => {
                tracing::warn!(%url, "render response lacks SVG content, using text fallback");
                fallback_html(source, "Render endpoint returned no SVG content.")
            }
            Err(reason) => {
                tracing::warn!(%url, %reason, "diagram render failed, using text fallback");
                fallback_html(source, &reason)
            }
        }
    }

    fn fetch(&self, url: &str) -> Result<String, String> {
        // Status errors are handled here, not by the transport layer.
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .http_status_as_error(false)
            .build()
            .into();
        let mut response = agent
            .get(url)
            .call()
            .map_err(|err| format!("request failed: {err}"))?;
        if !response.status().is_success() {
            return Err(format!("render endpoint returned {}", response.status()));
        }
        response
            .body_mut()
            .read_to_string()
            .map_err(|err| format!("read response body: {err}"))
    }
}

pub(crate) fn fallback_html(source: &str, note: &str) -> String {
    format!(
        "<div class=\"puml-fallback\"><h4>Diagram (Text View)</h4>\
         <pre>{}</pre><p>{}</p></div>",
        escape_html(source),
        escape_html(note)
    )
}
