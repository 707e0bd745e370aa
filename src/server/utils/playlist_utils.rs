use tracing::error;
use url::Url;

/// where the relay is mounted, every rewritten reference points back here
pub const RELAY_PATH: &str = "/api/proxy";

/// relay-addressed form of an absolute upstream url
pub fn relay_url(target: &str) -> String {
    format!("{}?url={}", RELAY_PATH, urlencoding::encode(target))
}

/// rewrite every reference line of an hls playlist so the player comes back through the relay.
///
/// directives (`#...`) and blank lines are copied byte for byte, line endings included. a
/// reference is a line holding a single token, relative ones are joined onto `base` the same
/// way a browser would. anything with inner whitespace is not a uri line and is left alone
pub fn rewrite_playlist(text: &str, base: &Url) -> String {
    let mut out = String::with_capacity(text.len() * 2);

    for line in text.split_inclusive('\n') {
        let (content, ending) = split_line_ending(line);
        let trimmed = content.trim();

        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.chars().any(char::is_whitespace)
        {
            out.push_str(line);
            continue;
        }

        match base.join(trimmed) {
            Ok(resolved) => out.push_str(&relay_url(resolved.as_str())),
            Err(e) => {
                error!("Failed to resolve: {} - {}", trimmed, e);
                out.push_str(content);
            }
        }
        out.push_str(ending);
    }

    out
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}
