//! Navigation parameters read once when a session starts.
//!
//! They arrive as a URL query string, e.g. the payload of a printed QR code
//! (`?loc=1F-2`) or a floor link from the main menu (`?floor=2F`).

/// The parameters a session cares about. Empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavParams {
    pub loc: Option<String>,
    pub floor: Option<String>,
}

impl NavParams {
    /// Parse a query string. A leading `?` is optional; the first occurrence of
    /// a key wins; `+` and `%XX` escapes are decoded.
    pub fn parse(query: &str) -> Self {
        let query = query.trim();
        let query = query.strip_prefix('?').unwrap_or(query);

        let mut loc = None;
        let mut floor = None;
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match decode(key).as_str() {
                "loc" => &mut loc,
                "floor" => &mut floor,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(decode(value));
            }
        }

        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        NavParams {
            loc: present(loc),
            floor: present(floor),
        }
    }

    pub fn from_loc(loc: impl Into<String>) -> Self {
        Self {
            loc: Some(loc.into()),
            floor: None,
        }
    }

    pub fn from_floor(floor: impl Into<String>) -> Self {
        Self {
            loc: None,
            floor: Some(floor.into()),
        }
    }
}

/// Decode `application/x-www-form-urlencoded` text. Invalid escapes are kept literally.
fn decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
