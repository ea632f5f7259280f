use rand::Rng;
use std::fmt;

use crate::tags::Tag;
use crate::{RandomiserError, Result};

/// Format version written into freshly generated seeds.
pub const CURRENT_VERSION: u8 = 2;

pub const SEED_LEN: usize = 9;

const VERSION_BITS: u32 = 6;
const SALT_BITS: u32 = 30;
const VERSION_MASK: u128 = (1 << VERSION_BITS) - 1;
const SALT_MASK: u32 = (1 << SALT_BITS) - 1;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const GROUP_LEN: usize = 5;

/// A shareable randomisation seed.
///
/// The nine bytes are one big-endian 72-bit integer laid out as
/// `{30-bit salt}{36-bit tags}{6-bit version}`, version in the low bits.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Seed {
    data: [u8; SEED_LEN],
    salt: u32,
    tags: Tag,
    version: u8,
    string: String,
}

impl Seed {
    /// Draws a fresh salt and packs it with `tags` at the current version.
    pub fn generate(tags: Tag) -> Seed {
        let salt = rand::thread_rng().gen::<u32>() & SALT_MASK;
        Seed::new(salt, tags, CURRENT_VERSION)
    }

    pub fn new(salt: u32, tags: Tag, version: u8) -> Seed {
        let value = ((salt & SALT_MASK) as u128) << (Tag::BITS + VERSION_BITS)
            | (tags.bits() as u128) << VERSION_BITS
            | (version as u128 & VERSION_MASK);

        let wide = value.to_be_bytes();
        let mut data = [0u8; SEED_LEN];
        data.copy_from_slice(&wide[wide.len() - SEED_LEN..]);
        Seed::from_bytes(data)
    }

    pub fn from_bytes(data: [u8; SEED_LEN]) -> Seed {
        let mut wide = [0u8; 16];
        wide[16 - SEED_LEN..].copy_from_slice(&data);
        let value = u128::from_be_bytes(wide);

        let version = (value & VERSION_MASK) as u8;
        let tags = Tag::from_bits_retain((value >> VERSION_BITS) as u64);
        let salt = (value >> (Tag::BITS + VERSION_BITS)) as u32 & SALT_MASK;

        Seed {
            data,
            salt,
            tags,
            version,
            string: display_string(&data),
        }
    }

    /// Parses a shared seed string. Separators, whitespace and case are
    /// ignored; anything that does not decode to exactly nine bytes is a
    /// format error. The version is not checked here.
    pub fn from_string(text: &str) -> Result<Seed> {
        let normalised: String = text
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let bytes = base32_decode(&normalised).ok_or_else(|| RandomiserError::Format {
            text: text.to_string(),
            reason: "not a valid base32 string".to_string(),
        })?;

        let data: [u8; SEED_LEN] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| RandomiserError::Format {
                    text: text.to_string(),
                    reason: format!("decodes to {} bytes, expected {}", bytes.len(), SEED_LEN),
                })?;

        Ok(Seed::from_bytes(data))
    }

    pub fn data(&self) -> &[u8; SEED_LEN] {
        &self.data
    }

    pub fn salt(&self) -> u32 {
        self.salt
    }

    pub fn tags(&self) -> Tag {
        self.tags
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn as_str(&self) -> &str {
        &self.string
    }

    /// Multi-line summary of the version and every declared flag.
    pub fn describe(&self) -> String {
        let mut out = format!("Seed: {}\nVersion: {}\n", self.string, self.version);
        for info in crate::tags::TAG_TABLE {
            let state = if self.tags.contains(info.tag) { "On" } else { "Off" };
            out.push_str(&format!(
                "  [{}] {}: {}\n",
                info.category.caption(),
                info.caption,
                state
            ));
        }
        out
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("string", &self.string)
            .field("version", &self.version)
            .field("tags", &self.tags)
            .finish()
    }
}

impl std::str::FromStr for Seed {
    type Err = RandomiserError;

    fn from_str(s: &str) -> Result<Seed> {
        Seed::from_string(s)
    }
}

fn display_string(data: &[u8]) -> String {
    let encoded = base32_encode(data).to_ascii_lowercase();
    let chars: Vec<char> = encoded.chars().collect();
    chars
        .chunks(GROUP_LEN)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// RFC 4648 base32 without padding.
fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &byte in data {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            let idx = (buffer >> bits) & 0x1F;
            out.push(BASE32_ALPHABET[idx as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }

    if bits > 0 {
        let idx = (buffer << (5 - bits)) & 0x1F;
        out.push(BASE32_ALPHABET[idx as usize] as char);
    }

    out
}

/// Decodes uppercase RFC 4648 base32. Padding may be present or stripped;
/// leftover bits that do not make up a whole byte must be zero.
fn base32_decode(text: &str) -> Option<Vec<u8>> {
    let body = text.trim_end_matches('=');

    // Only these remainders can come out of encoding whole bytes.
    if !matches!(body.len() % 8, 0 | 2 | 4 | 5 | 7) {
        return None;
    }

    let mut out = Vec::with_capacity(body.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for c in body.bytes() {
        let value = BASE32_ALPHABET.iter().position(|&a| a == c)? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
        buffer &= (1 << bits) - 1;
    }

    if buffer != 0 {
        return None;
    }

    Some(out)
}
