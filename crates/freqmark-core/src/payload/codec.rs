use crate::error::WatermarkError;
use crate::options::FramingTags;
use crate::result::Result;

const BITS_PER_BYTE: usize = 8;

/// Where the payload text came from, decides the tag pair around it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PayloadOrigin {
    Text,
    Image,
}

/// turns every UTF-8 byte of `text` into 8 binary digits, most significant bit first
pub fn string_to_binary(text: &str) -> String {
    let mut bits = String::with_capacity(text.len() * BITS_PER_BYTE);
    for byte in text.bytes() {
        bits.push_str(&format!("{byte:08b}"));
    }
    bits
}

/// inverse of [`string_to_binary`]
pub fn binary_to_string(bits: &str) -> Result<String> {
    ensure_binary(bits)?;
    if bits.len() % BITS_PER_BYTE != 0 {
        return Err(WatermarkError::InvalidBinaryString(format!(
            "length {} is not a multiple of {BITS_PER_BYTE}",
            bits.len()
        )));
    }

    let bytes = bits
        .as_bytes()
        .chunks_exact(BITS_PER_BYTE)
        .map(|byte| byte.iter().fold(0u8, |acc, b| acc << 1 | (b - b'0')))
        .collect();

    Ok(String::from_utf8(bytes)?)
}

fn ensure_binary(bits: &str) -> Result<()> {
    match bits.char_indices().find(|(_, c)| *c != '0' && *c != '1') {
        Some((i, c)) => Err(WatermarkError::InvalidBinaryString(format!(
            "unexpected {c:?} at position {i}"
        ))),
        None => Ok(()),
    }
}

/// A payload bit string wrapped into the tag pair of its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedPayload {
    origin: PayloadOrigin,
    bits: String,
}

impl FramedPayload {
    /// frames the given payload bits, they must only contain '0' and '1'
    pub fn frame(origin: PayloadOrigin, payload_bits: &str, tags: &FramingTags) -> Result<Self> {
        ensure_binary(payload_bits)?;
        let (prefix, suffix) = tags.pair(origin);

        let mut bits = String::with_capacity(prefix.len() + payload_bits.len() + suffix.len());
        bits.push_str(prefix);
        bits.push_str(payload_bits);
        bits.push_str(suffix);

        Ok(Self { origin, bits })
    }

    pub fn origin(&self) -> PayloadOrigin {
        self.origin
    }

    pub fn as_str(&self) -> &str {
        &self.bits
    }

    /// number of framed bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Groups the framed bits into codes of `code_width` bits each, most
    /// significant bit first. A short last group is padded with zeros on the right.
    ///
    /// `code_width` must be within `1..=32`.
    pub fn to_codes(&self, code_width: usize) -> Result<Vec<u32>> {
        if !(1..=32).contains(&code_width) {
            return Err(WatermarkError::InvalidOptions(format!(
                "code width {code_width} is outside of 1..=32"
            )));
        }

        Ok(self
            .bits
            .as_bytes()
            .chunks(code_width)
            .map(|group| {
                let code = group
                    .iter()
                    .fold(0u64, |acc, b| acc << 1 | u64::from(b - b'0'));
                (code << (code_width - group.len())) as u32
            })
            .collect())
    }
}

/// Classifies a framed bit string by its tag pair and returns the payload
/// bits between the tags.
pub fn unframe<'b>(bits: &'b str, tags: &FramingTags) -> Result<(PayloadOrigin, &'b str)> {
    for origin in [PayloadOrigin::Image, PayloadOrigin::Text] {
        let (prefix, suffix) = tags.pair(origin);
        if bits.len() >= prefix.len() + suffix.len() {
            if let Some(inner) = bits
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix))
            {
                return Ok((origin, inner));
            }
        }
    }

    Err(WatermarkError::UnknownFraming)
}
