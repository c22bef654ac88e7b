// wallet-core/src/chains/filecoin/cbor.rs
//
// Minimal canonical CBOR writer (RFC 8949 §4.2.1 shortest-form heads) for
// the tuple-encoded structures Filecoin signs. Write-only: nodes hand back
// JSON, never CBOR.

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_ARRAY: u8 = 4;

#[derive(Debug, Default)]
pub struct CborWriter {
    buf: Vec<u8>,
}

impl CborWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn head(&mut self, major: u8, value: u64) {
        let m = major << 5;
        match value {
            0..=23 => self.buf.push(m | value as u8),
            24..=0xff => {
                self.buf.push(m | 24);
                self.buf.push(value as u8);
            }
            0x100..=0xffff => {
                self.buf.push(m | 25);
                self.buf.extend_from_slice(&(value as u16).to_be_bytes());
            }
            0x1_0000..=0xffff_ffff => {
                self.buf.push(m | 26);
                self.buf.extend_from_slice(&(value as u32).to_be_bytes());
            }
            _ => {
                self.buf.push(m | 27);
                self.buf.extend_from_slice(&value.to_be_bytes());
            }
        }
    }

    pub fn array(&mut self, len: usize) -> &mut Self {
        self.head(MAJOR_ARRAY, len as u64);
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.head(MAJOR_UNSIGNED, value);
        self
    }

    pub fn i64(&mut self, value: i64) -> &mut Self {
        if value >= 0 {
            self.head(MAJOR_UNSIGNED, value as u64);
        } else {
            // -1 - n
            self.head(MAJOR_NEGATIVE, !(value as u64));
        }
        self
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.head(MAJOR_BYTES, data.len() as u64);
        self.buf.extend_from_slice(data);
        self
    }

    /// Filecoin BigInt: empty for zero, else sign byte (0x00) ‖ big-endian magnitude.
    pub fn big_uint(&mut self, value: u128) -> &mut Self {
        let encoded = big_uint_bytes(value);
        self.bytes(&encoded)
    }

    /// Append already-encoded CBOR.
    pub fn raw(&mut self, encoded: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(encoded);
        self
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

pub fn big_uint_bytes(value: u128) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let be = value.to_be_bytes();
    let first = be.iter().position(|&b| b != 0).unwrap_or(be.len());
    let mut out = Vec::with_capacity(1 + be.len() - first);
    out.push(0x00);
    out.extend_from_slice(&be[first..]);
    out
}
