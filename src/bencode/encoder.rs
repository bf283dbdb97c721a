/// Closed value model accepted by the encoder.
///
/// Dictionaries keep their pairs in the order they were built; callers that
/// need canonical bencode should go through [`Value::sorted_dict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Bytes(Vec<u8>),
    Dict(Vec<(Vec<u8>, Value)>),
}

impl Value {
    /// Build a dictionary whose keys are ordered by raw byte value.
    pub fn sorted_dict(mut pairs: Vec<(Vec<u8>, Value)>) -> Self {
        pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
        Value::Dict(pairs)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Bytes(value.as_bytes().to_vec())
    }
}

pub trait BencodeEncode {
    fn bencode(&self, buf: &mut Vec<u8>);
}

impl BencodeEncode for i64 {
    fn bencode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b"i");

        let mut buffer = itoa::Buffer::new();
        buf.extend_from_slice(buffer.format(*self).as_bytes());
        buf.extend_from_slice(b"e");
    }
}

impl BencodeEncode for &[u8] {
    fn bencode(&self, buf: &mut Vec<u8>) {
        let mut buffer = itoa::Buffer::new();
        buf.extend_from_slice(buffer.format(self.len()).as_bytes());
        buf.extend_from_slice(b":");
        buf.extend_from_slice(self);
    }
}

impl BencodeEncode for &str {
    fn bencode(&self, buf: &mut Vec<u8>) {
        self.as_bytes().bencode(buf);
    }
}

impl BencodeEncode for Vec<u8> {
    fn bencode(&self, buf: &mut Vec<u8>) {
        self.as_slice().bencode(buf);
    }
}

impl BencodeEncode for Value {
    fn bencode(&self, buf: &mut Vec<u8>) {
        match self {
            Value::Integer(n) => n.bencode(buf),
            Value::Bytes(bytes) => bytes.bencode(buf),
            Value::Dict(pairs) => encode_dict(pairs, buf),
        }
    }
}

/// Encode a dictionary, emitting pairs exactly in slice order.
pub fn encode_dict<K: BencodeEncode, V: BencodeEncode>(
    pairs: &[(K, V)],
    buf: &mut Vec<u8>,
) {
    buf.extend_from_slice(b"d");
    for (key, value) in pairs {
        key.bencode(buf);
        value.bencode(buf);
    }
    buf.extend_from_slice(b"e");
}

pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64);
    value.bencode(&mut buf);
    buf
}
