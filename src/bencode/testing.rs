use crate::bencode::encoder::Value;
use bendy::decoding::{Decoder, Object};

/// Decode a single bencoded value with bendy, checking nothing trails it.
pub fn decode(bytes: &[u8]) -> Value {
    let mut decoder = Decoder::new(bytes);
    let value = match decoder.next_object().expect("malformed bencode") {
        Some(object) => to_value(object),
        None => panic!("empty bencode input"),
    };
    assert!(
        decoder.next_object().expect("malformed trailing data").is_none(),
        "trailing data after bencode value"
    );
    value
}

fn to_value(object: Object<'_, '_>) -> Value {
    match object {
        Object::Integer(digits) => Value::Integer(digits.parse().expect("integer out of range")),
        Object::Bytes(bytes) => Value::Bytes(bytes.to_vec()),
        Object::Dict(mut dict) => {
            let mut pairs = Vec::new();
            while let Some((key, value)) = dict.next_pair().expect("malformed dictionary") {
                pairs.push((key.to_vec(), to_value(value)));
            }
            Value::Dict(pairs)
        }
        Object::List(_) => panic!("tracker responses carry no lists"),
    }
}
