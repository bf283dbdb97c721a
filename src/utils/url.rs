use anyhow::{bail, Context, Result};

/// Decode URL-encoded bytes (percent-encoding)
///
/// Works on raw bytes so that binary values such as `info_hash` come back
/// byte-exact. `+` decodes to a space.
pub fn url_decode(encoded: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::with_capacity(encoded.len());
    let mut bytes = encoded.iter().copied();

    while let Some(byte) = bytes.next() {
        match byte {
            b'%' => {
                let hi = bytes
                    .next()
                    .context("Incomplete percent-encoding: missing first hex digit")?;
                let lo = bytes
                    .next()
                    .context("Incomplete percent-encoding: missing second hex digit")?;

                decoded.push((hex_value(hi)? << 4) | hex_value(lo)?);
            }
            b'+' => decoded.push(b' '),
            _ => decoded.push(byte),
        }
    }

    Ok(decoded)
}

fn hex_value(digit: u8) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => bail!("Invalid hex digit in percent-encoding: {:?}", digit as char),
    }
}
