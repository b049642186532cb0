use base64::{
    prelude::{BASE64_URL_SAFE, BASE64_URL_SAFE_NO_PAD},
    DecodeError, Engine,
};

/// Encode the input as unpadded base64url.
pub fn encode<T: AsRef<[u8]>>(input: T) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(input)
}

/// Decode an unpadded base64url string.
///
/// The input is padded back before decoding: a length that is 3 modulo 4 gets a single `=`, any
/// other length gets as many `=` as its remainder. Inputs that are 1 modulo 4 can't be recovered
/// and fail to decode.
pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    let padding = match input.len() % 4 {
        3 => 1,
        other => other,
    };
    let mut padded = String::with_capacity(input.len() + padding);
    padded.push_str(input);
    padded.extend(std::iter::repeat('=').take(padding));
    BASE64_URL_SAFE.decode(padded)
}

pub(crate) fn encode_json<T: serde::Serialize>(input: &T) -> Result<String, serde_json::Error> {
    let input = serde_json::to_vec(input)?;
    Ok(encode(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::no_padding("any carnal pleasure.", "YW55IGNhcm5hbCBwbGVhc3VyZS4")]
    #[case::one_pad("any carnal pleasure", "YW55IGNhcm5hbCBwbGVhc3VyZQ")]
    #[case::aligned("any carnal pleasur", "YW55IGNhcm5hbCBwbGVhc3Vy")]
    #[case::three_remainder("any carnal pleasu", "YW55IGNhcm5hbCBwbGVhc3U")]
    #[case::two_remainder("any carnal pleas", "YW55IGNhcm5hbCBwbGVhcw")]
    fn known_values(#[case] plain: &str, #[case] encoded: &str) {
        assert_eq!(encode(plain), encoded);
        assert_eq!(decode(encoded).expect("decode failed"), plain.as_bytes());
    }

    #[test]
    fn url_safe_alphabet() {
        // 0xfb 0xff encodes to `+/8=` in the standard alphabet.
        let encoded = encode([0xfb_u8, 0xff, 0xfb, 0xff, 0xfe]);
        assert_eq!(encoded, "-__7__4");
        assert!(!encoded.contains(['+', '/', '=']));
        assert_eq!(decode(&encoded).unwrap(), [0xfb, 0xff, 0xfb, 0xff, 0xfe]);
    }

    #[test]
    fn all_lengths() {
        let input: Vec<u8> = (0..=255).collect();
        for length in 0..input.len() {
            let encoded = encode(&input[..length]);
            assert!(!encoded.contains(['+', '/', '=']), "bad character in {encoded}");
            assert_eq!(decode(&encoded).expect("decode failed"), &input[..length]);
        }
    }

    #[test]
    fn three_remainder_takes_one_pad() {
        // "YW55" + "IGM" is 7 characters long, which needs exactly one `=`.
        assert_eq!(decode("YW55IGM").unwrap(), b"any c");
    }

    #[rstest]
    #[case::single_remainder("YW55I")]
    #[case::standard_alphabet("+/+/")]
    #[case::emoji("🚀")]
    fn invalid_inputs(#[case] input: &str) {
        decode(input).expect_err("decode succeeded");
    }
}
