/// Validation tests across the whole codec.
///
/// These tests verify:
/// 1. **Scenarios** - single-symbol, empty, equal-weight and corrupted inputs
/// 2. **Format properties** - header length field, payload size, padding bounds
/// 3. **Algorithmic properties** - prefix-freedom, frequency conservation
/// 4. **Round trips** - fixed corpora and generated text (proptest)
#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::container::{self, Container, LENGTH_FIELD_SIZE};
    use crate::frequency::get_frequency;
    use crate::huffman::{CodeTable, HuffmanTree};
    use crate::pack;
    use crate::{compress, decompress, inspect, HzError};

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    /// Split a container into (header bytes, payload bytes).
    fn split(data: &[u8]) -> (&[u8], &[u8]) {
        let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        let end = LENGTH_FIELD_SIZE + len;
        (&data[LENGTH_FIELD_SIZE..end], &data[end..])
    }

    /// Frame arbitrary header and payload bytes as a container.
    fn raw_container(header: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut data = (header.len() as u32).to_be_bytes().to_vec();
        data.extend_from_slice(header);
        data.extend_from_slice(payload);
        data
    }

    fn assert_round_trip(input: &str) {
        let packed = compress(input).unwrap();
        let unpacked = decompress(&packed).unwrap();
        assert_eq!(unpacked, input, "round trip failed for {:?}", input);
    }

    fn text_lorem() -> String {
        "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
         tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, \
         quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.\n"
            .repeat(20)
    }

    fn text_unicode() -> String {
        "Compressão de texto: ação, coração, não! Ελληνικά, 日本語, emoji 🦀🦀.\r\n\t".repeat(7)
    }

    // ---------------------------------------------------------------
    // 1. Scenarios
    // ---------------------------------------------------------------

    #[test]
    fn scenario_single_symbol() {
        let freq = get_frequency("aaaa");
        assert_eq!(freq.get('a'), 4);
        assert_eq!(freq.used(), 1);

        let tree = HuffmanTree::from_frequency_table(&freq).unwrap();
        assert!(tree.root().is_leaf());

        let table = tree.code_table();
        assert_eq!(table.get('a').unwrap().to_string(), "0");
        assert_round_trip("aaaa");
    }

    #[test]
    fn scenario_empty_input() {
        assert!(matches!(compress(""), Err(HzError::InvalidInput(_))));
    }

    #[test]
    fn scenario_equal_weights() {
        let freq = get_frequency("abcabc");
        assert_eq!(
            freq.iter().collect::<Vec<_>>(),
            vec![('a', 2), ('b', 2), ('c', 2)]
        );
        let table = CodeTable::from_frequency_table(&freq).unwrap();
        let mut lengths: Vec<usize> = table.iter().map(|(_, c)| c.len()).collect();
        lengths.sort();
        assert_eq!(lengths, vec![1, 2, 2]);
        assert_round_trip("abcabc");
    }

    #[test]
    fn scenario_corrupted_payload_byte() {
        // b = "0", a = "1": the payload is 100 one-bits then a zero-bit.
        let input = format!("{}b", "a".repeat(100));
        let packed = compress(&input).unwrap();
        let (header, payload) = split(&packed);
        assert_eq!(payload.len(), 14);
        assert_eq!(payload[0], 3);
        assert_eq!(payload[5], 0xFF);

        let mut corrupted = packed.clone();
        let idx = LENGTH_FIELD_SIZE + header.len() + 5;
        corrupted[idx] = 0x00;
        let err = decompress(&corrupted).unwrap_err();
        assert!(matches!(err, HzError::DecodeError { .. }), "{err:?}");
    }

    #[test]
    fn scenario_corrupted_padding_count() {
        let packed = compress("abcabc").unwrap();
        let (header, _) = split(&packed);
        let idx = LENGTH_FIELD_SIZE + header.len();
        for padding in [0u8, 5, 7, 8, 200] {
            let mut corrupted = packed.clone();
            corrupted[idx] = padding;
            let err = decompress(&corrupted).unwrap_err();
            assert!(
                matches!(err, HzError::DecodeError { .. }),
                "padding {padding}: {err:?}"
            );
            assert!(inspect(&corrupted).is_err());
        }
    }

    #[test]
    fn scenario_corrupted_header() {
        let packed = compress("header damage").unwrap();

        let mut bad_json = packed.clone();
        bad_json[LENGTH_FIELD_SIZE] = b'x';
        assert!(matches!(
            decompress(&bad_json),
            Err(HzError::CorruptHeader { .. })
        ));

        let mut bad_len = packed.clone();
        bad_len[0] = 0xFF;
        assert!(matches!(
            decompress(&bad_len),
            Err(HzError::CorruptHeader { .. })
        ));

        assert!(matches!(
            decompress(&packed[..3]),
            Err(HzError::CorruptHeader { .. })
        ));
    }

    #[test]
    fn scenario_header_only() {
        let packed = compress("xyz").unwrap();
        let (header, _) = split(&packed);
        let truncated = &packed[..LENGTH_FIELD_SIZE + header.len()];
        assert!(matches!(
            decompress(truncated),
            Err(HzError::TruncatedPayload { actual: 0, .. })
        ));
    }

    #[test]
    fn scenario_header_counts_overflow_packed_size() {
        // Each header is valid on its own (total fits in a u64), but the
        // packed length in bytes does not.
        let headers: [&[u8]; 2] = [
            br#"{"a":18446744073709551615}"#,
            br#"{"a":9223372036854775807,"b":9223372036854775807}"#,
        ];
        for header in headers {
            let data = raw_container(header, &[1, 0]);
            let err = decompress(&data).unwrap_err();
            assert!(matches!(err, HzError::CorruptHeader { .. }), "{err:?}");
            let err = inspect(&data).unwrap_err();
            assert!(matches!(err, HzError::CorruptHeader { .. }), "{err:?}");
        }
    }

    #[test]
    fn scenario_header_counts_overflow_code_bits() {
        // 2^62 each: a=10, b=11, c=0 makes 5 * 2^62 payload bits.
        let data = raw_container(
            br#"{"a":4611686018427387904,"b":4611686018427387904,"c":4611686018427387904}"#,
            &[0, 0],
        );
        let err = decompress(&data).unwrap_err();
        assert!(matches!(err, HzError::CorruptHeader { .. }), "{err:?}");
        assert_eq!(err.stage(), "header");
        assert_eq!(inspect(&data).unwrap_err().stage(), "header");
    }

    #[test]
    fn scenario_header_repeats_a_symbol() {
        let packed = compress("aab").unwrap();
        let (header, payload) = split(&packed);
        assert_eq!(header, br#"{"a":2,"b":1}"#);

        // Same payload; the last "a" entry alone would decode it.
        let forged = raw_container(br#"{"a":5,"a":2,"b":1}"#, payload);
        let err = decompress(&forged).unwrap_err();
        assert!(matches!(err, HzError::CorruptHeader { .. }), "{err:?}");
        assert!(inspect(&forged).is_err());
    }

    // ---------------------------------------------------------------
    // 2. Fixed corpora
    // ---------------------------------------------------------------

    #[test]
    fn round_trip_corpora() {
        assert_round_trip(&text_lorem());
        assert_round_trip(&text_unicode());
        assert_round_trip("x");
        assert_round_trip("xy");
        assert_round_trip("\n");
        assert_round_trip(&"ab".repeat(4));
        let all_ascii: String = (0u8..128).map(char::from).collect();
        assert_round_trip(&all_ascii);
    }

    #[test]
    fn compression_shrinks_skewed_text() {
        let input = format!("{}{}{}", "a".repeat(1000), "b".repeat(10), "c".repeat(5));
        let packed = compress(&input).unwrap();
        assert!(
            packed.len() < input.len() / 4,
            "packed {} bytes, input {} bytes",
            packed.len(),
            input.len()
        );
    }

    #[test]
    fn independent_rebuilds_agree() {
        let text = text_unicode();
        let freq = get_frequency(&text);
        let encode_side = CodeTable::from_frequency_table(&freq).unwrap();

        let packed = compress(&text).unwrap();
        let decoded_freq = Container::parse(&packed).unwrap().frequencies;
        let decode_side = CodeTable::from_frequency_table(&decoded_freq).unwrap();

        for (symbol, code) in encode_side.iter() {
            assert_eq!(decode_side.get(symbol), Some(code));
        }
        assert_eq!(encode_side.len(), decode_side.len());
    }

    // ---------------------------------------------------------------
    // 3. Properties
    // ---------------------------------------------------------------

    fn text_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::collection::vec(any::<char>(), 1..300)
                .prop_map(|chars| chars.into_iter().collect::<String>()),
            "[ab]{1,64}",
            "[a-e ]{1,400}",
            prop::collection::vec(prop::char::range('a', 'c'), 1..2000)
                .prop_map(|chars| chars.into_iter().collect::<String>()),
        ]
    }

    proptest! {
        #[test]
        fn prop_round_trip(text in text_strategy()) {
            let packed = compress(&text).unwrap();
            prop_assert_eq!(decompress(&packed).unwrap(), text);
        }

        #[test]
        fn prop_prefix_free(text in text_strategy()) {
            let table = HuffmanTree::from_text(&text).unwrap().code_table();
            let codes: Vec<_> = table.iter().map(|(_, c)| c.clone()).collect();
            for (i, a) in codes.iter().enumerate() {
                prop_assert!(!a.is_empty());
                for (j, b) in codes.iter().enumerate() {
                    if i != j {
                        prop_assert!(!a.is_prefix_of(b), "{} is a prefix of {}", a, b);
                    }
                }
            }
        }

        #[test]
        fn prop_frequency_conservation(text in text_strategy()) {
            let freq = get_frequency(&text);
            prop_assert_eq!(freq.total(), text.chars().count() as u64);
            prop_assert_eq!(freq.iter().map(|(_, c)| c).sum::<u64>(), freq.total());
            prop_assert!(freq.iter().all(|(_, c)| c > 0));
        }

        #[test]
        fn prop_container_self_description(text in text_strategy()) {
            let packed = compress(&text).unwrap();
            let freq = get_frequency(&text);
            let header = container::encode_header(&freq).unwrap();

            let (stored_header, payload) = split(&packed);
            prop_assert_eq!(stored_header, &header[..]);

            let table = CodeTable::from_frequency_table(&freq).unwrap();
            let bits = table.encoded_bits(&freq).unwrap();
            prop_assert_eq!(Some(payload.len() as u64), pack::packed_len(bits));
            prop_assert_eq!(
                payload.len() as u64,
                (payload[0] as u64 + 8 + bits).div_ceil(8)
            );
        }

        #[test]
        fn prop_padding_bounds(text in text_strategy()) {
            let packed = compress(&text).unwrap();
            let (_, payload) = split(&packed);
            let padding = payload[0];
            prop_assert!(padding <= 7);
            let info = inspect(&packed).unwrap();
            prop_assert_eq!(padding, info.padding_bits);
            prop_assert_eq!((info.payload_bits + padding as u64) % 8, 0);
        }
    }
}
