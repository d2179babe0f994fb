use hilbert_codec::encode::{bwt, huffman, mtf, rle};
use hilbert_codec::analysis::entropy::Histogram;

fn text_block() -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog; the lazy dog sleeps. ".repeat(6)
}

/// BWT clusters symbols, MTF turns clusters into small ranks, Huffman packs them
#[test]
fn test_bwt_mtf_huffman_chain() {
    let data = text_block();

    let (last, primary) = bwt::forward(&data);
    let ranks = mtf::encode(&last);
    let (bits, table) = huffman::build_and_encode(&ranks);

    let decoded_ranks = huffman::decode(&bits, &table).unwrap();
    let decoded_last = mtf::decode(&decoded_ranks);
    let restored = bwt::inverse(&decoded_last, primary).unwrap();
    assert_eq!(restored, data);

    assert!(bits.len() < data.len() * 8);
}

#[test]
fn test_bwt_lowers_mtf_entropy() {
    let data = text_block();
    let plain = Histogram::from_bytes(&mtf::encode(&data)).entropy();
    let (last, _) = bwt::forward(&data);
    let transformed = Histogram::from_bytes(&mtf::encode(&last)).entropy();
    assert!(transformed < plain, "{} !< {}", transformed, plain);
}

#[test]
fn test_rle_over_mtf_ranks() {
    let mut data = vec![10u8; 40];
    data.extend(vec![200u8; 25]);
    data.extend(vec![10u8; 5]);

    let ranks = mtf::encode(&data);
    let runs = rle::encode(&ranks);
    // 10, zeros, 200, zeros, 1, zeros
    assert_eq!(runs.len(), 6);
    assert_eq!(mtf::decode(&rle::decode(&runs)), data);
}
