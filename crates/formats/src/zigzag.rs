/// Maps a signed delta onto an unsigned value so small magnitudes stay small.
pub fn zig_zag_encode(value: i16) -> u16 {
    ((value << 1) ^ (value >> 15)) as u16
}

pub fn zig_zag_decode(value: u16) -> i16 {
    ((value >> 1) as i16) ^ -((value & 1) as i16)
}

/// Delta + zig-zag encodes a quantized component array (first value against 0).
pub fn encode_deltas(values: &[u16]) -> Vec<u16> {
    let mut prev: i32 = 0;
    values
        .iter()
        .map(|&v| {
            let delta = v as i32 - prev;
            prev = v as i32;
            zig_zag_encode(delta as i16)
        })
        .collect()
}

pub fn decode_deltas(encoded: &[u16]) -> Vec<u16> {
    let mut acc: i32 = 0;
    encoded
        .iter()
        .map(|&e| {
            acc += zig_zag_decode(e) as i32;
            acc as u16
        })
        .collect()
}
