//! High-water-mark index encoding.
//!
//! Each index is written as `highest - index`, where `highest` is the next
//! vertex that has not been referenced yet. Decoding requires that vertices
//! are first referenced in ascending order; [`first_use_order`] produces the
//! vertex permutation that satisfies this for an arbitrary index buffer.

pub fn encode_indices(indices: &[u32]) -> Vec<u32> {
    let mut highest = 0u32;
    indices
        .iter()
        .map(|&idx| {
            let code = highest.wrapping_sub(idx);
            if code == 0 {
                highest += 1;
            }
            code
        })
        .collect()
}

pub fn decode_indices(encoded: &[u32]) -> Vec<u32> {
    let mut highest = 0u32;
    encoded
        .iter()
        .map(|&code| {
            let idx = highest.wrapping_sub(code);
            if code == 0 {
                highest += 1;
            }
            idx
        })
        .collect()
}

/// Whether `indices` already reference vertices in first-use order.
pub fn is_first_use_ordered(indices: &[u32]) -> bool {
    let mut next = 0u32;
    for &idx in indices {
        if idx > next {
            return false;
        }
        if idx == next {
            next += 1;
        }
    }
    true
}

/// Permutation `old -> new` that renumbers vertices in order of first use.
///
/// Vertices never referenced by `indices` are appended after the referenced
/// ones, keeping their relative order.
pub fn first_use_order(indices: &[u32], vertex_count: usize) -> Vec<u32> {
    let mut remap = vec![u32::MAX; vertex_count];
    let mut next = 0u32;
    for &idx in indices {
        let slot = &mut remap[idx as usize];
        if *slot == u32::MAX {
            *slot = next;
            next += 1;
        }
    }
    for slot in remap.iter_mut().filter(|s| **s == u32::MAX) {
        *slot = next;
        next += 1;
    }
    remap
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ordered_triangles_encode_new_vertices_as_zero() {
        let indices = [0, 1, 2, 1, 2, 3, 2, 3, 4, 3, 4, 5];
        let encoded = encode_indices(&indices);
        assert_eq!(encoded, vec![0, 0, 0, 2, 1, 0, 2, 1, 0, 2, 1, 0]);
        assert_eq!(decode_indices(&encoded), indices.to_vec());
    }

    #[test]
    fn detects_out_of_order_buffers() {
        assert!(is_first_use_ordered(&[0, 1, 2, 2, 1, 3]));
        assert!(!is_first_use_ordered(&[0, 2, 1]));
        assert!(is_first_use_ordered(&[]));
    }

    #[test]
    fn first_use_order_renumbers_and_keeps_unused_last() {
        let remap = first_use_order(&[3, 1, 0, 1, 0, 4], 6);
        assert_eq!(remap, vec![2, 1, 4, 0, 3, 5]);
        let renumbered: Vec<u32> = [3u32, 1, 0, 1, 0, 4]
            .iter()
            .map(|&i| remap[i as usize])
            .collect();
        assert!(is_first_use_ordered(&renumbered));
    }
}
