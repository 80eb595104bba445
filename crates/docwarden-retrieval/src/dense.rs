// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Brute-force inner-product vector index and its binary file format.
//!
//! File layout (all little-endian): magic `DWVI`, `u32` format version,
//! `u32` dimensions, `u32` row count, then `count * dimensions` `f32` values.

use docwarden_core::DocwardenError;

const MAGIC: &[u8; 4] = b"DWVI";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// Row-major matrix of L2-normalised embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseIndex {
    dimensions: usize,
    data: Vec<f32>,
}

impl DenseIndex {
    /// Build from rows that all have `dimensions` entries.
    pub fn from_rows(dimensions: usize, rows: Vec<Vec<f32>>) -> Result<Self, DocwardenError> {
        let mut data = Vec::with_capacity(rows.len() * dimensions);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dimensions {
                return Err(DocwardenError::Embedding {
                    message: format!(
                        "vector {i} has {} dimensions, expected {dimensions}",
                        row.len()
                    ),
                    source: None,
                });
            }
            data.extend(row);
        }
        Ok(Self { dimensions, data })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        if self.dimensions == 0 {
            0
        } else {
            self.data.len() / self.dimensions
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dimensions..(i + 1) * self.dimensions]
    }

    /// Top `limit` rows by inner product with `query`, best first; equal
    /// scores keep row order.
    pub fn search(&self, query: &[f32], limit: usize) -> Vec<(usize, f32)> {
        if query.len() != self.dimensions || limit == 0 {
            return Vec::new();
        }
        let mut scored: Vec<(usize, f32)> = (0..self.len())
            .map(|i| (i, inner_product(self.row(i), query)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(limit);
        scored
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.dimensions as u32).to_le_bytes());
        out.extend_from_slice(&(self.len() as u32).to_le_bytes());
        for value in &self.data {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocwardenError> {
        let corrupt = |why: &str| DocwardenError::IndexUnavailable(format!("vector file {why}"));

        if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
            return Err(corrupt("has no valid header"));
        }
        let word = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        let version = word(4);
        if version != FORMAT_VERSION {
            return Err(corrupt(&format!("has unsupported version {version}")));
        }
        let dimensions = word(8) as usize;
        let count = word(12) as usize;

        let expected = count
            .checked_mul(dimensions)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| corrupt("header declares an impossible size"))?;
        let body = &bytes[HEADER_LEN..];
        if body.len() != expected {
            return Err(corrupt("length does not match its header"));
        }
        let data = body
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok(Self { dimensions, data })
    }
}

pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale `v` to unit length in place; zero vectors are left as is.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> DenseIndex {
        DenseIndex::from_rows(
            2,
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.6, 0.8], vec![1.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = DenseIndex::from_rows(3, vec![vec![1.0, 0.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, DocwardenError::Embedding { .. }));
    }

    #[test]
    fn search_orders_by_inner_product_then_row() {
        let hits = index().search(&[1.0, 0.0], 3);
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![0, 3, 2]);
    }

    #[test]
    fn search_with_wrong_dimensions_is_empty() {
        assert!(index().search(&[1.0, 0.0, 0.0], 3).is_empty());
    }

    #[test]
    fn bytes_round_trip_exactly() {
        let original = index();
        let bytes = original.to_bytes();
        assert_eq!(&bytes[..4], b"DWVI");
        assert_eq!(DenseIndex::from_bytes(&bytes).unwrap(), original);
    }

    #[test]
    fn truncated_file_is_rejected() {
        let bytes = index().to_bytes();
        assert!(DenseIndex::from_bytes(&bytes[..bytes.len() - 2]).is_err());
        assert!(DenseIndex::from_bytes(b"NOPE").is_err());
    }

    #[test]
    fn oversized_header_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        let err = DenseIndex::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, DocwardenError::IndexUnavailable(_)));
    }

    #[test]
    fn normalize_produces_unit_length() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }
}
