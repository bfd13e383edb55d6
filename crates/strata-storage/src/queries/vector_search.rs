//! Stream-description embeddings with brute-force cosine search.

use rusqlite::{params, Connection, OptionalExtension};

use strata_core::errors::StrataResult;

use crate::to_storage_err;

pub fn upsert_embedding(
    conn: &Connection,
    stream_id: &str,
    organization_id: &str,
    provider: &str,
    content_hash: &str,
    embedding: &[f32],
) -> StrataResult<()> {
    conn.execute(
        "INSERT INTO stream_embeddings
            (stream_id, organization_id, provider, content_hash, embedding, dimensions, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
         ON CONFLICT(stream_id) DO UPDATE SET
            organization_id = excluded.organization_id,
            provider = excluded.provider,
            content_hash = excluded.content_hash,
            embedding = excluded.embedding,
            dimensions = excluded.dimensions,
            updated_at = excluded.updated_at",
        params![
            stream_id,
            organization_id,
            provider,
            content_hash,
            f32_vec_to_bytes(embedding),
            embedding.len() as i64,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Distinct providers behind an organization's stored embeddings, sorted.
pub fn index_providers(conn: &Connection, organization_id: &str) -> StrataResult<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT provider FROM stream_embeddings
             WHERE organization_id = ?1 ORDER BY provider",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![organization_id], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn embedding_hash(conn: &Connection, stream_id: &str) -> StrataResult<Option<String>> {
    conn.query_row(
        "SELECT content_hash FROM stream_embeddings WHERE stream_id = ?1",
        params![stream_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn remove_embedding(conn: &Connection, stream_id: &str) -> StrataResult<()> {
    conn.execute(
        "DELETE FROM stream_embeddings WHERE stream_id = ?1",
        params![stream_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// `(stream_id, cosine_similarity)` pairs within one organization, best first.
/// Only embeddings from `provider` are compared; those of a different
/// dimensionality and non-positive similarities are skipped.
pub fn search_streams(
    conn: &Connection,
    organization_id: &str,
    provider: &str,
    query: &[f32],
    limit: usize,
) -> StrataResult<Vec<(String, f64)>> {
    let query_norm_sq: f64 = query.iter().map(|x| (*x as f64) * (*x as f64)).sum();
    if query_norm_sq == 0.0 || limit == 0 {
        return Ok(Vec::new());
    }

    let mut stmt = conn
        .prepare(
            "SELECT stream_id, embedding, dimensions FROM stream_embeddings
             WHERE organization_id = ?1 AND provider = ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![organization_id, provider], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut scored = Vec::new();
    for row in rows {
        let (stream_id, blob, dims) = row.map_err(|e| to_storage_err(e.to_string()))?;
        if dims as usize != query.len() {
            continue;
        }
        let sim = cosine_similarity(query, &bytes_to_f32_vec(&blob));
        if sim > 0.0 {
            scored.push((stream_id, sim));
        }
    }

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(limit);
    Ok(scored)
}

fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_encoding_preserves_values() {
        let v = vec![0.25_f32, -1.5, 3.0];
        assert_eq!(bytes_to_f32_vec(&f32_vec_to_bytes(&v)), v);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-9);
    }
}
