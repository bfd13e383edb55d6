//! Hashed TF-IDF provider.
//!
//! Terms are folded into a fixed number of signed buckets (the hashing
//! trick), weighted by sub-linear term frequency and a length-based IDF
//! estimate, then L2-normalized. Deterministic and dependency-free, so it is
//! always available as the last link of the provider chain.

use std::collections::BTreeMap;

use strata_core::errors::StrataResult;
use strata_core::traits::IEmbeddingProvider;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of", "on",
    "or", "the", "this", "to", "with",
];

pub struct HashedTfIdf {
    dimensions: usize,
}

impl HashedTfIdf {
    pub const NAME: &'static str = "hashed-tfidf";

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// FNV-1a, 64 bit.
    fn fnv1a(term: &str) -> u64 {
        term.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
        })
    }

    /// Lowercased alphanumeric terms, stopwords removed, plural `s` folded.
    pub(crate) fn terms(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .filter(|t| t.chars().count() >= 2 && !STOPWORDS.contains(&t.as_str()))
            .map(|t| {
                if t.len() > 3 && t.ends_with('s') && !t.ends_with("ss") {
                    t[..t.len() - 1].to_string()
                } else {
                    t
                }
            })
            .collect()
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for term in Self::terms(text) {
            *counts.entry(term).or_default() += 1;
        }

        let mut out = vec![0.0_f32; self.dimensions];
        for (term, count) in &counts {
            let h = Self::fnv1a(term);
            let bucket = (h % self.dimensions as u64) as usize;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            let tf = 1.0 + (*count as f32).ln();
            let idf = 1.0 + (term.chars().count() as f32).ln();
            out[bucket] += sign * tf * idf;
        }

        let norm = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            out.iter_mut().for_each(|x| *x /= norm);
        }
        out
    }
}

impl IEmbeddingProvider for HashedTfIdf {
    fn embed(&self, text: &str) -> StrataResult<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    fn embed_batch(&self, texts: &[String]) -> StrataResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn blank_text_is_the_zero_vector() {
        let p = HashedTfIdf::new(64);
        let v = p.embed("  the of ").unwrap();
        assert_eq!(v.len(), 64);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn non_blank_text_has_unit_norm() {
        let p = HashedTfIdf::new(256);
        let v = p.embed("Quarterly supplier invoices").unwrap();
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
    }

    #[test]
    fn same_text_same_vector() {
        let p = HashedTfIdf::new(128);
        assert_eq!(p.embed("renewal call").unwrap(), p.embed("renewal call").unwrap());
    }

    #[test]
    fn plurals_and_case_fold_together() {
        assert_eq!(HashedTfIdf::terms("Invoices"), vec!["invoice"]);
        assert_eq!(HashedTfIdf::terms("the class"), vec!["class"]);
    }

    #[test]
    fn overlapping_texts_score_higher() {
        let p = HashedTfIdf::new(256);
        let finance = p.embed("Finance. Invoices and supplier payments").unwrap();
        let invoice = p.embed("Pay the supplier invoice").unwrap();
        let lunch = p.embed("Book team lunch venue").unwrap();
        assert!(cosine(&finance, &invoice) > cosine(&finance, &lunch));
    }

    #[test]
    fn batch_agrees_with_single_calls() {
        let p = HashedTfIdf::new(32);
        let texts = vec!["alpha beta".to_string(), "gamma".to_string()];
        let batch = p.embed_batch(&texts).unwrap();
        assert_eq!(batch[0], p.embed("alpha beta").unwrap());
        assert_eq!(batch[1], p.embed("gamma").unwrap());
    }
}
