//! Inverse document frequency variants, all in base 2.

/// `1 / ln 2`.
pub const REC_LOG_2_OF_E: f64 = std::f64::consts::LOG2_E;

#[inline]
pub fn log2(value: f64) -> f64 {
    value.log2()
}

/// Idf functions bound to a collection size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Idf {
    pub number_of_documents: f64,
}

impl Idf {
    pub fn new(number_of_documents: f64) -> Idf {
        Idf {
            number_of_documents,
        }
    }

    /// `log2(N / df)`.
    pub fn idf(&self, document_frequency: f64) -> f64 {
        log2(self.number_of_documents / document_frequency)
    }

    /// `log2((N + 1) / (df + 0.5))`, the DFR idf.
    pub fn idf_dfr(&self, document_frequency: f64) -> f64 {
        log2((self.number_of_documents + 1.0) / (document_frequency + 0.5))
    }

    /// `log2((N - df) / df)`, the INQUERY idf; zero when the term is in at least half
    /// of the documents.
    pub fn idf_enquiry(&self, document_frequency: f64) -> f64 {
        let ratio = (self.number_of_documents - document_frequency) / document_frequency;
        if ratio <= 1.0 { 0.0 } else { log2(ratio) }
    }

    /// `log2((N + 1) / (n_exp + 0.5))` with the expected document frequency `n_exp`
    /// of a term occurring `term_frequency` times.
    pub fn idf_n_exp(&self, term_frequency: f64) -> f64 {
        let n = self.number_of_documents;
        let n_exp = n * (1.0 - ((n - 1.0) / n).powf(term_frequency));
        log2((n + 1.0) / (n_exp + 0.5))
    }
}
