//! Request signing seam.
//!
//! Credential acquisition and signature computation live outside this crate;
//! callers plug them in through [`RequestSigner`].

use crate::error::Result;

/// Signs outgoing requests (e.g. SigV4 with a credentials provider)
///
/// Called once per request, after the request is fully built and before it
/// is sent. Implementations add whatever headers the signature scheme needs.
pub trait RequestSigner: Send + Sync {
    /// Sign `request` for `region`
    fn sign(&self, request: &mut reqwest::Request, region: &str) -> Result<()>;
}

/// Signer plus the region it signs for, resolved at client construction
#[derive(Clone)]
pub(crate) struct SigningContext {
    pub(crate) signer: std::sync::Arc<dyn RequestSigner>,
    pub(crate) region: String,
}

impl SigningContext {
    pub(crate) fn sign(&self, request: &mut reqwest::Request) -> Result<()> {
        self.signer.sign(request, &self.region)
    }
}

impl std::fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningContext")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
