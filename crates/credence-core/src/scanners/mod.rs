//! Content integrity scanners.
//!
//! Each scanner answers one question about a document and returns exactly
//! one [`SecurityFinding`]. Scanners are independent: none reads another's
//! output, so they can be composed in any order.

pub mod injection;
pub mod invisible;
pub mod patterns;
pub mod semantic;

pub use injection::PatternInjectionScanner;
pub use invisible::InvisibleContentDetector;
pub use semantic::SemanticEvasionDetector;

use crate::extract::LayeredText;
use crate::types::SecurityFinding;

/// A content integrity check over both views of a document.
pub trait Scanner {
    /// Detector name recorded on every finding.
    fn name(&self) -> &'static str;

    /// Scan the document. Never fails; a clean document yields a clear finding.
    fn scan(&self, layers: &LayeredText) -> SecurityFinding;
}
