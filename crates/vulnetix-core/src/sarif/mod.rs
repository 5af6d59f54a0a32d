//! SARIF document model and the dual-pass validation engine.

pub mod dual;
pub mod model;
pub mod rules;
pub mod schema;
pub mod validate;

pub use dual::{DualValidator, EnhancedValidationResult};
pub use rules::{Diagnostic, Diagnostics, SUPPORTED_VERSIONS, SarifVersion};
pub use validate::{Stats, StructuralValidator, ValidationResult};
