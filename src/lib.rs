// Enable pedantic lints globally, then allow the noisy ones we're not fixing.
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]
// DSP code performs intentional casts
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap
)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(
    clippy::module_name_repetitions,
    clippy::doc_markdown,
    clippy::float_cmp,
    clippy::needless_pass_by_value
)]
#![allow(clippy::redundant_pub_crate)]

pub mod complex;
pub mod convolver;
pub mod error;
pub mod io;
pub mod ir;
pub mod settings;
pub mod transform;

pub use convolver::{Convolver, EngineKind, FirConvolver, Network};
pub use error::ConvolutionError;
pub use transform::{RustFftTransform, Transform};
