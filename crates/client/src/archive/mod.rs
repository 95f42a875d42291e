//! Archive URL handling.
//!
//! ### Domain Normalization
//! - Inject `http://` when no scheme is present, parse, keep the last two
//!   host labels, lowercase.
//!
//! ### Original URL Extraction
//! - Archive links embed the original URL after the service prefix; the
//!   last `http` marks it.
//!
//! ### Mapping Resolution
//! - Canonical domain → archive origin, origin + path → upstream URL.

pub mod domain;
pub mod extract;
pub mod resolve;

pub use domain::{normalize_domain, with_scheme};
pub use extract::{extract_original, is_image_url};
pub use resolve::{Resolved, resolve};
