pub mod correction;
pub mod detectors;
pub mod io;
pub mod metrics;
pub mod session;
pub mod signal;

pub use correction::*;
pub use detectors::*;
pub use metrics::*;
pub use session::*;
pub use signal::*;
