pub use crate::error::{Error, Result};

pub use log::{debug, error, info, trace, warn};
