//! Process-wide shutdown coordination.
//! A single cancellation token, cancelled by the Ctrl-C handler, so that
//! in-flight rename runs wind down and report what they did.
//!
//! Notes:
//! - `request()` is idempotent and safe to call from the ctrlc thread.
//! - Runs use `token()`, a child of the root, so cancelling one run never
//!   cancels the process.

use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

static ROOT: OnceLock<CancellationToken> = OnceLock::new();

fn root() -> &'static CancellationToken {
    ROOT.get_or_init(CancellationToken::new)
}

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    root().cancel();
}

/// Check whether a shutdown has been requested.
#[inline]
pub fn is_requested() -> bool {
    root().is_cancelled()
}

/// A fresh token that is cancelled on shutdown.
pub fn token() -> CancellationToken {
    root().child_token()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_cancel_leaves_root_alone() {
        let t = token();
        t.cancel();
        assert!(t.is_cancelled());
        assert!(!is_requested());
    }
}
