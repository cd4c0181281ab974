// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Once;
use tracing::Level;

static TRACING: Once = Once::new();

/// Installs a debug-level subscriber once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        // Another subscriber may already be installed by the harness.
        let _ = tally_pipeline::telemetry::setup_tracing(Level::DEBUG);
    });
}
