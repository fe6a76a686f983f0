//! Short correlation identifiers.

use rand::Rng;

/// Generate an 8-hex-digit correlation identifier.
///
/// Meant for at-a-glance matching between application logs and the
/// annotated comment; collision-tolerant, not cryptographic, and not
/// globally unique.
pub fn new_identifier() -> String {
    let mut rng = rand::thread_rng();
    format!("{:08x}", rng.gen::<u32>())
}
