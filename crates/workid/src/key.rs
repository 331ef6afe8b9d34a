/// Prefix shared by every reservation key.
pub const KEY_PREFIX: &str = "workid:";

/// Derives the reservation key for a candidate id within a namespace.
///
/// The key is the sole coordination point between independent processes:
/// equal `(app, module, candidate)` tuples always map to the same key, so
/// two processes racing for the same candidate contend on the same store
/// entry.
///
/// Layout: `workid:<app>:<module>:<candidate>` with the candidate formatted
/// as a base-10 integer.
pub fn reservation_key(app: &str, module: &str, candidate: u16) -> String {
    format!("{KEY_PREFIX}{app}:{module}:{candidate}")
}
