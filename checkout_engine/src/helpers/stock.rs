/// Clamp a requested cart quantity against the known available stock.
///
/// The accepted quantity is `min(max(requested, 1), available)` when the stock level is known.
/// When it is unknown (`None`), no ceiling is applied and the server remains the final authority;
/// only the `>= 1` floor is enforced. The second element reports whether the request was changed.
pub fn clamp(requested: u32, available: Option<u32>) -> (u32, bool) {
    let floored = requested.max(1);
    let accepted = match available {
        Some(stock) => floored.min(stock),
        None => floored,
    };
    (accepted, accepted != requested)
}
