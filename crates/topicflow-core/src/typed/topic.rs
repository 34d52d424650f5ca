//! Topic trait - ペイロード型と購読パターンの対応付け

use serde::de::DeserializeOwned;

/// A payload type that knows which topic pattern it is subscribed under.
///
/// # Example
/// ```ignore
/// #[derive(Deserialize)]
/// struct OrderCreated {
///     order_id: u64,
/// }
///
/// impl Topic for OrderCreated {
///     const PATTERN: &'static str = "orders.created";
/// }
///
/// builder.subscribe_topic::<OrderCreated, _>(OrderHandler)?;
/// ```
///
/// `GROUP` overrides the default group; the version suffix is still applied.
pub trait Topic: DeserializeOwned + Send + 'static {
    /// Exact topic or wildcard pattern (`*` one segment, `#` one or more).
    const PATTERN: &'static str;

    const GROUP: Option<&'static str> = None;
}
