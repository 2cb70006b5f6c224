/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Human-facing order number: `ORD` + creation millis + 4 random digits.
///
/// The random suffix keeps numbers unique when two orders land in the same
/// millisecond.
pub fn order_number(now: i64) -> String {
    use rand::Rng;
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("ORD{}{:04}", now, suffix)
}

/// Fresh resource id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
