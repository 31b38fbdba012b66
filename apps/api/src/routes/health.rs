/// GET /
/// Liveness probe: a static confirmation string.
pub async fn liveness_handler() -> &'static str {
    "TalentScout screening API is running"
}
