/// Team and exhibition events excluded from the corpus.
///
/// Matching is a case-insensitive substring test on the tournament name, so
/// "Davis Cup" also removes "Davis Cup Finals" and every qualifying tie.
pub fn get_excluded_events() -> Vec<String> {
    [
        "Davis Cup",
        "Laver Cup",
        "United Cup",
        "Olympics",
        "Atp Cup",
        "Next Gen",
        "Billie Jean King",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}
