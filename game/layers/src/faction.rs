/// Short display tag for a full faction name.
///
/// Factions the game ships with have fixed, well known tags. Anything
/// else (modded factions etc.) falls back to the upper-cased initials
/// of each word of the name.
pub fn faction_tag(faction: &str) -> String {
    match faction {
        "United States Army" => "USA".to_string(),
        "United States Marine Corps" => "USMC".to_string(),
        "Russian Ground Forces" => "RUS".to_string(),
        "British Army" => "GB".to_string(),
        "Canadian Army" => "CAF".to_string(),
        "Australian Defence Force" => "AUS".to_string(),
        "Irregular Militia Forces" => "IRR".to_string(),
        "Middle Eastern Alliance" => "MEA".to_string(),
        "Insurgent Forces" => "INS".to_string(),
        other => other
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(|c| c.to_uppercase())
            .collect(),
    }
}
