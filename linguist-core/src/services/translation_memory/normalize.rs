/// Matching key for a source string: lowercase, single spaces, no quote marks.
///
/// `&` accelerators and `%N` placeholders are kept so a match never moves them.
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    collapsed
        .chars()
        .filter(|ch| !matches!(ch, '“' | '”' | '‘' | '’' | '"' | '\''))
        .collect()
}
