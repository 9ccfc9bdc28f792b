use std::collections::HashSet;

use docstage_core::models::CandidateFile;

/// Return a name that no file in `collection` already uses.
///
/// An unused name is returned unchanged. Otherwise the name is split at its last
/// `.` and a counter is inserted before the extension: `a.pdf` becomes `a (1).pdf`,
/// then `a (2).pdf`, and so on. A name without a dot gets the counter appended.
pub fn unique_name(candidate_name: &str, collection: &[CandidateFile]) -> String {
    unique_name_excluding(candidate_name, collection.iter().map(|f| f.name()))
}

/// [`unique_name`] over names drawn from more than one collection.
pub fn unique_name_excluding<'a>(
    candidate_name: &str,
    taken: impl IntoIterator<Item = &'a str>,
) -> String {
    let taken: HashSet<&str> = taken.into_iter().collect();

    if !taken.contains(candidate_name) {
        return candidate_name.to_string();
    }

    let (base, ext) = match candidate_name.rfind('.') {
        Some(idx) => candidate_name.split_at(idx),
        None => (candidate_name, ""),
    };

    let mut counter = 1u64;
    loop {
        let name = format!("{} ({}){}", base, counter, ext);
        if !taken.contains(name.as_str()) {
            return name;
        }
        counter += 1;
    }
}
