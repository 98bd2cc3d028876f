//! Entity and file naming helpers.

use std::collections::HashSet;
use std::path::Path;

/// Return `name` if unused, otherwise the first of `{name}_001`,
/// `{name}_002`, ... that is not in `used`.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use slyvid_core::naming::free_name;
///
/// let used: HashSet<String> = ["Demo".to_string(), "Demo_001".to_string()].into();
/// assert_eq!(free_name(&used, "Demo"), "Demo_002");
/// assert_eq!(free_name(&used, "Other"), "Other");
/// ```
pub fn free_name(used: &HashSet<String>, name: &str) -> String {
    let mut candidate = name.to_string();
    let mut suffix = 1u32;
    while used.contains(&candidate) {
        candidate = format!("{name}_{suffix:03}");
        suffix += 1;
    }
    candidate
}

/// File name with extension, e.g. `orange_kiwi.mp4` for `data/orange_kiwi.mp4`.
pub fn file_name_with_ext(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
