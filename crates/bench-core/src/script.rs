//! Script mode: replay a user-supplied statement blob instead of the
//! benchmark catalog.

/// Concatenate script lines into one statement blob.
///
/// No line separators are reinserted: the statements execute as a single
/// batch per iteration, otherwise concurrent workers would race each other
/// between the individual statements of the script.
pub fn join_script<S: AsRef<str>>(lines: &[S]) -> String {
    let mut script = String::new();
    for line in lines {
        script.push_str(line.as_ref());
    }
    script
}
