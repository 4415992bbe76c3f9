pub mod sqlite_user_repo;
pub mod sqlite_auth_repo;
pub mod sqlite_category_repo;
pub mod sqlite_event_repo;
pub mod sqlite_registration_repo;
pub mod sqlite_report_repo;

pub mod postgres_user_repo;
pub mod postgres_auth_repo;
pub mod postgres_category_repo;
pub mod postgres_event_repo;
pub mod postgres_registration_repo;
pub mod postgres_report_repo;

/// Builds a `%term%` pattern for `LIKE ... ESCAPE '\'`, folded to lowercase
/// and with the wildcard characters of `term` taken literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
