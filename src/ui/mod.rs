pub mod charts;
pub mod panels;

/// "hours.per.week" → "Hours per week", "workclass" → "Workclass".
pub fn column_title(column: &str) -> String {
    let spaced = column.replace(['.', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
