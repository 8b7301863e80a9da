//! Upsert statement construction.

/// Quote an identifier for interpolation into a statement, doubling any
/// embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build the insert-with-conflict-merge statement for one payload.
///
/// Every payload column is merged on conflict (last write wins per
/// overlapping column), and the full affected rows are requested back.
/// Caller guarantees `columns` is non-empty and ordered; values bind as
/// `$1..$n` in the same order.
pub fn upsert_statement(table: &str, on_conflict: &str, columns: &[&str]) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let merge_list = columns
        .iter()
        .map(|c| {
            let quoted = quote_ident(c);
            format!("{quoted} = EXCLUDED.{quoted}")
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {} RETURNING *",
        quote_ident(table),
        column_list,
        placeholders,
        quote_ident(on_conflict),
        merge_list,
    )
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
