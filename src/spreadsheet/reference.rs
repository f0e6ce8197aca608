//! A1-style cell references, 1-indexed on both axes.

/// Converts a column label ("A", "AB") to its 1-based index.
pub(crate) fn col_to_index(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    label.chars().try_fold(0usize, |index, character| {
        let character = character.to_ascii_uppercase();
        if character.is_ascii_uppercase() {
            index.checked_mul(26)?.checked_add((character as u8 - b'A') as usize + 1)
        } else {
            None
        }
    })
}

/// Converts a 1-based column index to its label.
pub(crate) fn index_to_col(mut index: usize) -> String {
    let mut label = Vec::new();
    while index > 0 {
        let remainder = (index - 1) % 26;
        label.push(b'A' + remainder as u8);
        index = (index - 1) / 26;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Parses a reference such as "D7" into `(row, col)`.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|character: char| character.is_ascii_digit())?;
    let (col, row) = reference.split_at(split);
    let col = col_to_index(col.trim_start_matches('$').trim_end_matches('$'))?;
    let row = row.parse::<usize>().ok().filter(|row| *row > 0)?;
    Some((row, col))
}

/// Formats `(row, col)` as an A1-style reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row)
}
